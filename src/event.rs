//! This module defines the properties and storage of events
//!
//! An event is a bag of named particle collections. A collection either owns
//! its particles, or is a "subset" collection made of references into other
//! collections. All reference resolution goes through `Event`, so that the
//! analyses never have to do index bookkeeping themselves.

use crate::particle::{CollectionId, ObjectRef, Particle};
use eyre::{bail, ensure, eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contents of a collection
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionData {
    /// The collection owns its particles
    Owned(Vec<Particle>),

    /// The collection refers to particles owned by other collections
    Subset(Vec<ObjectRef>),
}

/// A named collection of particles within an event
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawCollection", into = "RawCollection")]
pub struct Collection {
    name: String,
    id: CollectionId,
    data: CollectionData,
}
//
impl Collection {
    /// Build a collection which owns its particles
    pub fn owned(name: impl Into<String>, id: CollectionId, particles: Vec<Particle>) -> Self {
        Self {
            name: name.into(),
            id,
            data: CollectionData::Owned(particles),
        }
    }

    /// Build a subset collection
    pub fn subset(name: impl Into<String>, id: CollectionId, refs: Vec<ObjectRef>) -> Self {
        Self {
            name: name.into(),
            id,
            data: CollectionData::Subset(refs),
        }
    }

    /// Identifier used by references into this collection
    #[cfg(test)]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Truth that this collection only refers to particles of other collections
    #[cfg(test)]
    pub fn is_subset(&self) -> bool {
        matches!(self.data, CollectionData::Subset(_))
    }

    /// Number of elements, whether owned or referenced
    pub fn len(&self) -> usize {
        match &self.data {
            CollectionData::Owned(particles) => particles.len(),
            CollectionData::Subset(refs) => refs.len(),
        }
    }
}

/// On-disk layout of a collection: exactly one of `particles` and `subset`
#[derive(Deserialize, Serialize)]
struct RawCollection {
    name: String,
    id: CollectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    particles: Option<Vec<Particle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subset: Option<Vec<ObjectRef>>,
}

impl TryFrom<RawCollection> for Collection {
    type Error = String;

    fn try_from(raw: RawCollection) -> std::result::Result<Self, String> {
        let data = match (raw.particles, raw.subset) {
            (Some(particles), None) => CollectionData::Owned(particles),
            (None, Some(refs)) => CollectionData::Subset(refs),
            (None, None) => CollectionData::Owned(Vec::new()),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "collection {} cannot both own particles and be a subset",
                    raw.name
                ))
            }
        };
        Ok(Self {
            name: raw.name,
            id: raw.id,
            data,
        })
    }
}

impl From<Collection> for RawCollection {
    fn from(coll: Collection) -> Self {
        let (particles, subset) = match coll.data {
            CollectionData::Owned(particles) => (Some(particles), None),
            CollectionData::Subset(refs) => (None, Some(refs)),
        };
        Self {
            name: coll.name,
            id: coll.id,
            particles,
            subset,
        }
    }
}

/// Storage for one event
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct Event {
    number: u64,
    collections: Vec<Collection>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<CollectionId, usize>,
}
//
impl Event {
    /// Build an event, checking that collection names and ids are unique
    pub fn new(number: u64, collections: Vec<Collection>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(collections.len());
        let mut by_id = HashMap::with_capacity(collections.len());
        for (pos, coll) in collections.iter().enumerate() {
            ensure!(
                by_name.insert(coll.name.clone(), pos).is_none(),
                "Event {number} has two collections named {}",
                coll.name
            );
            ensure!(
                by_id.insert(coll.id, pos).is_none(),
                "Event {number} has two collections with id {}",
                coll.id
            );
        }
        Ok(Self {
            number,
            collections,
            by_name,
            by_id,
        })
    }

    /// Event number
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Look up a collection by name
    ///
    /// Analyses declare which collections they read, so a missing one means
    /// that the input does not match the analysis and is reported as an error.
    ///
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.by_name
            .get(name)
            .map(|&pos| &self.collections[pos])
            .ok_or_else(|| eyre!("Event {} has no collection named {name}", self.number))
    }

    /// Multiplicity of a collection
    pub fn len(&self, name: &str) -> Result<usize> {
        Ok(self.collection(name)?.len())
    }

    /// Resolve a reference to the particle it designates
    pub fn resolve(&self, obj: ObjectRef) -> Result<&Particle> {
        let Some(&pos) = self.by_id.get(&obj.collection) else {
            bail!("Event {} has no collection with id {}", self.number, obj.collection);
        };
        let target = &self.collections[pos];
        match &target.data {
            CollectionData::Owned(particles) => particles.get(obj.index).ok_or_else(|| {
                eyre!(
                    "Reference {obj} is out of range: {} only has {} particles",
                    target.name,
                    particles.len()
                )
            }),
            CollectionData::Subset(_) => bail!(
                "Reference {obj} points into subset collection {}, which owns no particles",
                target.name
            ),
        }
    }

    /// Particles of a collection, resolving subset references
    pub fn particles(&self, name: &str) -> Result<Vec<&Particle>> {
        let coll = self.collection(name)?;
        match &coll.data {
            CollectionData::Owned(particles) => Ok(particles.iter().collect()),
            CollectionData::Subset(refs) => refs.iter().map(|&obj| self.resolve(obj)).collect(),
        }
    }

    /// Constituents of a composite particle
    pub fn constituents(&self, particle: &Particle) -> Result<Vec<&Particle>> {
        particle
            .particles
            .iter()
            .map(|&obj| self.resolve(obj))
            .collect()
    }
}

/// On-disk layout of an event
#[derive(Deserialize, Serialize)]
struct RawEvent {
    number: u64,
    collections: Vec<Collection>,
}

impl TryFrom<RawEvent> for Event {
    type Error = String;

    fn try_from(raw: RawEvent) -> std::result::Result<Self, String> {
        Event::new(raw.number, raw.collections).map_err(|e| e.to_string())
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        Self {
            number: event.number,
            collections: event.collections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn subset_collections_resolve_to_owned_particles() {
        let event = fixtures::zh_event(0);
        let pfos = event.particles("PandoraPFOs").unwrap();
        let muons = event.particles("Muons").unwrap();
        assert_eq!(muons.len(), 2);
        assert!(event.collection("Muons").unwrap().is_subset());
        assert!(muons.iter().all(|mu| mu.pdg.abs() == 13));
        assert!(muons.iter().all(|mu| pfos.contains(mu)));
    }

    #[test]
    fn missing_collection_is_an_error() {
        let event = fixtures::zh_event(0);
        let err = event.collection("Electrons").unwrap_err();
        assert!(err.to_string().contains("Electrons"));
        assert!(event.len("Electrons").is_err());
    }

    #[test]
    fn dangling_references_are_errors() {
        let event = fixtures::zh_event(0);
        let pfos = event.collection("PandoraPFOs").unwrap().id();
        let muons = event.collection("Muons").unwrap().id();
        assert!(event.resolve(ObjectRef::new(pfos, 1000)).is_err());
        assert!(event.resolve(ObjectRef::new(CollectionId(999), 0)).is_err());
        assert!(event.resolve(ObjectRef::new(muons, 0)).is_err());
    }

    #[test]
    fn duplicate_collections_are_rejected() {
        let a = Collection::owned("A", CollectionId(1), Vec::new());
        let b = Collection::owned("A", CollectionId(2), Vec::new());
        assert!(Event::new(0, vec![a.clone(), b]).is_err());
        let c = Collection::owned("C", CollectionId(1), Vec::new());
        assert!(Event::new(0, vec![a, c]).is_err());
    }

    #[test]
    fn json_round_trip_keeps_subset_structure() {
        let event = fixtures::pi0_event(7, &[(0.1349766, 0.128, 0.137)]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"subset\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert!(back.collection("Pi0s_New").unwrap().is_subset());
    }

    #[test]
    fn ambiguous_collection_is_rejected_on_read() {
        let json = r#"{"number": 1, "collections": [
            {"name": "X", "id": 1, "particles": [], "subset": []}
        ]}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());
    }
}
