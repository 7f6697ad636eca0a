//! Particle records, as stored in event collections

use crate::{momentum::FourMomentum, numeric::Float};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Identifier of a collection within an event
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CollectionId(pub u32);

impl Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a particle that is owned by another collection
///
/// Subset collections and constituent links of composite particles are made
/// of these. They are resolved by `Event::resolve()`.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct ObjectRef {
    /// Collection which owns the referenced particle
    pub collection: CollectionId,

    /// Position of the particle within that collection
    pub index: usize,
}
//
impl ObjectRef {
    /// Refer to the particle at some index of a collection
    pub fn new(collection: CollectionId, index: usize) -> Self {
        Self { collection, index }
    }
}

impl Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.collection, self.index)
    }
}

/// How the energy component of a particle's 4-momentum is obtained
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum P4Source {
    /// Use the stored mass and the 3-momentum: E = √(|p|² + m²)
    #[default]
    Mass,

    /// Use the stored energy as-is
    Energy,
}

/// A reconstructed (or generated) particle
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Particle {
    /// PDG particle ID
    pub pdg: i32,

    /// Energy (GeV)
    pub energy: Float,

    /// 3-momentum (GeV)
    pub momentum: [Float; 3],

    /// Mass (GeV). For fitted composites, this is what the fit reported.
    pub mass: Float,

    /// Electric charge
    #[serde(default)]
    pub charge: Float,

    /// Particle ID quality. Candidate finders store the fit probability here.
    #[serde(default)]
    pub goodness_of_pid: Float,

    /// Generator status, only set for Monte Carlo truth particles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_status: Option<i32>,

    /// Constituents of a composite particle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub particles: Vec<ObjectRef>,
}
//
impl Particle {
    /// Build a particle from its kinematics
    pub fn new(pdg: i32, p4: FourMomentum) -> Self {
        Self {
            pdg,
            energy: p4.e(),
            momentum: [p4.px(), p4.py(), p4.pz()],
            mass: p4.mass(),
            charge: 0.,
            goodness_of_pid: 0.,
            generator_status: None,
            particles: Vec::new(),
        }
    }

    /// Set the electric charge
    pub fn with_charge(mut self, charge: Float) -> Self {
        self.charge = charge;
        self
    }

    /// Mark this particle as Monte Carlo truth with some generator status
    pub fn with_generator_status(mut self, status: i32) -> Self {
        self.generator_status = Some(status);
        self
    }

    /// 4-momentum of the particle
    pub fn p4(&self, source: P4Source) -> FourMomentum {
        match source {
            P4Source::Mass => FourMomentum::from_mass(self.momentum, self.mass),
            P4Source::Energy => {
                let [px, py, pz] = self.momentum;
                FourMomentum::new(px, py, pz, self.energy)
            }
        }
    }

    /// Transverse momentum
    pub fn pt(&self) -> Float {
        self.p4(P4Source::Energy).pt()
    }
}
