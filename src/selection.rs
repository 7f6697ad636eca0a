//! Mechanism to select which events contribute to an analysis

use crate::event::Event;
use eyre::Result;
use log::debug;

/// Predicate on events
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// Keep every event
    All,

    /// Keep events where a collection has exactly `count` elements
    Multiplicity { collection: String, count: usize },

    /// Keep events where a collection has at least one element
    NonEmpty { collection: String },
}
//
impl Selection {
    /// Require an exact collection multiplicity
    pub fn multiplicity(collection: &str, count: usize) -> Self {
        Self::Multiplicity {
            collection: collection.to_owned(),
            count,
        }
    }

    /// Require a non-empty collection
    pub fn non_empty(collection: &str) -> Self {
        Self::NonEmpty {
            collection: collection.to_owned(),
        }
    }

    /// Decide whether an event passes the selection or should be skipped
    ///
    /// Failing the predicate is not an error, but not finding the collection
    /// that the predicate is about is.
    ///
    pub fn keep(&self, event: &Event) -> Result<bool> {
        match self {
            Self::All => Ok(true),
            Self::Multiplicity { collection, count } => {
                let len = event.len(collection)?;
                if len != *count {
                    debug!(
                        "Skipping event {}: {len} entries in {collection}, expected {count}",
                        event.number()
                    );
                }
                Ok(len == *count)
            }
            Self::NonEmpty { collection } => {
                let len = event.len(collection)?;
                if len == 0 {
                    debug!("Skipping event {}: {collection} is empty", event.number());
                }
                Ok(len > 0)
            }
        }
    }
}
