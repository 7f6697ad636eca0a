//! Masses of the Higgs and Z candidates from the recoil reconstruction

use super::Analysis;
use crate::{
    accumulator::Accumulator, config::Configuration, event::Event, histogram::HistSpec,
    selection::Selection,
};
use eyre::{eyre, Result};

const HIGGS_MASS: &str = "higgs_mass";
const Z_MASS: &str = "z_mass";

/// Stored masses of the leading Higgs and Z candidates
pub struct Candidates {
    higgs: String,
    z: String,
    selection: Selection,
    histograms: Vec<HistSpec>,
}
//
impl Candidates {
    /// Set up the analysis from the configuration
    pub fn new(config: &Configuration) -> Self {
        let higgs = config.collections.higgs.clone();
        Self {
            selection: Selection::non_empty(&higgs),
            higgs,
            z: config.collections.z.clone(),
            histograms: config.book(vec![
                HistSpec::new(HIGGS_MASS, "Higgs;Mass [GeV];Entries", 100, 0., 250.),
                HistSpec::new(Z_MASS, "Z;Mass [GeV];Entries", 100, 0., 250.),
            ]),
        }
    }
}
//
impl Analysis for Candidates {
    fn name(&self) -> &'static str {
        "candidates"
    }

    fn histograms(&self) -> Vec<HistSpec> {
        self.histograms.clone()
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn analyze(&self, event: &Event, acc: &mut Accumulator) -> Result<()> {
        for (collection, hist) in [(&self.higgs, HIGGS_MASS), (&self.z, Z_MASS)] {
            let leading = event
                .particles(collection)?
                .into_iter()
                .next()
                .ok_or_else(|| eyre!("{collection} is empty"))?;
            acc.fill(hist, leading.mass)?;
        }
        Ok(())
    }
}
