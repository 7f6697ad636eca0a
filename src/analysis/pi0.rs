//! How much the kinematic fit moves π⁰ → γγ candidates around

use super::Analysis;
use crate::{
    accumulator::Accumulator, config::Configuration, event::Event, histogram::HistSpec,
    momentum::invariant_mass, particle::P4Source, selection::Selection,
};
use eyre::{ensure, Result};

const PI0_MASS: &str = "pi0_mass";
const PI0_P4: &str = "pi0_p4";
const PI0_MASS_PREFIT: &str = "pi0_mass_prefit";
const FIT_DELTA_M: &str = "fit_delta_m";

/// Comparison of fitted π⁰ candidates with the photon pairs they come from
pub struct Pi0 {
    pi0s: String,
    p4_source: P4Source,
    selection: Selection,
    histograms: Vec<HistSpec>,
}
//
impl Pi0 {
    /// Set up the analysis from the configuration
    pub fn new(config: &Configuration) -> Self {
        Self {
            pi0s: config.collections.pi0s.clone(),
            p4_source: config.pi0_p4,
            selection: Selection::All,
            histograms: config.book(vec![
                HistSpec::new(PI0_MASS, ";M_{#pi^{0}};Entries", 100, 0.130, 0.139),
                HistSpec::new(PI0_P4, ";M_{#gamma#gamma};Entries", 100, 0.130, 0.139),
                HistSpec::new(
                    PI0_MASS_PREFIT,
                    ";M_{#gamma#gamma} (prefit);Entries",
                    100,
                    0.1,
                    0.19,
                ),
                HistSpec::new(
                    FIT_DELTA_M,
                    ";M_{#gamma#gamma} (postfit) - M_{#gamma#gamma} (prefit);Entries",
                    100,
                    -0.1,
                    0.1,
                ),
            ]),
        }
    }
}
//
impl Analysis for Pi0 {
    fn name(&self) -> &'static str {
        "pi0"
    }

    fn histograms(&self) -> Vec<HistSpec> {
        self.histograms.clone()
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn analyze(&self, event: &Event, acc: &mut Accumulator) -> Result<()> {
        for pi0 in event.particles(&self.pi0s)? {
            acc.fill(PI0_MASS, pi0.mass)?;
            let postfit_mass = pi0.p4(self.p4_source).mass();
            acc.fill(PI0_P4, postfit_mass)?;

            let photons = event.constituents(pi0)?;
            ensure!(
                photons.len() >= 2,
                "π⁰ candidate in {} has {} constituents, needs two photons",
                self.pi0s,
                photons.len()
            );
            let prefit_mass =
                invariant_mass(photons[..2].iter().map(|photon| photon.p4(self.p4_source)));
            acc.fill(PI0_MASS_PREFIT, prefit_mass)?;
            acc.fill(FIT_DELTA_M, postfit_mass - prefit_mass)?;
        }
        Ok(())
    }
}
