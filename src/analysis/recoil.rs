//! Z → μμ reconstruction and the mass of the system recoiling against it

use super::Analysis;
use crate::{
    accumulator::Accumulator,
    config::Configuration,
    event::Event,
    histogram::HistSpec,
    momentum::{recoil_mass, FourMomentum},
    numeric::Float,
    particle::P4Source,
    selection::Selection,
};
use eyre::Result;

const Z_MASS: &str = "z_mass";
const RECOIL_MASS: &str = "recoil_mass";

/// Recoil mass analysis of events with exactly two muons
pub struct Recoil {
    muons: String,
    p4_source: P4Source,
    e_cms: Float,
    selection: Selection,
    histograms: Vec<HistSpec>,
}
//
impl Recoil {
    /// Set up the analysis from the configuration
    pub fn new(config: &Configuration) -> Self {
        let muons = config.collections.muons.clone();
        Self {
            selection: Selection::multiplicity(&muons, 2),
            muons,
            p4_source: config.muon_p4,
            e_cms: config.e_cms,
            histograms: config.book(vec![
                HistSpec::new(Z_MASS, ";Mass / GeV;Entries", 240, 60., 120.),
                HistSpec::new(RECOIL_MASS, ";Mass / GeV;Entries", 380, 60., 250.),
            ]),
        }
    }
}
//
impl Analysis for Recoil {
    fn name(&self) -> &'static str {
        "recoil"
    }

    fn histograms(&self) -> Vec<HistSpec> {
        self.histograms.clone()
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn analyze(&self, event: &Event, acc: &mut Accumulator) -> Result<()> {
        let z_p4 = event
            .particles(&self.muons)?
            .into_iter()
            .map(|muon| muon.p4(self.p4_source))
            .sum::<FourMomentum>();
        acc.fill(Z_MASS, z_p4.mass())?;
        acc.fill(RECOIL_MASS, recoil_mass(FourMomentum::at_rest(self.e_cms), z_p4))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::run, fixtures};
    use approx::assert_relative_eq;

    #[test]
    fn back_to_back_muons() {
        let analysis = Recoil::new(&Configuration::default());
        let acc = run(&analysis, vec![Ok(fixtures::zh_event(0))]).unwrap();

        let z_mass = acc.histogram(Z_MASS).unwrap();
        assert_eq!(z_mass.entries(), 1);
        assert_relative_eq!(z_mass.mean(), 100., max_relative = 1e-9);
        assert_eq!(z_mass.integral(), 1.);

        let recoil = acc.histogram(RECOIL_MASS).unwrap();
        assert_relative_eq!(recoil.mean(), 150., max_relative = 1e-9);
    }

    #[test]
    fn masses_follow_the_muon_kinematics() {
        let mu1 = FourMomentum::new(12., -30., 25., 60.);
        let mu2 = FourMomentum::new(-20., 15., 5., 40.);
        let event = fixtures::muon_event(0, &[mu1, mu2]);
        let mut config = Configuration::default();
        config.muon_p4 = P4Source::Energy;
        let analysis = Recoil::new(&config);
        let acc = run(&analysis, vec![Ok(event)]).unwrap();

        let (e, px, py, pz): (Float, Float, Float, Float) = (100., -8., -15., 30.);
        let expected_z = (e * e - px * px - py * py - pz * pz).sqrt();
        let expected_recoil = ((250. - e) * (250. - e) - px * px - py * py - pz * pz).sqrt();
        assert_relative_eq!(acc.histogram(Z_MASS).unwrap().mean(), expected_z, max_relative = 1e-9);
        assert_relative_eq!(
            acc.histogram(RECOIL_MASS).unwrap().mean(),
            expected_recoil,
            max_relative = 1e-9
        );
    }

    #[test]
    fn other_multiplicities_contribute_nothing() {
        let analysis = Recoil::new(&Configuration::default());
        let muon = FourMomentum::new(1., 2., 3., 40.);
        let events = (0..4).map(|n| Ok(fixtures::muon_event(n as u64, &vec![muon; n])));
        let acc = run(&analysis, events).unwrap();
        assert_eq!(acc.processed_events(), 4);
        assert_eq!(acc.selected_events(), 1);
        assert_eq!(acc.histogram(Z_MASS).unwrap().total(), 1.);
        assert_eq!(acc.histogram(RECOIL_MASS).unwrap().total(), 1.);
    }
}
