//! Center-of-mass energy seen in the Monte Carlo truth

use super::Analysis;
use crate::{
    accumulator::Accumulator, config::Configuration, event::Event, histogram::HistSpec,
    numeric::Float, selection::Selection,
};
use eyre::Result;
use log::{info, warn};

const E_CMS: &str = "e_cms";

/// Sum of the energies of final state particles, event by event
pub struct CenterOfMassEnergy {
    mc_particles: String,
    final_state_status: i32,
    selection: Selection,
    histograms: Vec<HistSpec>,
}
//
impl CenterOfMassEnergy {
    /// Set up the analysis from the configuration
    pub fn new(config: &Configuration) -> Self {
        Self {
            mc_particles: config.collections.mc_particles.clone(),
            final_state_status: config.final_state_status,
            selection: Selection::All,
            histograms: config.book(vec![HistSpec::new(
                E_CMS,
                ";#sqrt{s} / GeV;Events",
                200,
                0.,
                500.,
            )]),
        }
    }
}
//
impl Analysis for CenterOfMassEnergy {
    fn name(&self) -> &'static str {
        "ecms"
    }

    fn histograms(&self) -> Vec<HistSpec> {
        self.histograms.clone()
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn analyze(&self, event: &Event, acc: &mut Accumulator) -> Result<()> {
        let sqrt_s = event
            .particles(&self.mc_particles)?
            .into_iter()
            .filter(|p| p.generator_status == Some(self.final_state_status))
            .map(|p| p.energy)
            .sum::<Float>();
        acc.fill(E_CMS, sqrt_s)
    }

    fn report(&self, acc: &Accumulator) {
        let Ok(hist) = acc.histogram(E_CMS) else {
            return;
        };
        info!(
            "<E_cms> = {} GeV from {} events",
            average(hist.sum_of_samples(), acc.processed_events()),
            acc.processed_events()
        );
        let outside = hist.underflow() + hist.overflow();
        if outside > 0. {
            let binning = hist.binning();
            warn!(
                "{outside} events fall outside of the plotted range [{}, {}] GeV",
                binning.low, binning.high
            );
        }
    }
}

/// Average of per-event values over all processed events
fn average(sum: Float, events: u64) -> Float {
    if events == 0 {
        0.
    } else {
        sum / events as Float
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::run, evgen::EventGenerator, fixtures, momentum::FourMomentum,
        random::RandomGenerator,
    };
    use approx::assert_relative_eq;

    #[test]
    fn final_state_adds_up_to_the_collision_energy() {
        let analysis = CenterOfMassEnergy::new(&Configuration::default());
        let muons = [
            FourMomentum::new(3., 40., -2., 45.),
            FourMomentum::new(-3., -35., 10., 40.),
        ];
        let events = vec![
            Ok(fixtures::zh_event(0)),
            Ok(fixtures::muon_event(1, &muons)),
        ];
        let acc = run(&analysis, events).unwrap();
        let hist = acc.histogram(E_CMS).unwrap();
        assert_eq!(hist.entries(), 2);
        assert_relative_eq!(hist.mean(), 250., max_relative = 1e-9);
        assert_relative_eq!(
            average(hist.sum_of_samples(), acc.processed_events()),
            250.,
            max_relative = 1e-9
        );
    }

    #[test]
    fn other_statuses_are_ignored() {
        let mut config = Configuration::default();
        config.final_state_status = 4;
        let analysis = CenterOfMassEnergy::new(&config);
        let acc = run(&analysis, vec![Ok(fixtures::zh_event(0))]).unwrap();
        assert_relative_eq!(acc.histogram(E_CMS).unwrap().mean(), 125.);
    }

    #[test]
    fn average_covers_events_outside_of_the_plotted_range() {
        let analysis = CenterOfMassEnergy::new(&Configuration::default());
        let generator = EventGenerator::new(600., 10.).unwrap();
        let mut rng = RandomGenerator::new(5);
        let events = (0..10)
            .map(|number| generator.generate(number, &mut rng))
            .collect::<Vec<_>>();
        let acc = run(&analysis, events).unwrap();
        let hist = acc.histogram(E_CMS).unwrap();
        assert_eq!(hist.overflow(), 10.);
        assert_eq!(hist.mean(), 0.);
        assert_relative_eq!(
            average(hist.sum_of_samples(), acc.processed_events()),
            600.,
            max_relative = 1e-9
        );
    }

    #[test]
    fn no_event_no_average() {
        assert_eq!(average(0., 0), 0.);
    }
}
