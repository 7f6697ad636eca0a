//! The event loop, and the analyses that can be run inside of it
//!
//! An analysis books histograms, decides which events it is interested in, and
//! fills its histograms from the events that pass this selection. The event
//! loop itself is shared by all analyses and lives in `run()`.

mod candidates;
mod ecms;
mod pi0;
mod recoil;

use crate::{
    accumulator::Accumulator, config::Configuration, event::Event, histogram::HistSpec,
    selection::Selection,
};
use eyre::{Result, WrapErr};
use log::info;

pub use self::{candidates::Candidates, ecms::CenterOfMassEnergy, pi0::Pi0, recoil::Recoil};

/// Interface shared by all analyses
pub trait Analysis {
    /// Short name, recorded in the histogram file
    fn name(&self) -> &'static str;

    /// Histograms to be booked before the event loop
    fn histograms(&self) -> Vec<HistSpec>;

    /// Which events are analyzed
    fn selection(&self) -> &Selection;

    /// Fill histograms from an event that passed the selection
    fn analyze(&self, event: &Event, acc: &mut Accumulator) -> Result<()>;

    /// Log a summary of the run
    fn report(&self, acc: &Accumulator) {
        info!(
            "{}: {} events processed, {} selected",
            self.name(),
            acc.processed_events(),
            acc.selected_events()
        );
        for hist in acc.histograms() {
            info!(
                "{:<16} entries: {:<8} mean: {:<12.6} std dev: {:.6}",
                hist.name(),
                hist.entries(),
                hist.mean(),
                hist.std_dev()
            );
        }
    }
}

/// Analyses which can be selected from the command line
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisKind {
    /// Z → μμ mass and Higgs recoil mass
    Recoil,

    /// π⁰ masses before and after the kinematic fit
    Pi0,

    /// Masses of reconstructed Higgs and Z candidates
    Candidates,

    /// Center-of-mass energy from Monte Carlo truth
    Ecms,
}
//
impl AnalysisKind {
    /// Set up the analysis
    pub fn build(self, config: &Configuration) -> Box<dyn Analysis> {
        match self {
            Self::Recoil => Box::new(Recoil::new(config)),
            Self::Pi0 => Box::new(Pi0::new(config)),
            Self::Candidates => Box::new(Candidates::new(config)),
            Self::Ecms => Box::new(CenterOfMassEnergy::new(config)),
        }
    }

    /// Where the histograms go when no output file is specified
    pub fn default_output(self) -> &'static str {
        match self {
            Self::Recoil => "higgs_recoil_hists.json",
            Self::Pi0 => "pi0_histograms.json",
            Self::Candidates => "higgs_candidates_hists.json",
            Self::Ecms => "ecms_hists.json",
        }
    }
}

/// Run an analysis over a stream of events
///
/// Every event is counted, and those which pass the analysis' selection are
/// handed over to it. Any error, whether it comes from reading the events or
/// from analyzing them, aborts the run.
///
pub fn run(
    analysis: &dyn Analysis,
    events: impl IntoIterator<Item = Result<Event>>,
) -> Result<Accumulator> {
    let mut acc = Accumulator::new(&analysis.histograms())?;
    for event in events {
        let event = event?;
        let selected = analysis.selection().keep(&event)?;
        acc.count_event(selected);
        if selected {
            analysis
                .analyze(&event, &mut acc)
                .wrap_err_with(|| format!("Failed to analyze event {}", event.number()))?;
        }
    }
    analysis.report(&acc);
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, momentum::FourMomentum};
    use eyre::eyre;

    #[test]
    fn unselected_events_are_counted_but_not_analyzed() {
        let analysis = AnalysisKind::Recoil.build(&Configuration::default());
        let muon = FourMomentum::new(0., 10., 10., 20.);
        let events = vec![
            Ok(fixtures::zh_event(0)),
            Ok(fixtures::muon_event(1, &[muon])),
            Ok(fixtures::muon_event(2, &[muon, muon, muon])),
        ];
        let acc = run(&*analysis, events).unwrap();
        assert_eq!(acc.processed_events(), 3);
        assert_eq!(acc.selected_events(), 1);
        for hist in acc.histograms() {
            assert_eq!(hist.total(), 1.);
        }
    }

    #[test]
    fn read_errors_abort_the_run() {
        let analysis = AnalysisKind::Recoil.build(&Configuration::default());
        let events = vec![Ok(fixtures::zh_event(0)), Err(eyre!("broken file"))];
        assert!(run(&*analysis, events).is_err());
    }

    #[test]
    fn binning_overrides_reach_the_bookings() {
        let mut config = Configuration::default();
        config
            .histograms
            .insert("z_mass".to_owned(), crate::histogram::Binning::new(10, 0., 190.));
        let analysis = AnalysisKind::Recoil.build(&config);
        let acc = run(&*analysis, vec![Ok(fixtures::zh_event(0))]).unwrap();
        assert_eq!(acc.histogram("z_mass").unwrap().bin_content(6), 1.);
    }
}
