//! This module allows accumulating histograms across processed events

use crate::{
    histogram::{Hist1D, HistSpec},
    numeric::Float,
    output::HistogramFile,
};
use eyre::{bail, ensure, eyre, Result};
use std::path::PathBuf;

/// This struct accumulates samples into booked histograms during the event
/// loop, and ultimately produces the histogram file (see HistogramFile).
#[derive(Clone, Debug)]
pub struct Accumulator {
    /// Booked histograms, in booking order
    histograms: Vec<Hist1D>,

    /// Number of events read
    processed_events: u64,

    /// Number of events which passed the selection
    selected_events: u64,
}
//
impl Accumulator {
    /// Book histograms
    pub fn new(specs: &[HistSpec]) -> Result<Self> {
        let mut histograms: Vec<Hist1D> = Vec::with_capacity(specs.len());
        for spec in specs {
            ensure!(
                histograms.iter().all(|h| h.name() != spec.name),
                "Histogram {} was booked twice",
                spec.name
            );
            histograms.push(Hist1D::new(spec)?);
        }
        Ok(Self {
            histograms,
            processed_events: 0,
            selected_events: 0,
        })
    }

    /// Record that an event was read, and whether it was selected
    pub fn count_event(&mut self, selected: bool) {
        self.processed_events += 1;
        if selected {
            self.selected_events += 1;
        }
    }

    /// Record one sample into a histogram
    pub fn fill(&mut self, name: &str, x: Float) -> Result<()> {
        match self.histograms.iter_mut().find(|h| h.name() == name) {
            Some(hist) => {
                hist.fill(x);
                Ok(())
            }
            None => bail!("No histogram named {name} was booked"),
        }
    }

    /// Access a histogram
    pub fn histogram(&self, name: &str) -> Result<&Hist1D> {
        self.histograms
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| eyre!("No histogram named {name} was booked"))
    }

    /// Booked histograms, in booking order
    pub fn histograms(&self) -> &[Hist1D] {
        &self.histograms
    }

    /// Number of events read so far
    pub fn processed_events(&self) -> u64 {
        self.processed_events
    }

    /// Number of events which passed the selection so far
    pub fn selected_events(&self) -> u64 {
        self.selected_events
    }

    /// Turn accumulated data into a histogram file
    pub fn finish(self, analysis: &str, inputs: Vec<PathBuf>) -> HistogramFile {
        HistogramFile::new(
            analysis,
            inputs,
            self.processed_events,
            self.selected_events,
            self.histograms,
        )
    }
}
