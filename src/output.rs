//! This module is in charge of writing the accumulated histograms to disk, as a
//! histogram file and a human-readable text summary

use crate::{histogram::Hist1D, numeric::Float};
use eyre::{ensure, eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

// Number of significant digits in the text summary, as in C's %g
const SIG_DIGITS: usize = 6;

/// Final results of an analysis run
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HistogramFile {
    /// RFC 3339 timestamp of when the run ended
    pub created: String,

    /// Name of the analysis that produced the histograms
    pub analysis: String,

    /// Event files that were read
    pub inputs: Vec<PathBuf>,

    /// Number of events read
    pub processed_events: u64,

    /// Number of events which passed the selection
    pub selected_events: u64,

    /// Histograms, in booking order
    pub histograms: Vec<Hist1D>,
}
//
impl HistogramFile {
    /// Wrap up the results of a run
    pub fn new(
        analysis: &str,
        inputs: Vec<PathBuf>,
        processed_events: u64,
        selected_events: u64,
        histograms: Vec<Hist1D>,
    ) -> Self {
        Self {
            created: timestamp(),
            analysis: analysis.to_owned(),
            inputs,
            processed_events,
            selected_events,
            histograms,
        }
    }

    /// Load a histogram file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open histogram file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("Malformed histogram file {}", path.display()))
    }

    /// Write the histogram file, and its text summary next to it
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        {
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create histogram file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        let summary_path = summary_path(path);
        let file = File::create(&summary_path)
            .wrap_err_with(|| format!("Failed to create summary {}", summary_path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_summary(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Access a histogram by name
    pub fn histogram(&self, name: &str) -> Result<&Hist1D> {
        self.histograms
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| eyre!("No histogram named {name} in this file"))
    }

    /// Add up the results of another run of the same analysis
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        ensure!(
            self.analysis == other.analysis,
            "Cannot merge results of analysis {} into {}",
            other.analysis,
            self.analysis
        );
        ensure!(
            self.histograms.len() == other.histograms.len(),
            "Cannot merge histogram files with different bookings"
        );
        for hist in &mut self.histograms {
            hist.merge(other.histogram(hist.name())?)?;
        }
        self.inputs.extend(other.inputs.iter().cloned());
        self.processed_events += other.processed_events;
        self.selected_events += other.selected_events;
        self.created = timestamp();
        Ok(())
    }

    /// Write a text summary of the run
    pub fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln_summary(out, &format!("evhist {}", self.analysis)[..])?;
        writeln_summary(out, ("Created", &self.created[..]))?;
        for input in &self.inputs {
            writeln_summary(out, ("Input", &input.display().to_string()[..]))?;
        }
        writeln_summary(out, ("Processed events", self.processed_events))?;
        writeln_summary(out, ("Selected events", self.selected_events))?;
        for hist in &self.histograms {
            let binning = hist.binning();
            writeln_summary(out, "---------------------------------------------")?;
            writeln_summary(out, ("Histogram", hist.name()))?;
            writeln_summary(out, ("Title", hist.main_title()))?;
            writeln_summary(out, ("Bins", binning.bins as u64))?;
            writeln_summary(out, ("Lower edge", binning.low))?;
            writeln_summary(out, ("Upper edge", binning.high))?;
            writeln_summary(out, ("Entries", hist.entries()))?;
            writeln_summary(out, ("Underflow", hist.underflow()))?;
            writeln_summary(out, ("Overflow", hist.overflow()))?;
            writeln_summary(out, ("Integral", hist.integral()))?;
            writeln_summary(out, ("Mean", hist.mean()))?;
            writeln_summary(out, ("Std dev", hist.std_dev()))?;
        }
        Ok(())
    }
}

/// Location of the text summary of a histogram file
pub fn summary_path(path: &Path) -> PathBuf {
    path.with_extension("txt")
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Text output facility for the run summary
fn writeln_summary(out: &mut dyn Write, data: impl WriteSummary) -> io::Result<()> {
    write!(out, " ")?;
    data.write(out)?;
    writeln!(out)
}

/// Trait implemented by things which can appear in the run summary
trait WriteSummary: Sized {
    /// Write down `self` using the summary style
    fn write(self, out: &mut dyn Write) -> io::Result<()>;
}

impl WriteSummary for &str {
    fn write(self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl WriteSummary for u64 {
    fn write(self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl WriteSummary for Float {
    fn write(self, out: &mut dyn Write) -> io::Result<()> {
        write_engineering(out, self, SIG_DIGITS)
    }
}

impl<T: WriteSummary> WriteSummary for (&str, T) {
    // Key-value output with fixed-size columns for readability
    fn write(self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation when printing leading zeroes would
/// take more room than an exponent, or when the number is so large that more
/// significant digits than requested would be printed.
///
fn write_engineering(out: &mut dyn Write, x: Float, sig_digits: usize) -> io::Result<()> {
    if x == 0. {
        // Zero is special because you can't take its log
        return write!(out, "0");
    }
    if !x.is_finite() {
        return write!(out, "{x}");
    }
    let mut precision = sig_digits - 1;
    let log_x = x.abs().log10();
    if (-4.0..(sig_digits as Float)).contains(&log_x) {
        // Rust's precision is a number of digits after the decimal point, so
        // it must be adjusted to the magnitude to get constant significant
        // digits. Leading zeroes of numbers below 1 are not significant.
        let magnitude = log_x.floor() as isize;
        precision = (precision as isize - magnitude).max(0) as usize;
        let with_zeros = format!("{x:.precision$}");
        if with_zeros.contains('.') {
            write!(out, "{}", with_zeros.trim_end_matches('0').trim_end_matches('.'))
        } else {
            write!(out, "{with_zeros}")
        }
    } else {
        write!(out, "{x:.precision$e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::HistSpec;

    fn engineering(x: Float) -> String {
        let mut out = Vec::new();
        write_engineering(&mut out, x, SIG_DIGITS).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0.), "0");
        assert_eq!(engineering(250.), "250");
        assert_eq!(engineering(0.135), "0.135");
        assert_eq!(engineering(-91.1876), "-91.1876");
        assert_eq!(engineering(1234567.), "1.23457e6");
        assert_eq!(engineering(0.000012345), "1.23450e-5");
    }

    fn results(analysis: &str) -> HistogramFile {
        let mut hist = Hist1D::new(&HistSpec::new("z_mass", "Z mass;m [GeV];", 10, 80., 100.))
            .unwrap();
        hist.fill(91.);
        hist.fill(150.);
        HistogramFile::new(analysis, vec![PathBuf::from("in.jsonl")], 3, 2, vec![hist])
    }

    #[test]
    fn file_and_summary_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hists.json");
        let results = results("recoil");
        results.write(&path).unwrap();

        assert_eq!(HistogramFile::read(&path).unwrap(), results);
        let summary = std::fs::read_to_string(summary_path(&path)).unwrap();
        assert!(summary.contains(" Histogram                      : z_mass\n"));
        assert!(summary.contains(" Selected events                : 2\n"));
        assert!(summary.contains(" Overflow                       : 1\n"));
        assert!(summary.contains(" Mean                           : 91\n"));
    }

    #[test]
    fn reading_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(HistogramFile::read(&path).is_err());
        assert!(HistogramFile::read(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn truncated_histograms_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.json");
        let mut json = serde_json::to_value(results("recoil")).unwrap();
        json["histograms"][0]["contents"] = serde_json::json!([0.0, 1.0]);
        std::fs::write(&path, json.to_string()).unwrap();
        assert!(HistogramFile::read(&path).is_err());

        json["histograms"][0]["contents"] = serde_json::json!([]);
        json["histograms"][0]["binning"]["bins"] = serde_json::json!(0);
        std::fs::write(&path, json.to_string()).unwrap();
        assert!(HistogramFile::read(&path).is_err());
    }

    #[test]
    fn merge_adds_runs_of_the_same_analysis() {
        let mut a = results("recoil");
        a.merge(&results("recoil")).unwrap();
        assert_eq!(a.processed_events, 6);
        assert_eq!(a.selected_events, 4);
        assert_eq!(a.inputs.len(), 2);
        assert_eq!(a.histogram("z_mass").unwrap().entries(), 4);
        assert!(a.merge(&results("pi0")).is_err());
    }
}
