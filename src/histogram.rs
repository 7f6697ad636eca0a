//! Fixed-binning one-dimensional histograms
//!
//! Binning follows the usual HEP convention: bin 0 is the underflow bin, bins
//! 1..=N cover [low, high) with equal widths, and bin N+1 is the overflow bin.
//! Filling never fails and never loses a sample.

use crate::numeric::Float;
use eyre::{ensure, Result};
use prefix_num_ops::real::*;
use serde::{Deserialize, Serialize};

/// Equal-width binning of an axis
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Binning {
    /// Number of in-range bins
    pub bins: usize,

    /// Lower edge of the first bin
    pub low: Float,

    /// Upper edge of the last bin
    pub high: Float,
}
//
impl Binning {
    /// Binning of [low, high) into bins equal-width bins
    pub fn new(bins: usize, low: Float, high: Float) -> Self {
        Self { bins, low, high }
    }

    /// Check that this binning makes sense
    pub fn validate(&self) -> Result<()> {
        ensure!(self.bins > 0, "A histogram needs at least one bin");
        ensure!(
            self.low.is_finite() && self.high.is_finite(),
            "Histogram edges must be finite, got [{}, {}]",
            self.low,
            self.high
        );
        ensure!(
            self.low < self.high,
            "Histogram lower edge {} must be below upper edge {}",
            self.low,
            self.high
        );
        Ok(())
    }

    /// Width of each bin
    pub fn width(&self) -> Float {
        (self.high - self.low) / (self.bins as Float)
    }

    /// Find the bin where a value belongs, including under/overflow
    pub fn find_bin(&self, x: Float) -> usize {
        if x < self.low {
            0
        } else if !(x < self.high) {
            // NaN lands here too, like in ROOT
            self.bins + 1
        } else {
            let bin = ((x - self.low) / self.width()) as usize + 1;
            // Rounding may push values right below the upper edge too far
            bin.min(self.bins)
        }
    }
}

/// Everything needed to book a histogram
#[derive(Clone, Debug, PartialEq)]
pub struct HistSpec {
    /// Unique name, used as file name when plotting
    pub name: String,

    /// Title and axis labels, as "title;x label;y label"
    pub title: String,

    /// Axis binning
    pub binning: Binning,
}
//
impl HistSpec {
    /// Describe a histogram of bins bins over [low, high)
    pub fn new(name: &str, title: &str, bins: usize, low: Float, high: Float) -> Self {
        Self {
            name: name.to_owned(),
            title: title.to_owned(),
            binning: Binning::new(bins, low, high),
        }
    }
}

/// A one-dimensional histogram with under/overflow bins
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawHist1D", into = "RawHist1D")]
pub struct Hist1D {
    name: String,
    title: String,
    binning: Binning,

    /// Bin contents, underflow and overflow included
    contents: Vec<Float>,

    /// Number of fill calls
    entries: u64,

    /// Sum of in-range weights, values and squared values (for statistics)
    sum_w: Float,
    sum_wx: Float,
    sum_wx2: Float,

    /// Sum of weighted values, wherever they landed
    sum_wx_all: Float,
}
//
impl Hist1D {
    /// Book a histogram
    pub fn new(spec: &HistSpec) -> Result<Self> {
        spec.binning.validate()?;
        Ok(Self {
            name: spec.name.clone(),
            title: spec.title.clone(),
            binning: spec.binning,
            contents: vec![0.; spec.binning.bins + 2],
            entries: 0,
            sum_w: 0.,
            sum_wx: 0.,
            sum_wx2: 0.,
            sum_wx_all: 0.,
        })
    }

    /// Unique name of the histogram
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Title without the axis labels
    pub fn main_title(&self) -> &str {
        self.title.split(';').next().unwrap_or("")
    }

    /// Label of the x axis, if any
    pub fn x_label(&self) -> &str {
        self.title.split(';').nth(1).unwrap_or("")
    }

    /// Label of the y axis, if any
    pub fn y_label(&self) -> &str {
        self.title.split(';').nth(2).unwrap_or("")
    }

    /// Axis binning
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Record one sample
    pub fn fill(&mut self, x: Float) {
        self.fill_weighted(x, 1.)
    }

    /// Record one weighted sample
    pub fn fill_weighted(&mut self, x: Float, w: Float) {
        let bin = self.binning.find_bin(x);
        self.contents[bin] += w;
        self.entries += 1;
        self.sum_wx_all += w * x;
        if bin != 0 && bin != self.binning.bins + 1 {
            self.sum_w += w;
            self.sum_wx += w * x;
            self.sum_wx2 += w * x * x;
        }
    }

    /// Number of fill calls, whatever bin they went to
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Content of a bin (0 is underflow, bins + 1 is overflow)
    pub fn bin_content(&self, bin: usize) -> Float {
        self.contents[bin]
    }

    /// In-range bin contents
    pub fn in_range(&self) -> &[Float] {
        &self.contents[1..=self.binning.bins]
    }

    /// Content of the underflow bin
    pub fn underflow(&self) -> Float {
        self.contents[0]
    }

    /// Content of the overflow bin
    pub fn overflow(&self) -> Float {
        self.contents[self.binning.bins + 1]
    }

    /// Sum of in-range bin contents
    pub fn integral(&self) -> Float {
        self.in_range().iter().sum()
    }

    /// Sum of all bin contents, underflow and overflow included
    pub fn total(&self) -> Float {
        self.contents.iter().sum()
    }

    /// Lower edge of a bin
    pub fn bin_low_edge(&self, bin: usize) -> Float {
        self.binning.low + (bin as Float - 1.) * self.binning.width()
    }

    /// Mean of the in-range samples
    pub fn mean(&self) -> Float {
        if self.sum_w == 0. {
            0.
        } else {
            self.sum_wx / self.sum_w
        }
    }

    /// Weighted sum of all samples, under/overflow included
    pub fn sum_of_samples(&self) -> Float {
        self.sum_wx_all
    }

    /// Standard deviation of the in-range samples
    pub fn std_dev(&self) -> Float {
        if self.sum_w == 0. {
            return 0.;
        }
        let mean = self.mean();
        let var = self.sum_wx2 / self.sum_w - mean * mean;
        sqrt(var.max(0.))
    }

    /// Add the contents of another histogram with the same binning
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        ensure!(
            self.binning == other.binning,
            "Cannot merge histogram {} into {}: binnings differ",
            other.name,
            self.name
        );
        for (mine, theirs) in self.contents.iter_mut().zip(&other.contents) {
            *mine += theirs;
        }
        self.entries += other.entries;
        self.sum_w += other.sum_w;
        self.sum_wx += other.sum_wx;
        self.sum_wx2 += other.sum_wx2;
        self.sum_wx_all += other.sum_wx_all;
        Ok(())
    }
}

/// On-disk layout of a histogram
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawHist1D {
    name: String,
    title: String,
    binning: Binning,
    contents: Vec<Float>,
    entries: u64,
    sum_w: Float,
    sum_wx: Float,
    sum_wx2: Float,
    #[serde(default)]
    sum_wx_all: Float,
}

impl TryFrom<RawHist1D> for Hist1D {
    type Error = String;

    fn try_from(raw: RawHist1D) -> std::result::Result<Self, String> {
        raw.binning
            .validate()
            .map_err(|e| format!("histogram {}: {e}", raw.name))?;
        if raw.contents.len() != raw.binning.bins + 2 {
            return Err(format!(
                "histogram {} has {} bins but {} bin contents, expected {}",
                raw.name,
                raw.binning.bins,
                raw.contents.len(),
                raw.binning.bins + 2
            ));
        }
        Ok(Self {
            name: raw.name,
            title: raw.title,
            binning: raw.binning,
            contents: raw.contents,
            entries: raw.entries,
            sum_w: raw.sum_w,
            sum_wx: raw.sum_wx,
            sum_wx2: raw.sum_wx2,
            sum_wx_all: raw.sum_wx_all,
        })
    }
}

impl From<Hist1D> for RawHist1D {
    fn from(hist: Hist1D) -> Self {
        Self {
            name: hist.name,
            title: hist.title,
            binning: hist.binning,
            contents: hist.contents,
            entries: hist.entries,
            sum_w: hist.sum_w,
            sum_wx: hist.sum_wx,
            sum_wx2: hist.sum_wx2,
            sum_wx_all: hist.sum_wx_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hist(bins: usize, low: Float, high: Float) -> Hist1D {
        Hist1D::new(&HistSpec::new("h", "Test;x;y", bins, low, high)).unwrap()
    }

    #[test]
    fn out_of_range_values_go_to_flow_bins() {
        let mut h = hist(10, 0., 10.);
        h.fill(-0.1);
        h.fill(10.);
        h.fill(1e9);
        h.fill(Float::NAN);
        h.fill(0.);
        h.fill(9.999);
        assert_eq!(h.underflow(), 1.);
        assert_eq!(h.overflow(), 3.);
        assert_eq!(h.bin_content(1), 1.);
        assert_eq!(h.bin_content(10), 1.);
        assert_eq!(h.integral(), 2.);
        assert_eq!(h.entries(), 6);
        assert_eq!(h.total(), 6.);
    }

    #[test]
    fn bin_edges_are_lower_inclusive() {
        let mut h = hist(240, 60., 120.);
        h.fill(60.25);
        assert_eq!(h.bin_content(2), 1.);
        assert_relative_eq!(h.bin_low_edge(2), 60.25);
    }

    #[test]
    fn totals_match_number_of_samples() {
        let mut h = hist(7, -1., 2.5);
        let samples = (0..1000).map(|i| (i as Float) * 0.01 - 2.);
        let n = samples.clone().count();
        samples.for_each(|x| h.fill(x));
        assert_eq!(h.total(), n as Float);
        assert_eq!(h.entries(), n as u64);
    }

    #[test]
    fn statistics_ignore_flow_bins() {
        let mut h = hist(100, 0., 10.);
        for x in [1., 2., 3., 100.] {
            h.fill(x);
        }
        assert_relative_eq!(h.mean(), 2.);
        assert_relative_eq!(h.std_dev(), (2. as Float / 3.).sqrt(), max_relative = 1e-6);
    }

    #[test]
    fn sum_of_samples_includes_flow_bins() {
        let mut h = hist(10, 0., 500.);
        for x in [-10., 250., 600., 650.] {
            h.fill(x);
        }
        assert_relative_eq!(h.mean(), 250.);
        assert_relative_eq!(h.sum_of_samples(), 1490.);
    }

    #[test]
    fn inconsistent_storage_is_rejected() {
        let mut h = hist(3, 0., 3.);
        h.fill(1.5);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(serde_json::from_str::<Hist1D>(&json).unwrap(), h);

        let truncated = json.replace("\"contents\":[0.0,0.0,1.0,0.0,0.0]", "\"contents\":[0.0,1.0]");
        assert_ne!(truncated, json);
        assert!(serde_json::from_str::<Hist1D>(&truncated).is_err());

        let empty = json.replace("\"bins\":3", "\"bins\":0");
        assert!(serde_json::from_str::<Hist1D>(&empty).is_err());
    }

    #[test]
    fn merge_requires_same_binning() {
        let mut a = hist(10, 0., 1.);
        let mut b = hist(10, 0., 1.);
        a.fill(0.5);
        b.fill(0.55);
        b.fill(2.);
        a.merge(&b).unwrap();
        assert_relative_eq!(a.sum_of_samples(), 3.05, max_relative = 1e-12);
        assert_eq!(a.bin_content(6), 2.);
        assert_eq!(a.overflow(), 1.);
        assert_eq!(a.entries(), 3);
        assert!(a.merge(&hist(5, 0., 1.)).is_err());
    }

    #[test]
    fn invalid_binning_is_rejected() {
        assert!(Binning::new(0, 0., 1.).validate().is_err());
        assert!(Binning::new(10, 1., 1.).validate().is_err());
        assert!(Binning::new(10, 0., Float::INFINITY).validate().is_err());
    }

    #[test]
    fn title_holds_axis_labels() {
        let h = hist(1, 0., 1.);
        assert_eq!(h.main_title(), "Test");
        assert_eq!(h.x_label(), "x");
        assert_eq!(h.y_label(), "y");
    }
}
