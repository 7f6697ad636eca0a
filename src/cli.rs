//! Command-line options

use crate::numeric::Float;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fill histograms from HEP event files, plot them, and set up the
/// reconstruction pipelines that produce these files
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Opt {
    /// Verbosity level: error, warn, info, debug or trace
    ///
    /// The EVHIST_LOG environment variable takes precedence, and accepts
    /// per-module filters.
    #[arg(long, default_value = "info", global = true)]
    pub loglevel: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Things evhist can do
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Z → μμ mass and Higgs recoil mass from events with two muons
    Recoil(AnalysisArgs),

    /// π⁰ masses before and after the kinematic fit
    Pi0(AnalysisArgs),

    /// Masses of reconstructed Higgs and Z candidates
    Candidates(AnalysisArgs),

    /// Center-of-mass energy from the Monte Carlo truth
    Ecms(AnalysisArgs),

    /// Render every histogram of a histogram file as an SVG image
    Plot {
        /// Histogram file
        histfile: PathBuf,

        /// Directory where images are written
        #[arg(short, long, default_value = "plots")]
        outdir: PathBuf,
    },

    /// Add up histogram files from several runs of the same analysis
    Merge {
        /// Histogram files to be merged
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Merged histogram file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check an algorithm chain configuration and print its bindings
    Pipeline {
        /// Pipeline configuration (TOML)
        config: PathBuf,
    },

    /// Generate toy e⁺e⁻ → ZH → μμγγ events
    Generate {
        /// Event file to be written
        #[arg(short, long, default_value = "zh_events.jsonl")]
        output: PathBuf,

        /// Number of events
        #[arg(short = 'n', long, default_value_t = 100)]
        events: u64,

        /// Random number generator seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Center-of-mass energy in GeV
        #[arg(long, default_value_t = 250.)]
        e_cms: Float,

        /// Minimal transverse momentum of selected muons in GeV
        #[arg(long, default_value_t = 10.)]
        muon_min_pt: Float,
    },
}

/// Options shared by all analyses
#[derive(Debug, Args)]
pub struct AnalysisArgs {
    /// Event files, read in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Histogram file (a text summary is written next to it)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Analysis configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
