//! evhist: event histogramming for e⁺e⁻ Higgs factory studies
//!
//!
//! # Introduction (for the physicist)
//!
//! At a Higgs factory, the Higgs boson is produced together with a Z boson
//! (e⁺e⁻ → ZH). When the Z decays into a pair of muons, its 4-momentum can be
//! measured precisely, and since the initial state is known, so is the
//! 4-momentum of whatever recoils against it. The mass of this recoiling
//! system peaks at the Higgs mass, whatever the Higgs decays into.
//!
//! This program fills histograms of such quantities (Z mass, recoil mass,
//! masses of kinematically fitted π⁰ → γγ candidates...) from event files
//! produced by a reconstruction chain, and plots them.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program runs in a purely sequential, batch style:
//!
//! * read in the configuration and book histograms
//! * loop over events,
//!     * deciding whether they pass the analysis' selection,
//!     * computing invariant and recoil masses of particle combinations,
//!     * filling the histograms
//! * then store the histograms and a text summary.
//!
//! The reconstruction chain itself (muon selection, kinematic fit, recoil
//! reconstruction) is implemented by an external framework. This program only
//! checks the configuration of such chains and translates it into property
//! bindings for that framework. A toy event generator is also provided, so
//! that the analyses can be exercised without the framework.

#![warn(missing_docs)]

mod accumulator;
mod analysis;
mod cli;
mod config;
mod event;
mod evgen;
#[cfg(test)]
mod fixtures;
mod histogram;
mod momentum;
mod numeric;
mod output;
mod particle;
mod pipeline;
mod plot;
mod random;
mod reader;
mod selection;
mod writer;

use crate::{
    analysis::AnalysisKind,
    cli::{AnalysisArgs, Command, Opt},
    config::Configuration,
    evgen::EventGenerator,
    numeric::Float,
    output::HistogramFile,
    pipeline::PipelineConfig,
    random::RandomGenerator,
    reader::EventReader,
    writer::EventWriter,
};
use clap::Parser;
use env_logger::Env;
use eyre::WrapErr;
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    let opt = Opt::parse();
    let env = Env::default().filter_or("EVHIST_LOG", &opt.loglevel);
    env_logger::init_from_env(env);
    debug!("settings: {opt:#?}");

    match &opt.command {
        Command::Recoil(args) => run_analysis(AnalysisKind::Recoil, args),
        Command::Pi0(args) => run_analysis(AnalysisKind::Pi0, args),
        Command::Candidates(args) => run_analysis(AnalysisKind::Candidates, args),
        Command::Ecms(args) => run_analysis(AnalysisKind::Ecms, args),
        Command::Plot { histfile, outdir } => {
            let hists = HistogramFile::read(histfile)?;
            plot::plot_file(&hists, outdir)?;
            Ok(())
        }
        Command::Merge { inputs, output } => merge(inputs, output),
        Command::Pipeline { config } => print_pipeline(config),
        Command::Generate {
            output,
            events,
            seed,
            e_cms,
            muon_min_pt,
        } => generate(output, *events, *seed, *e_cms, *muon_min_pt),
    }
}

/// Run an analysis over event files and store the resulting histograms
fn run_analysis(kind: AnalysisKind, args: &AnalysisArgs) -> Result<()> {
    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::load(args.config.as_deref())
        .wrap_err("Failed to load the configuration")?;
    let analysis = kind.build(&cfg);

    // ### EVENT LOOP ###

    let start_time = Instant::now();
    let reader = EventReader::open(&args.inputs)?;
    let acc = analysis::run(&*analysis, reader)
        .wrap_err_with(|| format!("The {} analysis failed", analysis.name()))?;
    let elapsed_time = start_time.elapsed();
    info!(
        "Processed {} events in {:.3} s",
        acc.processed_events(),
        elapsed_time.as_secs_f64()
    );

    // ### RESULTS DISPLAY AND STORAGE ###

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(kind.default_output()));
    acc.finish(analysis.name(), args.inputs.clone())
        .write(&output)?;
    info!(
        "Histograms written to {} (summary in {})",
        output.display(),
        output::summary_path(&output).display()
    );
    Ok(())
}

/// Add up several histogram files
fn merge(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let (first, others) = inputs
        .split_first()
        .ok_or_else(|| eyre::eyre!("No histogram file to merge"))?;
    let mut merged = HistogramFile::read(first)?;
    for path in others {
        merged
            .merge(&HistogramFile::read(path)?)
            .wrap_err_with(|| format!("Failed to merge {}", path.display()))?;
    }
    merged.write(output)?;
    info!(
        "Merged {} histogram files ({} events) into {}",
        inputs.len(),
        merged.processed_events,
        output.display()
    );
    Ok(())
}

/// Check a pipeline configuration and print what the framework should get
fn print_pipeline(config: &Path) -> Result<()> {
    let pipeline = pipeline::build_pipeline(PipelineConfig::load(config)?)
        .wrap_err_with(|| format!("Invalid pipeline in {}", config.display()))?;
    for algorithm in pipeline.algorithms() {
        info!(
            "{} ({}): reads {:?}, writes {:?}",
            algorithm.name(),
            algorithm.kind(),
            algorithm.inputs(),
            algorithm.outputs()
        );
        for property in algorithm.kind().properties() {
            if let Some(value) = algorithm.value(property.name) {
                debug!("  {}.{} = {value}", algorithm.name(), property.name);
            }
        }
    }
    println!("# Property bindings");
    for binding in pipeline.bindings() {
        println!("{binding}");
    }
    println!();
    println!("# Runner arguments");
    println!("{}", pipeline.command_line().join(" "));
    println!();
    println!("# Collections written out");
    for collection in pipeline.kept_collections() {
        println!("{collection}");
    }
    Ok(())
}

/// Generate toy events into an event file
fn generate(output: &Path, events: u64, seed: u64, e_cms: Float, muon_min_pt: Float) -> Result<()> {
    let generator = EventGenerator::new(e_cms, muon_min_pt)?;
    let mut rng = RandomGenerator::new(seed);
    let mut writer = EventWriter::create(output)?;
    for number in 0..events {
        writer.write(&generator.generate(number, &mut rng)?)?;
    }
    let written = writer.finish()?;
    info!(
        "Generated {written} events at {e_cms} GeV into {}",
        output.display()
    );
    Ok(())
}
