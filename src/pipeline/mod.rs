//! Configuration of a chain of externally implemented algorithms
//!
//! A pipeline is described by an immutable configuration record, which is
//! checked once by `build_pipeline()`. The resulting `Pipeline` does not run
//! anything by itself: its property bindings are meant to be forwarded verbatim
//! to the framework which implements the algorithms.

mod algorithm;
mod output_commands;

use self::{
    algorithm::{AlgorithmKind, ParamValue, PropertySpec},
    output_commands::OutputCommands,
};
use eyre::{bail, ensure, Result, WrapErr};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
};

/// Input and output settings of a pipeline
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IoConfig {
    /// Event files to be read
    pub input: Vec<PathBuf>,

    /// Collections to be read from the input files. When this is not set, any
    /// collection which no algorithm produces is assumed to come from there.
    pub input_collections: Option<Vec<String>>,

    /// Event file to be written
    pub output: Option<PathBuf>,

    /// `keep`/`drop` rules selecting the collections which are written
    pub output_commands: Vec<String>,

    /// Maximal number of events to be processed, or -1 for all of them
    pub event_max: i64,
}
//
impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            input_collections: None,
            output: None,
            output_commands: Vec::new(),
            event_max: -1,
        }
    }
}

/// Configuration of one algorithm instance
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlgorithmConfig {
    /// Which algorithm this is
    pub kind: AlgorithmKind,

    /// Instance name, defaults to the name of the algorithm kind
    pub name: Option<String>,

    /// Property bindings
    #[serde(default)]
    pub properties: BTreeMap<String, ParamValue>,
}

/// Configuration of a whole pipeline
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input and output files
    #[serde(default)]
    pub io: IoConfig,

    /// Algorithms, in execution order
    #[serde(default, rename = "algorithm")]
    pub algorithms: Vec<AlgorithmConfig>,
}
//
impl PipelineConfig {
    /// Load a pipeline configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text)
            .wrap_err_with(|| format!("Invalid pipeline configuration in {}", path.display()))
    }

    /// Parse a pipeline configuration
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Algorithm instance with all of its properties resolved
#[derive(Clone, Debug, PartialEq)]
pub struct Algorithm {
    kind: AlgorithmKind,
    name: String,

    /// Property values in declaration order, and whether they were configured
    properties: Vec<(&'static str, ParamValue, bool)>,
}
//
impl Algorithm {
    fn new(config: &AlgorithmConfig) -> Result<Self> {
        let kind = config.kind;
        let name = config.name.clone().unwrap_or_else(|| kind.to_string());
        ensure!(
            !name.is_empty() && !name.contains(char::is_whitespace),
            "Invalid algorithm name {name:?}"
        );
        for (property, value) in &config.properties {
            kind.property(property)?
                .check(value)
                .wrap_err_with(|| format!("Bad value for {name}.{property}"))?;
        }
        let properties = kind
            .properties()
            .iter()
            .map(|spec| match config.properties.get(spec.name) {
                Some(value) => (spec.name, value.clone(), true),
                None => (spec.name, spec.default_value(), false),
            })
            .collect();
        Ok(Self {
            kind,
            name,
            properties,
        })
    }

    /// Which component implements this algorithm
    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    /// Instance name, as used in the bindings
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of a property
    pub fn value(&self, property: &str) -> Option<&ParamValue> {
        self.properties
            .iter()
            .find(|(name, _, _)| *name == property)
            .map(|(_, value, _)| value)
    }

    /// Collections which this algorithm reads
    pub fn inputs(&self) -> Vec<&str> {
        self.collections(|spec| spec.is_input())
    }

    /// Collections which this algorithm writes
    pub fn outputs(&self) -> Vec<&str> {
        self.collections(|spec| spec.is_output())
    }

    fn collections(&self, select: impl Fn(&PropertySpec) -> bool) -> Vec<&str> {
        self.kind
            .properties()
            .iter()
            .zip(&self.properties)
            .filter(|(spec, _)| select(spec))
            .flat_map(|(_, (_, value, _))| value.names())
            .collect()
    }
}

/// One `Component.Property = value` binding
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// Algorithm instance or service name
    pub component: String,

    /// Property name
    pub property: String,

    /// Value to be set
    pub value: ParamValue,
}
//
impl Binding {
    fn new(component: &str, property: &str, value: ParamValue) -> Self {
        Self {
            component: component.to_owned(),
            property: property.to_owned(),
            value,
        }
    }
}
//
impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = {}", self.component, self.property, self.value)
    }
}

/// A checked pipeline configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    io: IoConfig,
    algorithms: Vec<Algorithm>,
    output_commands: OutputCommands,
}
//
impl Pipeline {
    /// Algorithms, in execution order
    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// Property bindings to be forwarded to the framework
    ///
    /// Only the properties that were explicitly configured are listed, the
    /// others keep the default value of the algorithm implementation.
    ///
    pub fn bindings(&self) -> Vec<Binding> {
        let mut bindings = Vec::new();
        let io = &self.io;
        let strings = |items: &[String]| ParamValue::List(items.to_vec());
        let paths = |items: &[PathBuf]| {
            ParamValue::List(items.iter().map(|p| p.display().to_string()).collect())
        };
        if !io.input.is_empty() {
            bindings.push(Binding::new("IOSvc", "Input", paths(&io.input)));
        }
        if let Some(collections) = &io.input_collections {
            bindings.push(Binding::new("IOSvc", "CollectionNames", strings(collections)));
        }
        if let Some(output) = &io.output {
            let output = ParamValue::Text(output.display().to_string());
            bindings.push(Binding::new("IOSvc", "Output", output));
        }
        if !io.output_commands.is_empty() {
            bindings.push(Binding::new(
                "IOSvc",
                "outputCommands",
                strings(&io.output_commands),
            ));
        }
        for algorithm in &self.algorithms {
            for (property, value, configured) in &algorithm.properties {
                if *configured {
                    bindings.push(Binding::new(&algorithm.name, property, value.clone()));
                }
            }
        }
        let top_alg = self.algorithms.iter().map(|a| a.name.clone()).collect();
        bindings.push(Binding::new("ApplicationMgr", "TopAlg", ParamValue::List(top_alg)));
        bindings.push(Binding::new(
            "ApplicationMgr",
            "EvtMax",
            ParamValue::Int(io.event_max),
        ));
        bindings
    }

    /// The bindings as `--Component.Property value...` runner arguments
    pub fn command_line(&self) -> Vec<String> {
        let mut args = Vec::new();
        for binding in self.bindings() {
            args.push(format!("--{}.{}", binding.component, binding.property));
            args.extend(binding.value.to_args());
        }
        args
    }

    /// Collections which end up in the output file, in production order
    pub fn kept_collections(&self) -> Vec<String> {
        let mut collections: Vec<String> = Vec::new();
        let inputs = self.io.input_collections.iter().flatten().map(String::as_str);
        let outputs = self.algorithms.iter().flat_map(Algorithm::outputs);
        for name in inputs.chain(outputs) {
            if self.output_commands.keeps(name) && !collections.iter().any(|c| c == name) {
                collections.push(name.to_owned());
            }
        }
        collections
    }
}

/// Check a pipeline configuration
pub fn build_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    let PipelineConfig { io, algorithms } = config;
    ensure!(
        io.event_max >= -1,
        "event_max must be -1 (all events) or a number of events, got {}",
        io.event_max
    );
    ensure!(
        io.input.iter().all(|path| !path.as_os_str().is_empty()),
        "Input file names cannot be empty"
    );
    let output_commands = OutputCommands::parse(&io.output_commands)?;

    let mut resolved: Vec<Algorithm> = Vec::with_capacity(algorithms.len());
    for config in &algorithms {
        let algorithm = Algorithm::new(config)?;
        ensure!(
            resolved.iter().all(|a| a.name != algorithm.name),
            "Two algorithms are named {}",
            algorithm.name
        );
        resolved.push(algorithm);
    }

    // Every collection must come from exactly one place
    let mut producers: HashMap<&str, usize> = HashMap::new();
    for (idx, algorithm) in resolved.iter().enumerate() {
        for output in algorithm.outputs() {
            if let Some(inputs) = &io.input_collections {
                ensure!(
                    !inputs.iter().any(|c| c == output),
                    "{} writes {output}, which is already read from the input file",
                    algorithm.name
                );
            }
            if let Some(&other) = producers.get(output) {
                bail!(
                    "{output} is produced by both {} and {}",
                    resolved[other].name,
                    algorithm.name
                );
            }
            producers.insert(output, idx);
        }
    }

    // ...and be available by the time it is read
    for (idx, algorithm) in resolved.iter().enumerate() {
        for input in algorithm.inputs() {
            match producers.get(input) {
                Some(&producer) if producer >= idx => bail!(
                    "{} reads {input} before {} produces it",
                    algorithm.name,
                    resolved[producer].name
                ),
                Some(_) => {}
                None => {
                    if let Some(inputs) = &io.input_collections {
                        ensure!(
                            inputs.iter().any(|c| c == input),
                            "{} reads {input}, which is neither read from the input file nor \
                             produced by an earlier algorithm",
                            algorithm.name
                        );
                    }
                }
            }
        }
    }

    Ok(Pipeline {
        io,
        algorithms: resolved,
        output_commands,
    })
}
