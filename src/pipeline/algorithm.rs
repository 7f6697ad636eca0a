//! Externally implemented algorithms, and the properties they accept
//!
//! Only the configuration surface of these algorithms is known here: which
//! properties they have, what type of value each property takes, and which
//! properties name the collections that they read and write.

use eyre::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use PropertyType::*;

const MUON_FILTER: &[PropertySpec] = &[
    PropertySpec::new("InputPFOs", Inputs, DefaultValue::Names(&["PandoraPFOs"])),
    PropertySpec::new("OutputMuons", Outputs, DefaultValue::Names(&["Muons"])),
    PropertySpec::new("MinPt", Real, DefaultValue::Real(10.)),
];

const HIGGS_RECOIL: &[PropertySpec] = &[
    PropertySpec::new("InputMuons", Input, DefaultValue::Name("Muons")),
    PropertySpec::new("HiggsCollection", Output, DefaultValue::Name("Higgs")),
    PropertySpec::new("ZCollection", Output, DefaultValue::Name("Z")),
];

const RECO_PARTICLE_FILTER: &[PropertySpec] = &[
    PropertySpec::new("InputCollection", Inputs, DefaultValue::Names(&["PandoraPFOs"])),
    PropertySpec::new(
        "OutputCollection",
        Outputs,
        DefaultValue::Names(&["FilteredParticles"]),
    ),
    PropertySpec::new("PDG", Int, DefaultValue::Int(13)),
    PropertySpec::new("MinPt", Real, DefaultValue::Real(0.)),
    PropertySpec::new("MinE", Real, DefaultValue::Real(0.)),
];

const GAMMA_GAMMA_CANDIDATE_FINDER: &[PropertySpec] = &[
    PropertySpec::new("InputCollection", Inputs, DefaultValue::Names(&["PandoraPhotons"])),
    PropertySpec::new(
        "OutputCollection",
        Outputs,
        DefaultValue::Names(&["GammaGammaCandidates"]),
    ),
    PropertySpec::new("ResonancePDG", Int, DefaultValue::Int(111)),
    PropertySpec::new("ResonanceMass", Real, DefaultValue::Real(0.135)),
    PropertySpec::new("MaxDeltaM", Real, DefaultValue::Real(0.04)),
    PropertySpec::new("MinFitProbability", Real, DefaultValue::Real(0.001)),
    PropertySpec::new(
        "Fitter",
        Choice(&["OPALFitter", "NewFitter", "NewtonFitter"]),
        DefaultValue::Text("OPALFitter"),
    ),
];

/// Algorithms which a pipeline can be made of
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum AlgorithmKind {
    /// Selects muons above a transverse momentum threshold
    MuonFilter,

    /// Builds a Z from two muons and the Higgs recoiling against it
    HiggsRecoil,

    /// Selects particles by PDG id, transverse momentum and energy
    RecoParticleFilter,

    /// Kinematic fit of photon pairs to a resonance hypothesis
    GammaGammaCandidateFinder,
}
//
impl AlgorithmKind {
    /// Properties accepted by this kind of algorithm
    pub fn properties(self) -> &'static [PropertySpec] {
        match self {
            Self::MuonFilter => MUON_FILTER,
            Self::HiggsRecoil => HIGGS_RECOIL,
            Self::RecoParticleFilter => RECO_PARTICLE_FILTER,
            Self::GammaGammaCandidateFinder => GAMMA_GAMMA_CANDIDATE_FINDER,
        }
    }

    /// Look up a property by name
    pub fn property(self, name: &str) -> Result<&'static PropertySpec> {
        match self.properties().iter().find(|spec| spec.name == name) {
            Some(spec) => Ok(spec),
            None => bail!(
                "{self} has no property named {name}, valid properties are {}",
                self.properties()
                    .iter()
                    .map(|spec| spec.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}
//
impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Value bound to an algorithm property
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
    Text(String),
    List(Vec<String>),
}
//
impl ParamValue {
    /// Collection names designated by this value, if it designates any
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Text(name) => vec![name.as_str()],
            Self::List(names) => names.iter().map(String::as_str).collect(),
            Self::Int(_) | Self::Real(_) => Vec::new(),
        }
    }

    /// Command-line arguments which set this value
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::List(names) => names.clone(),
            Self::Text(text) => vec![text.clone()],
            Self::Int(_) | Self::Real(_) => vec![self.to_string()],
        }
    }
}
//
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            // Debug formatting keeps the decimal point of round numbers
            Self::Real(x) => write!(f, "{x:?}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::List(names) => {
                write!(f, "[")?;
                for (idx, name) in names.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// What kind of value a property holds
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyType {
    /// Name of the one collection that is read
    Input,

    /// Names of the collections that are read
    Inputs,

    /// Name of the one collection that is written
    Output,

    /// Names of the collections that are written
    Outputs,

    /// Integer
    Int,

    /// Real number (integers are accepted too)
    Real,

    /// One identifier out of a fixed set
    Choice(&'static [&'static str]),
}

/// Value that a property has when nothing is bound to it
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefaultValue {
    Name(&'static str),
    Names(&'static [&'static str]),
    Int(i64),
    Real(f64),
    Text(&'static str),
}

/// Declaration of an algorithm property
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertySpec {
    /// Property name, as known to the framework
    pub name: &'static str,

    /// What values it accepts
    pub ty: PropertyType,

    /// Value used when the property is not configured
    pub default: DefaultValue,
}
//
impl PropertySpec {
    const fn new(name: &'static str, ty: PropertyType, default: DefaultValue) -> Self {
        Self { name, ty, default }
    }

    /// Value used when the configuration does not bind this property
    pub fn default_value(&self) -> ParamValue {
        match self.default {
            DefaultValue::Name(name) | DefaultValue::Text(name) => ParamValue::Text(name.to_owned()),
            DefaultValue::Names(names) => {
                ParamValue::List(names.iter().map(|&name| name.to_owned()).collect())
            }
            DefaultValue::Int(i) => ParamValue::Int(i),
            DefaultValue::Real(x) => ParamValue::Real(x),
        }
    }

    /// Does this property name collections that the algorithm reads?
    pub fn is_input(&self) -> bool {
        matches!(self.ty, PropertyType::Input | PropertyType::Inputs)
    }

    /// Does this property name collections that the algorithm writes?
    pub fn is_output(&self) -> bool {
        matches!(self.ty, PropertyType::Output | PropertyType::Outputs)
    }

    /// Check that a value is acceptable for this property
    pub fn check(&self, value: &ParamValue) -> Result<()> {
        let type_ok = match (self.ty, value) {
            (Input | Output, ParamValue::Text(_)) => true,
            (Inputs | Outputs, ParamValue::Text(_) | ParamValue::List(_)) => true,
            (Int, ParamValue::Int(_)) => true,
            (Real, ParamValue::Int(_) | ParamValue::Real(_)) => true,
            (Choice(choices), ParamValue::Text(text)) => {
                ensure!(
                    choices.contains(&text.as_str()),
                    "{} must be one of {}, got {text:?}",
                    self.name,
                    choices.join(", ")
                );
                true
            }
            _ => false,
        };
        ensure!(
            type_ok,
            "{} expects {}, got {value}",
            self.name,
            self.ty.describe()
        );
        if self.is_input() || self.is_output() {
            let names = value.names();
            ensure!(!names.is_empty(), "{} must name at least one collection", self.name);
            ensure!(
                names.iter().all(|name| !name.trim().is_empty()),
                "{} contains an empty collection name",
                self.name
            );
        }
        if let ParamValue::Real(x) = value {
            ensure!(x.is_finite(), "{} must be finite, got {x}", self.name);
        }
        Ok(())
    }
}
//
impl PropertyType {
    fn describe(self) -> &'static str {
        match self {
            Self::Input | Self::Output => "a collection name",
            Self::Inputs | Self::Outputs => "a list of collection names",
            Self::Int => "an integer",
            Self::Real => "a number",
            Self::Choice(_) => "an identifier",
        }
    }
}
