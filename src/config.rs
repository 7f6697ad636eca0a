//! Mechanism for loading and sharing the analysis configuration
//!
//! Every setting has a default matching the standard Higgs-recoil and π⁰
//! studies, so the configuration file is optional and only needs to list what
//! differs from these defaults.

use crate::{
    histogram::{Binning, HistSpec},
    numeric::Float,
    particle::P4Source,
};
use eyre::{ensure, Result, WrapErr};
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Names of the collections read by the analyses
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionNames {
    /// Selected muons (usually a subset of the particle flow objects)
    pub muons: String,

    /// Higgs candidates from the recoil reconstruction
    pub higgs: String,

    /// Z candidates from the recoil reconstruction
    pub z: String,

    /// Selected π⁰ candidates from the kinematic fit
    pub pi0s: String,

    /// Monte Carlo truth particles
    pub mc_particles: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            muons: "Muons".to_owned(),
            higgs: "Higgs".to_owned(),
            z: "Z".to_owned(),
            pi0s: "Pi0s_New".to_owned(),
            mc_particles: "MCParticle".to_owned(),
        }
    }
}

/// Analysis configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Collision energy at center of mass (GeV)
    pub e_cms: Float,

    /// How muon 4-momenta are built
    pub muon_p4: P4Source,

    /// How π⁰ candidate and photon 4-momenta are built
    pub pi0_p4: P4Source,

    /// Generator status of final state Monte Carlo particles
    pub final_state_status: i32,

    /// Collection names
    pub collections: CollectionNames,

    /// Binning overrides, by histogram name
    pub histograms: BTreeMap<String, Binning>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            e_cms: 250.,
            muon_p4: P4Source::Mass,
            pi0_p4: P4Source::Energy,
            final_state_status: 1,
            collections: CollectionNames::default(),
            histograms: BTreeMap::new(),
        }
    }
}
//
impl Configuration {
    /// Load the configuration from a file (or use the defaults), check it,
    /// and print it out
    pub fn load(file_name: Option<&Path>) -> Result<Self> {
        let config = match file_name {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml(&text)
                    .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))?
            }
            None => {
                let config = Self::default();
                config.validate()?;
                config
            }
        };
        config.print();
        Ok(config)
    }

    /// Parse and check a TOML configuration
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration makes sense
    fn validate(&self) -> Result<()> {
        ensure!(
            self.e_cms.is_finite() && self.e_cms > 0.,
            "The center-of-mass energy must be positive, got {}",
            self.e_cms
        );
        for (name, binning) in &self.histograms {
            binning
                .validate()
                .wrap_err_with(|| format!("Bad binning for histogram {name}"))?;
        }
        Ok(())
    }

    /// Apply binning overrides to a set of histogram bookings
    pub fn book(&self, mut specs: Vec<HistSpec>) -> Vec<HistSpec> {
        for spec in &mut specs {
            if let Some(binning) = self.histograms.get(&spec.name) {
                spec.binning = *binning;
            }
        }
        specs
    }

    /// Display the configuration
    pub fn print(&self) {
        info!("E_cms          : {} GeV", self.e_cms);
        info!("Muon p4        : {:?}", self.muon_p4);
        info!("Pi0 p4         : {:?}", self.pi0_p4);
        info!("Final state    : status {}", self.final_state_status);
        info!("Muons          : {}", self.collections.muons);
        info!("Higgs          : {}", self.collections.higgs);
        info!("Z              : {}", self.collections.z);
        info!("Pi0s           : {}", self.collections.pi0s);
        info!("MC particles   : {}", self.collections.mc_particles);
        for (name, binning) in &self.histograms {
            info!(
                "Binning of {name:<10}: {} bins in [{}, {}]",
                binning.bins, binning.low, binning.high
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Configuration::from_toml("").unwrap(), Configuration::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Configuration::from_toml(
            r#"
            e_cms = 240.0
            muon_p4 = "energy"

            [collections]
            muons = "IsolatedMuons"

            [histograms.z_mass]
            bins = 60
            low = 80.0
            high = 100.0
            "#,
        )
        .unwrap();
        assert_eq!(config.e_cms, 240.);
        assert_eq!(config.muon_p4, P4Source::Energy);
        assert_eq!(config.collections.muons, "IsolatedMuons");
        assert_eq!(config.collections.higgs, "Higgs");

        let specs = config.book(vec![
            HistSpec::new("z_mass", "", 240, 60., 120.),
            HistSpec::new("recoil_mass", "", 380, 60., 250.),
        ]);
        assert_eq!(specs[0].binning, Binning::new(60, 80., 100.));
        assert_eq!(specs[1].binning, Binning::new(380, 60., 250.));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(Configuration::from_toml("e_cms = -1.0").is_err());
        assert!(Configuration::from_toml("ecms = 250.0").is_err());
        assert!(Configuration::from_toml(
            "[histograms.z_mass]\nbins = 0\nlow = 0.0\nhigh = 1.0"
        )
        .is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Configuration::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
