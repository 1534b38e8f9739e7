use crate::core::particle::ParticleType;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MIN_PHOTON_ENERGY: f64 = 1e-3;
pub const DEFAULT_MIN_ELECTRON_ENERGY: f64 = 1e-5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {value} (must be finite and non-negative)")]
    InvalidValue { parameter: &'static str, value: f64 },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Minimum energies (MeV) below which emitted relaxation particles are
/// absorbed locally instead of banked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyCutoffs {
    min_photon_energy: f64,
    min_electron_energy: f64,
}

impl EnergyCutoffs {
    pub fn new(min_photon_energy: f64, min_electron_energy: f64) -> Result<Self, ConfigError> {
        check_energy("min_photon_energy", min_photon_energy)?;
        check_energy("min_electron_energy", min_electron_energy)?;
        Ok(Self {
            min_photon_energy,
            min_electron_energy,
        })
    }

    pub fn min_photon_energy(&self) -> f64 {
        self.min_photon_energy
    }

    pub fn min_electron_energy(&self) -> f64 {
        self.min_electron_energy
    }

    pub fn for_particle(&self, particle_type: ParticleType) -> f64 {
        match particle_type {
            ParticleType::Photon => self.min_photon_energy,
            ParticleType::Electron => self.min_electron_energy,
        }
    }

    /// An emitted particle is kept when its energy reaches the cutoff.
    pub fn is_tracked(&self, particle_type: ParticleType, energy: f64) -> bool {
        energy >= self.for_particle(particle_type)
    }
}

impl Default for EnergyCutoffs {
    fn default() -> Self {
        Self {
            min_photon_energy: DEFAULT_MIN_PHOTON_ENERGY,
            min_electron_energy: DEFAULT_MIN_ELECTRON_ENERGY,
        }
    }
}

fn check_energy(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { parameter, value })
    }
}

/// Settings for atomic relaxation during a simulation run.
///
/// Relaxation can be switched off per incident particle type; an ionization
/// caused by a particle whose mode is off leaves the atom un-relaxed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxationConfig {
    pub min_photon_energy: f64,
    pub min_electron_energy: f64,
    pub photon_relaxation: bool,
    pub electron_relaxation: bool,
    pub seed: u64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            min_photon_energy: DEFAULT_MIN_PHOTON_ENERGY,
            min_electron_energy: DEFAULT_MIN_ELECTRON_ENERGY,
            photon_relaxation: true,
            electron_relaxation: true,
            seed: 0,
        }
    }
}

impl RelaxationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cutoffs().map(|_| ())
    }

    pub fn cutoffs(&self) -> Result<EnergyCutoffs, ConfigError> {
        EnergyCutoffs::new(self.min_photon_energy, self.min_electron_energy)
    }

    pub fn relaxation_enabled_for(&self, particle_type: ParticleType) -> bool {
        match particle_type {
            ParticleType::Photon => self.photon_relaxation,
            ParticleType::Electron => self.electron_relaxation,
        }
    }
}

#[derive(Default)]
pub struct RelaxationConfigBuilder {
    min_photon_energy: Option<f64>,
    min_electron_energy: Option<f64>,
    photon_relaxation: Option<bool>,
    electron_relaxation: Option<bool>,
    seed: Option<u64>,
}

impl RelaxationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_photon_energy(mut self, energy: f64) -> Self {
        self.min_photon_energy = Some(energy);
        self
    }
    pub fn min_electron_energy(mut self, energy: f64) -> Self {
        self.min_electron_energy = Some(energy);
        self
    }
    pub fn photon_relaxation(mut self, enabled: bool) -> Self {
        self.photon_relaxation = Some(enabled);
        self
    }
    pub fn electron_relaxation(mut self, enabled: bool) -> Self {
        self.electron_relaxation = Some(enabled);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<RelaxationConfig, ConfigError> {
        let config = RelaxationConfig {
            min_photon_energy: self
                .min_photon_energy
                .ok_or(ConfigError::MissingParameter("min_photon_energy"))?,
            min_electron_energy: self
                .min_electron_energy
                .ok_or(ConfigError::MissingParameter("min_electron_energy"))?,
            photon_relaxation: self.photon_relaxation.unwrap_or(true),
            electron_relaxation: self.electron_relaxation.unwrap_or(true),
            seed: self.seed.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
