use super::config::{ConfigError, EnergyCutoffs};
use crate::core::data::table::TableError;
use crate::core::sampling::SamplingError;
use crate::core::subshell::Subshell;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelaxationError {
    #[error("Relaxation table error: {source}")]
    Table {
        #[from]
        source: TableError,
    },

    #[error("Transition distribution error: {source}")]
    Sampling {
        #[from]
        source: SamplingError,
    },

    #[error("Model for subshell {expected} was asked to relax a vacancy in {found}")]
    WrongSubshell { expected: Subshell, found: Subshell },

    #[error("Cyclic transition data along vacancy path {}", format_path(.path))]
    CyclicTransitionData { path: Vec<Subshell> },

    #[error("Atomic number {0} is outside the supported range 1..=100")]
    InvalidAtomicNumber(u32),

    #[error("No relaxation model has been built for atomic number {0}")]
    ModelNotBuilt(u32),
}

/// Failures of a complete relaxation run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid relaxation configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Relaxation failed: {source}")]
    Relaxation {
        #[from]
        source: RelaxationError,
    },

    #[error(
        "Model for atomic number {atomic_number} was built with cutoffs {built:?}, run requested {requested:?}"
    )]
    CutoffMismatch {
        atomic_number: u32,
        built: EnergyCutoffs,
        requested: EnergyCutoffs,
    },
}

fn format_path(path: &[Subshell]) -> String {
    path.iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" -> ")
}
