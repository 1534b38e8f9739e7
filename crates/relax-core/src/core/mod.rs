//! # Core Module
//!
//! Stateless building blocks of the relaxation engine: subshell identifiers,
//! particle state, discrete sampling primitives and tabulated relaxation data.
//!
//! ## Architecture
//!
//! - **Subshells** ([`subshell`]) - Canonical subshell identifiers and ENDF designator conversion
//! - **Particles** ([`particle`]) - Particle phase-space state and the append-only particle bank
//! - **Sampling** ([`sampling`]) - Inverse-CDF discrete distributions and isotropic directions
//! - **Data** ([`data`]) - Raw element data capability, subshell tables and validation

pub mod data;
pub mod particle;
pub mod sampling;
pub mod subshell;
