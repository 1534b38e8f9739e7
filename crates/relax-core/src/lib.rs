//! # Relax++ Core Library
//!
//! Atomic relaxation for Monte Carlo radiation transport: when a collision
//! leaves a vacancy in an inner atomic subshell, the atom de-excites through a
//! cascade of radiative (fluorescence) and non-radiative (Auger) transitions,
//! and the photons and electrons it emits are handed back to the transport
//! loop as secondary particles.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data: subshell identifiers, particle state and
//!   the particle bank, discrete sampling, and validated per-subshell transition tables decoded
//!   from any source implementing `ElementRelaxationData`.
//!
//! - **[`engine`]: The Logic Core.** Subshell and atomic relaxation models, the recursive
//!   cascade, the per-element model factory and cache, configuration, and errors.
//!
//! - **[`workflows`]: The Public API.** Warm-up of the model cache followed by parallel
//!   relaxation of a batch of ionization events with reproducible per-history random streams.

pub mod core;
pub mod engine;
pub mod workflows;
