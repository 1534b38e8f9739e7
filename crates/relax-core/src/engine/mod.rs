//! # Engine Module
//!
//! The stateful relaxation machinery: models that sample transitions and emit
//! secondary particles, the factory that builds and caches them per element,
//! and the configuration they run under.
//!
//! ## Architecture
//!
//! - **Subshell models** ([`subshell_model`]) - Sample one transition for a vacancy and bank its particle
//! - **Atomic models** ([`atomic_model`]) - Recursive cascade over subshell models, plus the shared void model
//! - **Classification** ([`transition`]) - Strategy deciding whether a transition is radiative or Auger
//! - **Factory** ([`factory`]) - Builds atomic models from element data and caches them by atomic number
//! - **Configuration** ([`config`]) - Energy cutoffs, relaxation modes and the run seed
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Relaxation and workflow error types
//!
//! Every model is immutable once built and is shared between histories through
//! [`std::sync::Arc`]. Only the factory cache is ever mutated, and only through
//! `&mut` access during warm-up.

pub mod atomic_model;
pub(crate) mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod progress;
pub mod subshell_model;
pub mod transition;
