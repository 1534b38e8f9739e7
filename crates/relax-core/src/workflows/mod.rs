//! # Workflows Module
//!
//! High-level entry points that drive the relaxation engine over a batch of
//! ionization events.
//!
//! - **Cascade Workflow** ([`cascade`]) - Single-threaded model warm-up followed by
//!   independent, optionally parallel, relaxation histories with per-history banks.

pub mod cascade;
