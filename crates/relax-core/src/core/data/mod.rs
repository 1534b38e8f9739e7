//! # Relaxation Data Module
//!
//! Per-element atomic relaxation data as consumed by the cascade engine.
//!
//! - [`source`] - The [`source::ElementRelaxationData`] capability every data format implements
//! - [`table`] - Validated per-subshell transition tables decoded from a data source
//! - [`container`] - An in-memory, write-once implementation of the data capability

pub mod container;
pub mod source;
pub mod table;
