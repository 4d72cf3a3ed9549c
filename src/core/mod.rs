//! Core domain models for verification
//!
//! This module defines the step catalog, the per-application pipeline
//! state machine, and the snapshots handed to clients.

pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod step;

pub use error::*;
pub use payload::*;
pub use pipeline::*;
pub use registry::*;
pub use snapshot::*;
pub use state::*;
pub use step::*;
