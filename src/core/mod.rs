//! Core domain models for the installer
//!
//! This module defines the steps, the fixed install plan, the run state
//! and the error taxonomy shared by every other module.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use error::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
