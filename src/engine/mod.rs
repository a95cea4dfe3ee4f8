//! Control engine module.
//!
//! Provides control orchestration and result aggregation.

pub mod orchestrator;
pub mod result;
