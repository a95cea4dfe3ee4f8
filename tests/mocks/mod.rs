//! Mock implementations for testing without touching the real host.
//!
//! Provides a configurable [`MockHost`] that simulates package and service
//! manager answers, including query failures.


pub use host::*;
