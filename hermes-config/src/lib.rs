//! Configuration for the Hermes profiling pipeline.
//!
//! The configuration is read from a `config.yml` file in a configuration folder, or created from
//! a JSON value for tests. Command line arguments can override individual options through
//! [`OverridableConfig`].
//!
//! ```yaml
//! profiling:
//!   profiles_sample_rate: 0.5
//!   platform: android
//! logging:
//!   level: debug
//! ```

#![warn(missing_docs)]

mod config;

pub use crate::config::*;
