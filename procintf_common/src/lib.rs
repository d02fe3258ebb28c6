//! procintf Common Library
//!
//! This crate provides shared constants, configuration loading and error
//! types for all procintf workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Endpoint names, permissions, write bounds and context defaults
//! - [`config`] - Configuration loading traits and types
//! - [`error`] - Interface error taxonomy with errno mapping
//! - [`mode`] - Permission mode bits for endpoints
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use procintf_common::consts::*;
//! use procintf_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod mode;
pub mod prelude;
