//! Prelude module for common re-exports.
//!
//! ```rust
//! use procintf_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, IntfConfig, LogLevel, ProcfsConfig, SharedConfig, ValidationMode,
};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{IntfError, IntfResult, ParseError};

// ─── Permissions ────────────────────────────────────────────────────
pub use crate::mode::{Access, Mode};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEBUG_LEVEL_DEFAULT, DEBUG_LEVEL_MAX, DEBUG_LEVEL_MIN, DEFAULT_DIR_NAME};
