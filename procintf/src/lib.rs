//! # procintf Library
//!
//! A pseudo-filesystem configuration/status interface: one small piece of
//! shared driver state exposed through four permissioned endpoints, each
//! with its own read and write semantics, all serialized by a single lock.
//!
//! # Module Structure
//!
//! - [`core`] - `ProcIntf` lifecycle controller and dispatch
//! - [`context`] - Driver context and the guarded store state
//! - [`endpoint`] - The four endpoints and their handlers
//! - [`registry`] - Fixed endpoint table
//! - [`serializer`] - Interruptible access serializer and caller identity
//! - [`validate`] - Integer parsing and range checks
//! - [`uaccess`] - Copy-in / copy-out across the caller boundary
//! - [`file`] - Open endpoint handles
//! - [`procfs`] - Namespace registration facility
//! - [`miscdev`] - Skeleton misc character device
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          procintf                                │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ ProcNamespace│◄──│  ProcIntf    │───►│  EndpointRegistry   │  │
//! │  │ (glue)      │    │ (lifecycle)  │    │  (fixed table)      │  │
//! │  └─────────────┘    └──────┬───────┘    └──────────┬──────────┘  │
//! │                            │                       │             │
//! │                            ▼                       ▼             │
//! │                   ┌────────────────┐      ┌────────────────┐     │
//! │                   │AccessSerializer│◄─────│ EndpointKind   │     │
//! │                   │ [StoreState]   │      │ show / store   │     │
//! │                   └────────────────┘      └────────────────┘     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use procintf::{Caller, ProcIntf, ProcTree};
//! use procintf_common::config::ProcfsConfig;
//!
//! let tree = ProcTree::new();
//! let intf = ProcIntf::enable(&ProcfsConfig::default(), Box::new(tree.clone())).unwrap();
//! let root = Caller::root();
//!
//! intf.write_entry("llkdproc_debug_level", &root, b"2\n").unwrap();
//! assert_eq!(
//!     intf.read_entry("llkdproc_debug_level", &root).unwrap(),
//!     "debug_level:2\n"
//! );
//! intf.disable();
//! ```

#![deny(missing_docs)]

pub mod context;
pub mod core;
pub mod endpoint;
pub mod file;
pub mod miscdev;
pub mod procfs;
pub mod registry;
pub mod serializer;
pub mod uaccess;
pub mod validate;

// Re-export key types for convenience
pub use crate::context::{ContextSnapshot, DriverContext, Field};
pub use crate::core::ProcIntf;
pub use crate::endpoint::EndpointKind;
pub use crate::file::ProcFile;
pub use crate::miscdev::{MiscDevice, MiscRegistry};
pub use crate::procfs::{ProcNamespace, ProcTree};
pub use crate::serializer::{Caller, Interrupt};
pub use crate::uaccess::{UserSlice, UserSliceMut};
