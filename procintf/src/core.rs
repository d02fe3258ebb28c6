//! Lifecycle controller.
//!
//! `ProcIntf` owns the store, the endpoint registry and the namespace
//! registration. [`ProcIntf::enable`] builds everything and registers the
//! endpoints in order; a failure at any step removes what was registered and
//! drops the store before the error is returned. [`ProcIntf::disable`]
//! consumes the controller, so teardown happens exactly once.

use procintf_common::config::{ProcfsConfig, ValidationMode};
use procintf_common::error::{IntfError, IntfResult};
use procintf_common::mode::{Access, Mode};
use tracing::{debug, info, warn};

use crate::context::{ContextSnapshot, StoreState};
use crate::endpoint::{EndpointKind, HandlerCtx};
use crate::file::ProcFile;
use crate::procfs::ProcNamespace;
use crate::registry::EndpointRegistry;
use crate::serializer::{AccessSerializer, Caller, SerializerStats};
use crate::uaccess::UserSlice;

/// The running interface.
pub struct ProcIntf {
    validation: ValidationMode,
    namespace: Box<dyn ProcNamespace>,
    registry: EndpointRegistry,
    store: AccessSerializer<StoreState>,
}

impl ProcIntf {
    /// Create the namespace directory, allocate the store and register the
    /// endpoints.
    ///
    /// # Errors
    /// - `IntfError::Unsupported` if the namespace facility is missing
    /// - `IntfError::RegistrationFailure` if the directory or an entry
    ///   cannot be created; nothing stays registered in that case
    pub fn enable(config: &ProcfsConfig, namespace: Box<dyn ProcNamespace>) -> IntfResult<Self> {
        let dir = config.dir_name.as_str();
        if !namespace.available() {
            warn!("{}: procfs unsupported! Aborting ...", dir);
            return Err(IntfError::Unsupported);
        }

        namespace.mkdir(dir).inspect_err(|_| {
            warn!("{}: proc_mkdir failed, aborting...", dir);
        })?;

        match Self::register_all(config, namespace.as_ref()) {
            Ok((registry, store)) => {
                info!(
                    "{} initialized ({} endpoints, validation={:?})",
                    dir,
                    registry.len(),
                    config.validation
                );
                Ok(Self {
                    validation: config.validation,
                    namespace,
                    registry,
                    store,
                })
            }
            Err(e) => {
                namespace.remove_subtree(dir);
                Err(e)
            }
        }
    }

    /// Register the entries in order, allocating the store just before the
    /// first endpoint that reads it. The store is dropped on error.
    fn register_all(
        config: &ProcfsConfig,
        namespace: &dyn ProcNamespace,
    ) -> IntfResult<(EndpointRegistry, AccessSerializer<StoreState>)> {
        let dir = config.dir_name.as_str();
        let mut registry = EndpointRegistry::new(dir);
        let mut store = None;

        for (step, kind) in EndpointKind::ALL.into_iter().enumerate() {
            if kind == EndpointKind::ShowContext {
                store = Some(AccessSerializer::new(StoreState::new()));
            }
            let spec = kind.spec();
            namespace
                .create(dir, spec.name, spec.mode)
                .inspect_err(|_| warn!("{}: proc_create [{}] failed, aborting...", dir, step + 1))?;
            registry.register(kind);
            debug!("proc file {} ({}/{}) created", step + 1, dir, spec.name);
        }

        let store = store.unwrap_or_else(|| AccessSerializer::new(StoreState::new()));
        Ok((registry, store))
    }

    /// Power the context off, remove the namespace and release the store.
    pub fn disable(self) {
        self.store.lock().power_off();
        self.namespace.remove_subtree(self.registry.dir());
        drop(self.store);
        info!("{} removed", self.registry.dir());
    }

    /// Namespace directory name.
    pub fn dir_name(&self) -> &str {
        self.registry.dir()
    }

    /// Range-check policy in force.
    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Registered entries with their modes.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Mode)> + '_ {
        self.registry.iter().map(|(_, spec)| (spec.name, spec.mode))
    }

    /// Open an entry after checking `access` against its mode bits.
    pub fn open(&self, name: &str, caller: &Caller, access: Access) -> IntfResult<ProcFile<'_>> {
        let kind = self.registry.lookup(name)?;
        let mode = kind.spec().mode;
        if !mode.permits(caller.uid, caller.gid, access) {
            debug!(entry = name, uid = caller.uid, "open denied");
            return Err(IntfError::PermissionDenied);
        }
        debug!(entry = name, pid = caller.pid, comm = %caller.comm, ?access, "open");
        Ok(ProcFile::new(self, kind, access, caller.clone()))
    }

    /// Open, read everything, close.
    pub fn read_entry(&self, name: &str, caller: &Caller) -> IntfResult<String> {
        self.open(name, caller, Access::Read)?.read_to_string()
    }

    /// Open, write `bytes` as one call, close.
    pub fn write_entry(&self, name: &str, caller: &Caller, bytes: &[u8]) -> IntfResult<usize> {
        self.write_user(name, caller, &UserSlice::new(bytes))
    }

    /// Open, write the caller's buffer as one call, close.
    pub fn write_user(&self, name: &str, caller: &Caller, ubuf: &UserSlice<'_>) -> IntfResult<usize> {
        self.open(name, caller, Access::Write)?.write(ubuf)
    }

    /// Snapshot of the whole store.
    pub fn snapshot(&self, caller: &Caller) -> IntfResult<ContextSnapshot> {
        Ok(self.store.lock_interruptible(caller)?.read())
    }

    /// Lock counters.
    pub fn serializer_stats(&self) -> SerializerStats {
        self.store.stats()
    }

    pub(crate) fn handler_ctx<'a>(&'a self, caller: &'a Caller) -> HandlerCtx<'a> {
        HandlerCtx {
            dir: self.registry.dir(),
            store: &self.store,
            validation: self.validation,
            caller,
        }
    }
}
