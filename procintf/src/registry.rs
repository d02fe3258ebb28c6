//! Endpoint registry.
//!
//! A fixed table filled in registration order at startup and read-only
//! afterwards. Lookups map an entry name to its [`EndpointKind`].

use procintf_common::error::{IntfError, IntfResult};

use crate::endpoint::{EndpointKind, EndpointSpec};

/// Registered endpoints of one namespace directory.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    dir: String,
    entries: Vec<EndpointKind>,
}

impl EndpointRegistry {
    /// Empty registry for `dir`.
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            entries: Vec::with_capacity(EndpointKind::ALL.len()),
        }
    }

    /// Directory name.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Add an endpoint.
    ///
    /// # Panics
    /// Panics if the endpoint is already registered.
    pub fn register(&mut self, kind: EndpointKind) {
        if self.entries.contains(&kind) {
            panic!("Endpoint '{}' is already registered", kind.name());
        }
        self.entries.push(kind);
    }

    /// Endpoint registered under `name`.
    ///
    /// # Errors
    /// Returns `IntfError::NotFound` if no endpoint has that name.
    pub fn lookup(&self, name: &str) -> IntfResult<EndpointKind> {
        self.entries
            .iter()
            .copied()
            .find(|k| k.name() == name)
            .ok_or_else(|| IntfError::NotFound(name.to_string()))
    }

    /// Registered endpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EndpointKind, EndpointSpec)> + '_ {
        self.entries.iter().map(|k| (*k, k.spec()))
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_register_and_lookup() {
        let mut reg = EndpointRegistry::new("d");
        reg.register(EndpointKind::DebugLevel);
        assert_eq!(
            reg.lookup("llkdproc_debug_level"),
            Ok(EndpointKind::DebugLevel)
        );
        assert_eq!(reg.dir(), "d");
    }

    #[test]
    fn registry_entry_not_found() {
        let reg = EndpointRegistry::new("d");
        assert!(matches!(reg.lookup("nonexistent"), Err(IntfError::NotFound(_))));
    }

    #[test]
    fn registry_keeps_order() {
        let mut reg = EndpointRegistry::new("d");
        for kind in EndpointKind::ALL {
            reg.register(kind);
        }
        let kinds: Vec<_> = reg.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, EndpointKind::ALL);
        assert_eq!(reg.len(), 4);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = EndpointRegistry::new("d");
        reg.register(EndpointKind::Config);
        reg.register(EndpointKind::Config);
    }
}
