//! Skeleton misc character device.
//!
//! Misc devices share major 10 and get a minor at registration. The
//! device's file operations do nothing but log the call and the calling
//! context; read and write report the full requested count as transferred.

use parking_lot::Mutex;
use procintf_common::error::{IntfError, IntfResult};
use procintf_common::mode::{Access, Mode};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::serializer::Caller;
use crate::uaccess::{UserSlice, UserSliceMut};

/// Major number shared by all misc devices.
pub const MISC_MAJOR: u32 = 10;

/// Size of the dynamic minor range; minors are handed out from the top.
pub const DYNAMIC_MINORS: u8 = 64;

/// Name of the skeleton device node.
pub const MISCDRV_NAME: &str = "llkd_miscdrv";

/// Permission bits of the skeleton device node.
pub const MISCDRV_PERMS: u16 = 0o666;

/// Minor number table.
#[derive(Debug, Default)]
pub struct MiscRegistry {
    minors: Mutex<BTreeMap<u8, String>>,
}

impl MiscRegistry {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and assign it the highest free dynamic minor.
    ///
    /// # Errors
    /// Returns `IntfError::RegistrationFailure` if the name is taken or the
    /// dynamic range is exhausted.
    pub fn register(&self, name: &str, perms: u16) -> IntfResult<MiscDevice<'_>> {
        let mut minors = self.minors.lock();
        let failure = || IntfError::RegistrationFailure {
            entry: name.to_string(),
        };
        if minors.values().any(|n| n == name) {
            return Err(failure());
        }
        let minor = (0..DYNAMIC_MINORS)
            .rev()
            .find(|m| !minors.contains_key(m))
            .ok_or_else(failure)?;
        minors.insert(minor, name.to_string());
        info!(
            "{}: misc driver (major # {}) registered, minor# = {}, dev node is /dev/{}",
            name, MISC_MAJOR, minor, name
        );
        Ok(MiscDevice {
            registry: self,
            name: name.to_string(),
            mode: Mode::from_octal(perms),
            minor,
        })
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.minors.lock().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.minors.lock().is_empty()
    }
}

/// A registered misc device; deregistered on drop.
#[derive(Debug)]
pub struct MiscDevice<'a> {
    registry: &'a MiscRegistry,
    name: String,
    mode: Mode,
    minor: u8,
}

impl MiscDevice<'_> {
    /// Device name, also the node name under `/dev`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned minor number.
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Node permission bits.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Open the device node.
    pub fn open(&self, caller: &Caller, access: Access) -> IntfResult<MiscFile<'_>> {
        if !self.mode.permits(caller.uid, caller.gid, access) {
            return Err(IntfError::PermissionDenied);
        }
        info!(
            pid = caller.pid,
            tid = caller.tid,
            comm = %caller.comm,
            "{}: open: filename: \"{}\", access = {:?}",
            self.name,
            self.name,
            access
        );
        Ok(MiscFile {
            dev: self,
            caller: caller.clone(),
        })
    }
}

impl Drop for MiscDevice<'_> {
    fn drop(&mut self) {
        self.registry.minors.lock().remove(&self.minor);
        info!("{}: misc driver deregistered, bye", self.name);
    }
}

/// Open handle of a misc device.
#[derive(Debug)]
pub struct MiscFile<'a> {
    dev: &'a MiscDevice<'a>,
    caller: Caller,
}

impl MiscFile<'_> {
    /// Pretend to fill `ubuf`; returns the requested count.
    pub fn read(&mut self, ubuf: &mut UserSliceMut<'_>) -> usize {
        debug!(pid = self.caller.pid, "{}: read: {} bytes", self.dev.name, ubuf.len());
        ubuf.len()
    }

    /// Pretend to consume `ubuf`; returns its count.
    pub fn write(&mut self, ubuf: &UserSlice<'_>) -> usize {
        debug!(pid = self.caller.pid, "{}: write: {} bytes", self.dev.name, ubuf.len());
        ubuf.len()
    }
}

impl Drop for MiscFile<'_> {
    fn drop(&mut self) {
        info!("{}: close: filename: \"{}\"", self.dev.name, self.dev.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minors_assigned_from_top_of_range() {
        let reg = MiscRegistry::new();
        let a = reg.register(MISCDRV_NAME, MISCDRV_PERMS).unwrap();
        let b = reg.register("other", 0o600).unwrap();
        assert_eq!(a.minor(), DYNAMIC_MINORS - 1);
        assert_eq!(b.minor(), DYNAMIC_MINORS - 2);
        drop(a);
        assert_eq!(reg.len(), 1);
        let c = reg.register("third", 0o600).unwrap();
        assert_eq!(c.minor(), DYNAMIC_MINORS - 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let reg = MiscRegistry::new();
        let _a = reg.register(MISCDRV_NAME, MISCDRV_PERMS).unwrap();
        assert!(matches!(
            reg.register(MISCDRV_NAME, MISCDRV_PERMS),
            Err(IntfError::RegistrationFailure { .. })
        ));
    }

    #[test]
    fn range_exhaustion() {
        let reg = MiscRegistry::new();
        let devs: Vec<_> = (0..DYNAMIC_MINORS)
            .map(|i| reg.register(&format!("dev{i}"), 0o600).unwrap())
            .collect();
        assert!(reg.register("one_too_many", 0o600).is_err());
        drop(devs);
        assert!(reg.is_empty());
    }

    #[test]
    fn skeleton_ops_report_full_count() {
        let reg = MiscRegistry::new();
        let dev = reg.register(MISCDRV_NAME, MISCDRV_PERMS).unwrap();
        let user = Caller::new(1000, 1000);
        let mut f = dev.open(&user, Access::ReadWrite).unwrap();

        let mut mem = [0u8; 32];
        assert_eq!(f.read(&mut UserSliceMut::new(&mut mem)), 32);
        assert_eq!(f.write(&UserSlice::new(b"hello")), 5);
    }

    #[test]
    fn mode_bits_enforced() {
        let reg = MiscRegistry::new();
        let dev = reg.register("private", 0o600).unwrap();
        assert!(matches!(
            dev.open(&Caller::new(1000, 1000), Access::Read),
            Err(IntfError::PermissionDenied)
        ));
        assert!(dev.open(&Caller::root(), Access::Read).is_ok());
    }
}
