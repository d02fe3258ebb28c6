//! System-wide constants for the procintf workspace.
//!
//! Single source of truth for endpoint names, permissions, write bounds and
//! the initial driver context values.

use static_assertions::const_assert;

/// Default namespace directory name.
pub const DEFAULT_DIR_NAME: &str = "procfs_simple_intf";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/procintf/procintf.toml";

// ─── Endpoints ──────────────────────────────────────────────────────

/// Read/write `config1` endpoint.
pub const CONFIG_NAME: &str = "llkdproc_config1";
/// Permission bits of the config endpoint.
pub const CONFIG_PERMS: u16 = 0o644;
/// Largest payload accepted by a config write, terminator included.
pub const CONFIG_WRITE_MAX: usize = 8;

/// Read-only `PAGE_OFFSET` endpoint.
pub const PGOFF_NAME: &str = "llkdproc_show_pgoff";
/// Permission bits of the page offset endpoint.
pub const PGOFF_PERMS: u16 = 0o444;

/// Read-only driver context dump.
pub const DRVCTX_NAME: &str = "llkdproc_show_drvctx";
/// Permission bits of the context dump endpoint.
pub const DRVCTX_PERMS: u16 = 0o440;

/// Read/write debug level endpoint.
pub const DEBUG_LEVEL_NAME: &str = "llkdproc_debug_level";
/// Permission bits of the debug level endpoint.
pub const DEBUG_LEVEL_PERMS: u16 = 0o644;
/// Largest payload accepted by a debug level write, terminator included.
pub const DEBUG_LEVEL_WRITE_MAX: usize = 12;

// ─── Debug level ────────────────────────────────────────────────────

/// Lowest accepted debug level.
pub const DEBUG_LEVEL_MIN: i32 = 0;
/// Highest accepted debug level.
pub const DEBUG_LEVEL_MAX: i32 = 2;
/// Debug level at startup and after a rejected write.
pub const DEBUG_LEVEL_DEFAULT: i32 = DEBUG_LEVEL_MIN;

// ─── Driver context ─────────────────────────────────────────────────

/// Capacity of the secret buffer in bytes.
pub const SECRET_CAPACITY: usize = 128;
/// Initial secret string.
pub const INITIAL_SECRET: &str = "AhA xxx";
/// Fixed `config2` value.
pub const CONFIG2_INIT: u32 = 0x4852_4a5f;
/// Fixed `config3` value.
pub const CONFIG3_INIT: u64 = 0x424c_0a52;
/// Power flag while the service is loaded.
pub const POWER_ON: i32 = 1;

/// Kernel direct-map base for the build target.
#[cfg(target_arch = "x86_64")]
pub const PAGE_OFFSET: u64 = 0xffff_8880_0000_0000;
/// Kernel direct-map base for the build target.
#[cfg(target_arch = "aarch64")]
pub const PAGE_OFFSET: u64 = 0xffff_0000_0000_0000;
/// Kernel direct-map base for the build target.
#[cfg(target_arch = "riscv64")]
pub const PAGE_OFFSET: u64 = 0xff60_0000_0000_0000;
/// Kernel direct-map base for the build target.
#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
pub const PAGE_OFFSET: u64 = 0xc000_0000;

const_assert!(DEBUG_LEVEL_MIN <= DEBUG_LEVEL_DEFAULT && DEBUG_LEVEL_DEFAULT <= DEBUG_LEVEL_MAX);
const_assert!(INITIAL_SECRET.len() < SECRET_CAPACITY);
const_assert!(CONFIG_WRITE_MAX > 0 && DEBUG_LEVEL_WRITE_MAX > 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_are_distinct() {
        let names = [CONFIG_NAME, PGOFF_NAME, DRVCTX_NAME, DEBUG_LEVEL_NAME];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn read_only_endpoints_have_no_write_bits() {
        assert_eq!(PGOFF_PERMS & 0o222, 0);
        assert_eq!(DRVCTX_PERMS & 0o222, 0);
        // Context dump is hidden from others.
        assert_eq!(DRVCTX_PERMS & 0o007, 0);
    }
}
