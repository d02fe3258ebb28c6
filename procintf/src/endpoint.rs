//! The four endpoints and their read/write handlers.
//!
//! Each endpoint is a variant of [`EndpointKind`]. Reads format a snapshot
//! taken under the serializer; writes bound-check and copy the payload in,
//! parse it, then mutate the store under the serializer.
//!
//! | Endpoint | Perms | Read | Write bound |
//! |----------|-------|------|-------------|
//! | `llkdproc_config1` | 0644 | `<dir>:config1:<dec>,0x<hex>` | 8 |
//! | `llkdproc_show_pgoff` | 0444 | `<dir>:PAGE_OFFSET:0x<hex>` | - |
//! | `llkdproc_show_drvctx` | 0440 | full context dump | - |
//! | `llkdproc_debug_level` | 0644 | `debug_level:<dec>` | 12 |

use procintf_common::config::ValidationMode;
use procintf_common::consts::{
    CONFIG_NAME, CONFIG_PERMS, CONFIG_WRITE_MAX, DEBUG_LEVEL_DEFAULT, DEBUG_LEVEL_MAX,
    DEBUG_LEVEL_MIN, DEBUG_LEVEL_NAME, DEBUG_LEVEL_PERMS, DEBUG_LEVEL_WRITE_MAX, DRVCTX_NAME,
    DRVCTX_PERMS, PAGE_OFFSET, PGOFF_NAME, PGOFF_PERMS,
};
use procintf_common::error::{IntfError, IntfResult};
use procintf_common::mode::Mode;
use static_assertions::const_assert;
use tracing::{debug, warn};

use crate::context::{ContextSnapshot, StoreState};
use crate::serializer::{AccessSerializer, Caller};
use crate::uaccess::UserSlice;
use crate::validate::{check_range, parse_signed, parse_unsigned, terminate};

/// Stack scratch for write payloads.
const SCRATCH: usize = 16;
const_assert!(CONFIG_WRITE_MAX <= SCRATCH && DEBUG_LEVEL_WRITE_MAX <= SCRATCH);

/// Closed set of endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// `config1`, read/write
    Config,
    /// Platform `PAGE_OFFSET`, read-only, stateless
    PageOffset,
    /// Full context dump, read-only
    ShowContext,
    /// Debug level, read/write
    DebugLevel,
}

/// Static description of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    /// Entry name
    pub name: &'static str,
    /// Permission bits
    pub mode: Mode,
    /// Largest accepted write, `None` if the endpoint is read-only
    pub write_max: Option<usize>,
}

/// What a handler needs besides the payload.
#[derive(Clone, Copy)]
pub struct HandlerCtx<'a> {
    /// Namespace directory name, printed by some reads
    pub dir: &'a str,
    /// The store
    pub store: &'a AccessSerializer<StoreState>,
    /// Range-check policy
    pub validation: ValidationMode,
    /// Calling context
    pub caller: &'a Caller,
}

impl EndpointKind {
    /// All endpoints in registration order.
    pub const ALL: [EndpointKind; 4] = [
        EndpointKind::Config,
        EndpointKind::PageOffset,
        EndpointKind::ShowContext,
        EndpointKind::DebugLevel,
    ];

    /// Name, mode and write bound.
    pub const fn spec(self) -> EndpointSpec {
        match self {
            EndpointKind::Config => EndpointSpec {
                name: CONFIG_NAME,
                mode: Mode::from_octal(CONFIG_PERMS),
                write_max: Some(CONFIG_WRITE_MAX),
            },
            EndpointKind::PageOffset => EndpointSpec {
                name: PGOFF_NAME,
                mode: Mode::from_octal(PGOFF_PERMS),
                write_max: None,
            },
            EndpointKind::ShowContext => EndpointSpec {
                name: DRVCTX_NAME,
                mode: Mode::from_octal(DRVCTX_PERMS),
                write_max: None,
            },
            EndpointKind::DebugLevel => EndpointSpec {
                name: DEBUG_LEVEL_NAME,
                mode: Mode::from_octal(DEBUG_LEVEL_PERMS),
                write_max: Some(DEBUG_LEVEL_WRITE_MAX),
            },
        }
    }

    /// Entry name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// True if the endpoint has a write handler.
    pub fn is_writable(self) -> bool {
        self.spec().write_max.is_some()
    }

    /// True if the endpoint reads the store.
    pub fn uses_store(self) -> bool {
        !matches!(self, EndpointKind::PageOffset)
    }

    /// Read handler: render the endpoint's text.
    pub fn show(self, hc: &HandlerCtx<'_>) -> IntfResult<String> {
        debug!(
            endpoint = self.name(),
            pid = hc.caller.pid,
            comm = %hc.caller.comm,
            "show"
        );
        match self {
            EndpointKind::PageOffset => Ok(format_pgoff(hc.dir)),
            EndpointKind::Config => {
                let config1 = hc.store.lock_interruptible(hc.caller)?.config1();
                Ok(format!("{}:config1:{},0x{:x}\n", hc.dir, config1, config1))
            }
            EndpointKind::ShowContext => {
                let snap = hc.store.lock_interruptible(hc.caller)?.read();
                Ok(format_context(hc.dir, &snap))
            }
            EndpointKind::DebugLevel => {
                let level = hc.store.lock_interruptible(hc.caller)?.debug_level();
                Ok(format!("debug_level:{}\n", level))
            }
        }
    }

    /// Write handler: returns the number of bytes consumed.
    pub fn store(self, hc: &HandlerCtx<'_>, ubuf: &UserSlice<'_>) -> IntfResult<usize> {
        let Some(max) = self.spec().write_max else {
            return Err(IntfError::NotSupported);
        };
        let count = ubuf.len();
        if count == 0 || count > max {
            return Err(IntfError::InputTooLarge { len: count, max });
        }
        let mut scratch = [0u8; SCRATCH];
        let buf = &mut scratch[..count];
        ubuf.copy_from_user(buf)?;
        let text = terminate(buf)?;
        debug!(endpoint = self.name(), "user sent: buf = {:?}", text);

        match self {
            EndpointKind::Config => store_config1(hc, text)?,
            EndpointKind::DebugLevel => store_debug_level(hc, text)?,
            EndpointKind::PageOffset | EndpointKind::ShowContext => {
                return Err(IntfError::NotSupported);
            }
        }
        Ok(count)
    }
}

fn store_config1(hc: &HandlerCtx<'_>, text: &str) -> IntfResult<()> {
    let value = parse_unsigned(text)?;
    if hc.validation == ValidationMode::Strict {
        check_range(
            i64::from(value),
            i64::from(DEBUG_LEVEL_MIN),
            i64::from(DEBUG_LEVEL_MAX),
        )
        .inspect_err(|_| warn!(value, "config1 outside debug level range, rejected"))?;
    }
    hc.store.lock_interruptible(hc.caller)?.set_config1(value);
    Ok(())
}

fn store_debug_level(hc: &HandlerCtx<'_>, text: &str) -> IntfResult<()> {
    let value = parse_signed(text)?;
    let mut store = hc.store.lock_interruptible(hc.caller)?;
    if let Err(e) = check_range(
        i64::from(value),
        i64::from(DEBUG_LEVEL_MIN),
        i64::from(DEBUG_LEVEL_MAX),
    ) {
        warn!(
            value,
            "trying to set invalid value for debug_level [allowed range: {}-{}]",
            DEBUG_LEVEL_MIN,
            DEBUG_LEVEL_MAX
        );
        match hc.validation {
            ValidationMode::Strict => store.set_debug_level(DEBUG_LEVEL_DEFAULT),
            ValidationMode::Legacy => store.reset_debug_level(),
        }
        return Err(e);
    }
    store.set_debug_level(value);
    Ok(())
}

/// `PAGE_OFFSET` line.
pub fn format_pgoff(dir: &str) -> String {
    format!("{}:PAGE_OFFSET:0x{:x}\n", dir, PAGE_OFFSET)
}

/// Multi-line context dump.
pub fn format_context(dir: &str, s: &ContextSnapshot) -> String {
    format!(
        "prodname:{}\n\
         tx:{},rx:{},err:{},myword:{},power:{}\n\
         config1:0x{:x},config2:0x{:x},config3:0x{:x}\n\
         oursecret:{}\n",
        dir,
        s.tx,
        s.rx,
        s.err,
        s.word,
        s.power,
        s.config1,
        s.config2,
        s.config3,
        s.secret
    )
}
