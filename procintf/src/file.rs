//! Open endpoint handles.
//!
//! A handle renders its endpoint once, on the first read, and serves that
//! text across later reads by offset; a read at the end returns 0. Writes go
//! straight to the endpoint's write handler each time.

use procintf_common::error::{IntfError, IntfResult};
use procintf_common::mode::Access;
use tracing::debug;

use crate::core::ProcIntf;
use crate::endpoint::EndpointKind;
use crate::serializer::Caller;
use crate::uaccess::{UserSlice, UserSliceMut};

/// An open endpoint.
pub struct ProcFile<'a> {
    intf: &'a ProcIntf,
    kind: EndpointKind,
    access: Access,
    caller: Caller,
    rendered: Option<String>,
    pos: usize,
}

impl<'a> ProcFile<'a> {
    pub(crate) fn new(intf: &'a ProcIntf, kind: EndpointKind, access: Access, caller: Caller) -> Self {
        Self {
            intf,
            kind,
            access,
            caller,
            rendered: None,
            pos: 0,
        }
    }

    /// Endpoint behind this handle.
    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Copy the next chunk of the rendered text into `ubuf`.
    pub fn read(&mut self, ubuf: &mut UserSliceMut<'_>) -> IntfResult<usize> {
        if !self.access.reads() {
            return Err(IntfError::PermissionDenied);
        }
        if self.rendered.is_none() {
            let text = self.kind.show(&self.intf.handler_ctx(&self.caller))?;
            self.rendered = Some(text);
        }
        let text = self.rendered.as_deref().unwrap_or_default().as_bytes();
        let remaining = &text[self.pos.min(text.len())..];
        let n = remaining.len().min(ubuf.len());
        ubuf.copy_to_user(&remaining[..n])?;
        self.pos += n;
        Ok(n)
    }

    /// Read everything left into a string.
    pub fn read_to_string(&mut self) -> IntfResult<String> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = self.read(&mut UserSliceMut::new(&mut chunk))?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Pass `ubuf` to the endpoint's write handler.
    pub fn write(&mut self, ubuf: &UserSlice<'_>) -> IntfResult<usize> {
        if !self.access.writes() {
            return Err(IntfError::PermissionDenied);
        }
        self.kind
            .store(&self.intf.handler_ctx(&self.caller), ubuf)
    }

    /// Drop the rendered text; the next read renders afresh.
    pub fn rewind(&mut self) {
        self.rendered = None;
        self.pos = 0;
    }
}

impl Drop for ProcFile<'_> {
    fn drop(&mut self) {
        debug!(endpoint = self.kind.name(), pid = self.caller.pid, "release");
    }
}
