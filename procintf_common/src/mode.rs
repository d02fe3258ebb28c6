//! Permission mode bits for namespace entries.
//!
//! Entries are owned by root:root. Access checks follow the owner / group /
//! other classes; uid 0 bypasses them.

use bitflags::bitflags;

bitflags! {
    /// POSIX-style permission bits of an entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u16 {
        /// Owner read.
        const OWNER_READ  = 0o400;
        /// Owner write.
        const OWNER_WRITE = 0o200;
        /// Owner execute.
        const OWNER_EXEC  = 0o100;
        /// Group read.
        const GROUP_READ  = 0o040;
        /// Group write.
        const GROUP_WRITE = 0o020;
        /// Group execute.
        const GROUP_EXEC  = 0o010;
        /// Other read.
        const OTHER_READ  = 0o004;
        /// Other write.
        const OTHER_WRITE = 0o002;
        /// Other execute.
        const OTHER_EXEC  = 0o001;
    }
}

/// Requested access on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Open for reading.
    Read,
    /// Open for writing.
    Write,
    /// Open for reading and writing.
    ReadWrite,
}

impl Access {
    /// True if the access includes reading.
    pub fn reads(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// True if the access includes writing.
    pub fn writes(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// Owner uid of every entry.
pub const ROOT_UID: u32 = 0;
/// Owner gid of every entry.
pub const ROOT_GID: u32 = 0;

impl Mode {
    /// Build from an octal permission value, dropping unknown bits.
    pub const fn from_octal(perms: u16) -> Self {
        Self::from_bits_truncate(perms)
    }

    /// Octal permission value.
    pub fn octal(self) -> u16 {
        self.bits()
    }

    /// True if no class grants write access.
    pub fn is_read_only(self) -> bool {
        !self.intersects(Self::OWNER_WRITE | Self::GROUP_WRITE | Self::OTHER_WRITE)
    }

    /// Check `access` for a caller against a root-owned entry.
    pub fn permits(self, uid: u32, gid: u32, access: Access) -> bool {
        if uid == ROOT_UID {
            return true;
        }
        let (read, write) = if gid == ROOT_GID {
            (Self::GROUP_READ, Self::GROUP_WRITE)
        } else {
            (Self::OTHER_READ, Self::OTHER_WRITE)
        };
        (!access.reads() || self.contains(read)) && (!access.writes() || self.contains(write))
    }

    /// `ls -l` style rendering, e.g. `-rw-r--r--`.
    pub fn symbolic(self) -> String {
        const BITS: [(Mode, char); 9] = [
            (Mode::OWNER_READ, 'r'),
            (Mode::OWNER_WRITE, 'w'),
            (Mode::OWNER_EXEC, 'x'),
            (Mode::GROUP_READ, 'r'),
            (Mode::GROUP_WRITE, 'w'),
            (Mode::GROUP_EXEC, 'x'),
            (Mode::OTHER_READ, 'r'),
            (Mode::OTHER_WRITE, 'w'),
            (Mode::OTHER_EXEC, 'x'),
        ];
        let mut out = String::with_capacity(10);
        out.push('-');
        for (bit, c) in BITS {
            out.push(if self.contains(bit) { c } else { '-' });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_bypasses_mode_bits() {
        let m = Mode::from_octal(0o440);
        assert!(m.permits(ROOT_UID, 1000, Access::Write));
    }

    #[test]
    fn group_and_other_classes() {
        let m = Mode::from_octal(0o440);
        assert!(m.permits(1000, ROOT_GID, Access::Read));
        assert!(!m.permits(1000, 1000, Access::Read));
        assert!(!m.permits(1000, ROOT_GID, Access::Write));

        let rw = Mode::from_octal(0o644);
        assert!(rw.permits(1000, 1000, Access::Read));
        assert!(!rw.permits(1000, 1000, Access::ReadWrite));
    }

    #[test]
    fn read_only_and_symbolic() {
        assert!(Mode::from_octal(0o444).is_read_only());
        assert!(!Mode::from_octal(0o644).is_read_only());
        assert_eq!(Mode::from_octal(0o644).symbolic(), "-rw-r--r--");
        assert_eq!(Mode::from_octal(0o440).symbolic(), "-r--r-----");
    }
}
