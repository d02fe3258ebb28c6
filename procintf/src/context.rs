//! Driver context: the shared state behind every endpoint.
//!
//! [`StoreState`] bundles the [`DriverContext`] record with the standalone
//! debug level. It is only ever constructed inside the access serializer, so
//! its methods run with the lock held by construction.

use procintf_common::consts::{
    CONFIG2_INIT, CONFIG3_INIT, DEBUG_LEVEL_DEFAULT, INITIAL_SECRET, POWER_ON, SECRET_CAPACITY,
};
use procintf_common::error::{IntfError, IntfResult};
use serde::Serialize;
use tracing::debug;

/// Fixed-capacity secret buffer.
pub type Secret = heapless::String<SECRET_CAPACITY>;

/// Status and configuration record of the driver.
#[derive(Debug, Clone, Default)]
pub struct DriverContext {
    /// Transmit counter
    pub tx: i32,
    /// Receive counter
    pub rx: i32,
    /// Error counter
    pub err: i32,
    /// Scratch word
    pub word: i32,
    /// Power flag
    pub power: i32,
    /// Configuration word, doubles as the debug level
    pub config1: u32,
    /// Fixed at creation
    pub config2: u32,
    /// Fixed at creation
    pub config3: u64,
    /// Short secret string
    pub secret: Secret,
}

impl DriverContext {
    /// Zeroed record populated with the startup constants.
    pub fn initialized() -> Self {
        let mut secret = Secret::new();
        // Capacity is checked at compile time in `consts`.
        let _ = secret.push_str(INITIAL_SECRET);
        Self {
            config1: 0,
            config2: CONFIG2_INIT,
            config3: CONFIG3_INIT,
            power: POWER_ON,
            secret,
            ..Self::default()
        }
    }
}

/// Point-in-time copy of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    /// Transmit counter
    pub tx: i32,
    /// Receive counter
    pub rx: i32,
    /// Error counter
    pub err: i32,
    /// Scratch word
    pub word: i32,
    /// Power flag
    pub power: i32,
    /// Configuration word
    pub config1: u32,
    /// Fixed configuration word
    pub config2: u32,
    /// Fixed configuration word
    pub config3: u64,
    /// Secret string
    pub secret: Secret,
    /// Debug level
    pub debug_level: i32,
}

/// Writable fields of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `tx` counter
    Tx,
    /// `rx` counter
    Rx,
    /// `err` counter
    Err,
    /// Scratch word
    Word,
    /// Power flag
    Power,
    /// `config1`; mirrored into the debug level
    Config1,
    /// Debug level; mirrored into `config1`
    DebugLevel,
}

/// Driver context plus debug level, guarded as one unit.
#[derive(Debug)]
pub struct StoreState {
    ctx: Box<DriverContext>,
    debug_level: i32,
}

impl StoreState {
    pub(crate) fn new() -> Self {
        debug!("allocated and init the driver context structure");
        Self {
            ctx: Box::new(DriverContext::initialized()),
            debug_level: DEBUG_LEVEL_DEFAULT,
        }
    }

    /// Snapshot every field.
    pub fn read(&self) -> ContextSnapshot {
        let c = &self.ctx;
        ContextSnapshot {
            tx: c.tx,
            rx: c.rx,
            err: c.err,
            word: c.word,
            power: c.power,
            config1: c.config1,
            config2: c.config2,
            config3: c.config3,
            secret: c.secret.clone(),
            debug_level: self.debug_level,
        }
    }

    /// Set `field` to `value`.
    ///
    /// `Config1` and `DebugLevel` update each other. A value that does not
    /// fit the field's type is rejected and nothing changes.
    pub fn write(&mut self, field: Field, value: i64) -> IntfResult<()> {
        match field {
            Field::Config1 => {
                let v = u32::try_from(value).map_err(|_| out_of_type(value, 0, u32::MAX as i64))?;
                self.set_config1(v);
            }
            Field::DebugLevel => self.set_debug_level(fit_i32(value)?),
            Field::Tx => self.ctx.tx = fit_i32(value)?,
            Field::Rx => self.ctx.rx = fit_i32(value)?,
            Field::Err => self.ctx.err = fit_i32(value)?,
            Field::Word => self.ctx.word = fit_i32(value)?,
            Field::Power => self.ctx.power = fit_i32(value)?,
        }
        Ok(())
    }

    /// Set `config1` and mirror it into the debug level.
    pub fn set_config1(&mut self, value: u32) {
        self.ctx.config1 = value;
        self.debug_level = value as i32;
    }

    /// Set the debug level and mirror it into `config1`.
    pub fn set_debug_level(&mut self, level: i32) {
        self.debug_level = level;
        self.ctx.config1 = level as u32;
    }

    /// Current `config1`.
    pub fn config1(&self) -> u32 {
        self.ctx.config1
    }

    /// Current debug level.
    pub fn debug_level(&self) -> i32 {
        self.debug_level
    }

    /// Force the debug level to its default, leaving `config1` untouched.
    pub fn reset_debug_level(&mut self) {
        self.debug_level = DEBUG_LEVEL_DEFAULT;
    }

    pub(crate) fn power_off(&mut self) {
        self.ctx.power = 0;
    }
}

fn fit_i32(value: i64) -> IntfResult<i32> {
    i32::try_from(value).map_err(|_| out_of_type(value, i32::MIN as i64, i32::MAX as i64))
}

fn out_of_type(value: i64, min: i64, max: i64) -> IntfError {
    IntfError::RangeViolation { value, min, max }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_matches_startup_constants() {
        let s = StoreState::new().read();
        assert_eq!(s.config1, 0);
        assert_eq!(s.config2, 0x4852_4a5f);
        assert_eq!(s.config3, 0x424c_0a52);
        assert_eq!(s.power, 1);
        assert_eq!((s.tx, s.rx, s.err, s.word), (0, 0, 0, 0));
        assert_eq!(s.secret.as_str(), "AhA xxx");
        assert_eq!(s.debug_level, 0);
    }

    #[test]
    fn config1_and_debug_level_mirror() {
        let mut st = StoreState::new();
        st.write(Field::Config1, 2).unwrap();
        assert_eq!(st.debug_level(), 2);

        st.write(Field::DebugLevel, 1).unwrap();
        assert_eq!(st.config1(), 1);
    }

    #[test]
    fn reset_leaves_config1() {
        let mut st = StoreState::new();
        st.write(Field::DebugLevel, 2).unwrap();
        st.reset_debug_level();
        assert_eq!(st.debug_level(), 0);
        assert_eq!(st.config1(), 2);
    }

    #[test]
    fn out_of_type_values_do_not_mutate() {
        let mut st = StoreState::new();
        let before = st.read();
        assert!(matches!(
            st.write(Field::Config1, -1),
            Err(IntfError::RangeViolation { .. })
        ));
        assert!(st.write(Field::Tx, i64::from(i32::MAX) + 1).is_err());
        assert_eq!(st.read(), before);
    }

    #[test]
    fn counters_are_writable() {
        let mut st = StoreState::new();
        st.write(Field::Tx, 10).unwrap();
        st.write(Field::Rx, -4).unwrap();
        st.write(Field::Word, 0x7f).unwrap();
        let s = st.read();
        assert_eq!((s.tx, s.rx, s.word), (10, -4, 0x7f));
        st.power_off();
        assert_eq!(st.read().power, 0);
    }
}
