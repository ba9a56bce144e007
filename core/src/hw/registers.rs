//! hw/registers.rs
//! Register access seam and read-only register capability records.

use std::collections::HashMap;

use bitflags::bitflags;
use thiserror::Error;

// --- GbE test path ---
pub const GBE_ENABLE: &str = "CSC_FED.TEST.GBE_TEST.ENABLE";
pub const GBE_PUSH_DATA: &str = "CSC_FED.TEST.GBE_TEST.PUSH_GBE_DATA";
pub const GBE_START_TRANSMIT: &str = "CSC_FED.TEST.GBE_TEST.START_TRANSMIT";
/// Bit 1 set: FIFO empty. Exactly `2`: empty and not transmitting.
pub const GBE_BUSY: &str = "CSC_FED.TEST.GBE_TEST.BUSY";
pub const GBE_MANUAL_READ_ENABLE: &str = "CSC_FED.TEST.GBE_TEST.MANUAL_READ_ENABLE";
pub const GBE_MANUAL_READ: &str = "CSC_FED.TEST.GBE_TEST.MANUAL_READ";
pub const TEST_MODULE_RESET: &str = "CSC_FED.TEST.CTRL.MODULE_RESET";

// --- TTC ---
pub const TTC_MODULE_RESET: &str = "CSC_FED.TTC.CTRL.MODULE_RESET";
pub const TTC_L1A_ENABLE: &str = "CSC_FED.TTC.CTRL.L1A_ENABLE";

// --- DAQ ---
pub const DAQ_ENABLE: &str = "CSC_FED.DAQ.CONTROL.DAQ_ENABLE";
pub const DAQ_INPUT_ENABLE_MASK: &str = "CSC_FED.DAQ.CONTROL.INPUT_ENABLE_MASK";
pub const DAQ_IGNORE_AMC13: &str = "CSC_FED.DAQ.CONTROL.IGNORE_AMC13";
pub const DAQ_FREEZE_ON_ERROR: &str = "CSC_FED.DAQ.CONTROL.FREEZE_ON_ERROR";
pub const DAQ_RESET_TILL_RESYNC: &str = "CSC_FED.DAQ.CONTROL.RESET_TILL_RESYNC";
pub const DAQ_SPY_SKIP_EMPTY_EVENTS: &str = "CSC_FED.DAQ.CONTROL.SPY.SPY_SKIP_EMPTY_EVENTS";
pub const DAQ_SPY_PRESCALE: &str = "CSC_FED.DAQ.CONTROL.SPY.SPY_PRESCALE";
pub const DAQ_RESET: &str = "CSC_FED.DAQ.CONTROL.RESET";
pub const DAQ_LAST_EVENT_EMPTY: &str = "CSC_FED.DAQ.LAST_EVENT_FIFO.EMPTY";
pub const DAQ_LAST_EVENT_DATA: &str = "CSC_FED.DAQ.LAST_EVENT_FIFO.DATA";
pub const DAQ_LAST_EVENT_DISABLE: &str = "CSC_FED.DAQ.LAST_EVENT_FIFO.DISABLE";
pub const DAQ_SPY_EVENTS_SENT: &str = "CSC_FED.DAQ.STATUS.SPY.SPY_EVENTS_SENT";
pub const DAQ_TTS_STATE: &str = "CSC_FED.DAQ.STATUS.TTS_STATE";

/// `TTS_STATE` value signalling an error.
pub const TTS_ERROR: u32 = 0xc;
/// `GBE_BUSY` value meaning FIFO empty and transmitter idle.
pub const GBE_IDLE: u32 = 0x2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HardwareError {
    #[error("unknown register: {0}")]
    UnknownRegister(String),

    #[error("register {name} does not allow {access:?}")]
    PermissionDenied { name: String, access: Permission },

    #[error("bus error on {name}: {msg}")]
    Bus { name: String, msg: String },
}

/// Named register reads and writes. Any error is fatal to the caller.
pub trait RegisterAccess {
    fn read(&mut self, name: &str) -> Result<u32, HardwareError>;
    fn write(&mut self, name: &str, value: u32) -> Result<(), HardwareError>;
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read(&mut self, name: &str) -> Result<u32, HardwareError> {
        (**self).read(name)
    }

    fn write(&mut self, name: &str, value: u32) -> Result<(), HardwareError> {
        (**self).write(name, value)
    }
}

bitflags! {
    /// What a register allows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Capability record for one register. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInfo {
    name: String,
    address: u32,
    permission: Permission,
}

impl RegisterInfo {
    pub fn new(name: impl Into<String>, address: u32, permission: Permission) -> Self {
        Self {
            name: name.into(),
            address,
            permission,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn allows(&self, access: Permission) -> bool {
        self.permission.contains(access)
    }
}

/// Register records looked up by name.
#[derive(Debug, Clone, Default)]
pub struct RegisterMap {
    by_name: HashMap<String, RegisterInfo>,
}

impl RegisterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: RegisterInfo) {
        self.by_name.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&RegisterInfo> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Record for `name` if it exists and allows `access`.
    pub fn check(&self, name: &str, access: Permission) -> Result<&RegisterInfo, HardwareError> {
        let info = self
            .get(name)
            .ok_or_else(|| HardwareError::UnknownRegister(name.to_string()))?;
        if !info.allows(access) {
            return Err(HardwareError::PermissionDenied {
                name: name.to_string(),
                access,
            });
        }
        Ok(info)
    }
}

impl FromIterator<RegisterInfo> for RegisterMap {
    fn from_iter<I: IntoIterator<Item = RegisterInfo>>(iter: I) -> Self {
        let mut map = Self::new();
        for info in iter {
            map.insert(info);
        }
        map
    }
}

/// Enforces a [`RegisterMap`] in front of another register handle.
#[derive(Debug)]
pub struct CheckedRegisters<R> {
    inner: R,
    map: RegisterMap,
}

impl<R: RegisterAccess> CheckedRegisters<R> {
    pub fn new(inner: R, map: RegisterMap) -> Self {
        Self { inner, map }
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RegisterAccess> RegisterAccess for CheckedRegisters<R> {
    fn read(&mut self, name: &str) -> Result<u32, HardwareError> {
        self.map.check(name, Permission::READ)?;
        self.inner.read(name)
    }

    fn write(&mut self, name: &str, value: u32) -> Result<(), HardwareError> {
        self.map.check(name, Permission::WRITE)?;
        self.inner.write(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(u32);

    impl RegisterAccess for Echo {
        fn read(&mut self, _name: &str) -> Result<u32, HardwareError> {
            Ok(self.0)
        }

        fn write(&mut self, _name: &str, value: u32) -> Result<(), HardwareError> {
            self.0 = value;
            Ok(())
        }
    }

    fn map() -> RegisterMap {
        [
            RegisterInfo::new(DAQ_TTS_STATE, 0x10, Permission::READ),
            RegisterInfo::new(GBE_START_TRANSMIT, 0x20, Permission::WRITE),
            RegisterInfo::new(GBE_ENABLE, 0x24, Permission::READ_WRITE),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn permissions_are_enforced() {
        let mut regs = CheckedRegisters::new(Echo(7), map());
        assert_eq!(regs.read(DAQ_TTS_STATE), Ok(7));
        assert!(matches!(
            regs.write(DAQ_TTS_STATE, 1),
            Err(HardwareError::PermissionDenied { .. })
        ));
        assert!(matches!(
            regs.read(GBE_START_TRANSMIT),
            Err(HardwareError::PermissionDenied { .. })
        ));
        regs.write(GBE_ENABLE, 1).unwrap();
        assert_eq!(regs.read(GBE_ENABLE), Ok(1));
    }

    #[test]
    fn unknown_register_is_rejected() {
        let mut regs = CheckedRegisters::new(Echo(0), map());
        assert_eq!(
            regs.read("NOPE"),
            Err(HardwareError::UnknownRegister("NOPE".to_string()))
        );
    }

    #[test]
    fn record_exposes_capabilities() {
        let m = map();
        let info = m.get(GBE_ENABLE).unwrap();
        assert_eq!(info.address(), 0x24);
        assert!(info.allows(Permission::READ));
        assert!(info.allows(Permission::WRITE));
        assert_eq!(m.len(), 3);
    }
}
