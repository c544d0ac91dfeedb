use serde::Deserialize;
use std::sync::{Arc, RwLock};

use mtp_core::{LinkSpeed, PointCode, Sio};

/// The bit device backing the Phy entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PhyBackend {
    Undefined,
    /// No device attached: the receiver sees continuous flags, transmitted octets are dropped
    None,
    /// Two stacks wired back-to-back in one process
    Loopback,
    /// Received octets read from a file, transmitted octets written to a file
    File,
}

/// PHY layer I/O configuration
#[derive(Debug, Clone)]
pub struct CfgPhyIo {
    pub backend: PhyBackend,

    /// Octets exchanged with the device per tick
    pub block_bytes: usize,

    pub rx_file: Option<String>,
    pub tx_file: Option<String>,
}

impl Default for CfgPhyIo {
    fn default() -> Self {
        Self {
            backend: PhyBackend::Undefined,
            block_bytes: default_block_bytes(),
            rx_file: None,
            tx_file: None,
        }
    }
}

#[inline]
fn default_block_bytes() -> usize {
    1
}

#[derive(Debug, Clone)]
pub struct CfgLink {
    /// Tag printed in front of every log line of this link
    pub name: String,
    /// Bits per second. Anything at or above 64000 uses the 64k timer profile
    pub bit_rate: u32,
    /// Disable both error rate monitors, for testing against noisy or synthetic input
    pub ignore_monitor: bool,
    /// Service indicator octet for outgoing and accepted incoming user messages
    pub sio: Sio,
    pub local_pc: PointCode,
    pub remote_pc: PointCode,
    /// Request emergency alignment when the link is started
    pub emergency: bool,
}

impl CfgLink {
    pub fn link_speed(&self) -> LinkSpeed {
        LinkSpeed::from_bit_rate(self.bit_rate)
    }
}

impl Default for CfgLink {
    fn default() -> Self {
        Self {
            name: "mtp".to_string(),
            bit_rate: 4800,
            ignore_monitor: false,
            sio: 0xcd,
            local_pc: PointCode::from_raw(1),
            remote_pc: PointCode::from_raw(2),
            emergency: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub debug_log: Option<String>,

    pub phy_io: CfgPhyIo,

    pub link: CfgLink,
}

impl StackConfig {
    pub fn new(name: &str, bit_rate: u32, local_pc: PointCode, remote_pc: PointCode) -> Self {
        StackConfig {
            debug_log: None,
            phy_io: CfgPhyIo {
                backend: PhyBackend::None,
                ..CfgPhyIo::default()
            },
            link: CfgLink {
                name: name.to_string(),
                bit_rate,
                local_pc,
                remote_pc,
                ..CfgLink::default()
            },
        }
    }

    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), &str> {
        match self.phy_io.backend {
            PhyBackend::File => {
                if self.phy_io.rx_file.is_none() && self.phy_io.tx_file.is_none() {
                    return Err("File backend requires rx_file and/or tx_file");
                }
            }
            PhyBackend::None | PhyBackend::Loopback => {}
            PhyBackend::Undefined => {
                return Err("phy_io backend must be defined");
            }
        };

        if self.phy_io.block_bytes == 0 {
            return Err("phy_io block_bytes must be at least 1");
        }
        if self.link.bit_rate == 0 {
            return Err("link bit_rate must be nonzero");
        }
        if self.link.sio & 0x0f == 0 {
            return Err("link sio must not use service indicator 0 (network management)");
        }
        if self.link.name.is_empty() {
            return Err("link name must not be empty");
        }

        Ok(())
    }
}

/// Mutable, stack-editable state (lock-protected).
#[derive(Debug, Clone, Default)]
pub struct StackState {
    /// Set by Mtp3 on IN_SERVICE, cleared on OUT_OF_SERVICE
    pub link_in_service: bool,
    /// Remote processor outage as last reported by the signalling link
    pub remote_processor_outage: bool,
}

/// Global shared configuration: immutable config + mutable state.
#[derive(Clone)]
pub struct SharedConfig {
    /// Read-only configuration (immutable after construction).
    cfg: Arc<StackConfig>,
    /// Mutable state guarded with RwLock (write by the stack, read by others).
    state: Arc<RwLock<StackState>>,
}

impl SharedConfig {
    pub fn new(name: &str, bit_rate: u32, local_pc: PointCode, remote_pc: PointCode) -> Self {
        Self::from_config(StackConfig::new(name, bit_rate, local_pc, remote_pc))
    }

    pub fn from_config(cfg: StackConfig) -> Self {
        Self::from_parts(cfg, StackState::default())
    }

    pub fn from_parts(cfg: StackConfig, state: StackState) -> Self {
        // Check config for validity before returning the SharedConfig object
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }

        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Like `from_parts`, but hands a validation failure back to the caller
    pub fn try_from_parts(cfg: StackConfig, state: StackState) -> Result<Self, String> {
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(Self {
            cfg: Arc::new(cfg),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }

    /// Read guard for mutable state.
    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, StackState> {
        self.state.read().expect("StackState RwLock blocked")
    }

    /// Write guard for mutable state.
    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, StackState> {
        self.state.write().expect("StackState RwLock blocked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let cfg = StackConfig::new("bs", 4800, PointCode::from_raw(1), PointCode::from_raw(2));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.link.link_speed(), LinkSpeed::Rate4k8);
    }

    #[test]
    fn test_validate_rejects() {
        let mut cfg = StackConfig::new("bs", 64000, PointCode::from_raw(1), PointCode::from_raw(2));
        assert_eq!(cfg.link.link_speed(), LinkSpeed::Rate64k);

        cfg.phy_io.backend = PhyBackend::File;
        assert!(cfg.validate().is_err());
        cfg.phy_io.rx_file = Some("in.bin".to_string());
        assert!(cfg.validate().is_ok());

        cfg.link.sio = 0xc0;
        assert!(cfg.validate().is_err());
        cfg.link.sio = 0xcd;

        cfg.phy_io.block_bytes = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_shared_state() {
        let shared = SharedConfig::new("bs", 4800, PointCode::from_raw(1), PointCode::from_raw(2));
        let clone = shared.clone();
        shared.state_write().link_in_service = true;
        assert!(clone.state_read().link_in_service);
        assert_eq!(clone.config().link.name, "bs");
    }
}
