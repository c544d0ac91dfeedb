use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use mtp_core::{PointCode, POINT_CODE_MAX};

use super::stack_config::{CfgLink, CfgPhyIo, PhyBackend, SharedConfig, StackConfig, StackState};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref phy) = root.phy_io {
        if !phy.extra.is_empty() {
            return Err(format!("Unrecognized fields: phy_io::{:?}", sorted_keys(&phy.extra)).into());
        }
    }
    if !root.link.extra.is_empty() {
        return Err(format!("Unrecognized fields in link: {:?}", sorted_keys(&root.link.extra)).into());
    }
    if let Some(ref ss) = root.stack_state {
        if !ss.extra.is_empty() {
            return Err(format!("Unrecognized fields in stack_state: {:?}", sorted_keys(&ss.extra)).into());
        }
    }

    // Build config from required and optional values
    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        phy_io: CfgPhyIo::default(),
        link: CfgLink::default(),
    };

    apply_link_patch(&mut cfg.link, root.link)?;

    if let Some(phy) = root.phy_io {
        apply_phy_io_patch(&mut cfg.phy_io, phy);
    }

    let mut state = StackState::default();
    if let Some(ss) = root.stack_state {
        if let Some(v) = ss.link_in_service {
            state.link_in_service = v;
        }
    }

    Ok(SharedConfig::try_from_parts(cfg, state)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_phy_io_patch(dst: &mut CfgPhyIo, src: PhyIoDto) {
    dst.backend = src.backend;
    if let Some(v) = src.block_bytes {
        dst.block_bytes = v;
    }
    dst.rx_file = src.rx_file;
    dst.tx_file = src.tx_file;
}

fn apply_link_patch(dst: &mut CfgLink, src: LinkDto) -> Result<(), Box<dyn std::error::Error>> {
    dst.name = src.name;
    dst.bit_rate = src.bit_rate;
    dst.local_pc = parse_point_code("local_pc", src.local_pc)?;
    dst.remote_pc = parse_point_code("remote_pc", src.remote_pc)?;

    if let Some(v) = src.sio {
        dst.sio = v;
    }
    if let Some(v) = src.ignore_monitor {
        dst.ignore_monitor = v;
    }
    if let Some(v) = src.emergency {
        dst.emergency = v;
    }
    Ok(())
}

fn parse_point_code(field: &str, value: u16) -> Result<PointCode, Box<dyn std::error::Error>> {
    PointCode::new(value).ok_or_else(|| format!("link.{} {} exceeds 14 bits (max {})", field, value, POINT_CODE_MAX).into())
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    link: LinkDto,

    #[serde(default)]
    phy_io: Option<PhyIoDto>,

    #[serde(default)]
    stack_state: Option<StackStatePatch>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct LinkDto {
    pub name: String,
    pub bit_rate: u32,
    pub local_pc: u16,
    pub remote_pc: u16,

    pub sio: Option<u8>,
    pub ignore_monitor: Option<bool>,
    pub emergency: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct PhyIoDto {
    pub backend: PhyBackend,
    pub block_bytes: Option<usize>,

    rx_file: Option<String>,
    tx_file: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct StackStatePatch {
    pub link_in_service: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
