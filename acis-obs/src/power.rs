//! Decoding of ACIS `WSPOW` power commands.
//!
//! The five hex digits after the `WSPOW` prefix select front-end processors
//! (bits 0-5) and video boards (bits 8-17). Video board bits 0-3 are the
//! I-array chips I0-I3 and bits 4-9 are S0-S5.

use crate::error::{Result, ThermalCheckError};

/// Prefix shared by every ACIS power configuration command.
pub const POWER_PREFIX: &str = "WSPOW";

/// Power command that shuts down every FEP and video board.
pub const POWER_DOWN: &str = "WSPOW00000";

const FEP_MASK: u32 = 0x3F;
const VIDEO_SHIFT: u32 = 8;
const VIDEO_MASK: u32 = 0x3FF;

/// Hardware selected by a power command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerConfig {
    /// FEP indices that are powered.
    pub feps: Vec<u8>,
    /// Chip identifiers (e.g. `I3`, `S2`) in bit order.
    pub ccds: Vec<String>,
}

impl PowerConfig {
    pub fn fep_count(&self) -> usize {
        self.feps.len()
    }

    pub fn ccd_count(&self) -> usize {
        self.ccds.len()
    }

    /// Comma-joined chip list, e.g. `"I0,I1,I2,I3,S2"`.
    pub fn ccds_joined(&self) -> String {
        self.ccds.join(",")
    }
}

/// Decode the chip and FEP selection of a `WSPOWxxxxx` command.
pub fn decode_power(cmd: &str) -> Result<PowerConfig> {
    let payload = cmd
        .strip_prefix(POWER_PREFIX)
        .ok_or_else(|| ThermalCheckError::PowerDecode(cmd.to_string()))?;
    if payload.len() != 5 {
        return Err(ThermalCheckError::PowerDecode(cmd.to_string()));
    }
    let word = u32::from_str_radix(payload, 16)
        .map_err(|_| ThermalCheckError::PowerDecode(cmd.to_string()))?;

    let fep_bits = word & FEP_MASK;
    let feps = (0..6u8).filter(|&bit| fep_bits & (1u32 << bit) != 0).collect();

    let video_bits = (word >> VIDEO_SHIFT) & VIDEO_MASK;
    let ccds = (0..10u32)
        .filter(|&bit| video_bits & (1u32 << bit) != 0)
        .map(|bit| {
            if bit < 4 {
                format!("I{bit}")
            } else {
                format!("S{}", bit - 4)
            }
        })
        .collect();

    Ok(PowerConfig { feps, ccds })
}
