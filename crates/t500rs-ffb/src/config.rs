//! Per-device configuration.
//!
//! The driver instance owns one of these; there is no module-level state.
//! The level knobs are percentage scales applied to condition-effect
//! coefficients at encode time.

use serde::{Deserialize, Serialize};

/// Configuration owned by one driver instance, fixed at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Scheduler tick period in milliseconds. Chosen empirically low enough
    /// that the transport's internal queue never saturates.
    pub tick_period_ms: u64,
    /// Spring coefficient scale, 0..=100 percent.
    pub spring_level: u8,
    /// Damper coefficient scale, 0..=100 percent.
    pub damper_level: u8,
    /// Friction coefficient scale, 0..=100 percent.
    pub friction_level: u8,
    /// Wheel rotation range in degrees, applied by `init()`.
    pub rotation_range_deg: u16,
    /// Master gain, applied by `init()`.
    pub gain: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 8,
            spring_level: 100,
            damper_level: 100,
            friction_level: 100,
            rotation_range_deg: 1024,
            gain: 0xffff,
        }
    }
}

impl DeviceConfig {
    /// Scale a wire coefficient byte by a 0..=100 percent level.
    pub(crate) fn scale_by_level(coefficient: u8, level: u8) -> u8 {
        let level = u16::from(level.min(100));
        ((u16::from(coefficient) * level) / 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_device_init() {
        let config = DeviceConfig::default();
        assert_eq!(config.tick_period_ms, 8);
        assert_eq!(config.rotation_range_deg, 1024);
        assert_eq!(config.gain, 0xffff);
        assert_eq!(config.spring_level, 100);
    }

    #[test]
    fn test_level_scaling() {
        assert_eq!(DeviceConfig::scale_by_level(0x64, 100), 0x64);
        assert_eq!(DeviceConfig::scale_by_level(0x64, 50), 0x32);
        assert_eq!(DeviceConfig::scale_by_level(0x64, 0), 0);
        // Levels above 100 clamp rather than amplify.
        assert_eq!(DeviceConfig::scale_by_level(0x64, 200), 0x64);
    }
}
