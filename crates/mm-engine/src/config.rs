//! Engine configuration.

use core::fmt;

use mm_ir::MAX_DEVICE_CHANNELS;

use crate::ring::OverflowPolicy;

/// Construction-time settings for an [`Interface`](crate::Interface).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// FM channels, table indices `0..fm_channels`
    pub fm_channels: u8,
    /// PSG channels, following the FM channels in the table
    pub psg_channels: u8,
    /// MIDI channels bound 1:1 to device channels in static mode
    pub static_channels: u8,
    pub dynamic_mode: bool,
    /// Three-byte id prefixing private sysex commands
    pub manufacturer_id: [u8; 3],
    /// Polls of the fast link before falling back to the serial link
    pub discovery_polls: u16,
    pub ring_overflow: OverflowPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fm_channels: 6,
            psg_channels: 4,
            static_channels: 6,
            dynamic_mode: false,
            manufacturer_id: [0x00, 0x22, 0x77],
            discovery_polls: 3000,
            ring_overflow: OverflowPolicy::OverwriteOldest,
        }
    }
}

impl EngineConfig {
    pub fn device_channels(&self) -> usize {
        self.fm_channels as usize + self.psg_channels as usize
    }

    /// Check the channel counts fit the device table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = self.device_channels();
        if total == 0 {
            return Err(ConfigError::NoDeviceChannels);
        }
        if total > MAX_DEVICE_CHANNELS {
            return Err(ConfigError::TooManyDeviceChannels { requested: total });
        }
        if self.static_channels as usize > total {
            return Err(ConfigError::StaticChannelsExceedDevices {
                static_channels: self.static_channels,
                device_channels: total,
            });
        }
        Ok(())
    }
}

/// Invalid configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// FM plus PSG channels exceed the device table
    TooManyDeviceChannels { requested: usize },
    /// More static bindings than device channels
    StaticChannelsExceedDevices { static_channels: u8, device_channels: usize },
    /// Neither FM nor PSG channels configured
    NoDeviceChannels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TooManyDeviceChannels { requested } => write!(
                f,
                "{} device channels requested, at most {} supported",
                requested, MAX_DEVICE_CHANNELS
            ),
            ConfigError::StaticChannelsExceedDevices { static_channels, device_channels } => write!(
                f,
                "{} static channels but only {} device channels",
                static_channels, device_channels
            ),
            ConfigError::NoDeviceChannels => write!(f, "No device channels configured"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
