//! Hardware voice slots and their MIDI channel binding.

/// Number of MIDI channels on the wire.
pub const MAX_MIDI_CHANNELS: u8 = 16;

/// Upper bound on the size of the device-channel table.
pub const MAX_DEVICE_CHANNELS: usize = 16;

/// Which sound chip a device channel belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelKind {
    /// FM synthesis channel
    Fm,
    /// Programmable sound generator (square wave / noise) channel
    Psg,
}

/// One hardware voice slot.
///
/// `index` is the position in the table (FM channels first, then PSG)
/// and `number` is the channel number local to its chip. Neither changes
/// after initialization; only `midi_channel` is rebound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceChannel {
    /// Position in the device-channel table
    pub index: u8,
    /// Chip this channel lives on
    pub kind: ChannelKind,
    /// Channel number on its chip
    pub number: u8,
    /// Bound MIDI channel, `None` when unassigned
    pub midi_channel: Option<u8>,
}

impl DeviceChannel {
    /// Create an unassigned device channel.
    pub const fn new(index: u8, kind: ChannelKind, number: u8) -> Self {
        Self {
            index,
            kind,
            number,
            midi_channel: None,
        }
    }

    /// True if a MIDI channel is bound to this slot.
    pub const fn is_assigned(&self) -> bool {
        self.midi_channel.is_some()
    }

    /// True if this slot serves `midi_channel`.
    pub fn serves(&self, midi_channel: u8) -> bool {
        self.midi_channel == Some(midi_channel)
    }
}
