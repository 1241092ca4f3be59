//! System-exclusive payload decoding.
//!
//! Two payload families are understood: the universal General MIDI
//! reset, and a private command set prefixed by a configurable
//! three-byte manufacturer id (`[extended-id marker, region, id]`).
//! Payloads exclude the `0xF0`/`0xF7` framing.

use crate::device_channel::MAX_MIDI_CHANNELS;

/// Universal non-realtime General MIDI reset, addressed to all devices.
pub const GENERAL_MIDI_RESET: [u8; 4] = [0x7E, 0x7F, 0x09, 0x01];

/// Remap a MIDI channel onto a device channel.
pub const COMMAND_REMAP: u8 = 0x00;
/// Request a pong reply.
pub const COMMAND_PING: u8 = 0x01;
/// Reply to a ping.
pub const COMMAND_PONG: u8 = 0x02;
/// Switch dynamic allocation on or off.
pub const COMMAND_DYNAMIC_MODE: u8 = 0x03;

/// Remap destination meaning "unbind this MIDI channel".
pub const DESTINATION_UNASSIGN: u8 = 0x7F;

/// Where a remap command sends a MIDI channel.
///
/// The kind tag and the chip-local number travel together so an index is
/// never interpreted without its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemapDestination {
    Fm(u8),
    Psg(u8),
    Unassign,
}

impl RemapDestination {
    /// Decode a raw destination byte: `0..fm_channels` are FM channels,
    /// the next `psg_channels` values are PSG channels, `0x7F` unassigns.
    pub fn decode(raw: u8, fm_channels: u8, psg_channels: u8) -> Option<Self> {
        if raw == DESTINATION_UNASSIGN {
            Some(RemapDestination::Unassign)
        } else if raw < fm_channels {
            Some(RemapDestination::Fm(raw))
        } else if raw - fm_channels < psg_channels {
            Some(RemapDestination::Psg(raw - fm_channels))
        } else {
            None
        }
    }
}

/// A decoded remap request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SysexRemap {
    pub midi_channel: u8,
    pub destination: RemapDestination,
}

/// What a captured sysex payload asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysexCommand {
    /// Silence every voice
    GeneralMidiReset,
    /// Rebind a MIDI channel
    Remap(SysexRemap),
    /// Answer with a pong
    Ping,
    /// Enable or disable dynamic allocation
    DynamicMode(bool),
    /// Remap whose channel or destination is out of range
    InvalidRemap { midi_channel: u8, destination: u8 },
    /// Our manufacturer id with an unknown or truncated command
    Unsupported { command: u8 },
    /// Not addressed to this device
    Foreign,
}

/// Decode a sysex payload against the configured manufacturer id and
/// channel counts.
pub fn decode_sysex(
    payload: &[u8],
    manufacturer_id: &[u8; 3],
    fm_channels: u8,
    psg_channels: u8,
) -> SysexCommand {
    if payload == GENERAL_MIDI_RESET.as_slice() {
        return SysexCommand::GeneralMidiReset;
    }
    let Some(body) = payload.strip_prefix(manufacturer_id.as_slice()) else {
        return SysexCommand::Foreign;
    };
    let Some((&command, args)) = body.split_first() else {
        return SysexCommand::Foreign;
    };
    match (command, args) {
        (COMMAND_REMAP, [midi_channel, destination, ..]) => {
            let decoded = RemapDestination::decode(*destination, fm_channels, psg_channels);
            match decoded {
                Some(destination) if *midi_channel < MAX_MIDI_CHANNELS => {
                    SysexCommand::Remap(SysexRemap {
                        midi_channel: *midi_channel,
                        destination,
                    })
                }
                _ => SysexCommand::InvalidRemap {
                    midi_channel: *midi_channel,
                    destination: *destination,
                },
            }
        }
        (COMMAND_PING, _) => SysexCommand::Ping,
        (COMMAND_DYNAMIC_MODE, [flag, ..]) => SysexCommand::DynamicMode(*flag != 0),
        _ => SysexCommand::Unsupported { command },
    }
}

/// The framed pong reply for `manufacturer_id`, ready to write to the link.
pub fn pong_reply(manufacturer_id: &[u8; 3]) -> [u8; 6] {
    [
        crate::message::STATUS_SYSEX_START,
        manufacturer_id[0],
        manufacturer_id[1],
        manufacturer_id[2],
        COMMAND_PONG,
        crate::message::STATUS_SYSEX_END,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: [u8; 3] = [0x00, 0x22, 0x77];

    fn decode(payload: &[u8]) -> SysexCommand {
        decode_sysex(payload, &ID, 6, 4)
    }

    #[test]
    fn general_midi_reset() {
        assert_eq!(decode(&[0x7E, 0x7F, 0x09, 0x01]), SysexCommand::GeneralMidiReset);
    }

    #[test]
    fn unrelated_payload_is_foreign() {
        assert_eq!(decode(&[0x12]), SysexCommand::Foreign);
        assert_eq!(decode(&[]), SysexCommand::Foreign);
        assert_eq!(decode(&[0x00, 0x22, 0x78, 0x00, 0x00, 0x01]), SysexCommand::Foreign);
    }

    #[test]
    fn id_without_command_is_foreign() {
        assert_eq!(decode(&ID), SysexCommand::Foreign);
    }

    #[test]
    fn remap_to_fm() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x00, 0x01]);
        assert_eq!(
            cmd,
            SysexCommand::Remap(SysexRemap {
                midi_channel: 0,
                destination: RemapDestination::Fm(1)
            })
        );
    }

    #[test]
    fn remap_to_first_psg() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x02, 0x06]);
        assert_eq!(
            cmd,
            SysexCommand::Remap(SysexRemap {
                midi_channel: 2,
                destination: RemapDestination::Psg(0)
            })
        );
    }

    #[test]
    fn remap_unassign() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x00, 0x7F]);
        assert_eq!(
            cmd,
            SysexCommand::Remap(SysexRemap {
                midi_channel: 0,
                destination: RemapDestination::Unassign
            })
        );
    }

    #[test]
    fn remap_past_psg_range_is_invalid() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x00, 0x0A]);
        assert_eq!(cmd, SysexCommand::InvalidRemap { midi_channel: 0, destination: 0x0A });
    }

    #[test]
    fn remap_of_channel_16_is_invalid() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x10, 0x00]);
        assert_eq!(cmd, SysexCommand::InvalidRemap { midi_channel: 0x10, destination: 0 });
    }

    #[test]
    fn truncated_remap_is_unsupported() {
        let cmd = decode(&[0x00, 0x22, 0x77, 0x00, 0x00]);
        assert_eq!(cmd, SysexCommand::Unsupported { command: COMMAND_REMAP });
    }

    #[test]
    fn ping_and_dynamic_mode() {
        assert_eq!(decode(&[0x00, 0x22, 0x77, 0x01]), SysexCommand::Ping);
        assert_eq!(decode(&[0x00, 0x22, 0x77, 0x03, 0x01]), SysexCommand::DynamicMode(true));
        assert_eq!(decode(&[0x00, 0x22, 0x77, 0x03, 0x00]), SysexCommand::DynamicMode(false));
    }

    #[test]
    fn destination_kind_follows_fm_count() {
        // With three FM channels, raw index 3 is the first PSG channel.
        assert_eq!(RemapDestination::decode(3, 3, 4), Some(RemapDestination::Psg(0)));
        assert_eq!(RemapDestination::decode(3, 6, 4), Some(RemapDestination::Fm(3)));
    }

    #[test]
    fn pong_is_framed() {
        assert_eq!(pong_reply(&ID), [0xF0, 0x00, 0x22, 0x77, 0x02, 0xF7]);
    }
}
