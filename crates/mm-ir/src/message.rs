//! Raw MIDI messages and the decoded event sum type.

/// Note Off (`0x8n`).
pub const STATUS_NOTE_OFF: u8 = 0x80;
/// Note On (`0x9n`).
pub const STATUS_NOTE_ON: u8 = 0x90;
/// Polyphonic key pressure (`0xAn`).
pub const STATUS_POLY_PRESSURE: u8 = 0xA0;
/// Control Change (`0xBn`).
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
/// Program Change (`0xCn`).
pub const STATUS_PROGRAM_CHANGE: u8 = 0xC0;
/// Pitch Bend (`0xEn`).
pub const STATUS_PITCH_BEND: u8 = 0xE0;
/// Start of a system-exclusive capture.
pub const STATUS_SYSEX_START: u8 = 0xF0;
/// End of a system-exclusive capture.
pub const STATUS_SYSEX_END: u8 = 0xF7;
/// Timing clock, 24 per quarter note.
pub const STATUS_CLOCK: u8 = 0xF8;
/// Transport start.
pub const STATUS_START: u8 = 0xFA;
/// Transport continue (not supported).
pub const STATUS_CONTINUE: u8 = 0xFB;
/// Transport stop.
pub const STATUS_STOP: u8 = 0xFC;

/// Channel volume controller.
pub const CC_VOLUME: u8 = 7;
/// Pan controller.
pub const CC_PAN: u8 = 10;
/// All sound off controller.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// All notes off controller.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// True if the high bit marks `byte` as a status byte.
pub const fn is_status(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// True for system realtime bytes (`0xF8..=0xFF`), which may arrive
/// in the middle of any other message.
pub const fn is_realtime(byte: u8) -> bool {
    byte >= STATUS_CLOCK
}

/// A short MIDI message: a status byte and up to two data bytes.
///
/// `data2` is zero for one-data-byte messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl Message {
    /// Create a message from its three bytes.
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self { status, data1, data2 }
    }

    /// The MIDI channel (low nibble of the status byte).
    pub const fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    /// The message type (high nibble of the status byte).
    pub const fn kind(&self) -> u8 {
        self.status & 0xF0
    }

    /// Number of data bytes a channel-voice status implies, or `None` for
    /// statuses this interface does not assemble.
    pub const fn data_len(status: u8) -> Option<u8> {
        match status & 0xF0 {
            STATUS_NOTE_OFF | STATUS_NOTE_ON | STATUS_POLY_PRESSURE | STATUS_CONTROL_CHANGE
            | STATUS_PITCH_BEND => Some(2),
            STATUS_PROGRAM_CHANGE => Some(1),
            _ => None,
        }
    }

    /// Decode a completed channel-voice message.
    ///
    /// Returns `None` for messages that are consumed without an event
    /// (polyphonic pressure) and for non channel-voice statuses.
    pub fn event(&self) -> Option<MidiEvent<'static>> {
        let channel = self.channel();
        match self.kind() {
            STATUS_NOTE_OFF => Some(MidiEvent::NoteOff { channel, pitch: self.data1 }),
            STATUS_NOTE_ON if self.data2 == 0 => {
                Some(MidiEvent::NoteOff { channel, pitch: self.data1 })
            }
            STATUS_NOTE_ON => Some(MidiEvent::NoteOn {
                channel,
                pitch: self.data1,
                velocity: self.data2,
            }),
            STATUS_CONTROL_CHANGE => Some(MidiEvent::ControlChange {
                channel,
                controller: self.data1,
                value: self.data2,
            }),
            STATUS_PROGRAM_CHANGE => Some(MidiEvent::ProgramChange { channel, program: self.data1 }),
            STATUS_PITCH_BEND => Some(MidiEvent::PitchBend {
                channel,
                value: self.data1 as u16 | ((self.data2 as u16) << 7),
            }),
            _ => None,
        }
    }
}

/// A completed MIDI event, ready for channel resolution and dispatch.
///
/// Sysex payloads borrow the assembler's capture buffer and exclude the
/// `0xF0`/`0xF7` framing bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent<'a> {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// 14-bit bend, centre `0x2000`.
    PitchBend { channel: u8, value: u16 },
    Clock,
    Start,
    Stop,
    Sysex(&'a [u8]),
}

impl MidiEvent<'_> {
    /// The MIDI channel for channel-voice events.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }
}
