//! Byte-at-a-time MIDI message assembly.

use arrayvec::ArrayVec;
use mm_ir::{
    is_realtime, is_status, Message, MidiEvent, Timing, STATUS_CLOCK, STATUS_START, STATUS_STOP,
    STATUS_SYSEX_END, STATUS_SYSEX_START,
};

use crate::monitor::Monitor;

/// Longest sysex payload captured; longer ones are abandoned.
pub const SYSEX_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Waiting for a status byte; data bytes are noise
    Idle,
    /// `received` of the message's data bytes are in, `remaining` to go
    Data { received: u8, remaining: u8 },
    /// Appending to the sysex buffer until `0xF7`
    Sysex,
    /// Payload overflowed; swallowing bytes until `0xF7`
    SysexOverflow,
}

/// Resumable MIDI parser, fed one byte per call.
///
/// Every message must start with its own status byte (no running status).
/// A status byte that arrives mid-message abandons the partial message
/// and starts a new one. System realtime bytes are handled as they arrive
/// and leave any message in progress untouched.
///
/// Clock and start bytes also drive the song [`Timing`].
#[derive(Clone, Debug)]
pub struct MessageAssembler {
    state: State,
    message: Message,
    sysex: ArrayVec<u8, SYSEX_CAPACITY>,
    timing: Timing,
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            message: Message::default(),
            sysex: ArrayVec::new(),
            timing: Timing::zero(),
        }
    }

    /// Current song position.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// True while a channel message or sysex capture is incomplete.
    pub fn in_progress(&self) -> bool {
        self.state != State::Idle
    }

    /// Abandon any partial message or sysex capture. Timing is kept.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.sysex.clear();
    }

    /// Consume one byte, returning an event if it completed one.
    pub fn push(&mut self, byte: u8, monitor: &mut Monitor) -> Option<MidiEvent<'_>> {
        if is_realtime(byte) {
            self.realtime(byte, monitor)
        } else if is_status(byte) {
            self.status(byte, monitor)
        } else {
            self.data(byte, monitor)
        }
    }

    fn realtime(&mut self, byte: u8, monitor: &mut Monitor) -> Option<MidiEvent<'static>> {
        match byte {
            STATUS_CLOCK => {
                self.timing.advance();
                Some(MidiEvent::Clock)
            }
            STATUS_START => {
                self.timing.reset();
                Some(MidiEvent::Start)
            }
            STATUS_STOP => Some(MidiEvent::Stop),
            _ => {
                monitor.unknown_status(byte);
                None
            }
        }
    }

    fn status(&mut self, byte: u8, monitor: &mut Monitor) -> Option<MidiEvent<'_>> {
        let previous = self.state;
        self.state = State::Idle;
        match previous {
            State::Sysex if byte == STATUS_SYSEX_END => {
                return Some(MidiEvent::Sysex(&self.sysex));
            }
            State::SysexOverflow if byte == STATUS_SYSEX_END => return None,
            State::Sysex | State::SysexOverflow => monitor.sysex_aborted(byte),
            State::Data { .. } => monitor.message_aborted(self.message.status, byte),
            State::Idle => {}
        }

        if byte == STATUS_SYSEX_START {
            self.sysex.clear();
            self.state = State::Sysex;
            return None;
        }
        match Message::data_len(byte) {
            Some(remaining) => {
                self.message = Message::new(byte, 0, 0);
                self.state = State::Data { received: 0, remaining };
            }
            None => monitor.unknown_status(byte),
        }
        None
    }

    fn data(&mut self, byte: u8, monitor: &mut Monitor) -> Option<MidiEvent<'_>> {
        match self.state {
            State::Idle | State::SysexOverflow => None,
            State::Sysex => {
                if self.sysex.try_push(byte).is_err() {
                    self.sysex.clear();
                    self.state = State::SysexOverflow;
                    monitor.sysex_overflow();
                }
                None
            }
            State::Data { received, remaining } => {
                if received == 0 {
                    self.message.data1 = byte;
                } else {
                    self.message.data2 = byte;
                }
                if remaining > 1 {
                    self.state = State::Data {
                        received: received + 1,
                        remaining: remaining - 1,
                    };
                    return None;
                }
                self.state = State::Idle;
                self.message.event()
            }
        }
    }
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}
