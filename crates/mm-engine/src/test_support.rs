//! Scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use mm_ir::DeviceChannel;

use crate::link::Link;
use crate::voice::VoiceControl;

/// A link that replays queued bytes and records what is written to it.
#[derive(Debug, Default)]
pub struct ScriptLink {
    pub incoming: VecDeque<u8>,
    pub written: Vec<u8>,
    pub present: bool,
    pub baud: Option<u32>,
}

impl ScriptLink {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            incoming: bytes.iter().copied().collect(),
            written: Vec::new(),
            present: true,
            baud: None,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().copied());
    }
}

impl Link for ScriptLink {
    fn ready_to_read(&mut self) -> bool {
        !self.incoming.is_empty()
    }

    fn read(&mut self) -> u8 {
        self.incoming.pop_front().unwrap_or(0)
    }

    fn write(&mut self, byte: u8) {
        self.written.push(byte);
    }

    fn baud_rate(&self) -> Option<u32> {
        self.baud
    }

    fn is_present(&self) -> bool {
        self.present
    }
}

/// One call made on the voice-control collaborator. Channels are recorded
/// by table index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Init,
    NoteOn(u8, u8, u8),
    NoteOff(u8),
    Volume(u8, u8),
    Pan(u8, u8),
    PitchBend(u8, u16),
    Program(u8, u8),
    AllFmOff,
    AllPsgSilence,
    Start,
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn take(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }
}

impl VoiceControl for Recorder {
    fn init(&mut self) {
        self.calls.push(Call::Init);
    }

    fn note_on(&mut self, channel: &DeviceChannel, pitch: u8, velocity: u8) {
        self.calls.push(Call::NoteOn(channel.index, pitch, velocity));
    }

    fn note_off(&mut self, channel: &DeviceChannel) {
        self.calls.push(Call::NoteOff(channel.index));
    }

    fn set_volume(&mut self, channel: &DeviceChannel, volume: u8) {
        self.calls.push(Call::Volume(channel.index, volume));
    }

    fn set_pan(&mut self, channel: &DeviceChannel, pan: u8) {
        self.calls.push(Call::Pan(channel.index, pan));
    }

    fn pitch_bend(&mut self, channel: &DeviceChannel, bend: u16) {
        self.calls.push(Call::PitchBend(channel.index, bend));
    }

    fn program(&mut self, channel: &DeviceChannel, program: u8) {
        self.calls.push(Call::Program(channel.index, program));
    }

    fn all_fm_off(&mut self) {
        self.calls.push(Call::AllFmOff);
    }

    fn all_psg_silence(&mut self) {
        self.calls.push(Call::AllPsgSilence);
    }

    fn start(&mut self) {
        self.calls.push(Call::Start);
    }
}
