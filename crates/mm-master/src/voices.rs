//! A voice-control collaborator that records what it is asked to do.

use std::fmt;

use mm_engine::VoiceControl;
use mm_ir::{ChannelKind, DeviceChannel};
use serde::Serialize;

/// A device channel as seen by the chips: kind plus chip-local number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub kind: ChannelKind,
    pub number: u8,
}

impl From<&DeviceChannel> for Voice {
    fn from(chan: &DeviceChannel) -> Self {
        Self {
            kind: chan.kind,
            number: chan.number,
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChannelKind::Fm => write!(f, "FM{}", self.number + 1),
            ChannelKind::Psg => write!(f, "PSG{}", self.number + 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCall {
    Init,
    NoteOn { voice: Voice, pitch: u8, velocity: u8 },
    NoteOff { voice: Voice },
    Volume { voice: Voice, volume: u8 },
    Pan { voice: Voice, pan: u8 },
    PitchBend { voice: Voice, bend: u16 },
    Program { voice: Voice, program: u8 },
    AllFmOff,
    AllPsgSilence,
    Start,
}

impl fmt::Display for VoiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceCall::Init => write!(f, "init"),
            VoiceCall::NoteOn { voice, pitch, velocity } => {
                write!(f, "{} note on {} vel {}", voice, pitch, velocity)
            }
            VoiceCall::NoteOff { voice } => write!(f, "{} note off", voice),
            VoiceCall::Volume { voice, volume } => write!(f, "{} volume {}", voice, volume),
            VoiceCall::Pan { voice, pan } => write!(f, "{} pan {}", voice, pan),
            VoiceCall::PitchBend { voice, bend } => write!(f, "{} bend {:04X}", voice, bend),
            VoiceCall::Program { voice, program } => write!(f, "{} program {}", voice, program),
            VoiceCall::AllFmOff => write!(f, "all FM off"),
            VoiceCall::AllPsgSilence => write!(f, "all PSG silent"),
            VoiceCall::Start => write!(f, "start"),
        }
    }
}

/// Records every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingVoices {
    calls: Vec<VoiceCall>,
}

impl RecordingVoices {
    pub fn calls(&self) -> &[VoiceCall] {
        &self.calls
    }

    pub fn take(&mut self) -> Vec<VoiceCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: VoiceCall) {
        log::trace!("{}", call);
        self.calls.push(call);
    }
}

impl VoiceControl for RecordingVoices {
    fn init(&mut self) {
        self.record(VoiceCall::Init);
    }

    fn note_on(&mut self, channel: &DeviceChannel, pitch: u8, velocity: u8) {
        self.record(VoiceCall::NoteOn { voice: channel.into(), pitch, velocity });
    }

    fn note_off(&mut self, channel: &DeviceChannel) {
        self.record(VoiceCall::NoteOff { voice: channel.into() });
    }

    fn set_volume(&mut self, channel: &DeviceChannel, volume: u8) {
        self.record(VoiceCall::Volume { voice: channel.into(), volume });
    }

    fn set_pan(&mut self, channel: &DeviceChannel, pan: u8) {
        self.record(VoiceCall::Pan { voice: channel.into(), pan });
    }

    fn pitch_bend(&mut self, channel: &DeviceChannel, bend: u16) {
        self.record(VoiceCall::PitchBend { voice: channel.into(), bend });
    }

    fn program(&mut self, channel: &DeviceChannel, program: u8) {
        self.record(VoiceCall::Program { voice: channel.into(), program });
    }

    fn all_fm_off(&mut self) {
        self.record(VoiceCall::AllFmOff);
    }

    fn all_psg_silence(&mut self) {
        self.record(VoiceCall::AllPsgSilence);
    }

    fn start(&mut self) {
        self.record(VoiceCall::Start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voices_display_one_based() {
        let fm = DeviceChannel::new(0, ChannelKind::Fm, 0);
        let psg = DeviceChannel::new(7, ChannelKind::Psg, 1);
        assert_eq!(Voice::from(&fm).to_string(), "FM1");
        assert_eq!(Voice::from(&psg).to_string(), "PSG2");
    }

    #[test]
    fn records_in_order() {
        let chan = DeviceChannel::new(1, ChannelKind::Fm, 1);
        let mut voices = RecordingVoices::default();
        voices.note_on(&chan, 60, 100);
        voices.all_psg_silence();
        let calls = voices.take();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to_string(), "FM2 note on 60 vel 100");
        assert_eq!(calls[1], VoiceCall::AllPsgSilence);
        assert!(voices.calls().is_empty());
    }
}
