//! Routing of channel messages to the voice-control collaborator.

use mm_ir::{ChannelKind, DeviceChannel, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_PAN, CC_VOLUME};

use crate::monitor::Monitor;
use crate::voice::VoiceControl;

/// Turns resolved channel messages into voice-control calls.
///
/// The dispatcher never decides which device channel serves a MIDI
/// channel; the caller resolves that first and passes `None` when nothing
/// serves it, in which case the message is dropped.
pub struct VoiceDispatcher<V> {
    voices: V,
}

impl<V: VoiceControl> VoiceDispatcher<V> {
    pub fn new(voices: V) -> Self {
        Self { voices }
    }

    pub fn voices(&self) -> &V {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut V {
        &mut self.voices
    }

    pub fn init(&mut self) {
        self.voices.init();
    }

    pub fn note_on(&mut self, channel: Option<&DeviceChannel>, pitch: u8, velocity: u8) {
        if let Some(chan) = channel {
            self.voices.note_on(chan, pitch, velocity);
        }
    }

    pub fn note_off(&mut self, channel: Option<&DeviceChannel>) {
        if let Some(chan) = channel {
            self.voices.note_off(chan);
        }
    }

    /// Volume, pan and the two "all off" controllers are understood;
    /// anything else is reported to `monitor`, whether or not a channel
    /// serves the message.
    pub fn control_change(
        &mut self,
        channel: Option<&DeviceChannel>,
        controller: u8,
        value: u8,
        monitor: &mut Monitor,
    ) {
        match (controller, channel) {
            (CC_VOLUME, Some(chan)) => self.voices.set_volume(chan, value),
            (CC_PAN, Some(chan)) => self.voices.set_pan(chan, value),
            (CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF, Some(chan)) => self.voices.note_off(chan),
            (CC_VOLUME | CC_PAN | CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF, None) => {}
            _ => monitor.unknown_cc(controller, value),
        }
    }

    /// PSG channels have no presets; program changes for them are ignored.
    pub fn program(&mut self, channel: Option<&DeviceChannel>, program: u8) {
        match channel {
            Some(chan) if chan.kind == ChannelKind::Fm => self.voices.program(chan, program),
            _ => {}
        }
    }

    pub fn pitch_bend(&mut self, channel: Option<&DeviceChannel>, bend: u16) {
        if let Some(chan) = channel {
            self.voices.pitch_bend(chan, bend);
        }
    }

    pub fn start(&mut self) {
        self.voices.start();
    }

    /// Silence both chips.
    pub fn all_notes_off(&mut self) {
        self.voices.all_fm_off();
        self.voices.all_psg_silence();
    }
}
