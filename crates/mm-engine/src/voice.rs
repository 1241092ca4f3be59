//! The voice-control collaborator.
//!
//! Register-level programming of the FM and PSG chips lives behind this
//! trait. Every call is fire-and-forget: nothing is returned and an
//! implementation must not block. Implementations look at
//! [`DeviceChannel::kind`] to pick the chip and [`DeviceChannel::number`]
//! for the channel on it.

use mm_ir::DeviceChannel;

pub trait VoiceControl {
    /// Load default presets and silence the chips.
    fn init(&mut self) {}

    /// Set pitch and key on.
    fn note_on(&mut self, channel: &DeviceChannel, pitch: u8, velocity: u8);

    /// Key off.
    fn note_off(&mut self, channel: &DeviceChannel);

    /// Channel volume, 0-127. Scaling to the chip's range is the
    /// implementation's job.
    fn set_volume(&mut self, channel: &DeviceChannel, volume: u8);

    /// Stereo position, 0-127 with 64 as centre.
    fn set_pan(&mut self, channel: &DeviceChannel, pan: u8);

    /// 14-bit bend, centre `0x2000`.
    fn pitch_bend(&mut self, channel: &DeviceChannel, bend: u16);

    /// Select a preset. Only ever called for FM channels.
    fn program(&mut self, channel: &DeviceChannel, program: u8);

    /// Key off every FM channel.
    fn all_fm_off(&mut self);

    /// Set every PSG channel to full attenuation.
    fn all_psg_silence(&mut self);

    /// The host started its transport.
    fn start(&mut self) {}
}
