//! Core types for the megamidi interface.
//!
//! This crate defines the plain data passed between the byte-level
//! protocol engine and its collaborators: raw MIDI messages, decoded
//! events, the device-channel table entries, clock timing, diagnostics
//! and the private system-exclusive command set.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod device_channel;
mod diagnostics;
mod message;
pub mod sysex;
mod timing;

pub use device_channel::{ChannelKind, DeviceChannel, MAX_DEVICE_CHANNELS, MAX_MIDI_CHANNELS};
pub use diagnostics::{ControlChange, Diagnostics};
pub use message::{
    is_realtime, is_status, Message, MidiEvent, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_PAN,
    CC_VOLUME, STATUS_CLOCK, STATUS_CONTINUE, STATUS_CONTROL_CHANGE, STATUS_NOTE_OFF,
    STATUS_NOTE_ON, STATUS_PITCH_BEND, STATUS_POLY_PRESSURE, STATUS_PROGRAM_CHANGE,
    STATUS_START, STATUS_STOP, STATUS_SYSEX_END, STATUS_SYSEX_START,
};
pub use sysex::{decode_sysex, RemapDestination, SysexCommand, SysexRemap};
pub use timing::{Timing, BEATS_PER_BAR, PULSES_PER_BEAT, PULSES_PER_SIXTEENTH};
