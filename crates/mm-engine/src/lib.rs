//! MIDI protocol engine for megamidi.
//!
//! Turns a raw MIDI byte stream into voice-control calls for FM and PSG
//! sound chips. Everything here is bounded and non-blocking: bytes are
//! buffered in a fixed ring, parsed one per [`Interface::tick`], mapped to
//! a device channel and dispatched to a [`VoiceControl`] implementation.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

mod allocator;
mod assembler;
mod config;
mod dispatcher;
pub mod event_log;
mod interface;
mod link;
mod load;
mod monitor;
mod ring;
mod transport;
mod voice;

#[cfg(test)]
mod test_support;

pub use allocator::ChannelAllocator;
pub use assembler::{MessageAssembler, SYSEX_CAPACITY};
pub use config::{ConfigError, EngineConfig};
pub use dispatcher::VoiceDispatcher;
pub use event_log::{EventLog, LogEntry, LogKind, LOG_CAPACITY};
pub use interface::Interface;
pub use link::Link;
pub use load::{load_percent, LoadMeter, LoadReport, REPORT_INTERVAL, SAMPLE_INTERVAL};
pub use monitor::Monitor;
pub use ring::{ByteRing, OverflowPolicy, RING_CAPACITY};
pub use transport::{Poll, Transport, TransportMode};
pub use voice::VoiceControl;
