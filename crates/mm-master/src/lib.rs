//! Headless session runner for megamidi.
//!
//! Drives an [`Interface`] the way the device's frame loop does: a
//! receiver thread feeds bytes into the serial link while this thread
//! ticks the interface, samples load and drains the event log. Both the
//! CLI and the integration tests go through here.

mod config;
mod stream;
mod voices;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use mm_engine::{ConfigError, Interface, REPORT_INTERVAL, RING_CAPACITY, SAMPLE_INTERVAL};
use mm_link::{LinkFeeder, LinkTap, NullLink, RingLink};
use serde::Serialize;

// Re-export common types so callers don't need mm-ir/mm-engine directly.
pub use mm_engine::{EngineConfig, LoadReport, LogEntry, LogKind, OverflowPolicy, TransportMode};
pub use mm_ir::{Diagnostics, Timing};

pub use config::{load_config, parse_config, ConfigLoadError};
pub use stream::{load_stream, parse_hex, StreamError};
pub use voices::{RecordingVoices, Voice, VoiceCall};

type HostInterface = Interface<NullLink, RingLink, RecordingVoices>;

/// Why a session could not run to completion.
#[derive(Debug)]
pub enum SessionError {
    Config(ConfigLoadError),
    Stream(StreamError),
    /// Neither link came up
    NoLink,
    /// The receiver thread panicked
    Receiver,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Config(e) => write!(f, "{}", e),
            SessionError::Stream(e) => write!(f, "{}", e),
            SessionError::NoLink => write!(f, "No usable link"),
            SessionError::Receiver => write!(f, "Receiver thread panicked"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ConfigLoadError> for SessionError {
    fn from(e: ConfigLoadError) -> Self {
        SessionError::Config(e)
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::Config(ConfigLoadError::Invalid(e))
    }
}

impl From<StreamError> for SessionError {
    fn from(e: StreamError) -> Self {
        SessionError::Stream(e)
    }
}

/// Snapshot of what the status display would show.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Status {
    pub transport: TransportMode,
    pub baud_rate: Option<u32>,
    pub dynamic_mode: bool,
    /// MIDI channel + 1 per device channel, 0 when unassigned
    pub mappings: Vec<u8>,
    pub timing: Timing,
    pub diagnostics: Diagnostics,
    pub load: u8,
}

impl Status {
    fn of(iface: &HostInterface) -> Self {
        Self {
            transport: iface.transport_mode(),
            baud_rate: iface.baud_rate(),
            dynamic_mode: iface.dynamic_mode(),
            mappings: iface.midi_channel_mappings().to_vec(),
            timing: *iface.timing(),
            diagnostics: *iface.diagnostics(),
            load: iface.load(),
        }
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub calls: Vec<VoiceCall>,
    /// Bytes the interface sent back to the host
    pub replies: Vec<u8>,
    pub log: Vec<LogEntry>,
    pub load: Vec<LoadReport>,
    pub ticks: u64,
    pub status: Status,
}

/// Runs byte streams through a fresh interface per run.
pub struct Session {
    config: EngineConfig,
}

impl Session {
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Feed `bytes` from a receiver thread over the serial link and tick
    /// until everything has been processed.
    pub fn run(&self, bytes: Vec<u8>) -> Result<SessionReport, SessionError> {
        let (link, feeder, tap) = RingLink::new(RING_CAPACITY);
        let voices = RecordingVoices::default();
        let mut iface = Interface::new(self.config.clone(), NullLink, link, voices);

        let stop_signal = Arc::new(AtomicBool::new(false));
        let receiver = spawn_receiver(feeder, bytes, stop_signal.clone());

        let result = run_loop(&mut iface, tap);

        stop_signal.store(true, Ordering::Relaxed);
        if receiver.join().is_err() {
            return Err(SessionError::Receiver);
        }
        result
    }

    /// Process `bytes` on the calling thread, handing each one to the
    /// interface as an interrupt-driven receiver would, then ticking
    /// until it is consumed. Deterministic, so suited to fixtures.
    pub fn replay(&self, bytes: &[u8]) -> SessionReport {
        let (link, _feeder, tap) = RingLink::new(64);
        let config = EngineConfig {
            discovery_polls: 0,
            ..self.config.clone()
        };
        let mut iface = Interface::new(config, NullLink, link, RecordingVoices::default());
        let mut window = Window::new(tap);

        for &byte in bytes {
            iface.receive(byte);
            window.tick(&mut iface);
        }
        while iface.buffered() > 0 {
            window.tick(&mut iface);
        }
        window.finish(&mut iface)
    }
}

fn spawn_receiver(mut feeder: LinkFeeder, bytes: Vec<u8>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for byte in bytes {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            while feeder.room() == 0 {
                if stop.load(Ordering::Relaxed) {
                    return;
                }
                std::thread::yield_now();
            }
            if let Err(e) = feeder.feed(byte) {
                log::warn!("receiver stopped: {}", e);
                return;
            }
        }
        feeder.close();
    })
}

fn run_loop(iface: &mut HostInterface, tap: LinkTap) -> Result<SessionReport, SessionError> {
    let mut window = Window::new(tap);
    loop {
        window.tick(iface);
        match iface.transport_mode() {
            TransportMode::Discovering => {}
            TransportMode::Unknown => return Err(SessionError::NoLink),
            TransportMode::LinkA | TransportMode::LinkB => {
                let link = iface.transport().serial_link();
                if link.is_drained() && iface.buffered() == 0 {
                    break;
                }
            }
        }
    }
    Ok(window.finish(iface))
}

/// Frame-loop bookkeeping shared by threaded and inline runs.
struct Window {
    tap: LinkTap,
    ticks: u64,
    log: Vec<LogEntry>,
    load: Vec<LoadReport>,
    replies: Vec<u8>,
}

impl Window {
    fn new(tap: LinkTap) -> Self {
        Self {
            tap,
            ticks: 0,
            log: Vec::new(),
            load: Vec::new(),
            replies: Vec::new(),
        }
    }

    fn tick(&mut self, iface: &mut HostInterface) {
        iface.tick();
        self.ticks += 1;
        if self.ticks % SAMPLE_INTERVAL as u64 == 0 {
            iface.sample_load();
        }
        if self.ticks % REPORT_INTERVAL as u64 == 0 {
            let report = iface.report_load();
            log::debug!("load {}% (peak {}%)", report.average, report.peak);
            self.load.push(report);
        }
        self.drain(iface);
    }

    fn drain(&mut self, iface: &mut HostInterface) {
        while let Some(entry) = iface.next_log() {
            self.log.push(entry);
        }
        while let Some(byte) = self.tap.try_recv() {
            self.replies.push(byte);
        }
    }

    fn finish(mut self, iface: &mut HostInterface) -> SessionReport {
        self.drain(iface);
        SessionReport {
            calls: iface.voices_mut().take(),
            replies: self.replies,
            log: self.log,
            load: self.load,
            ticks: self.ticks,
            status: Status::of(iface),
        }
    }
}
