//! Diagnostics and the event log, updated together.

use mm_ir::Diagnostics;

use crate::event_log::{EventLog, LogEntry, LogKind};
use crate::transport::TransportMode;

/// Records dropped or notable input.
///
/// Each reporting method updates [`Diagnostics`] where there is a field
/// for it and appends an [`EventLog`] entry.
#[derive(Clone, Debug, Default)]
pub struct Monitor {
    diagnostics: Diagnostics,
    log: EventLog,
}

impl Monitor {
    pub const fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            log: EventLog::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Take the oldest log entry for display.
    pub fn next_log(&mut self) -> Option<LogEntry> {
        self.log.pop()
    }

    /// Clear diagnostics and the log.
    pub fn reset(&mut self) {
        self.diagnostics.reset();
        self.log.clear();
    }

    pub fn unknown_status(&mut self, status: u8) {
        self.diagnostics.record_unknown_status(status);
        self.log.push(LogKind::UnknownStatus(status));
    }

    pub fn unknown_cc(&mut self, controller: u8, value: u8) {
        self.diagnostics.record_unknown_cc(controller, value);
        self.log.push(LogKind::UnknownControlChange { controller, value });
    }

    pub fn sysex_overflow(&mut self) {
        self.diagnostics.record_sysex_overflow();
        self.log.push(LogKind::SysexOverflow);
    }

    pub fn sysex_aborted(&mut self, status: u8) {
        self.log.push(LogKind::SysexAborted { status });
    }

    pub fn message_aborted(&mut self, partial: u8, status: u8) {
        self.log.push(LogKind::MessageAborted { partial, status });
    }

    pub fn ring_overflow(&mut self, lost: u16) {
        self.diagnostics.record_ring_overflow(lost);
        self.log.push(LogKind::RingOverflow { lost });
    }

    pub fn dropped_note(&mut self, midi_channel: u8) {
        self.diagnostics.record_dropped_note();
        self.log.push(LogKind::NoFreeChannel { midi_channel });
    }

    pub fn remapped(&mut self, midi_channel: u8, device_channel: Option<u8>) {
        self.log.push(LogKind::Remapped { midi_channel, device_channel });
    }

    pub fn invalid_remap(&mut self, midi_channel: u8, destination: u8) {
        self.log.push(LogKind::InvalidRemap { midi_channel, destination });
    }

    pub fn unsupported_sysex(&mut self, command: u8) {
        self.log.push(LogKind::UnsupportedSysex { command });
    }

    pub fn dynamic_mode(&mut self, enabled: bool) {
        self.log.push(LogKind::DynamicMode(enabled));
    }

    pub fn transport_resolved(&mut self, mode: TransportMode) {
        self.log.push(LogKind::TransportResolved(mode));
    }
}
