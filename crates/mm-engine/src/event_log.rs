//! Bounded log of notable events for the status display.

use core::fmt;

use heapless::Deque;
use log::Level;

use crate::transport::TransportMode;

/// Entries kept before the oldest is dropped.
pub const LOG_CAPACITY: usize = 8;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    UnknownStatus(u8),
    UnknownControlChange { controller: u8, value: u8 },
    SysexOverflow,
    /// A sysex capture was cut short by another status byte
    SysexAborted { status: u8 },
    /// A channel message with status `partial` was cut short by `status`
    MessageAborted { partial: u8, status: u8 },
    RingOverflow { lost: u16 },
    NoFreeChannel { midi_channel: u8 },
    /// `device_channel` is the table index, `None` for an unassign
    Remapped { midi_channel: u8, device_channel: Option<u8> },
    InvalidRemap { midi_channel: u8, destination: u8 },
    UnsupportedSysex { command: u8 },
    DynamicMode(bool),
    TransportResolved(TransportMode),
}

impl LogKind {
    /// Severity shown on screen and passed to the `log` facade.
    pub fn level(&self) -> Level {
        match self {
            LogKind::Remapped { .. } | LogKind::DynamicMode(_) | LogKind::TransportResolved(_) => {
                Level::Info
            }
            _ => Level::Warn,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LogKind::UnknownStatus(status) => write!(f, "Unknown Status {:02X}", status),
            LogKind::UnknownControlChange { controller, value } => {
                write!(f, "Unknown CC {:02X} Value {:02X}", controller, value)
            }
            LogKind::SysexOverflow => write!(f, "Sysex too long"),
            LogKind::SysexAborted { status } => write!(f, "Sysex cut by {:02X}", status),
            LogKind::MessageAborted { partial, status } => {
                write!(f, "{:02X} cut by {:02X}", partial, status)
            }
            LogKind::RingOverflow { lost } => write!(f, "Buffer overflow, {} lost", lost),
            LogKind::NoFreeChannel { midi_channel } => {
                write!(f, "No free channel for MIDI {}", midi_channel + 1)
            }
            LogKind::Remapped { midi_channel, device_channel: Some(dev) } => {
                write!(f, "MIDI {} -> dev {}", midi_channel + 1, dev)
            }
            LogKind::Remapped { midi_channel, device_channel: None } => {
                write!(f, "MIDI {} unassigned", midi_channel + 1)
            }
            LogKind::InvalidRemap { midi_channel, destination } => {
                write!(f, "Bad remap {:02X} -> {:02X}", midi_channel, destination)
            }
            LogKind::UnsupportedSysex { command } => write!(f, "Unknown sysex cmd {:02X}", command),
            LogKind::DynamicMode(true) => write!(f, "Dynamic mode on"),
            LogKind::DynamicMode(false) => write!(f, "Dynamic mode off"),
            LogKind::TransportResolved(mode) => write!(f, "Link: {:?}", mode),
        }
    }
}

/// A log record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub kind: LogKind,
}

/// FIFO of the most recent [`LOG_CAPACITY`] entries.
///
/// Every push is also forwarded to the `log` facade, so hosts with a
/// logger installed see the same records.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Deque<LogEntry, LOG_CAPACITY>,
}

impl EventLog {
    pub const fn new() -> Self {
        Self { entries: Deque::new() }
    }

    /// Append an entry, dropping the oldest if full.
    pub fn push(&mut self, kind: LogKind) {
        let level = kind.level();
        log::log!(level, "{}", kind);
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let _ = self.entries.push_back(LogEntry { level, kind });
    }

    /// Take the oldest entry.
    pub fn pop(&mut self) -> Option<LogEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries oldest first, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn pops_in_push_order() {
        let mut log = EventLog::new();
        log.push(LogKind::UnknownStatus(0xD0));
        log.push(LogKind::SysexOverflow);
        assert_eq!(log.pop().map(|e| e.kind), Some(LogKind::UnknownStatus(0xD0)));
        assert_eq!(log.pop().map(|e| e.kind), Some(LogKind::SysexOverflow));
        assert!(log.pop().is_none());
    }

    #[test]
    fn full_log_drops_oldest() {
        let mut log = EventLog::new();
        for status in 0..(LOG_CAPACITY as u8 + 2) {
            log.push(LogKind::UnknownStatus(status));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.pop().map(|e| e.kind), Some(LogKind::UnknownStatus(2)));
    }

    #[test]
    fn levels() {
        assert_eq!(LogKind::UnknownStatus(0xF1).level(), Level::Warn);
        assert_eq!(LogKind::DynamicMode(true).level(), Level::Info);
    }

    #[test]
    fn display_matches_screen_text() {
        assert_eq!(LogKind::UnknownStatus(0xF1).to_string(), "Unknown Status F1");
        assert_eq!(
            LogKind::UnknownControlChange { controller: 0x0E, value: 0x7F }.to_string(),
            "Unknown CC 0E Value 7F"
        );
        assert_eq!(
            LogKind::Remapped { midi_channel: 0, device_channel: None }.to_string(),
            "MIDI 1 unassigned"
        );
    }
}
