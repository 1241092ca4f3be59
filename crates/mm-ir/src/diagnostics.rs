//! Last-value-wins diagnostics for the display.

/// A control change that was not recognised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlChange {
    pub controller: u8,
    pub value: u8,
}

/// Diagnostic record of dropped input.
///
/// The `last_*` fields are overwritten, never queued. The counters
/// saturate rather than wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Most recent unsupported status byte
    pub last_unknown_status: Option<u8>,
    /// Most recent unrecognised controller and its value
    pub last_unknown_cc: Option<ControlChange>,
    /// Sysex captures abandoned because the payload was too long
    pub sysex_overflows: u16,
    /// Bytes lost to a full receive ring
    pub ring_overflows: u16,
    /// Note Ons dropped for want of a free device channel
    pub dropped_notes: u16,
}

impl Diagnostics {
    /// Create an empty record.
    pub const fn new() -> Self {
        Self {
            last_unknown_status: None,
            last_unknown_cc: None,
            sysex_overflows: 0,
            ring_overflows: 0,
            dropped_notes: 0,
        }
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn record_unknown_status(&mut self, status: u8) {
        self.last_unknown_status = Some(status);
    }

    pub fn record_unknown_cc(&mut self, controller: u8, value: u8) {
        self.last_unknown_cc = Some(ControlChange { controller, value });
    }

    pub fn record_sysex_overflow(&mut self) {
        self.sysex_overflows = self.sysex_overflows.saturating_add(1);
    }

    pub fn record_ring_overflow(&mut self, lost: u16) {
        self.ring_overflows = self.ring_overflows.saturating_add(lost);
    }

    pub fn record_dropped_note(&mut self) {
        self.dropped_notes = self.dropped_notes.saturating_add(1);
    }
}
