//! Song position derived from MIDI clock pulses.

/// Clock pulses per quarter note.
pub const PULSES_PER_BEAT: u32 = 24;

/// Clock pulses per sixteenth note.
pub const PULSES_PER_SIXTEENTH: u32 = PULSES_PER_BEAT / 4;

/// Quarter-note beats per bar (4/4 only).
pub const BEATS_PER_BAR: u32 = 4;

/// Position in bars, beats and sixteenths, advanced one clock pulse at a time.
///
/// All fields are zero-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timing {
    /// Pulses since the last start
    pub clocks: u32,
    /// Sixteenth within the current beat: 0..4
    pub sixteenth: u8,
    /// Beat within the current bar: 0..BEATS_PER_BAR
    pub bar_beat: u8,
    /// Bars since the last start
    pub bar: u32,
}

impl Timing {
    /// The start position.
    pub const fn zero() -> Self {
        Self {
            clocks: 0,
            sixteenth: 0,
            bar_beat: 0,
            bar: 0,
        }
    }

    /// Position after `clocks` pulses from the start.
    pub fn from_clocks(clocks: u32) -> Self {
        let beats = clocks / PULSES_PER_BEAT;
        Self {
            clocks,
            sixteenth: ((clocks / PULSES_PER_SIXTEENTH) % 4) as u8,
            bar_beat: (beats % BEATS_PER_BAR) as u8,
            bar: beats / BEATS_PER_BAR,
        }
    }

    /// Advance by one clock pulse.
    pub fn advance(&mut self) {
        *self = Self::from_clocks(self.clocks.wrapping_add(1));
    }

    /// Return to the start position.
    pub fn reset(&mut self) {
        *self = Self::zero();
    }
}
