//! Fixed-capacity receive ring.

use heapless::Deque;

/// Default receive ring capacity in bytes.
pub const RING_CAPACITY: usize = 1024;

/// What a full ring does with an incoming byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Drop the oldest unread byte to make room
    #[default]
    OverwriteOldest,
    /// Drop the incoming byte
    RejectNewest,
}

/// A circular byte queue between the receiver and the per-tick consumer.
///
/// Bytes come out in the order they went in. A full ring never faults:
/// one byte is lost according to the [`OverflowPolicy`] and the loss is
/// counted.
#[derive(Clone, Debug)]
pub struct ByteRing<const N: usize = RING_CAPACITY> {
    bytes: Deque<u8, N>,
    policy: OverflowPolicy,
    /// Bytes lost since creation (saturating).
    overflows: u16,
}

impl<const N: usize> ByteRing<N> {
    /// Create an empty ring that overwrites the oldest byte when full.
    pub const fn new() -> Self {
        Self::with_policy(OverflowPolicy::OverwriteOldest)
    }

    /// Create an empty ring with an explicit overflow policy.
    pub const fn with_policy(policy: OverflowPolicy) -> Self {
        Self {
            bytes: Deque::new(),
            policy,
            overflows: 0,
        }
    }

    /// Store one byte. Returns `false` if a byte was lost to make it fit.
    pub fn write(&mut self, byte: u8) -> bool {
        if !self.bytes.is_full() {
            // Cannot fail: checked above.
            let _ = self.bytes.push_back(byte);
            return true;
        }
        self.overflows = self.overflows.saturating_add(1);
        if self.policy == OverflowPolicy::OverwriteOldest {
            self.bytes.pop_front();
            let _ = self.bytes.push_back(byte);
        }
        false
    }

    /// Remove and return the oldest byte.
    pub fn read(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes that can be written before the ring overflows.
    pub fn free(&self) -> usize {
        N - self.bytes.len()
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true if there is nothing to read.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes lost to overflow so far.
    pub fn overflows(&self) -> u16 {
        self.overflows
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
