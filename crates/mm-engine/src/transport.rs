//! Link discovery, receive buffering and activity counting.

use crate::link::Link;
use crate::ring::{ByteRing, OverflowPolicy};

/// Which link the transport is using.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    /// Still polling for the fast link
    Discovering,
    /// Fast (flashcart-style) link detected
    LinkA,
    /// Fell back to the byte-serial link
    LinkB,
    /// Neither link is usable
    Unknown,
}

impl TransportMode {
    /// True once discovery has finished, whatever the outcome.
    pub fn is_resolved(self) -> bool {
        self != TransportMode::Discovering
    }
}

/// Result of one [`Transport::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Poll {
    /// Set on the poll that finished discovery
    pub resolved: Option<TransportMode>,
    /// Bytes moved from the link into the ring
    pub moved: usize,
}

/// Owns both links, picks one, and buffers what it receives.
///
/// Discovery polls the fast link's readiness; the first time it reports
/// data the transport settles on it for good. After `discovery_polls`
/// polls without a sign of it the serial link is used instead (or
/// `Unknown` if that is absent too). The mode never changes afterwards.
pub struct Transport<A, B> {
    fast: A,
    serial: B,
    mode: TransportMode,
    polls: u16,
    discovery_polls: u16,
    ring: ByteRing,
    idle: u16,
    busy: u16,
}

impl<A: Link, B: Link> Transport<A, B> {
    pub fn new(fast: A, serial: B, discovery_polls: u16, policy: OverflowPolicy) -> Self {
        Self {
            fast,
            serial,
            mode: TransportMode::Discovering,
            polls: 0,
            discovery_polls,
            ring: ByteRing::with_policy(policy),
            idle: 0,
            busy: 0,
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Advance discovery if needed, then move bytes the active link has
    /// ready into the receive ring.
    ///
    /// Only as many bytes as the ring has room for are taken; the rest
    /// stay in the link for a later poll.
    pub fn poll(&mut self) -> Poll {
        let mut result = Poll::default();
        if self.mode == TransportMode::Discovering {
            self.discover();
            if !self.mode.is_resolved() {
                return result;
            }
            result.resolved = Some(self.mode);
        }
        while self.ring.free() > 0 {
            let byte = match self.mode {
                TransportMode::LinkA if self.fast.ready_to_read() => self.fast.read(),
                TransportMode::LinkB if self.serial.ready_to_read() => self.serial.read(),
                _ => break,
            };
            self.ring.write(byte);
            result.moved += 1;
        }
        result
    }

    fn discover(&mut self) {
        if self.fast.is_present() && self.fast.ready_to_read() {
            self.mode = TransportMode::LinkA;
            return;
        }
        self.polls = self.polls.saturating_add(1);
        if self.polls >= self.discovery_polls {
            self.mode = if self.serial.is_present() {
                TransportMode::LinkB
            } else {
                TransportMode::Unknown
            };
        }
    }

    /// Store a byte delivered by an interrupt-driven receiver. Returns
    /// `false` if a byte was lost to overflow.
    pub fn receive(&mut self, byte: u8) -> bool {
        self.ring.write(byte)
    }

    /// True if a byte is buffered and `read` will return it.
    pub fn is_ready(&self) -> bool {
        !self.ring.is_empty()
    }

    /// Take the oldest buffered byte. Never waits.
    pub fn read(&mut self) -> Option<u8> {
        self.ring.read()
    }

    /// Send a byte on the active link. Dropped while discovering, when
    /// no link is usable, or when the link is not ready to accept it.
    pub fn write(&mut self, byte: u8) {
        match self.mode {
            TransportMode::LinkA if self.fast.ready_to_write() => self.fast.write(byte),
            TransportMode::LinkB if self.serial.ready_to_write() => self.serial.write(byte),
            _ => log::debug!("dropped outgoing byte {:02X} in mode {:?}", byte, self.mode),
        }
    }

    /// Serial line speed, only once the serial link is in use.
    pub fn baud_rate(&self) -> Option<u32> {
        match self.mode {
            TransportMode::LinkB => self.serial.baud_rate(),
            _ => None,
        }
    }

    /// Count a tick in which no byte was processed.
    pub fn record_idle(&mut self) {
        self.idle = self.idle.saturating_add(1);
    }

    /// Count a tick in which a byte was processed.
    pub fn record_busy(&mut self) {
        self.busy = self.busy.saturating_add(1);
    }

    pub fn idle_count(&self) -> u16 {
        self.idle
    }

    pub fn busy_count(&self) -> u16 {
        self.busy
    }

    /// Start a new load-metering window.
    pub fn reset_counts(&mut self) {
        self.idle = 0;
        self.busy = 0;
    }

    pub fn ring(&self) -> &ByteRing {
        &self.ring
    }

    pub fn fast_link(&self) -> &A {
        &self.fast
    }

    pub fn fast_link_mut(&mut self) -> &mut A {
        &mut self.fast
    }

    pub fn serial_link(&self) -> &B {
        &self.serial
    }
}
