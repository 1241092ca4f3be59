//! Byte link fed from another thread through lock-free rings.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mm_engine::Link;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::error::LinkError;

/// MIDI's standard line speed.
pub const MIDI_BAUD: u32 = 31_250;

/// The engine's end of a pair of single-producer rings.
///
/// Inbound bytes are pushed by a [`LinkFeeder`] (typically on a receiver
/// thread); bytes the engine writes come out of the matching
/// [`LinkTap`]. Neither side ever blocks.
pub struct RingLink {
    inbound: HeapCons<u8>,
    outbound: HeapProd<u8>,
    baud: Option<u32>,
    feeder_open: Arc<AtomicBool>,
}

/// Producer half of a [`RingLink`]'s inbound ring. `Send`.
pub struct LinkFeeder {
    producer: HeapProd<u8>,
    open: Arc<AtomicBool>,
}

/// Consumer half of a [`RingLink`]'s outbound ring.
pub struct LinkTap {
    consumer: HeapCons<u8>,
}

impl RingLink {
    /// Create a link with `capacity` bytes of buffering in each direction.
    pub fn new(capacity: usize) -> (Self, LinkFeeder, LinkTap) {
        let (in_prod, in_cons) = HeapRb::<u8>::new(capacity).split();
        let (out_prod, out_cons) = HeapRb::<u8>::new(capacity).split();
        let open = Arc::new(AtomicBool::new(true));

        let link = Self {
            inbound: in_cons,
            outbound: out_prod,
            baud: Some(MIDI_BAUD),
            feeder_open: open.clone(),
        };
        let feeder = LinkFeeder { producer: in_prod, open };
        let tap = LinkTap { consumer: out_cons };
        (link, feeder, tap)
    }

    pub fn with_baud_rate(mut self, baud: Option<u32>) -> Self {
        self.baud = baud;
        self
    }

    /// True while the feeder exists and has not been closed.
    pub fn feeder_open(&self) -> bool {
        self.feeder_open.load(Ordering::Acquire)
    }

    /// Bytes pushed by the feeder and not yet read.
    pub fn pending(&self) -> usize {
        self.inbound.occupied_len()
    }

    /// Nothing left to read and nothing more coming.
    pub fn is_drained(&self) -> bool {
        !self.feeder_open() && self.inbound.is_empty()
    }
}

impl Link for RingLink {
    fn ready_to_read(&mut self) -> bool {
        !self.inbound.is_empty()
    }

    fn read(&mut self) -> u8 {
        self.inbound.try_pop().unwrap_or(0)
    }

    fn ready_to_write(&mut self) -> bool {
        !self.outbound.is_full()
    }

    fn write(&mut self, byte: u8) {
        if self.outbound.try_push(byte).is_err() {
            log::warn!("outbound ring full, dropped {:02X}", byte);
        }
    }

    fn baud_rate(&self) -> Option<u32> {
        self.baud
    }
}

impl LinkFeeder {
    /// Push one byte without waiting.
    pub fn feed(&mut self, byte: u8) -> Result<(), LinkError> {
        if !self.producer.read_is_held() {
            return Err(LinkError::Disconnected);
        }
        self.producer.try_push(byte).map_err(|_| LinkError::Full)
    }

    /// Push as many of `bytes` as fit, returning how many were taken.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> usize {
        self.producer.push_slice(bytes)
    }

    /// Free space in the inbound ring.
    pub fn room(&self) -> usize {
        self.producer.vacant_len()
    }

    /// Signal that no more bytes will be fed.
    pub fn close(&mut self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Drop for LinkFeeder {
    fn drop(&mut self) {
        self.close();
    }
}

impl LinkTap {
    pub fn try_recv(&mut self) -> Option<u8> {
        self.consumer.try_pop()
    }

    /// Everything written so far.
    pub fn drain(&mut self) -> Vec<u8> {
        self.consumer.pop_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_cross_in_order() {
        let (mut link, mut feeder, _tap) = RingLink::new(8);
        assert!(!link.ready_to_read());
        for b in [0x90, 60, 100] {
            feeder.feed(b).unwrap();
        }
        assert_eq!(link.pending(), 3);
        let got: Vec<u8> = (0..3).map(|_| link.read()).collect();
        assert_eq!(got, [0x90, 60, 100]);
        assert!(!link.ready_to_read());
    }

    #[test]
    fn full_ring_rejects() {
        let (_link, mut feeder, _tap) = RingLink::new(2);
        assert_eq!(feeder.feed_slice(&[1, 2, 3]), 2);
        assert_eq!(feeder.room(), 0);
        assert_eq!(feeder.feed(4), Err(LinkError::Full));
    }

    #[test]
    fn feeding_a_dropped_link_fails() {
        let (link, mut feeder, _tap) = RingLink::new(4);
        drop(link);
        assert_eq!(feeder.feed(1), Err(LinkError::Disconnected));
    }

    #[test]
    fn writes_come_out_of_tap() {
        let (mut link, _feeder, mut tap) = RingLink::new(4);
        assert!(link.ready_to_write());
        link.write(0xF0);
        link.write(0xF7);
        assert_eq!(tap.drain(), [0xF0, 0xF7]);
        assert_eq!(tap.try_recv(), None);
    }

    #[test]
    fn drained_after_close() {
        let (mut link, mut feeder, _tap) = RingLink::new(4);
        feeder.feed(1).unwrap();
        drop(feeder);
        assert!(!link.feeder_open());
        assert!(!link.is_drained());
        link.read();
        assert!(link.is_drained());
    }

    #[test]
    fn reports_midi_baud() {
        let (link, _feeder, _tap) = RingLink::new(1);
        assert_eq!(link.baud_rate(), Some(MIDI_BAUD));
        assert_eq!(link.with_baud_rate(None).baud_rate(), None);
    }

    #[test]
    fn feeder_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<LinkFeeder>();
    }
}
