//! A link with no hardware behind it.

use mm_engine::Link;

/// Never ready, never present. Writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLink;

impl Link for NullLink {
    fn ready_to_read(&mut self) -> bool {
        false
    }

    fn read(&mut self) -> u8 {
        0
    }

    fn ready_to_write(&mut self) -> bool {
        false
    }

    fn write(&mut self, _byte: u8) {}

    fn is_present(&self) -> bool {
        false
    }
}
