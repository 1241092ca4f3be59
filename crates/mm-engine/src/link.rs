//! The contract a physical byte link must satisfy.

/// A byte-oriented link to the host.
///
/// Every method must return promptly. `read` is only called after
/// `ready_to_read` has returned `true`.
pub trait Link {
    /// True if at least one byte can be read without waiting.
    fn ready_to_read(&mut self) -> bool;

    /// Read one byte. Only valid after `ready_to_read` returned `true`.
    fn read(&mut self) -> u8;

    /// True if `write` would not have to wait.
    fn ready_to_write(&mut self) -> bool {
        true
    }

    /// Write one byte.
    fn write(&mut self, byte: u8);

    /// Line speed, for links that have one.
    fn baud_rate(&self) -> Option<u32> {
        None
    }

    /// False if the hardware behind this link is absent.
    fn is_present(&self) -> bool {
        true
    }
}

impl<L: Link + ?Sized> Link for &mut L {
    fn ready_to_read(&mut self) -> bool {
        (**self).ready_to_read()
    }

    fn read(&mut self) -> u8 {
        (**self).read()
    }

    fn ready_to_write(&mut self) -> bool {
        (**self).ready_to_write()
    }

    fn write(&mut self, byte: u8) {
        (**self).write(byte)
    }

    fn baud_rate(&self) -> Option<u32> {
        (**self).baud_rate()
    }

    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}
