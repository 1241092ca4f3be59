//! Host-side byte links for megamidi.

mod error;
mod null_link;
mod ring_link;

pub use error::LinkError;
pub use null_link::NullLink;
pub use ring_link::{LinkFeeder, LinkTap, RingLink, MIDI_BAUD};
