//! MIDI channel to device channel mapping.

use arrayvec::ArrayVec;
use mm_ir::sysex::DESTINATION_UNASSIGN;
use mm_ir::{
    ChannelKind, DeviceChannel, RemapDestination, SysexRemap, MAX_DEVICE_CHANNELS, MAX_MIDI_CHANNELS,
};

use crate::monitor::Monitor;

/// Owns the device-channel table and decides which device channel, if
/// any, serves each MIDI channel.
///
/// The table is built once: FM channels first, then PSG. Lookups scan it
/// linearly; it never holds more than [`MAX_DEVICE_CHANNELS`] entries.
///
/// At most one device channel is bound to a given MIDI channel. In static
/// mode the binding only changes through sysex remaps. In dynamic mode a
/// Note On on an unbound MIDI channel takes the lowest free device channel
/// (never stealing a busy one) and the matching Note Off gives it back.
/// MIDI channels remapped by sysex are pinned and left alone by dynamic
/// allocation until the mode changes.
///
/// The allocator also remembers which device channels have a key down, so
/// a remap can hand back the voices it cut off from their MIDI channel.
#[derive(Clone, Debug)]
pub struct ChannelAllocator {
    channels: ArrayVec<DeviceChannel, MAX_DEVICE_CHANNELS>,
    fm_channels: u8,
    psg_channels: u8,
    static_channels: u8,
    dynamic: bool,
    /// Bit `n` set: MIDI channel `n` was placed by a sysex remap
    pinned: u16,
    /// Bit `i` set: device channel `i` was keyed on and not yet off
    sounding: u16,
}

impl ChannelAllocator {
    /// Build the table and bind the first `static_channels` MIDI channels
    /// 1:1. Counts are clamped to fit the table.
    pub fn new(fm_channels: u8, psg_channels: u8, static_channels: u8) -> Self {
        let max = MAX_DEVICE_CHANNELS as u8;
        let fm_channels = fm_channels.min(max);
        let psg_channels = psg_channels.min(max - fm_channels);

        let mut channels = ArrayVec::new();
        for number in 0..fm_channels {
            channels.push(DeviceChannel::new(number, ChannelKind::Fm, number));
        }
        for number in 0..psg_channels {
            channels.push(DeviceChannel::new(fm_channels + number, ChannelKind::Psg, number));
        }

        let mut allocator = Self {
            channels,
            fm_channels,
            psg_channels,
            static_channels,
            dynamic: false,
            pinned: 0,
            sounding: 0,
        };
        allocator.bind_static(static_channels);
        allocator
    }

    /// The whole table, in index order.
    pub fn channels(&self) -> &[DeviceChannel] {
        &self.channels
    }

    pub fn fm_channels(&self) -> u8 {
        self.fm_channels
    }

    pub fn psg_channels(&self) -> u8 {
        self.psg_channels
    }

    pub fn dynamic_mode(&self) -> bool {
        self.dynamic
    }

    /// The device channel serving `midi_channel`, if any.
    pub fn resolve(&self, midi_channel: u8) -> Option<&DeviceChannel> {
        self.channels.iter().find(|c| c.serves(midi_channel))
    }

    fn position(&self, midi_channel: u8) -> Option<usize> {
        self.channels.iter().position(|c| c.serves(midi_channel))
    }

    /// Bind MIDI channels `0..count` to the first `count` device channels
    /// and unbind the rest.
    pub fn bind_static(&mut self, count: u8) {
        let count = (count as usize).min(MAX_MIDI_CHANNELS as usize);
        for (i, chan) in self.channels.iter_mut().enumerate() {
            chan.midi_channel = if i < count { Some(i as u8) } else { None };
        }
        self.pinned = 0;
    }

    /// Switch the allocation policy. Turning dynamic mode on frees every
    /// device channel; turning it off restores the static binding. Either
    /// way sysex pins are dropped. Setting the current mode again changes
    /// nothing.
    pub fn set_dynamic_mode(&mut self, enabled: bool) {
        if enabled == self.dynamic {
            return;
        }
        self.dynamic = enabled;
        if enabled {
            self.bind_static(0);
        } else {
            self.bind_static(self.static_channels);
        }
    }

    /// The device channel for a Note On on `midi_channel`, allocating one
    /// in dynamic mode. Returns `None` if the note must be dropped.
    pub fn acquire(&mut self, midi_channel: u8, monitor: &mut Monitor) -> Option<&DeviceChannel> {
        if let Some(i) = self.position(midi_channel) {
            return Some(&self.channels[i]);
        }
        if !self.dynamic || self.is_pinned(midi_channel) {
            return None;
        }
        let Some(i) = self.channels.iter().position(|c| !c.is_assigned()) else {
            monitor.dropped_note(midi_channel);
            return None;
        };
        self.channels[i].midi_channel = Some(midi_channel);
        log::debug!("MIDI {} allocated device channel {}", midi_channel, i);
        Some(&self.channels[i])
    }

    /// Record a key-on on device channel `index`.
    pub fn note_started(&mut self, index: u8) {
        if (index as usize) < self.channels.len() {
            self.sounding |= 1 << index;
        }
    }

    /// True if device channel `index` has a key down.
    pub fn is_sounding(&self, index: u8) -> bool {
        (index as usize) < self.channels.len() && self.sounding & (1 << index) != 0
    }

    /// Every voice was silenced at once.
    pub fn silence_all(&mut self) {
        self.sounding = 0;
    }

    /// Called after a Note Off (or an all-off controller) on
    /// `midi_channel`: its device channel stops sounding and, in dynamic
    /// mode, goes back to the free pool unless it was pinned.
    pub fn release(&mut self, midi_channel: u8) {
        let Some(i) = self.position(midi_channel) else {
            return;
        };
        self.sounding &= !(1 << i);
        if !self.dynamic || self.is_pinned(midi_channel) {
            return;
        }
        self.channels[i].midi_channel = None;
        log::debug!("MIDI {} released device channel {}", midi_channel, i);
    }

    /// Apply a sysex remap unconditionally.
    ///
    /// The MIDI channel leaves whatever device channel it had; the target
    /// device channel loses its previous occupant. The destination is
    /// looked up by kind and chip-local number together.
    ///
    /// Returns the device channels that were still sounding when they lost
    /// their MIDI channel. The caller keys them off.
    pub fn apply_remap(
        &mut self,
        remap: SysexRemap,
        monitor: &mut Monitor,
    ) -> ArrayVec<DeviceChannel, 2> {
        let mut vacated = ArrayVec::new();
        let SysexRemap { midi_channel, destination } = remap;
        let target = match destination {
            RemapDestination::Fm(number) => self.find(ChannelKind::Fm, number),
            RemapDestination::Psg(number) => self.find(ChannelKind::Psg, number),
            RemapDestination::Unassign => None,
        };
        if target.is_none() && destination != RemapDestination::Unassign {
            let raw = match destination {
                RemapDestination::Psg(number) => self.fm_channels.saturating_add(number),
                RemapDestination::Fm(number) => number,
                RemapDestination::Unassign => DESTINATION_UNASSIGN,
            };
            monitor.invalid_remap(midi_channel, raw);
            return vacated;
        }

        // Rebinding a channel onto itself keeps its voice.
        let previous = self.position(midi_channel).filter(|&i| Some(i) != target);
        let evicted = target.filter(|&i| {
            self.channels[i].is_assigned() && !self.channels[i].serves(midi_channel)
        });
        for i in previous.into_iter().chain(evicted) {
            if self.is_sounding(i as u8) {
                self.sounding &= !(1 << i);
                vacated.push(self.channels[i]);
            }
        }

        for chan in self.channels.iter_mut().filter(|c| c.serves(midi_channel)) {
            chan.midi_channel = None;
        }
        if let Some(i) = target {
            self.channels[i].midi_channel = Some(midi_channel);
        }
        if midi_channel < MAX_MIDI_CHANNELS {
            self.pinned |= 1 << midi_channel;
        }
        monitor.remapped(midi_channel, target.map(|i| i as u8));
        vacated
    }

    fn find(&self, kind: ChannelKind, number: u8) -> Option<usize> {
        self.channels
            .iter()
            .position(|c| c.kind == kind && c.number == number)
    }

    fn is_pinned(&self, midi_channel: u8) -> bool {
        midi_channel < MAX_MIDI_CHANNELS && self.pinned & (1 << midi_channel) != 0
    }

    /// One display value per device channel: MIDI channel + 1, or 0 when
    /// unassigned.
    pub fn display_mappings(&self) -> ArrayVec<u8, MAX_DEVICE_CHANNELS> {
        self.channels
            .iter()
            .map(|c| c.midi_channel.map_or(0, |m| m + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ChannelAllocator {
        ChannelAllocator::new(6, 4, 6)
    }

    fn remap(midi_channel: u8, destination: RemapDestination) -> SysexRemap {
        SysexRemap { midi_channel, destination }
    }

    fn index_of(alloc: &ChannelAllocator, midi: u8) -> Option<u8> {
        alloc.resolve(midi).map(|c| c.index)
    }

    // === Table layout ===

    #[test]
    fn table_is_fm_then_psg() {
        let alloc = reference();
        let chans = alloc.channels();
        assert_eq!(chans.len(), 10);
        assert_eq!(chans[0].kind, ChannelKind::Fm);
        assert_eq!(chans[5].kind, ChannelKind::Fm);
        assert_eq!(chans[6].kind, ChannelKind::Psg);
        assert_eq!(chans[6].number, 0);
        assert_eq!(chans[9].number, 3);
        for (i, c) in chans.iter().enumerate() {
            assert_eq!(c.index as usize, i);
        }
    }

    #[test]
    fn counts_are_clamped_to_table() {
        let alloc = ChannelAllocator::new(12, 12, 6);
        assert_eq!(alloc.channels().len(), MAX_DEVICE_CHANNELS);
        assert_eq!(alloc.psg_channels(), 4);
    }

    // === Static binding ===

    #[test]
    fn static_binding_is_one_to_one() {
        let alloc = reference();
        for midi in 0..6 {
            assert_eq!(index_of(&alloc, midi), Some(midi));
        }
        assert_eq!(index_of(&alloc, 6), None);
        assert!(!alloc.channels()[6].is_assigned());
    }

    #[test]
    fn static_mode_never_allocates() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        assert!(alloc.acquire(9, &mut monitor).is_none());
        assert_eq!(monitor.diagnostics().dropped_notes, 0);
    }

    #[test]
    fn static_release_keeps_binding() {
        let mut alloc = reference();
        alloc.release(0);
        assert_eq!(index_of(&alloc, 0), Some(0));
    }

    #[test]
    fn display_mappings_are_one_based() {
        let alloc = reference();
        assert_eq!(alloc.display_mappings().as_slice(), &[1, 2, 3, 4, 5, 6, 0, 0, 0, 0]);
    }

    // === Dynamic mode ===

    #[test]
    fn enabling_dynamic_frees_everything() {
        let mut alloc = reference();
        alloc.set_dynamic_mode(true);
        assert!(alloc.dynamic_mode());
        assert!(alloc.channels().iter().all(|c| !c.is_assigned()));
    }

    #[test]
    fn dynamic_allocates_lowest_free() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        assert_eq!(alloc.acquire(9, &mut monitor).map(|c| c.index), Some(0));
        assert_eq!(alloc.acquire(3, &mut monitor).map(|c| c.index), Some(1));
        // Already bound: same channel again.
        assert_eq!(alloc.acquire(9, &mut monitor).map(|c| c.index), Some(0));
    }

    #[test]
    fn dynamic_reaches_psg_after_fm() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        for midi in 0..6 {
            alloc.acquire(midi, &mut monitor);
        }
        let chan = alloc.acquire(6, &mut monitor).copied();
        assert_eq!(chan.map(|c| c.kind), Some(ChannelKind::Psg));
    }

    #[test]
    fn dynamic_does_not_steal() {
        let mut alloc = ChannelAllocator::new(1, 1, 0);
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        alloc.acquire(0, &mut monitor);
        alloc.acquire(1, &mut monitor);
        assert!(alloc.acquire(2, &mut monitor).is_none());
        assert_eq!(index_of(&alloc, 0), Some(0));
        assert_eq!(index_of(&alloc, 1), Some(1));
        assert_eq!(monitor.diagnostics().dropped_notes, 1);
    }

    #[test]
    fn dynamic_release_frees_channel() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        alloc.acquire(4, &mut monitor);
        alloc.release(4);
        assert_eq!(index_of(&alloc, 4), None);
        assert_eq!(alloc.acquire(7, &mut monitor).map(|c| c.index), Some(0));
    }

    #[test]
    fn disabling_dynamic_restores_static() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        alloc.acquire(12, &mut monitor);
        alloc.set_dynamic_mode(false);
        assert_eq!(index_of(&alloc, 12), None);
        assert_eq!(index_of(&alloc, 2), Some(2));
    }

    #[test]
    fn setting_same_mode_keeps_mapping() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.apply_remap(remap(0, RemapDestination::Psg(0)), &mut monitor);
        alloc.set_dynamic_mode(false);
        assert_eq!(index_of(&alloc, 0), Some(6));
    }

    // === Sysex remap ===

    #[test]
    fn remap_to_psg_moves_channel() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.apply_remap(remap(0, RemapDestination::Psg(0)), &mut monitor);
        assert_eq!(index_of(&alloc, 0), Some(6));
        assert!(!alloc.channels()[0].is_assigned());
    }

    #[test]
    fn remap_evicts_previous_occupant() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.apply_remap(remap(0, RemapDestination::Fm(1)), &mut monitor);
        assert_eq!(index_of(&alloc, 0), Some(1));
        assert_eq!(index_of(&alloc, 1), None);
        let bound = alloc.channels().iter().filter(|c| c.serves(0)).count();
        assert_eq!(bound, 1);
    }

    #[test]
    fn remap_is_idempotent() {
        let mut once = reference();
        let mut twice = reference();
        let mut monitor = Monitor::new();
        let cmd = remap(3, RemapDestination::Psg(2));
        once.apply_remap(cmd, &mut monitor);
        twice.apply_remap(cmd, &mut monitor);
        twice.apply_remap(cmd, &mut monitor);
        assert_eq!(once.channels(), twice.channels());
    }

    #[test]
    fn unassign_clears_binding() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.apply_remap(remap(0, RemapDestination::Unassign), &mut monitor);
        assert_eq!(index_of(&alloc, 0), None);
    }

    #[test]
    fn remap_is_resolved_by_kind() {
        // Three FM channels: Psg(0) is table index 3, Fm(3) does not exist.
        let mut alloc = ChannelAllocator::new(3, 4, 3);
        let mut monitor = Monitor::new();
        alloc.apply_remap(remap(0, RemapDestination::Psg(0)), &mut monitor);
        assert_eq!(alloc.resolve(0).map(|c| (c.kind, c.number)), Some((ChannelKind::Psg, 0)));
        alloc.apply_remap(remap(1, RemapDestination::Fm(3)), &mut monitor);
        assert_eq!(index_of(&alloc, 1), Some(1));
    }

    #[test]
    fn pinned_channel_survives_dynamic_release() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        alloc.apply_remap(remap(5, RemapDestination::Psg(1)), &mut monitor);
        alloc.release(5);
        assert_eq!(index_of(&alloc, 5), Some(7));
    }

    #[test]
    fn unassigned_pin_blocks_dynamic_allocation() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.set_dynamic_mode(true);
        alloc.apply_remap(remap(2, RemapDestination::Unassign), &mut monitor);
        assert!(alloc.acquire(2, &mut monitor).is_none());
        assert_eq!(monitor.diagnostics().dropped_notes, 0);
    }

    // === Sounding voices ===

    #[test]
    fn remap_hands_back_sounding_voice() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.note_started(0);
        let vacated = alloc.apply_remap(remap(0, RemapDestination::Psg(0)), &mut monitor);
        assert_eq!(vacated.len(), 1);
        assert_eq!(vacated[0].index, 0);
        assert!(!alloc.is_sounding(0));
    }

    #[test]
    fn remap_hands_back_evicted_voice() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.note_started(0);
        alloc.note_started(1);
        let vacated = alloc.apply_remap(remap(0, RemapDestination::Fm(1)), &mut monitor);
        let indices: ArrayVec<u8, 2> = vacated.iter().map(|c| c.index).collect();
        assert_eq!(indices.as_slice(), &[0, 1]);
        assert_eq!(vacated[1].midi_channel, Some(1));
    }

    #[test]
    fn remap_of_silent_channels_hands_back_nothing() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        assert!(alloc.apply_remap(remap(0, RemapDestination::Fm(1)), &mut monitor).is_empty());
    }

    #[test]
    fn remap_onto_own_channel_keeps_voice() {
        let mut alloc = reference();
        let mut monitor = Monitor::new();
        alloc.note_started(2);
        assert!(alloc.apply_remap(remap(2, RemapDestination::Fm(2)), &mut monitor).is_empty());
        assert!(alloc.is_sounding(2));
    }

    #[test]
    fn release_stops_sounding_in_static_mode() {
        let mut alloc = reference();
        alloc.note_started(3);
        alloc.release(3);
        assert!(!alloc.is_sounding(3));
        assert_eq!(index_of(&alloc, 3), Some(3));
    }

    #[test]
    fn silence_all_clears_every_voice() {
        let mut alloc = reference();
        alloc.note_started(0);
        alloc.note_started(9);
        alloc.silence_all();
        assert!((0..10).all(|i| !alloc.is_sounding(i)));
    }
}
