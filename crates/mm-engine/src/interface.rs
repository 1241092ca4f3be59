//! The per-device context tying the pipeline together.

use arrayvec::ArrayVec;
use mm_ir::sysex::pong_reply;
use mm_ir::{
    decode_sysex, DeviceChannel, Diagnostics, MidiEvent, SysexCommand, Timing, CC_ALL_NOTES_OFF,
    CC_ALL_SOUND_OFF, MAX_DEVICE_CHANNELS,
};

use crate::allocator::ChannelAllocator;
use crate::assembler::MessageAssembler;
use crate::config::EngineConfig;
use crate::dispatcher::VoiceDispatcher;
use crate::event_log::LogEntry;
use crate::link::Link;
use crate::load::{LoadMeter, LoadReport};
use crate::monitor::Monitor;
use crate::transport::{Transport, TransportMode};
use crate::voice::VoiceControl;

/// One MIDI interface: links in, voice-control calls out.
///
/// All state lives here and is only touched through `&mut self`; build
/// one per device. [`tick`](Self::tick) is the only processing step and
/// consumes at most one received byte per call.
pub struct Interface<A, B, V> {
    config: EngineConfig,
    transport: Transport<A, B>,
    assembler: MessageAssembler,
    allocator: ChannelAllocator,
    dispatcher: VoiceDispatcher<V>,
    monitor: Monitor,
    load: LoadMeter,
}

impl<A: Link, B: Link, V: VoiceControl> Interface<A, B, V> {
    /// Build the channel table from `config`, bind the static mapping and
    /// initialise the voices. Out-of-range channel counts are clamped.
    pub fn new(config: EngineConfig, fast_link: A, serial_link: B, voices: V) -> Self {
        let transport = Transport::new(
            fast_link,
            serial_link,
            config.discovery_polls,
            config.ring_overflow,
        );
        let mut allocator =
            ChannelAllocator::new(config.fm_channels, config.psg_channels, config.static_channels);
        allocator.set_dynamic_mode(config.dynamic_mode);

        let mut dispatcher = VoiceDispatcher::new(voices);
        dispatcher.init();

        Self {
            config,
            transport,
            assembler: MessageAssembler::new(),
            allocator,
            dispatcher,
            monitor: Monitor::new(),
            load: LoadMeter::new(),
        }
    }

    /// Pump the active link, then process at most one buffered byte.
    pub fn tick(&mut self) {
        let Self {
            config,
            transport,
            assembler,
            allocator,
            dispatcher,
            monitor,
            ..
        } = self;

        let poll = transport.poll();
        if let Some(mode) = poll.resolved {
            monitor.transport_resolved(mode);
        }

        let Some(byte) = transport.read() else {
            transport.record_idle();
            return;
        };
        transport.record_busy();

        let Some(event) = assembler.push(byte, monitor) else {
            return;
        };

        match event {
            MidiEvent::NoteOn { channel, pitch, velocity } => {
                let chan = allocator.acquire(channel, monitor).copied();
                if let Some(chan) = &chan {
                    allocator.note_started(chan.index);
                }
                dispatcher.note_on(chan.as_ref(), pitch, velocity);
            }
            MidiEvent::NoteOff { channel, .. } => {
                let chan = allocator.resolve(channel).copied();
                dispatcher.note_off(chan.as_ref());
                allocator.release(channel);
            }
            MidiEvent::ControlChange { channel, controller, value } => {
                let chan = allocator.resolve(channel).copied();
                dispatcher.control_change(chan.as_ref(), controller, value, monitor);
                if matches!(controller, CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF) {
                    allocator.release(channel);
                }
            }
            MidiEvent::ProgramChange { channel, program } => {
                dispatcher.program(allocator.resolve(channel), program);
            }
            MidiEvent::PitchBend { channel, value } => {
                dispatcher.pitch_bend(allocator.resolve(channel), value);
            }
            MidiEvent::Start => dispatcher.start(),
            MidiEvent::Clock | MidiEvent::Stop => {}
            MidiEvent::Sysex(payload) => {
                let command = decode_sysex(
                    payload,
                    &config.manufacturer_id,
                    allocator.fm_channels(),
                    allocator.psg_channels(),
                );
                match command {
                    SysexCommand::GeneralMidiReset => {
                        dispatcher.all_notes_off();
                        allocator.silence_all();
                    }
                    SysexCommand::Remap(remap) => {
                        for chan in allocator.apply_remap(remap, monitor) {
                            dispatcher.note_off(Some(&chan));
                        }
                    }
                    SysexCommand::Ping => {
                        for byte in pong_reply(&config.manufacturer_id) {
                            transport.write(byte);
                        }
                    }
                    SysexCommand::DynamicMode(enabled) => {
                        if allocator.dynamic_mode() != enabled {
                            allocator.set_dynamic_mode(enabled);
                            monitor.dynamic_mode(enabled);
                        }
                    }
                    SysexCommand::InvalidRemap { midi_channel, destination } => {
                        monitor.invalid_remap(midi_channel, destination)
                    }
                    SysexCommand::Unsupported { command } => monitor.unsupported_sysex(command),
                    SysexCommand::Foreign => log::debug!("ignored foreign sysex"),
                }
            }
        }
    }

    /// Store a byte from an interrupt-driven receiver.
    pub fn receive(&mut self, byte: u8) {
        if !self.transport.receive(byte) {
            self.monitor.ring_overflow(1);
        }
    }

    /// Clear diagnostics, the event log and any partial message. The
    /// channel mapping and timing are left alone.
    pub fn reset(&mut self) {
        self.monitor.reset();
        self.assembler.reset();
    }

    // --- Display accessors ---

    pub fn timing(&self) -> &Timing {
        self.assembler.timing()
    }

    pub fn channels(&self) -> &[DeviceChannel] {
        self.allocator.channels()
    }

    /// MIDI channel + 1 per device channel, 0 when unassigned.
    pub fn midi_channel_mappings(&self) -> ArrayVec<u8, MAX_DEVICE_CHANNELS> {
        self.allocator.display_mappings()
    }

    pub fn dynamic_mode(&self) -> bool {
        self.allocator.dynamic_mode()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.monitor.diagnostics()
    }

    pub fn next_log(&mut self) -> Option<LogEntry> {
        self.monitor.next_log()
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport.mode()
    }

    pub fn idle_count(&self) -> u16 {
        self.transport.idle_count()
    }

    pub fn busy_count(&self) -> u16 {
        self.transport.busy_count()
    }

    pub fn reset_counts(&mut self) {
        self.transport.reset_counts();
    }

    /// Free slots in the receive ring.
    pub fn buffer_available(&self) -> usize {
        self.transport.ring().free()
    }

    /// Bytes received but not yet processed.
    pub fn buffered(&self) -> usize {
        self.transport.ring().available()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.transport.baud_rate()
    }

    // --- Load metering ---

    /// Take a load sample from the activity counters accumulated since the
    /// last report.
    pub fn sample_load(&mut self) -> u8 {
        self.load.sample(self.transport.idle_count(), self.transport.busy_count())
    }

    /// Close the current load window and reset the activity counters.
    pub fn report_load(&mut self) -> LoadReport {
        self.transport.reset_counts();
        self.load.close_window()
    }

    pub fn load(&self) -> u8 {
        self.load.last_average()
    }

    // --- Collaborators ---

    pub fn voices(&self) -> &V {
        self.dispatcher.voices()
    }

    pub fn voices_mut(&mut self) -> &mut V {
        self.dispatcher.voices_mut()
    }

    pub fn transport(&self) -> &Transport<A, B> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport<A, B> {
        &mut self.transport
    }
}
