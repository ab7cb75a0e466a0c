//! Track events and their ordering.

use std::cmp::Ordering;

/// Note-on status byte (channel 1).
pub const STATUS_NOTE_ON: u8 = 0x90;
/// Note-off status byte (channel 1).
pub const STATUS_NOTE_OFF: u8 = 0x80;
/// Meta-event prefix.
pub const STATUS_META: u8 = 0xFF;

const META_TEMPO: u8 = 0x51;

/// One event of the single output track, without its delta time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEvent {
    /// Set tempo meta-event (24-bit microseconds per quarter note)
    Tempo { micros_per_quarter: u32 },
    NoteOn { key: u8, velocity: u8 },
    /// Written as 0x80 with velocity 0
    NoteOff { key: u8 },
}

impl TrackEvent {
    /// First byte on the wire; also the tie-break key for equal ticks.
    pub fn status(&self) -> u8 {
        match self {
            TrackEvent::Tempo { .. } => STATUS_META,
            TrackEvent::NoteOn { .. } => STATUS_NOTE_ON,
            TrackEvent::NoteOff { .. } => STATUS_NOTE_OFF,
        }
    }

    /// Append the event bytes (no delta time).
    pub fn write(&self, out: &mut Vec<u8>) {
        match *self {
            TrackEvent::Tempo { micros_per_quarter } => {
                let [_, hi, mid, lo] = micros_per_quarter.to_be_bytes();
                out.extend_from_slice(&[STATUS_META, META_TEMPO, 0x03, hi, mid, lo]);
            }
            TrackEvent::NoteOn { key, velocity } => {
                out.extend_from_slice(&[STATUS_NOTE_ON, key, velocity]);
            }
            TrackEvent::NoteOff { key } => {
                out.extend_from_slice(&[STATUS_NOTE_OFF, key, 0]);
            }
        }
    }
}

/// An event at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u32,
    pub event: TrackEvent,
}

impl TimedEvent {
    pub fn new(tick: u32, event: TrackEvent) -> Self {
        Self { tick, event }
    }
}

/// Track order: tick ascending, then status byte ascending.
///
/// At equal ticks a note-off (0x80) precedes a note-on (0x90), and the tempo
/// meta-event (0xFF) comes last.
pub fn event_order(a: &TimedEvent, b: &TimedEvent) -> Ordering {
    a.tick
        .cmp(&b.tick)
        .then_with(|| a.event.status().cmp(&b.event.status()))
}

/// Stable sort by [`event_order`]; events equal under it keep insertion order.
pub fn sort_events(events: &mut [TimedEvent]) {
    events.sort_by(event_order);
}
