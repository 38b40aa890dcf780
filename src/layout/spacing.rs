//! Duration → horizontal space.
//!
//! Widths are linear in duration: one quarter note advances `unit` pixels,
//! so a measure spans `beats × 4 / beat_type` quarters.

use crate::model::{Attributes, Element, Part};

const DEFAULT_BEATS: i32 = 4;
const DEFAULT_BEAT_TYPE: i32 = 4;
const DEFAULT_DIVISIONS: i32 = 1;

/// Horizontal span of a full measure.
pub fn measure_width(beats: i32, beat_type: i32, divisions: i32, unit: f64) -> f64 {
    // The measure holds beats × (4 / beat_type) quarters, i.e. that many
    // × divisions ticks, each worth unit / divisions pixels.
    let ticks = beats as f64 * 4.0 / beat_type as f64 * divisions as f64;
    element_spacing_f(ticks, divisions, unit)
}

/// Horizontal advance of an element lasting `duration` divisions.
pub fn element_spacing(duration: i32, divisions: i32, unit: f64) -> f64 {
    element_spacing_f(duration as f64, divisions, unit)
}

fn element_spacing_f(duration: f64, divisions: i32, unit: f64) -> f64 {
    duration / divisions.max(1) as f64 * unit
}

/// Time signature and divisions in effect for a part.
///
/// Values are sticky: zero or missing fields in later attributes keep the
/// previously seen value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meter {
    pub beats: i32,
    pub beat_type: i32,
    pub divisions: i32,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            beats: DEFAULT_BEATS,
            beat_type: DEFAULT_BEAT_TYPE,
            divisions: DEFAULT_DIVISIONS,
        }
    }
}

impl Meter {
    /// The meter after applying `attrs`.
    pub fn absorb(self, attrs: &Attributes) -> Self {
        let mut next = self;
        if let Some(d) = attrs.divisions.filter(|d| *d > 0) {
            next.divisions = d;
        }
        if let Some(ref t) = attrs.time {
            if t.beats > 0 {
                next.beats = t.beats;
            }
            if t.beat_type > 0 {
                next.beat_type = t.beat_type;
            }
        }
        next
    }

    pub fn measure_width(&self, unit: f64) -> f64 {
        measure_width(self.beats, self.beat_type, self.divisions, unit)
    }

    pub fn spacing(&self, duration: i32, unit: f64) -> f64 {
        element_spacing(duration, self.divisions, unit)
    }
}

/// Furthest cursor position reached by a measure's content, relative to its
/// first note, replaying chord carry-over and backups the way the layout
/// driver does.
pub fn content_span(elements: &[Element], meter: Meter, unit: f64) -> (f64, Meter) {
    let mut meter = meter;
    let mut cursor = 0.0_f64;
    let mut pending = 0.0_f64;
    let mut furthest = 0.0_f64;
    let mut have_head = false;

    for el in elements {
        match el {
            Element::Attributes(a) => meter = meter.absorb(a),
            Element::Note(n) => {
                let Some(duration) = n.duration.filter(|d| *d >= 0) else {
                    continue;
                };
                if !n.octave_in_range() {
                    continue;
                }
                if n.chord && have_head && !n.is_rest() {
                    continue;
                }
                cursor += pending;
                pending = meter.spacing(duration, unit);
                have_head = !n.is_rest();
                furthest = furthest.max(cursor + pending);
            }
            Element::Backup(b) if b.duration >= 0 => {
                cursor += pending;
                pending = 0.0;
                cursor = (cursor - meter.spacing(b.duration, unit)).max(0.0);
            }
            Element::Backup(_) | Element::Harmony(_) | Element::Barline(_) => {}
        }
    }
    (furthest.max(cursor + pending), meter)
}

/// Width of every measure of a part: the nominal width from the time
/// signature, widened when the content needs more room.
pub fn part_measure_widths(part: &Part, unit: f64) -> Vec<f64> {
    let mut meter = Meter::default();
    let mut widths = Vec::with_capacity(part.measures.len());
    for measure in &part.measures {
        // Notes are measured with the divisions in force where they stand;
        // time changes take effect for the measure that declares them.
        let (content, end) = content_span(&measure.elements, meter, unit);
        meter = end;
        widths.push(meter.measure_width(unit).max(content));
    }
    widths
}
