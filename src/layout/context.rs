//! Clef / key / time context for one part.
//!
//! The context is a value: [`PartContext::with_attributes`] returns the
//! context after an `Attributes` element instead of mutating shared state, so
//! the driver threads it through a part as an accumulator.

use std::collections::BTreeMap;

use crate::model::{Attributes, Clef, ClefSign, Element, Part};

use super::constants::DEFAULT_STAFF_LINES;
use super::spacing::Meter;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartContext {
    clefs: BTreeMap<i32, Clef>,
    staff_lines: BTreeMap<i32, i32>,
    fifths: i32,
    meter: Meter,
}

/// What an `Attributes` element changed, as seen by the engraver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextChange {
    /// Staves whose clef was replaced by a different one
    pub clefs: Vec<i32>,
    /// Previous and new fifths when the key signature changed
    pub key: Option<(i32, i32)>,
    pub time: bool,
}

impl ContextChange {
    pub fn is_empty(&self) -> bool {
        self.clefs.is_empty() && self.key.is_none() && !self.time
    }
}

impl PartContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context in force at the first note of `part`: every `Attributes`
    /// element of the first measure that precedes its first note or backup.
    pub fn initial(part: &Part) -> Self {
        let mut ctx = Self::new();
        let Some(first) = part.measures.first() else {
            return ctx;
        };
        for el in &first.elements {
            match el {
                Element::Attributes(a) => ctx = ctx.with_attributes(a),
                Element::Note(_) | Element::Backup(_) => break,
                Element::Harmony(_) | Element::Barline(_) => {}
            }
        }
        ctx
    }

    /// The context after applying `attrs`. Clefs replace the previous clef of
    /// their staff; everything not mentioned carries over.
    pub fn with_attributes(&self, attrs: &Attributes) -> Self {
        let mut next = self.clone();
        for clef in attrs.clefs.iter().filter(|c| c.staff > 0) {
            next.clefs.insert(clef.staff, *clef);
        }
        for details in attrs.staff_details.iter().filter(|d| d.staff > 0 && d.lines > 0) {
            next.staff_lines.insert(details.staff, details.lines);
        }
        if let Some(key) = attrs.key {
            next.fifths = key.fifths.clamp(-7, 7);
        }
        next.meter = self.meter.absorb(attrs);
        next
    }

    /// Differences between `self` and a later context.
    pub fn change_to(&self, next: &PartContext) -> ContextChange {
        let staves: std::collections::BTreeSet<i32> =
            self.clefs.keys().chain(next.clefs.keys()).copied().collect();
        ContextChange {
            clefs: staves
                .into_iter()
                .filter(|s| engraved(&self.clef(*s)) != engraved(&next.clef(*s)))
                .collect(),
            key: (self.fifths != next.fifths).then_some((self.fifths, next.fifths)),
            time: self.meter.beats != next.meter.beats
                || self.meter.beat_type != next.meter.beat_type,
        }
    }

    /// Active clef for a staff; treble when none was declared.
    pub fn clef(&self, staff: i32) -> Clef {
        self.clefs
            .get(&staff)
            .copied()
            .unwrap_or_else(|| Clef::treble(staff))
    }

    pub fn lines(&self, staff: i32) -> i32 {
        self.staff_lines
            .get(&staff)
            .copied()
            .unwrap_or(DEFAULT_STAFF_LINES)
    }

    pub fn is_tab(&self, staff: i32) -> bool {
        self.clef(staff).is_tab()
    }

    pub fn fifths(&self) -> i32 {
        self.fifths
    }

    pub fn meter(&self) -> Meter {
        self.meter
    }
}

/// The parts of a clef that affect its glyph and note positions.
fn engraved(clef: &Clef) -> (ClefSign, i32, i32) {
    (clef.sign, clef.effective_line(), clef.octave_change.unwrap_or(0))
}
