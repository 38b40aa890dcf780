//! Output geometry and the builder that accumulates it.
//!
//! Every primitive carries the part / measure / element indices it came from
//! so a drawing back-end can re-render incrementally. Coordinates are final:
//! nothing downstream needs clefs, pitches or durations.

use serde::Serialize;

use crate::model::{AccidentalValue, BarStyle, ClefSign, NoteType, NoteheadValue};

use super::curves::Curve;
use super::fretboard::FretboardGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Stable identity of a primitive. `measure` is `None` for the part prefix
/// (initial clef, key and time); `element` is `None` for measure furniture
/// such as staff lines and boundary barlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GeometryKey {
    pub part: usize,
    pub measure: Option<usize>,
    pub element: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    #[serde(flatten)]
    pub key: GeometryKey,
    #[serde(flatten)]
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Shape {
    StaffLine {
        x1: f64,
        x2: f64,
        y: f64,
        width: f64,
    },
    Barline {
        x: f64,
        y1: f64,
        y2: f64,
        width: f64,
        style: BarStyle,
    },
    Clef {
        x: f64,
        /// y of the line the clef sits on
        y: f64,
        staff: i32,
        sign: ClefSign,
        line: i32,
        octave_change: i32,
    },
    KeyAccidental {
        x: f64,
        y: f64,
        accidental: AccidentalValue,
    },
    TimeDigit {
        x: f64,
        y: f64,
        digit: u32,
    },
    Notehead {
        x: f64,
        y: f64,
        shape: NoteheadValue,
        filled: bool,
    },
    Rest {
        x: f64,
        y: f64,
        #[serde(rename = "type")]
        note_type: NoteType,
        measure: bool,
    },
    Stem {
        x: f64,
        y1: f64,
        y2: f64,
        width: f64,
    },
    Flag {
        x: f64,
        y: f64,
        count: u8,
        up: bool,
    },
    Dot {
        x: f64,
        y: f64,
        radius: f64,
    },
    LedgerLine {
        x1: f64,
        x2: f64,
        y: f64,
    },
    Accidental {
        x: f64,
        y: f64,
        accidental: AccidentalValue,
    },
    TieCurve(Curve),
    SlurCurve(Curve),
    TupletBracket {
        x1: f64,
        x2: f64,
        y: f64,
        above: bool,
    },
    ChordSymbol {
        x: f64,
        y: f64,
        text: String,
    },
    FretboardDiagram(FretboardGeometry),
    TabFretLabel {
        x: f64,
        y: f64,
        string: i32,
        fret: i32,
    },
}

impl Shape {
    /// The kind tag as it appears in serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::StaffLine { .. } => "staff-line",
            Shape::Barline { .. } => "barline",
            Shape::Clef { .. } => "clef",
            Shape::KeyAccidental { .. } => "key-accidental",
            Shape::TimeDigit { .. } => "time-digit",
            Shape::Notehead { .. } => "notehead",
            Shape::Rest { .. } => "rest",
            Shape::Stem { .. } => "stem",
            Shape::Flag { .. } => "flag",
            Shape::Dot { .. } => "dot",
            Shape::LedgerLine { .. } => "ledger-line",
            Shape::Accidental { .. } => "accidental",
            Shape::TieCurve(_) => "tie-curve",
            Shape::SlurCurve(_) => "slur-curve",
            Shape::TupletBracket { .. } => "tuplet-bracket",
            Shape::ChordSymbol { .. } => "chord-symbol",
            Shape::FretboardDiagram(_) => "fretboard-diagram",
            Shape::TabFretLabel { .. } => "tab-fret-label",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GeometryBuilder
// ═══════════════════════════════════════════════════════════════════════

/// Accumulates one part's primitives in emission order, stamping each with
/// the current measure/element position.
pub(super) struct GeometryBuilder {
    part: usize,
    measure: Option<usize>,
    element: Option<usize>,
    primitives: Vec<Primitive>,
}

impl GeometryBuilder {
    pub(super) fn new(part: usize) -> Self {
        Self {
            part,
            measure: None,
            element: None,
            primitives: Vec::new(),
        }
    }

    /// Subsequent primitives belong to `measure` (`None` for the prefix).
    pub(super) fn enter_measure(&mut self, measure: Option<usize>) {
        self.measure = measure;
        self.element = None;
    }

    pub(super) fn at_element(&mut self, element: Option<usize>) {
        self.element = element;
    }

    pub(super) fn push(&mut self, shape: Shape) {
        self.primitives.push(Primitive {
            key: GeometryKey {
                part: self.part,
                measure: self.measure,
                element: self.element,
            },
            shape,
        });
    }

    /// Push with an explicit position, for primitives that close something
    /// opened elsewhere (curves ending in a later measure are keyed by their end).
    pub(super) fn push_at(&mut self, measure: usize, element: usize, shape: Shape) {
        self.primitives.push(Primitive {
            key: GeometryKey {
                part: self.part,
                measure: Some(measure),
                element: Some(element),
            },
            shape,
        });
    }

    pub(super) fn line(&mut self, x1: f64, x2: f64, y: f64, width: f64) {
        self.push(Shape::StaffLine { x1, x2, y, width });
    }

    pub(super) fn stem(&mut self, x: f64, y1: f64, y2: f64, width: f64) {
        self.push(Shape::Stem { x, y1, y2, width });
    }

    pub(super) fn dot(&mut self, x: f64, y: f64, radius: f64) {
        self.push(Shape::Dot { x, y, radius });
    }

    pub(super) fn build(self) -> Vec<Primitive> {
        self.primitives
    }
}
