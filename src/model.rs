//! Data model for the score consumed by the layout engine.
//!
//! The model mirrors MusicXML's partwise "cursor" structure: a measure is an
//! ordered list of elements, and the order is significant. It is produced by
//! an external parser and treated as immutable input.

use serde::{Deserialize, Serialize};

/// A complete musical score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// Musical parts (instruments), top to bottom
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Classical Guitar")
    pub name: Option<String>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measure {
    /// Measure number as written in the source (may be "0" for a pickup, "12a", ...)
    pub number: String,
    /// Ordered elements; order follows notation semantics
    pub elements: Vec<Element>,
}

/// One entry of a measure's element stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Element {
    Attributes(Attributes),
    Harmony(Harmony),
    Note(Note),
    Backup(Backup),
    Barline(Barline),
}

// ─── Attributes ──────────────────────────────────────────────────────

/// Musical attributes; only the fields that change are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Divisions per quarter note (determines duration resolution)
    pub divisions: Option<i32>,
    /// Key signature
    pub key: Option<Key>,
    /// Time signature
    pub time: Option<Time>,
    /// Number of staves in this part (e.g. 2 for piano grand staff)
    pub staves: Option<i32>,
    /// Clef(s), each tagged with its staff number
    pub clefs: Vec<Clef>,
    /// Per-staff line counts (tablature, percussion)
    pub staff_details: Vec<StaffDetails>,
}

/// Key signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

/// Clef definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clef {
    /// Staff number this clef belongs to (1-based)
    #[serde(default = "default_staff")]
    pub staff: i32,
    /// Clef sign
    pub sign: ClefSign,
    /// Staff line the clef sits on, counted from the bottom
    #[serde(default)]
    pub line: Option<i32>,
    /// Octave transposition (e.g., -1 for guitar's octave-lower treble clef)
    #[serde(default)]
    pub octave_change: Option<i32>,
}

fn default_staff() -> i32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClefSign {
    G,
    F,
    C,
    #[serde(rename = "percussion")]
    Percussion,
    #[serde(rename = "TAB")]
    Tab,
    #[serde(rename = "none")]
    None,
    #[serde(other)]
    Unknown,
}

/// Line count for one staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffDetails {
    #[serde(default = "default_staff")]
    pub staff: i32,
    pub lines: i32,
}

impl Clef {
    /// Treble clef (G on line 2) for the given staff.
    pub fn treble(staff: i32) -> Self {
        Self {
            staff,
            sign: ClefSign::G,
            line: Some(2),
            octave_change: None,
        }
    }

    /// Bass clef (F on line 4) for the given staff.
    pub fn bass(staff: i32) -> Self {
        Self {
            staff,
            sign: ClefSign::F,
            line: Some(4),
            octave_change: None,
        }
    }

    /// The line the clef sits on, falling back to the sign's customary line.
    pub fn effective_line(&self) -> i32 {
        match (self.line, self.sign) {
            (Some(l), _) if (1..=5).contains(&l) => l,
            (_, ClefSign::F) => 4,
            (_, ClefSign::C) => 3,
            _ => 2,
        }
    }

    pub fn is_tab(&self) -> bool {
        self.sign == ClefSign::Tab
    }

    /// Octave transposition, limited to four octaves either way.
    pub fn octave_shift(&self) -> i32 {
        self.octave_change.unwrap_or(0).clamp(-4, 4)
    }
}

// ─── Notes ───────────────────────────────────────────────────────────

/// Octaves a note may be written in (MusicXML octave numbers).
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = 0..=9;

/// A single note or rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    /// Duration in divisions; required, `None` marks malformed input
    pub duration: Option<i32>,
    /// Pitch (None for rests and unpitched notes)
    pub pitch: Option<Pitch>,
    /// Display position for percussion notes
    pub unpitched: Option<Unpitched>,
    /// Rest marker
    pub rest: Option<Rest>,
    /// Whether this note sounds together with the previous note
    pub chord: bool,
    /// Staff number (1-based); defaults to 1
    pub staff: Option<i32>,
    /// Duration class, governs notehead fill, stem and flags
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    /// Augmentation dot count
    pub dots: u32,
    pub accidental: Option<AccidentalValue>,
    pub stem: Option<Stem>,
    pub notehead: Option<NoteheadValue>,
    pub notations: Notations,
}

impl Note {
    pub fn staff(&self) -> i32 {
        self.staff.filter(|s| *s > 0).unwrap_or(1)
    }

    pub fn is_rest(&self) -> bool {
        self.rest.is_some()
    }

    /// The step/octave used for vertical placement, if the note has one.
    pub fn display_position(&self) -> Option<(Step, i32)> {
        if let Some(ref p) = self.pitch {
            return Some((p.step, p.octave));
        }
        if let Some(ref u) = self.unpitched {
            return Some((u.display_step, u.display_octave));
        }
        match self.rest {
            Some(Rest {
                display_step: Some(step),
                display_octave: Some(octave),
                ..
            }) => Some((step, octave)),
            _ => None,
        }
    }

    /// False when the note's display octave cannot be placed on a staff.
    pub fn octave_in_range(&self) -> bool {
        self.display_position()
            .map_or(true, |(_, octave)| OCTAVE_RANGE.contains(&octave))
    }
}

/// Pitch of a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp
    #[serde(default)]
    pub alter: Option<f64>,
}

/// Display position of a percussion note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpitched {
    pub display_step: Step,
    pub display_octave: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rest {
    /// Whole-measure rest
    pub measure: bool,
    pub display_step: Option<Step>,
    pub display_octave: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Step {
    /// Diatonic index counted from C.
    pub fn index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::A => "A",
            Step::B => "B",
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteType {
    #[serde(rename = "maxima")]
    Maxima,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "breve")]
    Breve,
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "eighth")]
    Eighth,
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "32nd")]
    ThirtySecond,
    #[serde(rename = "64th")]
    SixtyFourth,
    #[serde(rename = "128th")]
    OneHundredTwentyEighth,
    #[serde(rename = "256th")]
    TwoHundredFiftySixth,
    #[serde(rename = "512th")]
    FiveHundredTwelfth,
    #[serde(rename = "1024th")]
    OneThousandTwentyFourth,
    #[serde(other)]
    Unknown,
}

impl NoteType {
    pub fn flag_count(self) -> u8 {
        match self {
            NoteType::Eighth => 1,
            NoteType::Sixteenth => 2,
            NoteType::ThirtySecond => 3,
            NoteType::SixtyFourth => 4,
            NoteType::OneHundredTwentyEighth => 5,
            NoteType::TwoHundredFiftySixth => 6,
            NoteType::FiveHundredTwelfth => 7,
            NoteType::OneThousandTwentyFourth => 8,
            _ => 0,
        }
    }

    /// Open (unfilled) notehead.
    pub fn is_hollow(self) -> bool {
        matches!(
            self,
            NoteType::Maxima | NoteType::Long | NoteType::Breve | NoteType::Whole | NoteType::Half
        )
    }

    pub fn has_stem(self) -> bool {
        !matches!(
            self,
            NoteType::Maxima | NoteType::Long | NoteType::Breve | NoteType::Whole
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stem {
    Up,
    Down,
    Double,
    None,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccidentalValue {
    Sharp,
    Natural,
    Flat,
    DoubleSharp,
    SharpSharp,
    FlatFlat,
    NaturalSharp,
    NaturalFlat,
    QuarterFlat,
    QuarterSharp,
    ThreeQuartersFlat,
    ThreeQuartersSharp,
    TripleSharp,
    TripleFlat,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteheadValue {
    #[serde(rename = "arrow down")]
    ArrowDown,
    #[serde(rename = "arrow up")]
    ArrowUp,
    #[serde(rename = "back slashed")]
    BackSlashed,
    #[serde(rename = "circle dot")]
    CircleDot,
    #[serde(rename = "circle-x")]
    CircleX,
    #[serde(rename = "circled")]
    Circled,
    #[serde(rename = "cluster")]
    Cluster,
    #[serde(rename = "cross")]
    Cross,
    #[serde(rename = "diamond")]
    Diamond,
    #[serde(rename = "do")]
    Do,
    #[serde(rename = "fa")]
    Fa,
    #[serde(rename = "fa up")]
    FaUp,
    #[serde(rename = "inverted triangle")]
    InvertedTriangle,
    #[serde(rename = "la")]
    La,
    #[serde(rename = "left triangle")]
    LeftTriangle,
    #[serde(rename = "mi")]
    Mi,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "re")]
    Re,
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "slash")]
    Slash,
    #[serde(rename = "slashed")]
    Slashed,
    #[serde(rename = "so")]
    So,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "ti")]
    Ti,
    #[serde(rename = "triangle")]
    Triangle,
    #[serde(rename = "x")]
    X,
    #[serde(other)]
    Unknown,
}

// ─── Notations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notations {
    pub ties: Vec<Tie>,
    pub slurs: Vec<Slur>,
    pub tuplets: Vec<Tuplet>,
    pub technical: Vec<Technical>,
}

/// Start/stop/continue marker shared by ties, slurs and tuplets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartStop {
    Start,
    Stop,
    Continue,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tie {
    #[serde(rename = "type")]
    pub kind: StartStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slur {
    #[serde(rename = "type")]
    pub kind: StartStop,
    /// Nesting number (1..N)
    #[serde(default = "default_number")]
    pub number: i32,
    #[serde(default)]
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuplet {
    #[serde(rename = "type")]
    pub kind: StartStop,
    #[serde(default = "default_number")]
    pub number: i32,
    #[serde(default)]
    pub placement: Option<Placement>,
}

fn default_number() -> i32 {
    1
}

/// String and fret for tablature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technical {
    pub string: i32,
    pub fret: i32,
}

// ─── Harmony ─────────────────────────────────────────────────────────

/// A chord symbol attached at a point in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmony {
    #[serde(default)]
    pub root: Option<HarmonyRoot>,
    pub kind: HarmonyKind,
    /// Display text overriding the kind suffix
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bass: Option<HarmonyRoot>,
    /// Offset from the current position, in divisions
    #[serde(default)]
    pub offset: Option<i32>,
    #[serde(default)]
    pub staff: Option<i32>,
    #[serde(default)]
    pub frame: Option<Frame>,
}

/// Root or bass note of a harmony.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonyRoot {
    pub step: Step,
    /// Alteration: -1 = flat, 1 = sharp
    #[serde(default)]
    pub alter: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonyKind {
    Major,
    Minor,
    Augmented,
    Diminished,
    Dominant,
    MajorSeventh,
    MinorSeventh,
    DiminishedSeventh,
    HalfDiminished,
    MajorMinor,
    MajorSixth,
    MinorSixth,
    DominantNinth,
    MajorNinth,
    MinorNinth,
    #[serde(rename = "dominant-11th")]
    Dominant11th,
    #[serde(rename = "dominant-13th")]
    Dominant13th,
    SuspendedFourth,
    SuspendedSecond,
    Power,
    None,
    #[serde(other)]
    Other,
}

/// Fretboard diagram attached to a harmony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub strings: i32,
    pub frets: i32,
    #[serde(default)]
    pub first_fret: Option<i32>,
    #[serde(default)]
    pub notes: Vec<FrameNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameNote {
    pub string: i32,
    pub fret: i32,
    #[serde(default)]
    pub fingering: Option<i32>,
    #[serde(default)]
    pub barre: Option<BarreKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarreKind {
    Start,
    Stop,
}

// ─── Cursor and barlines ─────────────────────────────────────────────

/// Cursor rewind used for independent voices/staves sharing a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub duration: i32,
}

/// An explicit barline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barline {
    #[serde(default)]
    pub location: BarLocation,
    #[serde(default)]
    pub style: BarStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarLocation {
    Left,
    #[default]
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarStyle {
    #[default]
    Regular,
    Dotted,
    Dashed,
    Heavy,
    LightLight,
    LightHeavy,
    HeavyLight,
    HeavyHeavy,
    Tick,
    Short,
    None,
    #[serde(other)]
    Unknown,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }
}
