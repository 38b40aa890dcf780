//! Staff furniture: staff lines, clefs, key and time signatures, barlines
//! and chord symbols.

use crate::model::{AccidentalValue, BarStyle, Clef, ClefSign, Harmony, HarmonyKind};

use super::constants::*;
use super::fretboard::{frame_size, fretboard_geometry};
use super::geometry::{GeometryBuilder, Shape};
use super::pitch::{key_signature_offsets, staff_middle_y};

/// Vertical placement of one staff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct StaffFrame {
    /// y of the top line
    pub(super) top: f64,
    pub(super) lines: i32,
    pub(super) spacing: f64,
}

impl StaffFrame {
    pub(super) fn bottom(&self) -> f64 {
        self.top + (self.lines - 1).max(0) as f64 * self.spacing
    }

    pub(super) fn middle(&self) -> f64 {
        staff_middle_y(self.lines, self.top, self.spacing)
    }

    /// y of `line`, counted from the bottom line (1).
    pub(super) fn line_y(&self, line: i32) -> f64 {
        self.top + (self.lines - line) as f64 * self.spacing
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Staff lines and clefs
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn emit_staff_lines(b: &mut GeometryBuilder, staff: &StaffFrame, x1: f64, x2: f64) {
    for i in 0..staff.lines {
        b.line(x1, x2, staff.top + i as f64 * staff.spacing, STAFF_LINE_WIDTH);
    }
}

/// Emit a clef marker. Clefs without a reference line (percussion, TAB) are
/// centered on the staff; `none` emits nothing.
pub(super) fn emit_clef(b: &mut GeometryBuilder, staff: &StaffFrame, x: f64, staff_number: i32, clef: &Clef) {
    let (sign, y, line) = match clef.sign {
        ClefSign::None => return,
        ClefSign::G | ClefSign::F | ClefSign::C => {
            let line = clef.effective_line();
            (clef.sign, staff.line_y(line), line)
        }
        ClefSign::Percussion | ClefSign::Tab => (clef.sign, staff.middle(), (staff.lines + 1) / 2),
        ClefSign::Unknown => (ClefSign::G, staff.line_y(2), 2),
    };
    b.push(Shape::Clef {
        x: x + CLEF_X_OFFSET,
        y,
        staff: staff_number,
        sign,
        line,
        octave_change: clef.octave_shift(),
    });
}

// ═══════════════════════════════════════════════════════════════════════
// Key signatures
// ═══════════════════════════════════════════════════════════════════════

/// Horizontal room taken by a key signature, including the trailing gap.
pub(super) fn key_sig_width(fifths: i32) -> f64 {
    if fifths == 0 {
        return 0.0;
    }
    fifths.unsigned_abs().min(7) as f64 * KEY_SIG_ACCIDENTAL_SPACE + KEY_SIG_GAP
}

/// Naturals needed to cancel `old_fifths` when switching to `new_fifths`.
pub(super) fn cancellation_natural_count(old_fifths: i32, new_fifths: i32) -> u32 {
    if old_fifths == 0 {
        return 0;
    }
    let same_direction = (old_fifths > 0 && new_fifths > 0) || (old_fifths < 0 && new_fifths < 0);

    if same_direction {
        old_fifths.unsigned_abs().saturating_sub(new_fifths.unsigned_abs())
    } else {
        old_fifths.unsigned_abs()
    }
}

/// Emit a key signature at `x`; returns the horizontal space used.
pub(super) fn emit_key_signature(b: &mut GeometryBuilder, staff: &StaffFrame, x: f64, fifths: i32, clef: &Clef) -> f64 {
    let accidental = if fifths > 0 {
        AccidentalValue::Sharp
    } else {
        AccidentalValue::Flat
    };
    let offsets = key_signature_offsets(fifths, clef, staff.spacing);
    for (i, dy) in offsets.iter().enumerate() {
        b.push(Shape::KeyAccidental {
            x: x + i as f64 * KEY_SIG_ACCIDENTAL_SPACE,
            y: staff.top + dy,
            accidental,
        });
    }
    if offsets.is_empty() {
        0.0
    } else {
        key_sig_width(fifths)
    }
}

/// Emit a mid-part key change: naturals for the accidentals that no longer
/// apply, then the new signature. Returns the horizontal space used.
pub(super) fn emit_key_change(
    b: &mut GeometryBuilder,
    staff: &StaffFrame,
    x: f64,
    old_fifths: i32,
    new_fifths: i32,
    clef: &Clef,
) -> f64 {
    let old = key_signature_offsets(old_fifths, clef, staff.spacing);
    let cancelled = (cancellation_natural_count(old_fifths, new_fifths) as usize).min(old.len());
    let mut cx = x;
    for dy in &old[old.len() - cancelled..] {
        b.push(Shape::KeyAccidental {
            x: cx,
            y: staff.top + dy,
            accidental: AccidentalValue::Natural,
        });
        cx += KEY_SIG_ACCIDENTAL_SPACE;
    }
    if cancelled > 0 {
        cx += KEY_SIG_GAP;
    }
    cx += emit_key_signature(b, staff, cx, new_fifths, clef);
    cx - x
}

// ═══════════════════════════════════════════════════════════════════════
// Time signatures
// ═══════════════════════════════════════════════════════════════════════

fn digits(n: i32) -> Vec<u32> {
    n.unsigned_abs()
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect()
}

/// Emit numerator and denominator digits centered on `center_x`, one row
/// above and one below the middle line.
pub(super) fn emit_time_signature(b: &mut GeometryBuilder, staff: &StaffFrame, center_x: f64, beats: i32, beat_type: i32) {
    let middle = staff.middle();
    for (value, y) in [
        (beats, middle - TIME_SIG_HALF_HEIGHT),
        (beat_type, middle + TIME_SIG_HALF_HEIGHT),
    ] {
        let row = digits(value);
        let first = center_x - (row.len() as f64 - 1.0) * TIME_SIG_DIGIT_WIDTH / 2.0;
        for (i, digit) in row.into_iter().enumerate() {
            b.push(Shape::TimeDigit {
                x: first + i as f64 * TIME_SIG_DIGIT_WIDTH,
                y,
                digit,
            });
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Barlines
// ═══════════════════════════════════════════════════════════════════════

/// Strokes of a barline style as (x offset, width), right-aligned so the
/// barline ends at the measure boundary.
fn barline_strokes(style: BarStyle) -> Vec<(f64, f64)> {
    let light = BARLINE_WIDTH;
    let heavy = HEAVY_BARLINE_WIDTH;
    let gap = DOUBLE_BARLINE_GAP;
    match style {
        BarStyle::None => Vec::new(),
        BarStyle::Heavy => vec![(-heavy / 2.0, heavy)],
        BarStyle::LightLight => vec![(-gap, light), (0.0, light)],
        BarStyle::LightHeavy => vec![(-heavy / 2.0 - gap, light), (-heavy / 2.0, heavy)],
        BarStyle::HeavyLight => vec![(heavy / 2.0, heavy), (heavy / 2.0 + gap, light)],
        BarStyle::HeavyHeavy => vec![(-heavy * 1.5 - gap, heavy), (-heavy / 2.0, heavy)],
        BarStyle::Regular
        | BarStyle::Dotted
        | BarStyle::Dashed
        | BarStyle::Tick
        | BarStyle::Short
        | BarStyle::Unknown => vec![(0.0, light)],
    }
}

/// Emit a barline spanning `top..bottom`. Tick and short styles cover only
/// part of the span.
pub(super) fn emit_barline(b: &mut GeometryBuilder, x: f64, top: f64, bottom: f64, spacing: f64, style: BarStyle) {
    let style = if style == BarStyle::Unknown {
        BarStyle::Regular
    } else {
        style
    };
    let (y1, y2) = match style {
        BarStyle::Tick => (top - spacing / 2.0, top + spacing / 2.0),
        BarStyle::Short => (top + spacing, (bottom - spacing).max(top + spacing)),
        _ => (top, bottom),
    };
    for (dx, width) in barline_strokes(style) {
        b.push(Shape::Barline {
            x: x + dx,
            y1,
            y2,
            width,
            style,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Harmony
// ═══════════════════════════════════════════════════════════════════════

fn kind_suffix(kind: HarmonyKind) -> &'static str {
    match kind {
        HarmonyKind::Major | HarmonyKind::None | HarmonyKind::Other => "",
        HarmonyKind::Minor => "m",
        HarmonyKind::Augmented => "+",
        HarmonyKind::Diminished => "°",
        HarmonyKind::Dominant => "7",
        HarmonyKind::MajorSeventh => "maj7",
        HarmonyKind::MinorSeventh => "m7",
        HarmonyKind::DiminishedSeventh => "°7",
        HarmonyKind::HalfDiminished => "ø7",
        HarmonyKind::MajorMinor => "m(maj7)",
        HarmonyKind::MajorSixth => "6",
        HarmonyKind::MinorSixth => "m6",
        HarmonyKind::DominantNinth => "9",
        HarmonyKind::MajorNinth => "maj9",
        HarmonyKind::MinorNinth => "m9",
        HarmonyKind::Dominant11th => "11",
        HarmonyKind::Dominant13th => "13",
        HarmonyKind::SuspendedFourth => "sus4",
        HarmonyKind::SuspendedSecond => "sus2",
        HarmonyKind::Power => "5",
    }
}

fn alter_sign(alter: Option<f64>) -> &'static str {
    match alter {
        Some(a) if a > 0.0 => "#",
        Some(a) if a < 0.0 => "♭",
        _ => "",
    }
}

/// Display text of a chord symbol: root, alteration, kind suffix (or the
/// harmony's own text) and an optional `/bass`. `None` when there is
/// nothing to show.
pub(super) fn chord_symbol_text(harmony: &Harmony) -> Option<String> {
    let mut text = String::new();
    if let Some(root) = harmony.root {
        text.push_str(root.step.name());
        text.push_str(alter_sign(root.alter));
    }
    match harmony.text.as_deref() {
        Some(t) => text.push_str(t),
        None => text.push_str(kind_suffix(harmony.kind)),
    }
    if let Some(bass) = harmony.bass {
        text.push('/');
        text.push_str(bass.step.name());
        text.push_str(alter_sign(bass.alter));
    }
    (!text.is_empty()).then_some(text)
}

/// Emit a chord symbol above the staff, with its fretboard diagram (if any)
/// centered above the text. Returns `false` when the harmony had a frame
/// that could not be laid out.
pub(super) fn emit_harmony(b: &mut GeometryBuilder, staff: &StaffFrame, x: f64, harmony: &Harmony) -> bool {
    let text_y = staff.top + CHORD_SYMBOL_OFFSET_Y;
    if let Some(text) = chord_symbol_text(harmony) {
        b.push(Shape::ChordSymbol { x, y: text_y, text });
    }
    let Some(ref frame) = harmony.frame else {
        return true;
    };
    let Some((width, height)) = frame_size(frame) else {
        return false;
    };
    let origin_y = text_y - FRAME_TEXT_GAP - height;
    match fretboard_geometry(frame, x - width / 2.0, origin_y) {
        Some(geometry) => {
            b.push(Shape::FretboardDiagram(geometry));
            true
        }
        None => false,
    }
}
