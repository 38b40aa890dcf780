//! Pitch → vertical position under the active clef.

use crate::model::{Clef, ClefSign, Step};

/// Staff steps from middle C (C4 = 0, D4 = 1, B3 = -1).
pub fn steps_from_middle_c(step: Step, octave: i32) -> i32 {
    octave.saturating_sub(4).saturating_mul(7).saturating_add(step.index())
}

/// The pitch (in steps from middle C) that sits on the clef's line, and that line.
fn clef_reference(clef: &Clef) -> (i32, i32) {
    match clef.sign {
        ClefSign::F => (steps_from_middle_c(Step::F, 3), clef.effective_line()),
        ClefSign::C => (0, clef.effective_line()),
        ClefSign::G => (steps_from_middle_c(Step::G, 4), clef.effective_line()),
        // Percussion and unrecognized clefs position display steps like a treble clef.
        ClefSign::Percussion | ClefSign::None | ClefSign::Tab | ClefSign::Unknown => {
            (steps_from_middle_c(Step::G, 4), 2)
        }
    }
}

/// Y coordinate of a notehead at `step`/`octave` on a staff whose top line is
/// at `staff_base_y`. Lines are numbered from the bottom (line 1) to the top.
///
/// The clef's octave change shifts the written position by seven steps per
/// octave: a treble-8vb clef (octave change -1) draws E3 where a plain treble
/// clef draws E4.
pub fn vertical_offset(
    step: Step,
    octave: i32,
    clef: &Clef,
    staff_lines: i32,
    staff_base_y: f64,
    line_spacing: f64,
) -> f64 {
    let written = steps_from_middle_c(step, octave).saturating_sub(7 * clef.octave_shift());
    let (ref_steps, ref_line) = clef_reference(clef);
    let ref_y = (staff_lines - ref_line) as f64 * line_spacing;
    staff_base_y + ref_y - (written as f64 - ref_steps as f64) * (line_spacing / 2.0)
}

/// Y coordinate of a tablature string: string 1 on the bottom line.
/// Returns `None` when the staff has no line for that string.
pub fn tab_string_y(string: i32, staff_lines: i32, staff_base_y: f64, line_spacing: f64) -> Option<f64> {
    if string < 1 || string > staff_lines {
        return None;
    }
    Some(staff_base_y + (staff_lines - string) as f64 * line_spacing)
}

/// Y of the staff's middle line (or middle space for even line counts).
pub fn staff_middle_y(staff_lines: i32, staff_base_y: f64, line_spacing: f64) -> f64 {
    staff_base_y + (staff_lines - 1).max(0) as f64 * line_spacing / 2.0
}

// ── Key signature positions ─────────────────────────────────────────

/// Sharps in order F C G D A E B, in half-spaces relative to the clef table.
const SHARP_ORDER: [i32; 7] = [0, -3, 1, -2, -5, -1, -4];
/// Flats in order B E A D G C F.
const FLAT_ORDER: [i32; 7] = [-4, -1, -5, -2, -6, -3, -7];

/// Shift applied to the order tables for a clef; `None` for clefs that carry
/// no key signature (percussion, TAB, none).
fn key_clef_adjust(clef: &Clef) -> Option<i32> {
    let line = clef.effective_line();
    match clef.sign {
        ClefSign::G => Some(10 + 2 * (line - 2)),
        ClefSign::F => Some(8 + 2 * (line - 4)),
        // Tenor and baritone drop an octave to keep accidentals on the staff.
        ClefSign::C => Some(match line {
            5 => 6,
            4 => 4,
            2 => 7,
            1 => 5,
            _ => 9,
        }),
        ClefSign::Percussion | ClefSign::Tab | ClefSign::None | ClefSign::Unknown => None,
    }
}

/// Vertical offsets below the top staff line of each key-signature accidental.
/// Positive fifths are sharps, negative are flats; at most seven are placed.
pub fn key_signature_offsets(fifths: i32, clef: &Clef, line_spacing: f64) -> Vec<f64> {
    let Some(adjust) = key_clef_adjust(clef) else {
        return Vec::new();
    };
    let order: &[i32; 7] = if fifths > 0 { &SHARP_ORDER } else { &FLAT_ORDER };
    let count = fifths.unsigned_abs().min(7) as usize;
    order[..count]
        .iter()
        .map(|base| (10 - (base + adjust)) as f64 * (line_spacing / 2.0))
        .collect()
}
