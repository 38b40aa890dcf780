//! Note, rest, stem, flag, dot, accidental and ledger line placement for one
//! chord group.

use crate::model::{AccidentalValue, Note, NoteType, NoteheadValue, Stem};

use super::chords::ChordGroup;
use super::constants::*;
use super::geometry::{GeometryBuilder, Shape};
use super::staff::StaffFrame;

/// Everything a chord group needs to be placed.
pub(super) struct GroupPlacement<'a> {
    pub(super) group: &'a ChordGroup,
    /// Member notes, in the group's member order
    pub(super) notes: Vec<&'a Note>,
    pub(super) x: f64,
    /// Staff of each member
    pub(super) staves: Vec<StaffFrame>,
    pub(super) tab: bool,
    /// Horizontal center of the measure, for whole-measure rests
    pub(super) measure_center: f64,
    pub(super) stem_length: f64,
}

/// Resolved facts about a placed group, used for curves and brackets.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct GroupMetrics {
    /// Absolute y of each member
    pub(super) ys: Vec<f64>,
    pub(super) x: f64,
    pub(super) stem_up: bool,
    /// Outermost y on each side, stems included
    pub(super) top: f64,
    pub(super) bottom: f64,
    /// Members with a value outside the known variants: (member, field)
    pub(super) unknown: Vec<(usize, &'static str)>,
}

/// Stem attachment (dx, dy) for an up stem on the given notehead shape.
/// Down stems mirror it.
fn stem_attachment(shape: NoteheadValue) -> (f64, f64) {
    match shape {
        NoteheadValue::Diamond | NoteheadValue::Mi | NoteheadValue::Re | NoteheadValue::Rectangle => (4.4, 0.0),
        NoteheadValue::Do | NoteheadValue::Triangle => (3.5, 3.0),
        NoteheadValue::Cross => (6.0, -1.0),
        NoteheadValue::Slash => (4.0, -3.0),
        NoteheadValue::Square => (3.5, 0.0),
        NoteheadValue::Ti => (4.5, -1.0),
        NoteheadValue::X => (4.0, -3.5),
        NoteheadValue::ArrowDown | NoteheadValue::ArrowUp => (0.0, 0.0),
        NoteheadValue::Fa => (-5.0, -5.0),
        NoteheadValue::FaUp | NoteheadValue::LeftTriangle => (5.0, 5.0),
        NoteheadValue::InvertedTriangle | NoteheadValue::La => (4.0, 0.0),
        _ => (NOTEHEAD_HALF_WIDTH, 0.0),
    }
}

/// Ledger line heights for noteheads spanning `min_y..=max_y` on `staff`.
pub(super) fn ledger_lines(staff: &StaffFrame, min_y: f64, max_y: f64) -> Vec<f64> {
    let half = staff.spacing / 2.0;
    let mut lines = Vec::new();

    let mut y = staff.top - staff.spacing;
    while y > min_y - half {
        lines.push(y);
        y -= staff.spacing;
    }
    let mut y = staff.bottom() + staff.spacing;
    while y < max_y + half {
        lines.push(y);
        y += staff.spacing;
    }
    lines
}

/// Highest and lowest member y on each staff, in first-seen staff order.
fn staff_extents(staves: &[StaffFrame], ys: &[f64]) -> Vec<(StaffFrame, (f64, f64))> {
    let mut extents: Vec<(StaffFrame, (f64, f64))> = Vec::new();
    for (staff, &y) in staves.iter().zip(ys) {
        match extents.iter_mut().find(|(s, _)| s == staff) {
            Some((_, (min_y, max_y))) => {
                *min_y = min_y.min(y);
                *max_y = max_y.max(y);
            }
            None => extents.push((*staff, (y, y))),
        }
    }
    extents
}

/// Whether a notehead at `y` sits on a (staff or ledger) line.
fn on_line(staff: &StaffFrame, y: f64) -> bool {
    let half_steps = ((y - staff.top) / (staff.spacing / 2.0)).round() as i64;
    half_steps.rem_euclid(2) == 0
}

fn emit_dots(b: &mut GeometryBuilder, staff: &StaffFrame, x: f64, y: f64, count: u32) {
    let dot_y = if on_line(staff, y) {
        y - staff.spacing / 2.0
    } else {
        y
    };
    for i in 0..count {
        b.dot(x + DOT_OFFSET_X + i as f64 * DOT_SPACING, dot_y, DOT_RADIUS);
    }
}

fn note_type_of(note: &Note, fallback: NoteType, unknown: &mut Vec<(usize, &'static str)>, member: usize) -> NoteType {
    match note.note_type {
        Some(NoteType::Unknown) => {
            unknown.push((member, "type"));
            fallback
        }
        Some(t) => t,
        None => fallback,
    }
}

/// Emit one chord group. The builder must already point at the group's
/// head element.
pub(super) fn emit_group(b: &mut GeometryBuilder, p: &GroupPlacement<'_>) -> GroupMetrics {
    let ys: Vec<f64> = p
        .group
        .offsets
        .iter()
        .zip(&p.staves)
        .map(|(dy, staff)| staff.top + dy)
        .collect();
    let mut unknown = Vec::new();

    if p.group.is_rest {
        return emit_rest(b, p, ys, unknown);
    }
    if p.tab {
        return emit_tab(b, p, ys);
    }

    let (Some(head), Some(&head_staff)) = (p.notes.first(), p.staves.first()) else {
        return GroupMetrics {
            ys,
            x: p.x,
            stem_up: true,
            top: 0.0,
            bottom: 0.0,
            unknown,
        };
    };
    let head_type = note_type_of(head, NoteType::Quarter, &mut unknown, 0);

    let high = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let low = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // ── Noteheads, accidentals, dots ──
    let mut head_shape = NoteheadValue::Normal;
    for (m, (note, &y)) in p.notes.iter().zip(&ys).enumerate() {
        let staff = &p.staves[m];
        let member_type = if m == 0 {
            head_type
        } else {
            note_type_of(note, head_type, &mut unknown, m)
        };
        let shape = match note.notehead {
            Some(NoteheadValue::Unknown) => {
                unknown.push((m, "notehead"));
                NoteheadValue::Normal
            }
            Some(shape) => shape,
            None => NoteheadValue::Normal,
        };
        if m == 0 {
            head_shape = shape;
        }
        if shape != NoteheadValue::None {
            b.push(Shape::Notehead {
                x: p.x,
                y,
                shape,
                filled: !member_type.is_hollow(),
            });
        }
        match note.accidental {
            Some(AccidentalValue::Unknown) => unknown.push((m, "accidental")),
            Some(accidental) => b.push(Shape::Accidental {
                x: p.x - ACCIDENTAL_OFFSET_X,
                y,
                accidental,
            }),
            None => {}
        }
        emit_dots(b, staff, p.x, y, note.dots);
    }

    // ── Ledger lines, once per staff the group touches ──
    for (staff, (min_y, max_y)) in staff_extents(&p.staves, &ys) {
        for ly in ledger_lines(&staff, min_y, max_y) {
            b.push(Shape::LedgerLine {
                x1: p.x - LEDGER_LINE_WIDTH / 2.0,
                x2: p.x + LEDGER_LINE_WIDTH / 2.0,
                y: ly,
            });
        }
    }

    // ── Stem and flags ──
    // Direction follows the members on the head's staff only.
    let middle = head_staff.middle();
    let (head_high, head_low) = staff_extents(&p.staves, &ys)
        .into_iter()
        .find(|(staff, _)| *staff == head_staff)
        .map_or((high, low), |(_, extent)| extent);
    let auto_up = (head_low - middle) >= (middle - head_high);
    let stem = match head.stem {
        Some(Stem::Unknown) => {
            unknown.push((0, "stem"));
            None
        }
        other => other,
    };
    let stem_up = match stem {
        Some(Stem::Up) | Some(Stem::Double) => true,
        Some(Stem::Down) => false,
        _ => auto_up,
    };

    let mut top = high;
    let mut bottom = low;
    let has_stem = head_type.has_stem() && stem != Some(Stem::None);
    if has_stem {
        let (dx, dy) = stem_attachment(head_shape);
        let up_tip = high - p.stem_length;
        let down_tip = low + p.stem_length;
        let double = stem == Some(Stem::Double);
        if stem_up || double {
            b.stem(p.x + dx, low + dy, up_tip, STEM_WIDTH);
            top = top.min(up_tip);
        }
        if !stem_up || double {
            b.stem(p.x - dx, high - dy, down_tip, STEM_WIDTH);
            bottom = bottom.max(down_tip);
        }
        let flags = head_type.flag_count();
        if flags > 0 && !double {
            let (fx, fy) = if stem_up {
                (p.x + dx, up_tip)
            } else {
                (p.x - dx, down_tip)
            };
            b.push(Shape::Flag {
                x: fx,
                y: fy,
                count: flags,
                up: stem_up,
            });
        }
    }

    GroupMetrics {
        ys,
        x: p.x,
        stem_up,
        top,
        bottom,
        unknown,
    }
}

fn emit_rest(b: &mut GeometryBuilder, p: &GroupPlacement<'_>, ys: Vec<f64>, mut unknown: Vec<(usize, &'static str)>) -> GroupMetrics {
    let mut x = p.x;
    let mut y = ys.first().copied().unwrap_or_default();
    if let (Some(note), Some(staff)) = (p.notes.first(), p.staves.first()) {
        y = ys.first().copied().unwrap_or_else(|| staff.middle());
        let whole_measure = note.rest.map_or(false, |r| r.measure);
        if whole_measure {
            x = p.measure_center;
        }
        let fallback = if whole_measure { NoteType::Whole } else { NoteType::Quarter };
        let note_type = note_type_of(note, fallback, &mut unknown, 0);
        b.push(Shape::Rest {
            x,
            y,
            note_type,
            measure: whole_measure,
        });
        emit_dots(b, staff, x, y, note.dots);
    }
    GroupMetrics {
        ys,
        x,
        stem_up: true,
        top: y,
        bottom: y,
        unknown,
    }
}

/// Tablature shows fret numbers on string lines, without heads or stems.
fn emit_tab(b: &mut GeometryBuilder, p: &GroupPlacement<'_>, ys: Vec<f64>) -> GroupMetrics {
    for (note, &y) in p.notes.iter().zip(&ys) {
        if let Some(t) = note.notations.technical.first() {
            b.push(Shape::TabFretLabel {
                x: p.x,
                y,
                string: t.string,
                fret: t.fret,
            });
        }
    }
    let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    GroupMetrics {
        ys,
        x: p.x,
        stem_up: true,
        top,
        bottom,
        unknown: Vec::new(),
    }
}
