//! Chord grouping.
//!
//! A chord group is the maximal run of notes that starts with a non-chord
//! note and continues through every following `chord` note. Harmony,
//! attributes and backups between them do not end the run.

use crate::model::{Element, Note};

use super::context::PartContext;
use super::pitch::{staff_middle_y, tab_string_y, vertical_offset};

/// Notes sounding together at one horizontal position.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordGroup {
    /// Element index of the first note; its duration drives spacing
    pub head: usize,
    /// Element indices of every member, head first
    pub members: Vec<usize>,
    /// Horizontal advance in divisions
    pub advance: i32,
    /// Per-member y below the member's staff top line
    pub offsets: Vec<f64>,
    pub staff: i32,
    pub is_rest: bool,
}

impl ChordGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group a measure's notes into chords. `ctx` is the context in force at the
/// start of the measure; attributes inside the measure are applied in order.
///
/// Notes without a usable duration or with an out-of-range octave are left
/// out; the driver reports them.
pub fn group_chords(elements: &[Element], ctx: &PartContext, line_spacing: f64) -> Vec<ChordGroup> {
    let mut ctx = ctx.clone();
    let mut groups: Vec<ChordGroup> = Vec::new();
    // Index of the group a following chord note may join
    let mut open: Option<usize> = None;

    for (i, el) in elements.iter().enumerate() {
        match el {
            Element::Attributes(a) => ctx = ctx.with_attributes(a),
            Element::Note(note) => {
                let Some(duration) = note.duration.filter(|d| *d >= 0) else {
                    continue;
                };
                if !note.octave_in_range() {
                    continue;
                }
                let offset = member_offset(note, &ctx, line_spacing);

                if note.chord && !note.is_rest() {
                    if let Some(group) = open.and_then(|g| groups.get_mut(g)) {
                        group.members.push(i);
                        group.offsets.push(offset);
                        continue;
                    }
                }

                groups.push(ChordGroup {
                    head: i,
                    members: vec![i],
                    advance: duration,
                    offsets: vec![offset],
                    staff: note.staff(),
                    is_rest: note.is_rest(),
                });
                open = if note.is_rest() { None } else { Some(groups.len() - 1) };
            }
            Element::Harmony(_) | Element::Backup(_) | Element::Barline(_) => {}
        }
    }
    groups
}

/// Vertical position of one note relative to its staff's top line.
///
/// TAB staves place notes on their string; anything without a position
/// (plain rests, TAB notes without a string) sits on the middle line.
pub fn member_offset(note: &Note, ctx: &PartContext, line_spacing: f64) -> f64 {
    let staff = note.staff();
    let lines = ctx.lines(staff);
    let middle = staff_middle_y(lines, 0.0, line_spacing);

    if ctx.is_tab(staff) && !note.is_rest() {
        return note
            .notations
            .technical
            .first()
            .and_then(|t| tab_string_y(t.string, lines, 0.0, line_spacing))
            .unwrap_or(middle);
    }
    match note.display_position() {
        Some((step, octave)) => vertical_offset(step, octave, &ctx.clef(staff), lines, 0.0, line_spacing),
        None => middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Backup, Clef, ClefSign, Harmony, HarmonyKind, Pitch, Rest, Step, Technical, Notations};
    use pretty_assertions::assert_eq;

    fn pitched(step: Step, octave: i32, duration: i32, chord: bool) -> Element {
        Element::Note(Note {
            duration: Some(duration),
            pitch: Some(Pitch { step, octave, alter: None }),
            chord,
            ..Note::default()
        })
    }

    fn rest(duration: i32, chord: bool) -> Element {
        Element::Note(Note {
            duration: Some(duration),
            rest: Some(Rest::default()),
            chord,
            ..Note::default()
        })
    }

    fn members(groups: &[ChordGroup]) -> Vec<Vec<usize>> {
        groups.iter().map(|g| g.members.clone()).collect()
    }

    #[test]
    fn three_note_chord_is_one_group() {
        let elements = vec![
            pitched(Step::C, 4, 1, false),
            pitched(Step::E, 4, 1, true),
            pitched(Step::G, 4, 1, true),
        ];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        assert_eq!(members(&groups), vec![vec![0, 1, 2]]);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].offsets, vec![50.0, 40.0, 30.0]);
        assert_eq!(groups[0].advance, 1);
    }

    #[test]
    fn chord_member_durations_are_ignored() {
        let elements = vec![pitched(Step::C, 4, 2, false), pitched(Step::E, 4, 8, true)];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        assert_eq!(groups[0].advance, 2);
    }

    #[test]
    fn interleaved_elements_do_not_break_a_run() {
        let elements = vec![
            pitched(Step::C, 4, 1, false),
            Element::Harmony(Harmony {
                root: None,
                kind: HarmonyKind::Major,
                text: None,
                bass: None,
                offset: None,
                staff: None,
                frame: None,
            }),
            Element::Attributes(Attributes::default()),
            Element::Backup(Backup { duration: 0 }),
            pitched(Step::E, 4, 1, true),
            pitched(Step::D, 4, 1, false),
        ];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        assert_eq!(members(&groups), vec![vec![0, 4], vec![5]]);
    }

    #[test]
    fn rests_are_singletons() {
        let elements = vec![
            pitched(Step::C, 4, 1, false),
            rest(1, true),
            pitched(Step::E, 4, 1, true),
            rest(1, false),
        ];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        // The chord note after a rest has no head to join and stands alone.
        assert_eq!(members(&groups), vec![vec![0], vec![1], vec![2], vec![3]]);
        assert!(groups[1].is_rest);
        assert_eq!(groups[1].offsets, vec![20.0]);
    }

    #[test]
    fn notes_without_duration_are_skipped() {
        let elements = vec![
            Element::Note(Note::default()),
            pitched(Step::C, 4, -1, false),
            pitched(Step::C, 4, 1, false),
        ];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        assert_eq!(members(&groups), vec![vec![2]]);
    }

    #[test]
    fn clef_change_applies_to_later_notes() {
        let elements = vec![
            pitched(Step::C, 4, 1, false),
            Element::Attributes(Attributes {
                clefs: vec![Clef::bass(1)],
                ..Attributes::default()
            }),
            pitched(Step::C, 4, 1, false),
        ];
        let groups = group_chords(&elements, &PartContext::new(), 10.0);
        assert_eq!(groups[0].offsets, vec![50.0]);
        assert_eq!(groups[1].offsets, vec![-10.0]);
    }

    #[test]
    fn tab_notes_sit_on_their_string() {
        let ctx = PartContext::new().with_attributes(&Attributes {
            clefs: vec![Clef {
                staff: 1,
                sign: ClefSign::Tab,
                line: None,
                octave_change: None,
            }],
            staff_details: vec![crate::model::StaffDetails { staff: 1, lines: 6 }],
            ..Attributes::default()
        });
        let note = Note {
            duration: Some(1),
            pitch: Some(Pitch { step: Step::E, octave: 2, alter: None }),
            notations: Notations {
                technical: vec![Technical { string: 6, fret: 0 }],
                ..Notations::default()
            },
            ..Note::default()
        };
        assert_eq!(member_offset(&note, &ctx, 10.0), 0.0);
    }
}
