//! Score frame: measure columns, part positions and total size, computed
//! before any element is placed.

use crate::model::{Element, Part, Score};
use crate::options::LayoutOptions;

use super::constants::*;
use super::context::PartContext;
use super::spacing::part_measure_widths;
use super::staff::key_sig_width;

/// One measure column, shared by every part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Column {
    pub(super) x: f64,
    pub(super) width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PartFrame {
    /// y of the top line of the part's first staff
    pub(super) y: f64,
    pub(super) staves: i32,
}

impl PartFrame {
    /// y of the top line of `staff` (1-based).
    pub(super) fn staff_top(&self, staff: i32, staff_spacing: f64) -> f64 {
        self.y + (staff.max(1) - 1) as f64 * staff_spacing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct ScoreFrame {
    /// Room for the initial clef, key and time signature
    pub(super) prefix_width: f64,
    pub(super) columns: Vec<Column>,
    pub(super) parts: Vec<PartFrame>,
    pub(super) width: f64,
    pub(super) height: f64,
}

impl ScoreFrame {
    /// Left edge of the first measure.
    pub(super) fn content_x(&self, opts: &LayoutOptions) -> f64 {
        opts.margin_left + self.prefix_width
    }
}

/// Number of staves a part uses: the largest staff number mentioned by a
/// `staves` count, a clef, staff details or a note.
pub(super) fn detect_staves(part: &Part) -> i32 {
    let mut max_staff = 1;
    for measure in &part.measures {
        for el in &measure.elements {
            match el {
                Element::Attributes(attrs) => {
                    if let Some(s) = attrs.staves {
                        max_staff = max_staff.max(s);
                    }
                    for clef in &attrs.clefs {
                        max_staff = max_staff.max(clef.staff);
                    }
                    for details in &attrs.staff_details {
                        max_staff = max_staff.max(details.staff);
                    }
                }
                Element::Note(note) => max_staff = max_staff.max(note.staff()),
                Element::Harmony(h) => {
                    if let Some(s) = h.staff {
                        max_staff = max_staff.max(s);
                    }
                }
                Element::Backup(_) | Element::Barline(_) => {}
            }
        }
    }
    max_staff
}

pub(super) fn compute_frame(score: &Score, opts: &LayoutOptions) -> ScoreFrame {
    // Prefix: clef, the widest initial key signature, time signature.
    let widest_key = score
        .parts
        .iter()
        .map(|p| key_sig_width(PartContext::initial(p).fifths()))
        .fold(0.0, f64::max);
    let prefix_width = CLEF_SPACE + widest_key + TIME_SIG_SPACE;

    // Measure i of every part shares one column.
    let mut widths: Vec<f64> = Vec::new();
    for part in &score.parts {
        for (i, w) in part_measure_widths(part, opts.spacing_unit).into_iter().enumerate() {
            match widths.get_mut(i) {
                Some(existing) => *existing = existing.max(w),
                None => widths.push(w),
            }
        }
    }
    let mut x = opts.margin_left + prefix_width;
    let columns = widths
        .into_iter()
        .map(|width| {
            let column = Column { x, width };
            x += width;
            column
        })
        .collect();

    let mut y = opts.margin_top;
    let parts = score
        .parts
        .iter()
        .map(|part| {
            let frame = PartFrame {
                y,
                staves: detect_staves(part),
            };
            y += frame.staves as f64 * opts.staff_spacing;
            frame
        })
        .collect();

    ScoreFrame {
        prefix_width,
        columns,
        parts,
        width: x + opts.margin_right,
        height: y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Key, Measure, Note, Time};
    use pretty_assertions::assert_eq;

    fn part(attrs: Attributes, quarters: usize, measures: usize, staff: i32) -> Part {
        let notes = (0..quarters).map(|_| {
            Element::Note(Note {
                duration: Some(1),
                staff: Some(staff),
                ..Note::default()
            })
        });
        let mut first = vec![Element::Attributes(attrs)];
        first.extend(notes.clone());
        let mut all = vec![Measure {
            number: "1".into(),
            elements: first,
        }];
        for i in 1..measures {
            all.push(Measure {
                number: (i + 1).to_string(),
                elements: notes.clone().collect(),
            });
        }
        Part {
            id: "P".into(),
            name: None,
            measures: all,
        }
    }

    #[test]
    fn columns_and_parts_stack() {
        let piano = part(
            Attributes {
                divisions: Some(1),
                staves: Some(2),
                time: Some(Time { beats: 3, beat_type: 4 }),
                ..Attributes::default()
            },
            3,
            2,
            1,
        );
        let flute = part(
            Attributes {
                key: Some(Key { fifths: 2 }),
                ..Attributes::default()
            },
            4,
            1,
            1,
        );
        let score = Score {
            title: None,
            composer: None,
            parts: vec![piano, flute],
        };
        let opts = LayoutOptions::default();
        let frame = compute_frame(&score, &opts);

        assert_eq!(frame.prefix_width, 32.0 + 28.0 + 24.0);
        let start = 50.0 + frame.prefix_width;
        assert_eq!(
            frame.columns,
            vec![
                Column { x: start, width: 160.0 },
                Column { x: start + 160.0, width: 120.0 },
            ]
        );
        assert_eq!(frame.parts[0], PartFrame { y: 60.0, staves: 2 });
        assert_eq!(frame.parts[1], PartFrame { y: 300.0, staves: 1 });
        assert_eq!(frame.height, 420.0);
        assert_eq!(frame.width, start + 280.0 + 30.0);
        assert_eq!(frame.parts[0].staff_top(2, 120.0), 180.0);
    }

    #[test]
    fn notes_reveal_extra_staves() {
        let p = part(Attributes::default(), 1, 1, 3);
        assert_eq!(detect_staves(&p), 3);
    }
}
