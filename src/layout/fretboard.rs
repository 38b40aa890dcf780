//! Fretboard diagrams for chord symbols.
//!
//! Strings run vertically with string 1 (highest pitch) on the right; frets
//! run horizontally from the nut down.

use serde::Serialize;

use crate::model::{BarreKind, Frame};

use super::constants::*;
use super::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameLine {
    pub from: Point,
    pub to: Point,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FingerDot {
    pub center: Point,
    pub radius: f64,
    pub string: i32,
    pub fret: i32,
    pub fingering: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FretboardGeometry {
    /// Top-left corner of the grid (the nut)
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub strings: i32,
    pub frets: i32,
    pub first_fret: i32,
    pub fret_lines: Vec<FrameLine>,
    pub string_lines: Vec<FrameLine>,
    pub dots: Vec<FingerDot>,
    pub barres: Vec<FrameLine>,
    /// Circles above the nut
    pub open_strings: Vec<Point>,
    /// Crosses above the nut for strings with no frame note
    pub muted_strings: Vec<Point>,
    /// Position label beside the first fret row, present when first fret > 1
    pub first_fret_label: Option<Point>,
}

/// Grid size of a frame, or `None` when it has no strings or frets.
pub fn frame_size(frame: &Frame) -> Option<(f64, f64)> {
    if frame.strings < 1 || frame.frets < 1 {
        return None;
    }
    Some((
        (frame.strings - 1) as f64 * FRAME_STRING_SPACING,
        frame.frets as f64 * FRAME_FRET_SPACING,
    ))
}

/// Lay out `frame` with its nut's left end at (`x`, `y`).
pub fn fretboard_geometry(frame: &Frame, x: f64, y: f64) -> Option<FretboardGeometry> {
    let (width, height) = frame_size(frame)?;
    let first_fret = frame.first_fret.filter(|f| *f > 0).unwrap_or(1);
    let string_x = |string: i32| x + (frame.strings - string) as f64 * FRAME_STRING_SPACING;
    let fret_y = |fret: f64| y + fret * FRAME_FRET_SPACING;

    let fret_lines = (0..=frame.frets)
        .map(|i| FrameLine {
            from: Point::new(x, fret_y(i as f64)),
            to: Point::new(x + width, fret_y(i as f64)),
            width: if i == 0 && first_fret == 1 {
                FRAME_NUT_WIDTH
            } else {
                FRAME_LINE_WIDTH
            },
        })
        .collect();

    let string_lines = (1..=frame.strings)
        .map(|s| FrameLine {
            from: Point::new(string_x(s), y),
            to: Point::new(string_x(s), y + height),
            width: FRAME_LINE_WIDTH,
        })
        .collect();

    let on_grid = |string: i32| string >= 1 && string <= frame.strings;
    let marker_y = y - FRAME_MARKER_OFFSET;

    let mut dots = Vec::new();
    let mut open_strings = Vec::new();
    for note in frame.notes.iter().filter(|n| on_grid(n.string)) {
        match note.fret {
            0 => open_strings.push(Point::new(string_x(note.string), marker_y)),
            f if f > 0 => dots.push(FingerDot {
                center: Point::new(string_x(note.string), fret_y(f as f64 - 0.5)),
                radius: FRAME_DOT_RADIUS,
                string: note.string,
                fret: f,
                fingering: note.fingering.filter(|n| *n > 0),
            }),
            _ => {}
        }
    }

    let muted_strings = (1..=frame.strings)
        .filter(|s| !frame.notes.iter().any(|n| n.string == *s && n.fret >= 0))
        .map(|s| Point::new(string_x(s), marker_y))
        .collect();

    // A barre runs from its start note to the stop note on the same fret.
    let barres = frame
        .notes
        .iter()
        .filter(|n| n.barre == Some(BarreKind::Start) && on_grid(n.string) && n.fret > 0)
        .filter_map(|start| {
            let stop = frame.notes.iter().find(|n| {
                n.barre == Some(BarreKind::Stop) && n.fret == start.fret && on_grid(n.string)
            })?;
            let by = fret_y(start.fret as f64 - 0.5);
            Some(FrameLine {
                from: Point::new(string_x(start.string.max(stop.string)), by),
                to: Point::new(string_x(start.string.min(stop.string)), by),
                width: FRAME_BARRE_WIDTH,
            })
        })
        .collect();

    Some(FretboardGeometry {
        origin: Point::new(x, y),
        width,
        height,
        strings: frame.strings,
        frets: frame.frets,
        first_fret,
        fret_lines,
        string_lines,
        dots,
        barres,
        open_strings,
        muted_strings,
        first_fret_label: (first_fret > 1)
            .then(|| Point::new(x - FRAME_MARKER_OFFSET, y + FRAME_FRET_SPACING / 2.0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameNote;
    use pretty_assertions::assert_eq;

    fn note(string: i32, fret: i32) -> FrameNote {
        FrameNote {
            string,
            fret,
            fingering: None,
            barre: None,
        }
    }

    /// Open C major: x32010
    fn c_major() -> Frame {
        Frame {
            strings: 6,
            frets: 4,
            first_fret: None,
            notes: vec![note(5, 3), note(4, 2), note(3, 0), note(2, 1), note(1, 0)],
        }
    }

    #[test]
    fn open_chord_markers() {
        let g = fretboard_geometry(&c_major(), 100.0, 50.0).unwrap();
        assert_eq!(g.width, 30.0);
        assert_eq!(g.height, 24.0);
        assert_eq!(g.fret_lines.len(), 5);
        assert_eq!(g.fret_lines[0].width, FRAME_NUT_WIDTH);
        assert_eq!(g.fret_lines[1].width, FRAME_LINE_WIDTH);
        assert_eq!(g.string_lines.len(), 6);
        // string 6 on the left, string 1 on the right
        assert_eq!(g.muted_strings, vec![Point::new(100.0, 44.0)]);
        assert_eq!(g.open_strings, vec![Point::new(118.0, 44.0), Point::new(130.0, 44.0)]);
        assert_eq!(g.dots.len(), 3);
        assert_eq!(g.dots[0].center, Point::new(106.0, 50.0 + 2.5 * 6.0));
        assert!(g.first_fret_label.is_none());
    }

    #[test]
    fn barre_chord_up_the_neck() {
        let mut start = note(6, 1);
        start.barre = Some(BarreKind::Start);
        let mut stop = note(1, 1);
        stop.barre = Some(BarreKind::Stop);
        let frame = Frame {
            strings: 6,
            frets: 4,
            first_fret: Some(5),
            notes: vec![start, note(5, 3), note(4, 3), note(3, 2), note(2, 1), stop],
        };
        let g = fretboard_geometry(&frame, 0.0, 0.0).unwrap();
        assert_eq!(g.fret_lines[0].width, FRAME_LINE_WIDTH);
        assert_eq!(
            g.barres,
            vec![FrameLine {
                from: Point::new(0.0, 3.0),
                to: Point::new(30.0, 3.0),
                width: FRAME_BARRE_WIDTH,
            }]
        );
        assert_eq!(g.first_fret_label, Some(Point::new(-6.0, 3.0)));
        assert!(g.muted_strings.is_empty());
    }

    #[test]
    fn empty_frame_has_no_geometry() {
        let frame = Frame {
            strings: 0,
            frets: 4,
            first_fret: None,
            notes: Vec::new(),
        };
        assert!(fretboard_geometry(&frame, 0.0, 0.0).is_none());
    }
}
