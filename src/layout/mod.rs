//! Score layout: converts a [`Score`] into positioned geometry.
//!
//! The engine computes the frame (measure columns, part positions) up front
//! from the musical content, then walks every part's measures in document
//! order, threading a [`PartContext`] and a horizontal cursor through the
//! elements and emitting [`Primitive`]s. Nothing is drawn here.

mod constants;
mod frame;
mod notes;
mod staff;

pub mod chords;
pub mod context;
pub mod curves;
pub mod fretboard;
pub mod geometry;
pub mod pitch;
pub mod spacing;

use serde::Serialize;

use crate::error::{Diagnostics, LayoutIssue};
use crate::model::*;
use crate::options::LayoutOptions;

use chords::{group_chords, ChordGroup};
use constants::*;
use context::PartContext;
use curves::*;
use frame::{compute_frame, Column, PartFrame, ScoreFrame};
use geometry::{GeometryBuilder, Primitive, Shape};
use notes::{emit_group, GroupMetrics, GroupPlacement};
use staff::*;

// ═══════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════

/// Geometry for a whole score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLayout {
    pub width: f64,
    pub height: f64,
    pub parts: Vec<PartLayout>,
    /// Recoverable problems found in the input, in encounter order
    pub issues: Vec<LayoutIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartLayout {
    pub index: usize,
    pub id: String,
    /// y of the top line of the part's first staff
    pub y: f64,
    pub staves: i32,
    pub measures: Vec<MeasureSpan>,
    pub chords: Vec<PlacedChord>,
    /// Flat primitive list in drawing order
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureSpan {
    pub index: usize,
    pub number: String,
    pub x: f64,
    pub width: f64,
}

/// A chord group after placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedChord {
    pub measure: usize,
    /// Element indices of the members, head first
    pub members: Vec<usize>,
    pub x: f64,
    /// Cursor advance taken by the group
    pub advance: f64,
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Lay out a score. Never fails: malformed input is skipped and reported in
/// [`ScoreLayout::issues`].
pub fn layout_score(score: &Score, opts: &LayoutOptions) -> ScoreLayout {
    let frame = compute_frame(score, opts);
    let mut diagnostics = Diagnostics::default();

    let parts = score
        .parts
        .iter()
        .enumerate()
        .filter_map(|(index, part)| {
            let part_frame = frame.parts.get(index)?;
            Some(PartEngraver::new(&frame, part_frame, index, opts, &mut diagnostics).run(part))
        })
        .collect();

    ScoreLayout {
        width: frame.width,
        height: frame.height,
        parts,
        issues: diagnostics.into_issues(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cursor
// ═══════════════════════════════════════════════════════════════════════

/// Horizontal cursor within a measure. A placed group's advance stays
/// pending until the next group (or backup) so chord members share one x.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    start: f64,
    pos: f64,
    pending: f64,
}

impl Cursor {
    fn new(start: f64) -> Self {
        Self {
            start,
            pos: start,
            pending: 0.0,
        }
    }

    fn flush(&mut self) {
        self.pos += self.pending;
        self.pending = 0.0;
    }

    /// Position of a new group with the given advance.
    fn place(&mut self, advance: f64) -> f64 {
        self.flush();
        self.pending = advance;
        self.pos
    }

    /// Where the next group would go.
    fn peek(&self) -> f64 {
        self.pos + self.pending
    }

    /// Move back by `amount`; returns the overshoot when clamped at the
    /// measure start.
    fn rewind(&mut self, amount: f64) -> Option<f64> {
        self.flush();
        let target = self.pos - amount;
        if target < self.start - 1e-9 {
            self.pos = self.start;
            Some(self.start - target)
        } else {
            self.pos = target;
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Part engraver
// ═══════════════════════════════════════════════════════════════════════

/// Per-part state for one layout pass. Discarded when the part is done.
struct PartEngraver<'a> {
    frame: &'a ScoreFrame,
    part_frame: &'a PartFrame,
    part: usize,
    opts: &'a LayoutOptions,
    diagnostics: &'a mut Diagnostics,
    builder: GeometryBuilder,
    ties: NotationTracker<TieKey>,
    slurs: NotationTracker<SlurKey>,
    tuplets: NotationTracker<TupletKey>,
    chords: Vec<PlacedChord>,
}

impl<'a> PartEngraver<'a> {
    fn new(
        frame: &'a ScoreFrame,
        part_frame: &'a PartFrame,
        part: usize,
        opts: &'a LayoutOptions,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            frame,
            part_frame,
            part,
            opts,
            diagnostics,
            builder: GeometryBuilder::new(part),
            ties: NotationTracker::new(ContinueMode::Reanchor),
            slurs: NotationTracker::new(ContinueMode::Hold),
            tuplets: NotationTracker::new(ContinueMode::Hold),
            chords: Vec::new(),
        }
    }

    fn staff_frame(&self, ctx: &PartContext, staff: i32) -> StaffFrame {
        StaffFrame {
            top: self.part_frame.staff_top(staff, self.opts.staff_spacing),
            lines: ctx.lines(staff),
            spacing: self.opts.staff_line_spacing,
        }
    }

    /// Top of the first staff and bottom of the last, for part-wide barlines.
    fn vertical_span(&self, ctx: &PartContext) -> (f64, f64) {
        let first = self.staff_frame(ctx, 1);
        let last = self.staff_frame(ctx, self.part_frame.staves);
        (first.top, last.bottom())
    }

    fn report(&mut self, issue: LayoutIssue) {
        self.diagnostics.report(issue);
    }

    fn unknown(&mut self, measure: usize, element: usize, field: &str) {
        self.report(LayoutIssue::UnknownVariant {
            part: self.part,
            measure,
            element,
            field: field.to_string(),
        });
    }

    fn dangling(&mut self, measure: usize, element: usize, notation: &str, reason: &str) {
        self.report(LayoutIssue::DanglingNotation {
            part: self.part,
            measure,
            element: Some(element),
            notation: notation.to_string(),
            reason: reason.to_string(),
        });
    }

    fn run(mut self, part: &Part) -> PartLayout {
        let initial = PartContext::initial(part);
        self.emit_prefix(&initial);

        let mut ctx = PartContext::new();
        let mut measures = Vec::with_capacity(part.measures.len());
        for (mi, measure) in part.measures.iter().enumerate() {
            let Some(column) = self.frame.columns.get(mi).copied() else {
                continue;
            };
            let is_last = mi + 1 == part.measures.len();
            ctx = self.layout_measure(mi, measure, column, ctx, is_last);
            measures.push(MeasureSpan {
                index: mi,
                number: measure.number.clone(),
                x: column.x,
                width: column.width,
            });
        }

        self.finish_notations();

        let primitives = self.builder.build();
        log::debug!(
            "part {} ({}): {} measures, {} chord groups, {} primitives",
            self.part,
            part.id,
            measures.len(),
            self.chords.len(),
            primitives.len()
        );

        PartLayout {
            index: self.part,
            id: part.id.clone(),
            y: self.part_frame.y,
            staves: self.part_frame.staves,
            measures,
            chords: self.chords,
            primitives,
        }
    }

    // ── Prefix: initial clef, key and time signature ──

    fn emit_prefix(&mut self, ctx: &PartContext) {
        let x = self.opts.margin_left;
        let end = self.frame.content_x(self.opts);
        let meter = ctx.meter();
        self.builder.enter_measure(None);
        for staff in 1..=self.part_frame.staves {
            let sf = self.staff_frame(ctx, staff);
            let clef = ctx.clef(staff);
            emit_staff_lines(&mut self.builder, &sf, x, end);
            emit_clef(&mut self.builder, &sf, x, staff, &clef);
            emit_key_signature(&mut self.builder, &sf, x + CLEF_SPACE, ctx.fifths(), &clef);
            emit_time_signature(
                &mut self.builder,
                &sf,
                end - TIME_SIG_SPACE / 2.0,
                meter.beats,
                meter.beat_type,
            );
        }
        // Left edge joining the staves of a multi-staff part.
        if self.part_frame.staves > 1 {
            let (top, bottom) = self.vertical_span(ctx);
            emit_barline(&mut self.builder, x, top, bottom, self.opts.staff_line_spacing, BarStyle::Regular);
        }
    }

    // ── Measures ──

    fn layout_measure(
        &mut self,
        mi: usize,
        measure: &Measure,
        column: Column,
        mut ctx: PartContext,
        is_last: bool,
    ) -> PartContext {
        let elements = &measure.elements;
        // Attributes at the head of the first measure form the prefix.
        let mut in_prefix = mi == 0;

        self.builder.enter_measure(Some(mi));
        let leading = leading_context(&ctx, elements);
        for staff in 1..=self.part_frame.staves {
            let sf = self.staff_frame(&leading, staff);
            emit_staff_lines(&mut self.builder, &sf, column.x, column.x + column.width);
        }

        let groups = group_chords(elements, &ctx, self.opts.staff_line_spacing);
        let mut next_group = 0;
        let mut cursor = Cursor::new(column.x + self.opts.note_inset);
        let mut right_barline: Option<(usize, BarStyle)> = None;

        for (ei, el) in elements.iter().enumerate() {
            self.builder.at_element(Some(ei));
            match el {
                Element::Attributes(attrs) => {
                    if attrs.clefs.iter().any(|c| c.sign == ClefSign::Unknown) {
                        self.unknown(mi, ei, "clef sign");
                    }
                    let next = ctx.with_attributes(attrs);
                    if !in_prefix {
                        self.emit_context_change(&ctx, &next, cursor.peek());
                    }
                    ctx = next;
                }
                Element::Note(note) => {
                    in_prefix = false;
                    match note.duration {
                        None => {
                            self.malformed(mi, ei, "note has no duration");
                            continue;
                        }
                        Some(d) if d < 0 => {
                            self.malformed(mi, ei, "note has a negative duration");
                            continue;
                        }
                        Some(_) => {}
                    }
                    if !note.octave_in_range() {
                        self.malformed(mi, ei, "note octave out of range");
                        continue;
                    }
                    let Some(group) = groups.get(next_group).filter(|g| g.head == ei) else {
                        // Chord member, placed with its head.
                        continue;
                    };
                    next_group += 1;
                    let advance = ctx.meter().spacing(group.advance, self.opts.spacing_unit);
                    let x = cursor.place(advance);
                    self.place_group(mi, elements, group, &ctx, x, column, advance);
                }
                Element::Backup(backup) => {
                    in_prefix = false;
                    if backup.duration < 0 {
                        self.malformed(mi, ei, "backup has a negative duration");
                        continue;
                    }
                    let amount = ctx.meter().spacing(backup.duration, self.opts.spacing_unit);
                    if let Some(overshoot) = cursor.rewind(amount) {
                        self.report(LayoutIssue::NegativeCursor {
                            part: self.part,
                            measure: mi,
                            element: ei,
                            overshoot,
                        });
                    }
                }
                Element::Harmony(harmony) => {
                    if harmony.kind == HarmonyKind::Other {
                        self.unknown(mi, ei, "harmony kind");
                    }
                    let offset = harmony
                        .offset
                        .map_or(0.0, |o| ctx.meter().spacing(o, self.opts.spacing_unit));
                    let staff = harmony.staff.filter(|s| *s > 0).unwrap_or(1);
                    let sf = self.staff_frame(&ctx, staff);
                    if !emit_harmony(&mut self.builder, &sf, cursor.peek() + offset, harmony) {
                        self.malformed(mi, ei, "fretboard frame needs at least one string and one fret");
                    }
                }
                Element::Barline(barline) => {
                    if barline.style == BarStyle::Unknown {
                        self.unknown(mi, ei, "bar style");
                    }
                    match barline.location {
                        BarLocation::Right => right_barline = Some((ei, barline.style)),
                        BarLocation::Left => self.emit_part_barline(&ctx, column.x, barline.style),
                        BarLocation::Middle => self.emit_part_barline(&ctx, cursor.peek(), barline.style),
                    }
                }
            }
        }

        // Measure boundary. The double barline closing a part is the final
        // (light-heavy) double bar; a styled right barline replaces it.
        let (element, style) = match right_barline {
            Some((ei, style)) => (Some(ei), style),
            None if is_last => (None, BarStyle::LightHeavy),
            None => (None, BarStyle::Regular),
        };
        self.builder.at_element(element);
        self.emit_part_barline(&ctx, column.x + column.width, style);
        ctx
    }

    fn malformed(&mut self, measure: usize, element: usize, reason: &str) {
        self.report(LayoutIssue::MalformedScore {
            part: self.part,
            measure,
            element,
            reason: reason.to_string(),
        });
    }

    fn emit_part_barline(&mut self, ctx: &PartContext, x: f64, style: BarStyle) {
        let (top, bottom) = self.vertical_span(ctx);
        emit_barline(&mut self.builder, x, top, bottom, self.opts.staff_line_spacing, style);
    }

    /// Inline clef, key and time changes. They sit at the cursor and take
    /// no horizontal space of their own.
    fn emit_context_change(&mut self, before: &PartContext, after: &PartContext, x: f64) {
        let change = before.change_to(after);
        if change.is_empty() {
            return;
        }
        let meter = after.meter();
        for staff in 1..=self.part_frame.staves {
            let sf = self.staff_frame(after, staff);
            let clef = after.clef(staff);
            let mut mx = x;
            if change.clefs.contains(&staff) {
                emit_clef(&mut self.builder, &sf, mx, staff, &clef);
                mx += CLEF_SPACE;
            }
            if let Some((old, new)) = change.key {
                mx += emit_key_change(&mut self.builder, &sf, mx, old, new, &clef);
            }
            if change.time {
                emit_time_signature(
                    &mut self.builder,
                    &sf,
                    mx + TIME_SIG_SPACE / 2.0,
                    meter.beats,
                    meter.beat_type,
                );
            }
        }
    }

    // ── Chord groups and their notations ──

    #[allow(clippy::too_many_arguments)]
    fn place_group(
        &mut self,
        mi: usize,
        elements: &[Element],
        group: &ChordGroup,
        ctx: &PartContext,
        x: f64,
        column: Column,
        advance: f64,
    ) {
        let notes: Vec<&Note> = group
            .members
            .iter()
            .filter_map(|&i| match elements.get(i) {
                Some(Element::Note(n)) => Some(n),
                _ => None,
            })
            .collect();
        let staves = notes.iter().map(|n| self.staff_frame(ctx, n.staff())).collect();

        let placement = GroupPlacement {
            group,
            notes,
            x,
            staves,
            tab: ctx.is_tab(group.staff),
            measure_center: column.x + column.width / 2.0,
            stem_length: self.opts.stem_length,
        };
        self.builder.at_element(Some(group.head));
        let metrics = emit_group(&mut self.builder, &placement);

        for &(member, field) in &metrics.unknown {
            if let Some(&ei) = group.members.get(member) {
                self.unknown(mi, ei, field);
            }
        }
        if !group.is_rest {
            for (m, note) in placement.notes.iter().enumerate() {
                if let Some(&ei) = group.members.get(m) {
                    self.track_notations(mi, ei, note, ctx, &metrics, m);
                }
            }
        }

        self.chords.push(PlacedChord {
            measure: mi,
            members: group.members.clone(),
            x,
            advance,
        });
    }

    fn track_notations(
        &mut self,
        mi: usize,
        ei: usize,
        note: &Note,
        ctx: &PartContext,
        metrics: &GroupMetrics,
        member: usize,
    ) {
        let Some(&y) = metrics.ys.get(member) else {
            return;
        };
        let staff = note.staff();
        let quarters = note.duration.unwrap_or(0) as f64 / ctx.meter().divisions as f64;
        let anchor = |y: f64, placement: Option<Placement>| Anchor {
            x: metrics.x,
            y,
            stem_up: metrics.stem_up,
            quarters,
            placement,
            measure: mi,
            element: ei,
        };
        let clearance = self.opts.staff_step();

        // Stops close before starts open, so a note can end one curve and
        // begin the next.
        let stop_first = |kind: StartStop| kind != StartStop::Stop;

        if let Some((step, octave)) = note.display_position() {
            let mut ties = note.notations.ties.clone();
            ties.sort_by_key(|t| stop_first(t.kind));
            for tie in ties {
                let key = TieKey { staff, step, octave };
                let transition = self.ties.apply(key, tie.kind, anchor(y, None));
                self.resolve(mi, ei, "tie", transition, |span| {
                    Shape::TieCurve(curve_between(span, &TIE_PROFILE, clearance))
                });
            }
        }

        let mut slurs = note.notations.slurs.clone();
        slurs.sort_by_key(|s| stop_first(s.kind));
        for slur in slurs {
            let key = SlurKey { staff, number: slur.number };
            let transition = self.slurs.apply(key, slur.kind, anchor(y, slur.placement));
            self.resolve(mi, ei, "slur", transition, |span| {
                Shape::SlurCurve(curve_between(span, &SLUR_PROFILE, clearance))
            });
        }

        let mut tuplets = note.notations.tuplets.clone();
        tuplets.sort_by_key(|t| stop_first(t.kind));
        for tuplet in tuplets {
            let above = match tuplet.placement {
                Some(p) => p == Placement::Above,
                None => metrics.stem_up,
            };
            let edge = if above { metrics.top } else { metrics.bottom };
            let key = TupletKey { staff, number: tuplet.number };
            let transition = self.tuplets.apply(key, tuplet.kind, anchor(edge, tuplet.placement));
            self.resolve(mi, ei, "tuplet", transition, |span| {
                let (x1, x2, y, above) = tuplet_bracket(span);
                Shape::TupletBracket { x1, x2, y, above }
            });
        }
    }

    fn resolve(
        &mut self,
        mi: usize,
        ei: usize,
        notation: &str,
        transition: Transition,
        shape: impl Fn(&Span) -> Shape,
    ) {
        match transition {
            Transition::Closed(span) => self.builder.push_at(mi, ei, shape(&span)),
            Transition::Dangling => {
                self.dangling(mi, ei, notation, "stop without a matching start")
            }
            Transition::Restarted(old) => {
                self.dangling(old.measure, old.element, notation, "start was never stopped")
            }
            Transition::Ignored => self.unknown(mi, ei, notation),
            Transition::Opened | Transition::Held => {}
        }
    }

    /// Anything still open at the end of the part is dropped.
    fn finish_notations(&mut self) {
        let ties = std::mem::replace(&mut self.ties, NotationTracker::new(ContinueMode::Reanchor));
        let slurs = std::mem::replace(&mut self.slurs, NotationTracker::new(ContinueMode::Hold));
        let tuplets = std::mem::replace(&mut self.tuplets, NotationTracker::new(ContinueMode::Hold));

        let open = ties
            .finish()
            .into_iter()
            .map(|(_, a)| ("tie", a))
            .chain(slurs.finish().into_iter().map(|(_, a)| ("slur", a)))
            .chain(tuplets.finish().into_iter().map(|(_, a)| ("tuplet", a)));
        for (notation, anchor) in open {
            self.dangling(
                anchor.measure,
                anchor.element,
                notation,
                "not closed before the end of the part",
            );
        }
    }
}

/// Context after the attributes that open a measure (before its first note).
fn leading_context(ctx: &PartContext, elements: &[Element]) -> PartContext {
    let mut leading = ctx.clone();
    for el in elements {
        match el {
            Element::Attributes(a) => leading = leading.with_attributes(a),
            Element::Note(_) | Element::Backup(_) => break,
            Element::Harmony(_) | Element::Barline(_) => {}
        }
    }
    leading
}
