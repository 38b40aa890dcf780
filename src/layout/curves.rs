//! Tie, slur and tuplet pairing.
//!
//! Each identity (a tie's pitch and staff, a slur's staff and number, ...)
//! runs its own small state machine:
//!
//! ```text
//! Idle --start--> Open --stop--> Idle      (emits a span)
//! Idle --stop---> Idle                     (dangling stop, nothing emitted)
//! Open --continue--> Open                  (re-anchors or holds, per mode)
//! ```
//!
//! Anything still open when the part ends is dangling and is handed back by
//! [`NotationTracker::finish`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Placement, StartStop, Step};

use super::constants::*;
use super::geometry::Point;

/// Where a notation event was attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub stem_up: bool,
    /// Length of the anchoring note in quarters
    pub quarters: f64,
    pub placement: Option<Placement>,
    pub measure: usize,
    pub element: usize,
}

/// A closed start → stop pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: Anchor,
    pub end: Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CurveState {
    Idle,
    Open(Anchor),
}

/// How a `continue` event on an open identity behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueMode {
    /// Close the current segment and open a new one at the continuing note
    Reanchor,
    /// Keep the original start anchor
    Hold,
}

/// Result of feeding one event to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Opened,
    Closed(Span),
    /// A start arrived while open; the earlier start is abandoned.
    Restarted(Anchor),
    Held,
    /// A stop with nothing open.
    Dangling,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct NotationTracker<K: Ord> {
    states: BTreeMap<K, CurveState>,
    mode: ContinueMode,
}

impl<K: Ord + Clone> NotationTracker<K> {
    pub fn new(mode: ContinueMode) -> Self {
        Self {
            states: BTreeMap::new(),
            mode,
        }
    }

    fn state(&self, key: &K) -> CurveState {
        self.states.get(key).copied().unwrap_or(CurveState::Idle)
    }

    fn set(&mut self, key: K, state: CurveState) {
        match state {
            CurveState::Idle => {
                self.states.remove(&key);
            }
            CurveState::Open(_) => {
                self.states.insert(key, state);
            }
        }
    }

    pub fn apply(&mut self, key: K, kind: StartStop, anchor: Anchor) -> Transition {
        let current = self.state(&key);
        let (next, transition) = match (current, kind) {
            (CurveState::Idle, StartStop::Start | StartStop::Continue) => {
                (CurveState::Open(anchor), Transition::Opened)
            }
            (CurveState::Open(old), StartStop::Start) => {
                (CurveState::Open(anchor), Transition::Restarted(old))
            }
            (CurveState::Open(start), StartStop::Stop) => (
                CurveState::Idle,
                Transition::Closed(Span { start, end: anchor }),
            ),
            (CurveState::Idle, StartStop::Stop) => (CurveState::Idle, Transition::Dangling),
            (CurveState::Open(start), StartStop::Continue) => match self.mode {
                ContinueMode::Reanchor => (
                    CurveState::Open(anchor),
                    Transition::Closed(Span { start, end: anchor }),
                ),
                ContinueMode::Hold => (current, Transition::Held),
            },
            (_, StartStop::Unknown) => (current, Transition::Ignored),
        };
        self.set(key, next);
        transition
    }

    pub fn open_count(&self) -> usize {
        self.states.len()
    }

    /// Identities still open, in key order.
    pub fn finish(self) -> Vec<(K, Anchor)> {
        self.states
            .into_iter()
            .filter_map(|(k, s)| match s {
                CurveState::Open(a) => Some((k, a)),
                CurveState::Idle => None,
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity keys
// ═══════════════════════════════════════════════════════════════════════

/// Ties join same-pitch notes on one staff. Two simultaneous ties on the same
/// pitch and staff share this key and cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TieKey {
    pub staff: i32,
    pub step: Step,
    pub octave: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlurKey {
    pub staff: i32,
    pub number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TupletKey {
    pub staff: i32,
    pub number: i32,
}

// ═══════════════════════════════════════════════════════════════════════
// Curve geometry
// ═══════════════════════════════════════════════════════════════════════

/// A lens-shaped quadratic curve: two quadratic Béziers sharing end points,
/// with control points `thickness` apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Curve {
    pub start: Point,
    pub end: Point,
    pub control_top: Point,
    pub control_bottom: Point,
    pub thickness: f64,
    pub above: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveProfile {
    pub thickness: f64,
    pub base_height: f64,
    pub height_per_quarter: f64,
    pub max_height: f64,
}

pub const TIE_PROFILE: CurveProfile = CurveProfile {
    thickness: TIE_THICKNESS,
    base_height: TIE_BASE_HEIGHT,
    height_per_quarter: TIE_HEIGHT_PER_QUARTER,
    max_height: TIE_MAX_HEIGHT,
};

pub const SLUR_PROFILE: CurveProfile = CurveProfile {
    thickness: SLUR_THICKNESS,
    base_height: SLUR_BASE_HEIGHT,
    height_per_quarter: SLUR_HEIGHT_PER_QUARTER,
    max_height: SLUR_MAX_HEIGHT,
};

/// Side of the notes a curve or bracket goes on: explicit placement wins,
/// otherwise opposite the stem.
fn curve_above(anchor: &Anchor) -> bool {
    match anchor.placement {
        Some(Placement::Above) => true,
        Some(Placement::Below) => false,
        None => !anchor.stem_up,
    }
}

/// Curve between the two anchors of `span`. End points sit `clearance` away
/// from the noteheads; the arc height grows with the starting note's length.
pub fn curve_between(span: &Span, profile: &CurveProfile, clearance: f64) -> Curve {
    let above = curve_above(&span.start);
    let dir = if above { -1.0 } else { 1.0 };

    let start = Point::new(span.start.x, span.start.y + dir * clearance);
    let end = Point::new(span.end.x, span.end.y + dir * clearance);
    let height = (profile.base_height + profile.height_per_quarter * span.start.quarters.max(0.0))
        .min(profile.max_height);

    let mid_x = (start.x + end.x) / 2.0;
    let mid_y = (start.y + end.y) / 2.0 + dir * height;
    let half = profile.thickness / 2.0;

    Curve {
        start,
        end,
        control_top: Point::new(mid_x, mid_y - half),
        control_bottom: Point::new(mid_x, mid_y + half),
        thickness: profile.thickness,
        above,
    }
}

/// Horizontal bracket over (or under) a tuplet. Anchors carry the group's
/// outermost y on the stem side.
pub fn tuplet_bracket(span: &Span) -> (f64, f64, f64, bool) {
    let above = match span.start.placement {
        Some(p) => p == Placement::Above,
        None => span.start.stem_up,
    };
    let y = if above {
        span.start.y.min(span.end.y) - TUPLET_CLEARANCE
    } else {
        span.start.y.max(span.end.y) + TUPLET_CLEARANCE
    };
    (span.start.x, span.end.x, y, above)
}
