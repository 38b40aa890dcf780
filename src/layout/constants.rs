//! Fixed glyph metrics for the layout engine (in output user units).
//!
//! Scale-dependent lengths that callers may tune live in
//! [`crate::LayoutOptions`]; the values here describe glyph geometry.

// ── Staff ───────────────────────────────────────────────────────────
pub(super) const DEFAULT_STAFF_LINES: i32 = 5;
pub(super) const STAFF_LINE_WIDTH: f64 = 0.8;

// ── Prefix widths ───────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 32.0; // clef glyph plus gap at part start
pub(super) const CLEF_X_OFFSET: f64 = 5.0;
pub(super) const KEY_SIG_ACCIDENTAL_SPACE: f64 = 12.0;
pub(super) const KEY_SIG_GAP: f64 = 4.0;
pub(super) const TIME_SIG_SPACE: f64 = 24.0;
pub(super) const TIME_SIG_DIGIT_WIDTH: f64 = 12.0;
pub(super) const TIME_SIG_HALF_HEIGHT: f64 = 10.0; // digits sit ±10 around the middle line

// ── Notes ───────────────────────────────────────────────────────────
pub(super) const NOTEHEAD_HALF_WIDTH: f64 = 5.0; // stem attaches here
pub(super) const ACCIDENTAL_OFFSET_X: f64 = 15.0;
pub(super) const DOT_OFFSET_X: f64 = 15.0;
pub(super) const DOT_SPACING: f64 = 8.0;
pub(super) const DOT_RADIUS: f64 = 2.0;
pub(super) const LEDGER_LINE_WIDTH: f64 = 22.0;
pub(super) const STEM_WIDTH: f64 = 1.0;

// ── Barlines ────────────────────────────────────────────────────────
pub(super) const BARLINE_WIDTH: f64 = 1.0;
pub(super) const HEAVY_BARLINE_WIDTH: f64 = 3.0;
pub(super) const DOUBLE_BARLINE_GAP: f64 = 4.0;

// ── Curves ──────────────────────────────────────────────────────────
pub(super) const TIE_THICKNESS: f64 = 2.5;
pub(super) const TIE_BASE_HEIGHT: f64 = 6.0;
pub(super) const TIE_HEIGHT_PER_QUARTER: f64 = 2.0;
pub(super) const TIE_MAX_HEIGHT: f64 = 16.0;
pub(super) const SLUR_THICKNESS: f64 = 4.0;
pub(super) const SLUR_BASE_HEIGHT: f64 = 10.0;
pub(super) const SLUR_HEIGHT_PER_QUARTER: f64 = 4.0;
pub(super) const SLUR_MAX_HEIGHT: f64 = 25.0;
pub(super) const TUPLET_CLEARANCE: f64 = 10.0; // beyond the stem tip

// ── Harmony ─────────────────────────────────────────────────────────
pub(super) const CHORD_SYMBOL_OFFSET_Y: f64 = -30.0; // above staff
pub(super) const FRAME_STRING_SPACING: f64 = 6.0;
pub(super) const FRAME_FRET_SPACING: f64 = 6.0;
pub(super) const FRAME_NUT_WIDTH: f64 = 2.0;
pub(super) const FRAME_LINE_WIDTH: f64 = 0.5;
pub(super) const FRAME_DOT_RADIUS: f64 = 2.0;
pub(super) const FRAME_BARRE_WIDTH: f64 = 4.0;
pub(super) const FRAME_MARKER_OFFSET: f64 = 6.0; // open/muted markers above the nut
pub(super) const FRAME_TEXT_GAP: f64 = 14.0; // between diagram bottom and chord text
