//! scorelayout: layout engine that turns a typed MusicXML-style score into
//! engraving geometry.
//!
//! The engine takes an already-parsed [`Score`] and produces a flat,
//! positioned list of primitives per part (staff lines, barlines, clefs,
//! noteheads, stems, curves, chord symbols, fretboard diagrams, ...). It does
//! no I/O and does not draw; a drawing back-end consumes the geometry.
//!
//! # Example
//! ```no_run
//! use scorelayout::{layout_score, score_from_json, LayoutOptions};
//!
//! let json = std::fs::read_to_string("score.json").unwrap();
//! let score = score_from_json(&json).unwrap();
//! let layout = layout_score(&score, &LayoutOptions::default());
//! println!("{} x {}", layout.width, layout.height);
//! for issue in &layout.issues {
//!     println!("warning: {issue}");
//! }
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod options;

pub use error::{Error, LayoutIssue};
pub use layout::geometry::{GeometryKey, Point, Primitive, Shape};
pub use layout::{layout_score, MeasureSpan, PartLayout, PlacedChord, ScoreLayout};
pub use model::*;
pub use options::LayoutOptions;

/// Deserialize a score model from JSON.
pub fn score_from_json(json: &str) -> Result<Score, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a layout to compact JSON.
pub fn layout_to_json(layout: &ScoreLayout) -> Result<String, Error> {
    Ok(serde_json::to_string(layout)?)
}

/// Lay out a JSON score with JSON options (empty string for defaults) and
/// return the geometry as JSON.
pub fn layout_json(score_json: &str, options_json: &str) -> Result<String, Error> {
    let score = score_from_json(score_json)?;
    let opts = if options_json.trim().is_empty() {
        LayoutOptions::default()
    } else {
        LayoutOptions::from_json(options_json)?
    };
    layout_to_json(&layout_score(&score, &opts))
}
