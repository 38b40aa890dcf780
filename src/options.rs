//! Layout configuration.
//!
//! All lengths are in output user units (pixels at scale 1). The defaults
//! reproduce the engine's reference geometry: 40px per quarter note, 10px
//! between staff lines and 120px between staves.

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Horizontal advance of one quarter note
    pub spacing_unit: f64,
    /// Distance between adjacent staff lines
    pub staff_line_spacing: f64,
    /// Vertical distance from one staff's top line to the next staff's top line
    pub staff_spacing: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Space above the first staff (chord symbols live here)
    pub margin_top: f64,
    /// Gap between a measure's left barline and its first note
    pub note_inset: f64,
    pub stem_length: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            spacing_unit: 40.0,
            staff_line_spacing: 10.0,
            staff_spacing: 120.0,
            margin_left: 50.0,
            margin_right: 30.0,
            margin_top: 60.0,
            note_inset: 10.0,
            stem_length: 35.0,
        }
    }
}

impl LayoutOptions {
    /// Load options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: LayoutOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("spacing_unit", self.spacing_unit),
            ("staff_line_spacing", self.staff_line_spacing),
            ("staff_spacing", self.staff_spacing),
            ("stem_length", self.stem_length),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidOptions(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
            ("margin_top", self.margin_top),
            ("note_inset", self.note_inset),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidOptions(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Half the staff-line spacing: one diatonic staff step.
    pub fn staff_step(&self) -> f64 {
        self.staff_line_spacing / 2.0
    }
}
