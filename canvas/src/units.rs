//! Unit conversion between data units and the units a user reads and types.
//!
//! A plan carries an optional `unit_scale`: the number of data units per
//! meter. With a positive scale the plan is *calibrated* and sizes are shown
//! in meters or centimeters; without one it is shown in raw pixels. Plans
//! whose data units already are meters simply have `unit_scale == 1.0`.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

/// Absolute tolerance when matching meter values against presets.
const METER_PRESET_TOLERANCE: f64 = 0.001;

/// Convert a data-unit length to centimeters.
///
/// The result is not rounded; round when formatting.
#[must_use]
pub fn data_to_cm(value: f64, unit_scale: f64) -> f64 {
    value / unit_scale * 100.0
}

/// Convert centimeters to a data-unit length.
#[must_use]
pub fn cm_to_data(cm: f64, unit_scale: f64) -> f64 {
    cm / 100.0 * unit_scale
}

/// A unit shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Meters,
    Centimeters,
    Pixels,
}

impl DisplayUnit {
    /// Suffix printed after a value.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Centimeters => "cm",
            Self::Pixels => "px",
        }
    }

    /// Increment used by numeric inputs in this unit.
    #[must_use]
    pub fn step(self) -> f64 {
        match self {
            Self::Meters => 0.01,
            Self::Centimeters | Self::Pixels => 1.0,
        }
    }
}

/// The conversion context of one plan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitSystem {
    unit_scale: Option<f64>,
}

impl UnitSystem {
    /// Build from a plan's stored scale. Missing, non-finite, or
    /// non-positive scales mean the plan is uncalibrated.
    #[must_use]
    pub fn new(unit_scale: Option<f64>) -> Self {
        Self { unit_scale: unit_scale.filter(|s| s.is_finite() && *s > 0.0) }
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.unit_scale.is_some()
    }

    /// Data units per meter, if calibrated.
    #[must_use]
    pub fn unit_scale(&self) -> Option<f64> {
        self.unit_scale
    }

    /// Meters when calibrated, pixels otherwise.
    #[must_use]
    pub fn default_unit(&self) -> DisplayUnit {
        if self.is_calibrated() { DisplayUnit::Meters } else { DisplayUnit::Pixels }
    }

    fn scale_or_unit(&self) -> f64 {
        self.unit_scale.unwrap_or(1.0)
    }

    /// Convert a data-unit length into `unit`.
    ///
    /// Pixel values are rounded to whole pixels; metric values are exact.
    #[must_use]
    pub fn to_display(&self, value: f64, unit: DisplayUnit) -> f64 {
        match unit {
            DisplayUnit::Meters => value / self.scale_or_unit(),
            DisplayUnit::Centimeters => data_to_cm(value, self.scale_or_unit()),
            DisplayUnit::Pixels => value.round(),
        }
    }

    /// Convert a length typed in `unit` back into data units.
    #[must_use]
    pub fn from_display(&self, value: f64, unit: DisplayUnit) -> f64 {
        match unit {
            DisplayUnit::Meters => value * self.scale_or_unit(),
            DisplayUnit::Centimeters => cm_to_data(value, self.scale_or_unit()),
            DisplayUnit::Pixels => value,
        }
    }

    /// Format a data-unit length for display, e.g. `"2.35 m"` or `"120 px"`.
    #[must_use]
    pub fn format(&self, value: f64, unit: DisplayUnit) -> String {
        let shown = self.to_display(value, unit);
        match unit {
            DisplayUnit::Meters => format!("{shown:.2} {}", unit.suffix()),
            DisplayUnit::Centimeters | DisplayUnit::Pixels => format!("{shown:.0} {}", unit.suffix()),
        }
    }
}

/// Which size a preset picker edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetSurface {
    DoorWidth,
    WindowWidth,
    WallThickness,
}

impl PresetSurface {
    /// Preset sizes in centimeters (or pixels when uncalibrated).
    #[must_use]
    pub fn presets_cm(self) -> &'static [u32] {
        match self {
            Self::DoorWidth => &[70, 80, 90, 100],
            Self::WindowWidth => &[60, 90, 120, 150],
            Self::WallThickness => &[10, 15, 20, 25, 30],
        }
    }

    /// Largest custom value accepted in pixel mode.
    #[must_use]
    pub fn pixel_limit(self) -> f64 {
        match self {
            Self::DoorWidth | Self::WindowWidth => 5000.0,
            Self::WallThickness => 500.0,
        }
    }
}

/// Preset values for `surface` expressed in `unit`.
#[must_use]
pub fn preset_values(surface: PresetSurface, unit: DisplayUnit) -> Vec<f64> {
    surface
        .presets_cm()
        .iter()
        .map(|&cm| match unit {
            DisplayUnit::Meters => f64::from(cm) / 100.0,
            DisplayUnit::Centimeters | DisplayUnit::Pixels => f64::from(cm),
        })
        .collect()
}

/// Preset labels for `surface`, e.g. `"0.90 m"` or `"90 cm"`.
#[must_use]
pub fn preset_labels(surface: PresetSurface, unit: DisplayUnit) -> Vec<String> {
    preset_values(surface, unit)
        .into_iter()
        .map(|v| match unit {
            DisplayUnit::Meters => format!("{v:.2} {}", unit.suffix()),
            DisplayUnit::Centimeters | DisplayUnit::Pixels => format!("{v:.0} {}", unit.suffix()),
        })
        .collect()
}

/// How a displayed value relates to the preset list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetMatch {
    /// The value equals the preset at this index; highlight it.
    Preset(usize),
    /// The value matches no preset; show it in the custom-entry field.
    Custom(f64),
}

/// Classify a displayed value against the presets of `surface`.
///
/// Centimeter and pixel presets are whole numbers and match exactly; meter
/// presets match within 0.001 to absorb floating-point drift.
#[must_use]
pub fn match_preset(value: f64, surface: PresetSurface, unit: DisplayUnit) -> PresetMatch {
    let tolerance = match unit {
        DisplayUnit::Meters => METER_PRESET_TOLERANCE,
        DisplayUnit::Centimeters | DisplayUnit::Pixels => f64::EPSILON,
    };
    preset_values(surface, unit)
        .iter()
        .position(|p| (value - p).abs() < tolerance)
        .map_or(PresetMatch::Custom(value), PresetMatch::Preset)
}

/// Parse a custom entry typed in `unit`.
///
/// Returns `None` for anything unparsable, non-finite, or non-positive, and
/// for pixel values above the surface's limit. Callers ignore `None` and
/// keep the previous value.
#[must_use]
pub fn parse_custom(input: &str, surface: PresetSurface, unit: DisplayUnit) -> Option<f64> {
    let Ok(value) = input.trim().parse::<f64>() else {
        return None;
    };
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    if unit == DisplayUnit::Pixels && value > surface.pixel_limit() {
        return None;
    }
    Some(value)
}
