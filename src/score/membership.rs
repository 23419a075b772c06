//! # Membership Scorer
//!
//! Maps a user context and an item's categorical buckets to a bounded
//! suitability score via triangular membership functions.
//!
//! Each bucket carries breakpoints `(a, b, c)`: membership is 0 at and
//! beyond the edges, 1 at the peak `b`, and linear in between. Tables are
//! validated at load time — `a < b < c` strictly for every bucket — so the
//! rising and falling slopes always have positive width and the division
//! below can never hit zero.

use serde::{Deserialize, Serialize};
use std::fs;

use super::{round3, ScoreMap};
use crate::catalog::{Item, Style, Weather};
use crate::context::Context;
use crate::error::StylistError;

/// Blend weights for the three membership components.
const TEMP_WEIGHT: f64 = 0.4;
const FORMALITY_WEIGHT: f64 = 0.4;
const MOOD_WEIGHT: f64 = 0.2;

/// Mood is scored on a fixed 0..10 scale peaking at 5.
const MOOD_BREAKPOINTS: Triangle = Triangle(0.0, 5.0, 10.0);

/// Triangular breakpoints `(a, b, c)`. Serialized as a 3-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle(pub f64, pub f64, pub f64);

impl Triangle {
    fn validate(&self, bucket: &str) -> Result<(), StylistError> {
        let Triangle(a, b, c) = *self;
        if !(a.is_finite() && b.is_finite() && c.is_finite()) || !(a < b && b < c) {
            return Err(StylistError::Config(format!(
                "breakpoints for `{bucket}` must satisfy a < b < c, got ({a}, {b}, {c})"
            )));
        }
        Ok(())
    }
}

/// Degree of fit of `x` against a triangular membership function.
///
/// Exactly at the left or right edge the membership is 0; strictly inside
/// the triangle it rises to 1 at the peak and falls back to 0.
pub fn membership(x: f64, tri: Triangle) -> f64 {
    let Triangle(a, b, c) = tri;
    if x <= a || x >= c {
        0.0
    } else if x < b {
        (x - a) / (b - a)
    } else if x > b {
        (c - x) / (c - b)
    } else {
        1.0
    }
}

/// Per-weather-bucket breakpoints. Closed by construction: a missing bucket
/// is a parse error, an unknown one is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherBreakpoints {
    pub cold: Triangle,
    pub cool: Triangle,
    pub mild: Triangle,
    pub warm: Triangle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StyleBreakpoints {
    pub casual: Triangle,
    pub semi_formal: Triangle,
    pub formal: Triangle,
}

/// Lookup tables from bucket to breakpoints, one per categorical attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointTable {
    pub weather: WeatherBreakpoints,
    pub style: StyleBreakpoints,
}

impl BreakpointTable {
    /// Built-in tables used when no override file is configured.
    pub fn default_seed() -> Self {
        Self {
            weather: WeatherBreakpoints {
                cold: Triangle(-15.0, 0.0, 15.0),
                cool: Triangle(10.0, 20.0, 25.0),
                mild: Triangle(20.0, 25.0, 30.0),
                warm: Triangle(28.0, 35.0, 40.0),
            },
            style: StyleBreakpoints {
                casual: Triangle(-2.0, 0.0, 4.0),
                semi_formal: Triangle(3.0, 5.0, 7.0),
                formal: Triangle(6.0, 8.0, 10.0),
            },
        }
    }

    /// Load the table: built-in seed when `path` is `None`, otherwise a JSON
    /// override file. Fails fast on parse errors or invalid orderings.
    pub fn load(path: Option<&str>) -> Result<Self, StylistError> {
        let table = match path {
            None => Self::default_seed(),
            Some(p) => {
                let data = fs::read_to_string(p).map_err(|e| {
                    StylistError::Config(format!("failed to read breakpoints {p}: {e}"))
                })?;
                Self::from_json_str(&data)?
            }
        };
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from a JSON string (validation included).
    pub fn from_json_str(data: &str) -> Result<Self, StylistError> {
        let table: Self = serde_json::from_str(data)
            .map_err(|e| StylistError::Config(format!("breakpoint table parse error: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    pub fn for_weather(&self, bucket: Weather) -> Triangle {
        match bucket {
            Weather::Cold => self.weather.cold,
            Weather::Cool => self.weather.cool,
            Weather::Mild => self.weather.mild,
            Weather::Warm => self.weather.warm,
        }
    }

    pub fn for_style(&self, bucket: Style) -> Triangle {
        match bucket {
            Style::Casual => self.style.casual,
            Style::SemiFormal => self.style.semi_formal,
            Style::Formal => self.style.formal,
        }
    }

    fn validate(&self) -> Result<(), StylistError> {
        self.weather.cold.validate("cold")?;
        self.weather.cool.validate("cool")?;
        self.weather.mild.validate("mild")?;
        self.weather.warm.validate("warm")?;
        self.style.casual.validate("casual")?;
        self.style.semi_formal.validate("semi-formal")?;
        self.style.formal.validate("formal")?;
        Ok(())
    }
}

/// Fuzzy suitability of a single item for the given context, in [0, 1].
pub fn fuzzy_score(context: &Context, item: &Item, table: &BreakpointTable) -> f64 {
    let t = membership(context.temperature, table.for_weather(item.weather));
    let f = membership(context.formality, table.for_style(item.style));
    let m = membership(context.mood, MOOD_BREAKPOINTS);
    round3(TEMP_WEIGHT * t + FORMALITY_WEIGHT * f + MOOD_WEIGHT * m)
}

/// Membership scores for the whole catalog, keyed by item id.
pub fn compute_membership_scores(
    context: &Context,
    items: &[Item],
    table: &BreakpointTable,
) -> ScoreMap {
    items
        .iter()
        .map(|item| (item.id.clone(), fuzzy_score(context, item, table)))
        .collect()
}
