//! Column layout of a trajectory log, detected from its header line.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};

/// How horizontal position is given in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    /// `lat`/`lon` columns, in degrees.
    Geodetic,
    /// `x`/`y` (or `sx`/`sy`) columns.
    Planar,
}

/// How velocity is given in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityKind {
    /// `trk`, `gs` and `vs` columns.
    TrackAndSpeed,
    /// `vx`, `vy` and `vz` columns.
    Cartesian,
}

/// Split a log line into fields. Commas, tabs and spaces separate fields;
/// square brackets are dropped when `strip_brackets` is set.
pub(crate) fn split_fields(line: &str, strip_brackets: bool) -> Vec<String> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .map(|field| {
            if strip_brackets {
                field.trim_matches(|c| c == '[' || c == ']')
            } else {
                field
            }
        })
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Index of the first column (after the identifier) named any of `names`.
fn column_index(columns: &[String], names: &[&str]) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, column)| names.contains(&column.as_str()))
        .map(|(idx, _)| idx)
}

fn first_field(line: &str) -> Option<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .find(|field| !field.is_empty())
}

/// A header line names its identifier column exactly `NAME`. Identifiers
/// that merely start with those letters are data.
pub(crate) fn is_header_line(line: &str) -> bool {
    first_field(line) == Some("NAME")
}

pub(crate) fn is_units_line(line: &str) -> bool {
    matches!(first_field(line), Some("unitless" | "[none]"))
}

/// Column indices and representation of one log.
///
/// Index 0 is always the aircraft identifier, so every other index refers to
/// the same position in a split data row. Optional columns that are absent
/// are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<String>,
    /// Declared unit per column; empty when the log has no units line.
    pub units: Vec<String>,
    pub position: PositionKind,
    pub velocity: VelocityKind,
    pub time: usize,
    /// Latitude or x.
    pub horizontal_a: usize,
    /// Longitude or y.
    pub horizontal_b: usize,
    pub altitude: Option<usize>,
    pub track: Option<usize>,
    pub ground_speed: Option<usize>,
    pub vertical_speed: Option<usize>,
    pub vx: Option<usize>,
    pub vy: Option<usize>,
    pub vz: Option<usize>,
    pub lookahead_time: Option<usize>,
}

impl Schema {
    /// Detect the schema from a `NAME ...` header line.
    pub fn from_header(line: &str) -> Result<Self> {
        let columns = split_fields(line, true);
        let find = |names: &[&str]| column_index(&columns, names);

        let time = find(&["time", "st"][..]).ok_or(IngestError::MissingColumn { column: "time" })?;

        let x = find(&["x", "sx"]);
        let (position, horizontal_a, horizontal_b) = match x {
            Some(x) => {
                let y = find(&["y", "sy"]).ok_or(IngestError::MissingColumn { column: "y" })?;
                (PositionKind::Planar, x, y)
            }
            None => {
                let lat = find(&["lat"]).ok_or(IngestError::MissingColumn { column: "lat" })?;
                let lon = find(&["lon"]).ok_or(IngestError::MissingColumn { column: "lon" })?;
                (PositionKind::Geodetic, lat, lon)
            }
        };

        let vx = find(&["vx"]);
        let vy = find(&["vy"]);
        let velocity = if vx.is_some() {
            if vy.is_none() {
                return Err(IngestError::MissingColumn { column: "vy" });
            }
            VelocityKind::Cartesian
        } else {
            VelocityKind::TrackAndSpeed
        };
        let track = find(&["trk"]);
        let ground_speed = find(&["gs"]);
        if velocity == VelocityKind::TrackAndSpeed {
            if track.is_none() {
                return Err(IngestError::MissingColumn { column: "trk" });
            }
            if ground_speed.is_none() {
                return Err(IngestError::MissingColumn { column: "gs" });
            }
        }

        Ok(Self {
            time,
            horizontal_a,
            horizontal_b,
            position,
            velocity,
            altitude: find(&["alt", "sz"]),
            track,
            ground_speed,
            vertical_speed: find(&["vs"]),
            vx,
            vy,
            vz: find(&["vz"]),
            lookahead_time: find(&["lookahead_time"]),
            columns,
            units: Vec::new(),
        })
    }

    /// Record the units line. Units are passed through untouched.
    pub fn set_units(&mut self, line: &str) {
        self.units = split_fields(line, true);
    }

    /// Declared unit of column `idx`, if the log has one.
    pub fn unit(&self, idx: usize) -> Option<&str> {
        self.units.get(idx).map(String::as_str)
    }

    pub fn column_name(&self, idx: usize) -> &str {
        self.columns.get(idx).map(String::as_str).unwrap_or("?")
    }

    /// Whether track angles are in degrees. Logs without a units line use
    /// the DAIDALUS default of degrees.
    pub fn track_in_degrees(&self) -> bool {
        match self.track.and_then(|idx| self.unit(idx)) {
            Some(unit) => unit == "deg",
            None => self.units.is_empty(),
        }
    }

    /// Column holding the vertical rate for this representation.
    pub fn vertical_rate_column(&self) -> Option<usize> {
        match self.velocity {
            VelocityKind::Cartesian => self.vz,
            VelocityKind::TrackAndSpeed => self.vertical_speed,
        }
    }
}
