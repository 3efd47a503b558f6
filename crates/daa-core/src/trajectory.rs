//! Trajectory log ingestion.
//!
//! A log holds one row per aircraft per timestep. The first identifier seen
//! is the ownship; every other identifier is an intruder. Rows are aligned
//! into complete timesteps and reduced to ownship-relative state series per
//! intruder.

use crate::error::{IngestError, Result};
use crate::projection::{spherical_to_xyz, LocalFrame};
use crate::schema::{self, PositionKind, Schema, VelocityKind};
use crate::vectors::Vect2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Identifier token meaning "same aircraft as the previous row".
pub const REPEAT_ID_TOKEN: &str = "\"";

/// Horizontal position of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Position {
    /// Latitude/longitude in radians.
    Geodetic { lat: f64, lon: f64 },
    Planar { x: f64, y: f64 },
}

/// Velocity of one sample, as declared in the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Velocity {
    /// Track angle in the log's declared unit.
    TrackAndSpeed {
        ground_speed: f64,
        track: f64,
        vertical_speed: f64,
    },
    Cartesian { vx: f64, vy: f64, vz: f64 },
}

impl Velocity {
    /// Horizontal velocity vector. Track angles are clockwise from north.
    pub fn horizontal(&self, track_in_degrees: bool) -> Vect2 {
        match *self {
            Velocity::TrackAndSpeed {
                ground_speed,
                track,
                ..
            } => {
                let angle = if track_in_degrees {
                    track.to_radians()
                } else {
                    track
                };
                Vect2::new(angle.sin() * ground_speed, angle.cos() * ground_speed)
            }
            Velocity::Cartesian { vx, vy, .. } => Vect2::new(vx, vy),
        }
    }

    pub fn vertical_rate(&self) -> f64 {
        match *self {
            Velocity::TrackAndSpeed { vertical_speed, .. } => vertical_speed,
            Velocity::Cartesian { vz, .. } => vz,
        }
    }

    pub fn ground_speed(&self) -> f64 {
        match *self {
            Velocity::TrackAndSpeed { ground_speed, .. } => ground_speed,
            Velocity::Cartesian { vx, vy, .. } => Vect2::new(vx, vy).norm(),
        }
    }

    /// Track angle: the declared column value, or `atan2(vx, vy)` mapped to
    /// `[0, 360)` degrees for Cartesian velocities.
    pub fn track(&self) -> f64 {
        match *self {
            Velocity::TrackAndSpeed { track, .. } => track,
            Velocity::Cartesian { vx, vy, .. } => {
                let deg = vx.atan2(vy).to_degrees();
                if deg < 0.0 {
                    deg + 360.0
                } else {
                    deg
                }
            }
        }
    }
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub aircraft_id: String,
    pub time: f64,
    pub position: Position,
    pub altitude: f64,
    pub velocity: Velocity,
    #[serde(default)]
    pub lookahead_time: Option<f64>,
}

/// All aligned samples of one aircraft, in log order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftTrajectory {
    pub aircraft_id: String,
    pub samples: Vec<TrackSample>,
}

impl AircraftTrajectory {
    fn new(aircraft_id: impl Into<String>) -> Self {
        Self {
            aircraft_id: aircraft_id.into(),
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn altitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.altitude).collect()
    }

    pub fn ground_speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity.ground_speed()).collect()
    }

    pub fn track_angles(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity.track()).collect()
    }

    pub fn vertical_speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity.vertical_rate()).collect()
    }
}

/// Ownship-relative state of one intruder at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeState {
    pub time: f64,
    /// Ownship minus intruder position in the local plane: points from the
    /// intruder toward the ownship.
    pub position: Vect2,
    /// Ownship minus intruder horizontal velocity.
    pub velocity: Vect2,
    /// Ownship minus intruder altitude.
    pub vertical_separation: f64,
    /// Ownship minus intruder vertical rate.
    pub vertical_rate: f64,
}

/// Relative state series of one intruder, aligned to ownship timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeSeries {
    pub intruder_id: String,
    pub states: Vec<RelativeState>,
}

/// Result of ingesting one log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    pub schema: Schema,
    pub ownship: AircraftTrajectory,
    /// Intruders in order of first appearance.
    pub intruders: Vec<AircraftTrajectory>,
    /// One series per intruder, same order as `intruders`.
    pub relative: Vec<RelativeSeries>,
    /// Data rows discarded by the alignment filter.
    pub dropped_rows: usize,
}

impl Encounter {
    pub fn ownship_id(&self) -> &str {
        &self.ownship.aircraft_id
    }

    pub fn intruder_ids(&self) -> Vec<&str> {
        self.intruders
            .iter()
            .map(|t| t.aircraft_id.as_str())
            .collect()
    }

    /// Ownship first, then intruders.
    pub fn aircraft(&self) -> impl Iterator<Item = &AircraftTrajectory> {
        std::iter::once(&self.ownship).chain(self.intruders.iter())
    }

    /// Aligned timestamps, taken from the ownship rows.
    pub fn times(&self) -> Vec<f64> {
        self.ownship.times()
    }

    /// Ownship look-ahead times; empty when the log has no such column.
    pub fn lookahead_times(&self) -> Vec<f64> {
        self.ownship
            .samples
            .iter()
            .filter_map(|s| s.lookahead_time)
            .collect()
    }

    pub fn timestep_count(&self) -> usize {
        self.ownship.len()
    }
}

/// Read and ingest the log at `path`.
pub fn read_log(path: impl AsRef<Path>) -> Result<Encounter> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log(&text)
}

/// Ingest the full text of a log.
pub fn parse_log(text: &str) -> Result<Encounter> {
    let (schema, samples) = parse_rows(text)?;

    let mut names: Vec<String> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for sample in &samples {
        if !index_of.contains_key(sample.aircraft_id.as_str()) {
            index_of.insert(sample.aircraft_id.as_str(), names.len());
            names.push(sample.aircraft_id.clone());
        }
    }

    let blocks = complete_blocks(&samples, names.len());
    let kept: usize = blocks.iter().map(|block| block.len()).sum();
    let dropped_rows = samples.len() - kept;
    if dropped_rows > 0 {
        tracing::warn!(
            dropped_rows,
            aircraft = names.len(),
            "discarded rows outside complete timesteps"
        );
    }

    let mut trajectories: Vec<AircraftTrajectory> =
        names.iter().map(AircraftTrajectory::new).collect();
    for block in &blocks {
        for sample in samples[block.clone()].iter() {
            let idx = index_of[sample.aircraft_id.as_str()];
            trajectories[idx].samples.push(sample.clone());
        }
    }

    let mut aircraft = trajectories.into_iter();
    let ownship = aircraft
        .next()
        .unwrap_or_else(|| AircraftTrajectory::new(String::new()));
    let intruders: Vec<AircraftTrajectory> = aircraft.collect();

    let track_in_degrees = schema.track_in_degrees();
    let relative = intruders
        .iter()
        .map(|intruder| relative_series(&ownship, intruder, track_in_degrees))
        .collect();

    tracing::debug!(
        ownship = %ownship.aircraft_id,
        intruders = intruders.len(),
        timesteps = ownship.len(),
        position = ?schema.position,
        velocity = ?schema.velocity,
        "ingested trajectory log"
    );

    Ok(Encounter {
        schema,
        ownship,
        intruders,
        relative,
        dropped_rows,
    })
}

fn parse_rows(text: &str) -> Result<(Schema, Vec<TrackSample>)> {
    let mut schema: Option<Schema> = None;
    let mut samples: Vec<TrackSample> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Header and units lines are only recognised ahead of the data, so
        // no aircraft identifier can be mistaken for one.
        if schema.is_none() && schema::is_header_line(line) {
            schema = Some(Schema::from_header(line)?);
            continue;
        }
        if samples.is_empty() && schema::is_units_line(line) {
            if let Some(schema) = schema.as_mut() {
                schema.set_units(line);
            }
            continue;
        }

        let schema = schema.as_ref().ok_or(IngestError::MissingHeader)?;
        let mut fields = schema::split_fields(line, false);
        if fields.first().map(String::as_str) == Some(REPEAT_ID_TOKEN) {
            let previous = samples
                .last()
                .map(|s| s.aircraft_id.clone())
                .ok_or(IngestError::OrphanPlaceholder { line: line_no })?;
            fields[0] = previous;
        }
        samples.push(parse_sample(schema, &fields, line_no)?);
    }

    let schema = schema.ok_or(IngestError::MissingHeader)?;
    Ok((schema, samples))
}

fn parse_sample(schema: &Schema, fields: &[String], line: usize) -> Result<TrackSample> {
    let number = |idx: usize| -> Result<f64> {
        let column = schema.column_name(idx).to_string();
        let value = fields
            .get(idx)
            .ok_or_else(|| IngestError::MissingField {
                line,
                column: column.clone(),
            })?;
        value.parse::<f64>().map_err(|_| IngestError::Malformed {
            line,
            column,
            value: value.clone(),
        })
    };
    let optional = |idx: Option<usize>| -> Result<f64> { idx.map_or(Ok(0.0), &number) };

    let a = number(schema.horizontal_a)?;
    let b = number(schema.horizontal_b)?;
    let position = match schema.position {
        PositionKind::Geodetic => Position::Geodetic {
            lat: a.to_radians(),
            lon: b.to_radians(),
        },
        PositionKind::Planar => Position::Planar { x: a, y: b },
    };

    let velocity = match schema.velocity {
        VelocityKind::TrackAndSpeed => Velocity::TrackAndSpeed {
            ground_speed: optional(schema.ground_speed)?,
            track: optional(schema.track)?,
            vertical_speed: optional(schema.vertical_speed)?,
        },
        VelocityKind::Cartesian => Velocity::Cartesian {
            vx: optional(schema.vx)?,
            vy: optional(schema.vy)?,
            vz: optional(schema.vz)?,
        },
    };

    Ok(TrackSample {
        aircraft_id: fields[0].clone(),
        time: number(schema.time)?,
        position,
        altitude: optional(schema.altitude)?,
        velocity,
        lookahead_time: schema.lookahead_time.map(&number).transpose()?,
    })
}

/// Row ranges that form complete timesteps.
///
/// A timestep is complete when exactly `aircraft` rows separate one ownship
/// row from the next and the run holds every aircraft once. Rows after the
/// last ownship row are never closed by a following one and are dropped,
/// unless the whole log is a single timestep.
fn complete_blocks(samples: &[TrackSample], aircraft: usize) -> Vec<std::ops::Range<usize>> {
    let Some(ownship) = samples.first().map(|s| s.aircraft_id.as_str()) else {
        return Vec::new();
    };
    if samples.len() == aircraft {
        return vec![0..samples.len()];
    }

    let starts: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.aircraft_id == ownship)
        .map(|(idx, _)| idx)
        .collect();

    starts
        .windows(2)
        .map(|pair| pair[0]..pair[1])
        .filter(|block| block.len() == aircraft)
        .filter(|block| {
            let ids: HashSet<&str> = samples[block.clone()]
                .iter()
                .map(|s| s.aircraft_id.as_str())
                .collect();
            ids.len() == aircraft
        })
        .collect()
}

fn relative_series(
    ownship: &AircraftTrajectory,
    intruder: &AircraftTrajectory,
    track_in_degrees: bool,
) -> RelativeSeries {
    let states = ownship
        .samples
        .iter()
        .zip(intruder.samples.iter())
        .map(|(own, intr)| {
            let (own_xy, intr_xy) = plane_positions(own.position, intr.position);
            RelativeState {
                time: own.time,
                position: own_xy.sub(intr_xy),
                velocity: own
                    .velocity
                    .horizontal(track_in_degrees)
                    .sub(intr.velocity.horizontal(track_in_degrees)),
                vertical_separation: own.altitude - intr.altitude,
                vertical_rate: own.velocity.vertical_rate() - intr.velocity.vertical_rate(),
            }
        })
        .collect();

    RelativeSeries {
        intruder_id: intruder.aircraft_id.clone(),
        states,
    }
}

/// Ownship and intruder positions in a common plane. Geodetic positions are
/// projected into the tangent plane at the ownship's point.
fn plane_positions(own: Position, intr: Position) -> (Vect2, Vect2) {
    match (own, intr) {
        (Position::Planar { x: ox, y: oy }, Position::Planar { x: ix, y: iy }) => {
            (Vect2::new(ox, oy), Vect2::new(ix, iy))
        }
        (Position::Geodetic { lat: olat, lon: olon }, Position::Geodetic { lat, lon }) => {
            let reference = spherical_to_xyz(olat, olon);
            let frame = LocalFrame::at(reference);
            (
                frame.project(reference),
                frame.project(spherical_to_xyz(lat, lon)),
            )
        }
        // The schema fixes one representation per log.
        _ => unreachable!("mixed position representations in one log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANAR_LOG: &str = "\
# planar encounter
NAME sx sy sz vx vy vz time
[none] [m] [m] [m] [m/s] [m/s] [m/s] [s]
own 0 0 1000 0 10 0 0
intr 100 0 500 0 0 5 0
own 0 10 1000 0 10 0 1
intr 100 0 505 0 0 5 1
own 0 20 1000 0 10 0 2
intr 100 0 510 0 0 5 2
";

    #[test]
    fn test_parse_planar_log() {
        let enc = parse_log(PLANAR_LOG).unwrap();
        assert_eq!(enc.ownship_id(), "own");
        assert_eq!(enc.intruder_ids(), vec!["intr"]);
        // The t=2 rows are never closed by another ownship row.
        assert_eq!(enc.times(), vec![0.0, 1.0]);
        assert_eq!(enc.dropped_rows, 2);
        assert_eq!(enc.schema.unit(3), Some("m"));

        let states = &enc.relative[0].states;
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].position, Vect2::new(-100.0, 0.0));
        assert_eq!(states[0].velocity, Vect2::new(0.0, 10.0));
        assert_eq!(states[0].vertical_separation, 500.0);
        assert_eq!(states[0].vertical_rate, -5.0);
        assert_eq!(states[1].position, Vect2::new(-100.0, 10.0));
        assert_eq!(states[1].vertical_separation, 495.0);
    }

    #[test]
    fn test_placeholder_repeats_previous_identifier() {
        let log = "\
NAME x y alt vx vy vz time
A 0 0 0 0 0 0 0
B 1 1 0 0 0 0 0
\" 2 2 0 0 0 0 0
A 0 0 0 0 0 0 1
B 1 1 0 0 0 0 1
A 0 0 0 0 0 0 2
B 1 1 0 0 0 0 2
";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.intruder_ids(), vec!["B"]);
        // A, B, B at t=0 is not a complete timestep; t=2 is never closed.
        assert_eq!(enc.times(), vec![1.0]);
        assert_eq!(enc.intruders[0].len(), 1);
        assert_eq!(enc.dropped_rows, 5);
    }

    #[test]
    fn test_orphan_placeholder_is_an_error() {
        let log = "NAME x y vx vy time\n\" 0 0 0 0 0\n";
        let err = parse_log(log).unwrap_err();
        assert!(matches!(err, IngestError::OrphanPlaceholder { line: 2 }));
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let log = "NAME x y vx vy time\nA 0 0 0 0 0\nB 0 abc 0 0 0\n";
        match parse_log(log).unwrap_err() {
            IngestError::Malformed {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "y");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_missing_field() {
        let log = "NAME x y vx vy time\nA 0 0 0 0\n";
        assert!(matches!(
            parse_log(log).unwrap_err(),
            IngestError::MissingField { line: 2, .. }
        ));
    }

    #[test]
    fn test_data_before_header_is_an_error() {
        assert!(matches!(
            parse_log("A 0 0 0 0 0\n").unwrap_err(),
            IngestError::MissingHeader
        ));
    }

    #[test]
    fn test_orphan_ownship_row_is_dropped() {
        let log = "\
NAME x y vx vy time
own 0 0 0 0 0
intr 5 5 0 0 0
own 0 0 0 0 1
";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.ownship.len(), 1);
        assert_eq!(enc.intruders[0].len(), 1);
        assert_eq!(enc.relative[0].states.len(), 1);
        assert_eq!(enc.dropped_rows, 1);
    }

    #[test]
    fn test_block_with_duplicate_intruder_is_dropped() {
        let log = "\
NAME x y vx vy time
own 0 0 0 0 0
b 1 0 0 0 0
c 2 0 0 0 0
own 0 0 0 0 1
b 1 0 0 0 1
b 1 0 0 0 1
own 0 0 0 0 2
b 1 0 0 0 2
c 2 0 0 0 2
own 0 0 0 0 3
";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.times(), vec![0.0, 2.0]);
        assert_eq!(enc.dropped_rows, 4);
        for series in &enc.relative {
            assert_eq!(series.states.len(), 2);
        }
    }

    #[test]
    fn test_final_timestep_is_dropped() {
        let log = "\
NAME x y vx vy time
own 0 0 0 0 0
intr 5 0 0 0 0
own 0 0 0 0 1
intr 5 0 0 0 1
own 0 0 0 0 2
intr 5 0 0 0 2
";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.times(), vec![0.0, 1.0]);
        assert_eq!(enc.intruders[0].times(), vec![0.0, 1.0]);
        assert_eq!(enc.dropped_rows, 2);
    }

    #[test]
    fn test_single_timestep_log_is_kept_whole() {
        let log = "NAME x y vx vy time\nown 0 0 0 0 0\nintr 5 0 0 0 0\n";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.times(), vec![0.0]);
        assert_eq!(enc.relative[0].states.len(), 1);
        assert_eq!(enc.dropped_rows, 0);
    }

    #[test]
    fn test_identifier_starting_with_name_is_an_aircraft() {
        let log = "\
NAME x y vx vy time
own 0 0 0 0 0
nameless 5 0 0 0 0
own 0 0 0 0 1
nameless 6 0 0 0 1
own 0 0 0 0 2
";
        let enc = parse_log(log).unwrap();
        assert_eq!(enc.intruder_ids(), vec!["nameless"]);
        assert_eq!(enc.times(), vec![0.0, 1.0]);
        assert_eq!(enc.relative[0].states[1].position, Vect2::new(-6.0, 0.0));
        assert_eq!(enc.dropped_rows, 1);
    }

    #[test]
    fn test_header_only_log_is_empty_not_error() {
        let enc = parse_log("NAME lat lon alt trk gs vs time\n").unwrap();
        assert_eq!(enc.timestep_count(), 0);
        assert!(enc.intruders.is_empty());
        assert!(enc.relative.is_empty());
    }

    #[test]
    fn test_track_and_speed_velocity_reconstruction() {
        let v = Velocity::TrackAndSpeed {
            ground_speed: 10.0,
            track: 90.0,
            vertical_speed: -2.0,
        };
        assert!(v.horizontal(true).almost_equals(Vect2::new(10.0, 0.0), 1e-12));
        let v_rad = Velocity::TrackAndSpeed {
            ground_speed: 10.0,
            track: std::f64::consts::PI,
            vertical_speed: 0.0,
        };
        assert!(v_rad.horizontal(false).almost_equals(Vect2::new(0.0, -10.0), 1e-12));
        assert_eq!(v.vertical_rate(), -2.0);
    }

    #[test]
    fn test_cartesian_ground_speed_and_track() {
        let v = Velocity::Cartesian {
            vx: -3.0,
            vy: -4.0,
            vz: 1.0,
        };
        assert_eq!(v.ground_speed(), 5.0);
        let trk = v.track();
        assert!((trk - (180.0 + 36.869_897_645_844_02)).abs() < 1e-9);
    }
}
