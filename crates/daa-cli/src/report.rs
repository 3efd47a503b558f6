//! Text and JSON rendering of encounter metrics.

use daa_core::{Detector, Encounter, IntruderMetrics, Metric};
use serde::Serialize;
use std::fmt;

/// Per-aircraft state series as read from the log.
#[derive(Debug, Clone, Serialize)]
pub struct AircraftSeries {
    pub aircraft_id: String,
    pub altitude: Vec<f64>,
    pub ground_speed: Vec<f64>,
    pub track: Vec<f64>,
    pub vertical_speed: Vec<f64>,
}

/// Everything a renderer needs for one log.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub ownship: &'a str,
    pub intruders: Vec<&'a str>,
    pub detector: &'a Detector,
    pub times: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lookahead_times: Vec<f64>,
    pub dropped_rows: usize,
    pub aircraft: Vec<AircraftSeries>,
    pub metrics: &'a [IntruderMetrics],
}

impl<'a> Report<'a> {
    pub fn new(
        encounter: &'a Encounter,
        detector: &'a Detector,
        metrics: &'a [IntruderMetrics],
    ) -> Self {
        let aircraft = encounter
            .aircraft()
            .map(|trajectory| AircraftSeries {
                aircraft_id: trajectory.aircraft_id.clone(),
                altitude: trajectory.altitudes(),
                ground_speed: trajectory.ground_speeds(),
                track: trajectory.track_angles(),
                vertical_speed: trajectory.vertical_speeds(),
            })
            .collect();
        Self {
            ownship: encounter.ownship_id(),
            intruders: encounter.intruder_ids(),
            detector,
            times: encounter.times(),
            lookahead_times: encounter.lookahead_times(),
            dropped_rows: encounter.dropped_rows,
            aircraft,
            metrics,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report. With `only` set, just that metric's series is
    /// listed per intruder.
    pub fn text(&self, only: Option<Metric>) -> TextReport<'_> {
        TextReport { report: self, only }
    }

    pub fn to_text(&self, only: Option<Metric>) -> String {
        self.text(only).to_string()
    }
}

/// Text rendering of a [`Report`], written through `Display`.
pub struct TextReport<'r> {
    report: &'r Report<'r>,
    only: Option<Metric>,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(
            f,
            "ownship {} | {} intruder(s) | {} timestep(s) | {} row(s) dropped",
            report.ownship,
            report.intruders.len(),
            report.times.len(),
            report.dropped_rows
        )?;
        writeln!(f, "detector {}", describe_detector(report.detector))?;

        for intruder in report.metrics {
            writeln!(f)?;
            writeln!(f, "intruder {}", intruder.intruder_id)?;
            match self.only {
                Some(metric) => {
                    for (time, value) in intruder.series(metric) {
                        writeln!(f, "  {:>10.3}  {}={:.3}", time, metric.name(), value)?;
                    }
                }
                None => {
                    writeln!(
                        f,
                        "  {:>10} {:>10} {:>9} {:>9} {:>10} {:>9} {:>9} {:>9}  wcv",
                        "time", "hd", "vd", "tcpa", "hmd", "tcoa", "vmd", "taumod"
                    )?;
                    for sample in &intruder.samples {
                        writeln!(
                            f,
                            "  {:>10.3} {:>10.1} {:>9.1} {:>9} {:>10.1} {:>9} {:>9.1} {:>9}  {}",
                            sample.time,
                            sample.horizontal_distance,
                            sample.vertical_distance,
                            format_time(sample.tcpa.time()),
                            sample.hmd,
                            format_time(sample.tcoa.time()),
                            sample.vmd,
                            format_time(sample.taumod.time()),
                            if sample.violation { "yes" } else { "no" }
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn format_time(t: Option<f64>) -> String {
    t.map(|t| format!("{t:.1}")).unwrap_or_else(|| "-".to_string())
}

fn describe_detector(detector: &Detector) -> String {
    match detector {
        Detector::WellClear(t) => format!(
            "WCV DMOD={} [{}] TAUMOD={} [{}] ZTHR={} [{}] TCOA={} [{}]",
            t.dmod.value,
            t.dmod.unit,
            t.taumod.value,
            t.taumod.unit,
            t.zthr.value,
            t.zthr.unit,
            t.tcoa.value,
            t.tcoa.unit
        ),
        Detector::Cd3d(t) => format!(
            "CD3D D={} [{}] H={} [{}]",
            t.d.value, t.d.unit, t.h.value, t.h.unit
        ),
    }
}
