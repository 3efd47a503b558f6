//! Per-intruder metric series for plotting and reporting.

use crate::metrics::{self, Convergence};
use crate::thresholds::Detector;
use crate::trajectory::{Encounter, RelativeState};
use serde::{Deserialize, Serialize};

/// Metrics of one intruder at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub time: f64,
    pub horizontal_distance: f64,
    pub vertical_distance: f64,
    pub tcpa: Convergence,
    pub hmd: f64,
    pub tcoa: Convergence,
    pub vmd: f64,
    pub taumod: Convergence,
    /// WCV for the well-clear detector, loss of separation for CD3D.
    pub violation: bool,
}

impl MetricSample {
    pub fn from_state(state: &RelativeState, detector: &Detector) -> Self {
        let s = state.position;
        let v = state.velocity;
        let sz = state.vertical_separation;
        let vz = state.vertical_rate;
        let violation = match detector {
            Detector::WellClear(thresholds) => metrics::wcv(s, sz, v, vz, thresholds),
            Detector::Cd3d(thresholds) => metrics::los_cd3d(s, sz, thresholds),
        };
        Self {
            time: state.time,
            horizontal_distance: s.norm(),
            vertical_distance: sz.abs(),
            tcpa: metrics::tcpa(s, v),
            hmd: metrics::hmd(s, v),
            tcoa: metrics::tcoa(sz, vz),
            vmd: metrics::vmd(sz, vz),
            taumod: metrics::taumod(s, v, detector.dmod()),
            violation,
        }
    }
}

/// A plottable metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Tcpa,
    Hmd,
    Vmd,
    Tcoa,
    Taumod,
    HorizontalDistance,
    VerticalDistance,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Tcpa,
        Metric::Hmd,
        Metric::Vmd,
        Metric::Tcoa,
        Metric::Taumod,
        Metric::HorizontalDistance,
        Metric::VerticalDistance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Tcpa => "tcpa",
            Metric::Hmd => "hmd",
            Metric::Vmd => "vmd",
            Metric::Tcoa => "tcoa",
            Metric::Taumod => "taumod",
            Metric::HorizontalDistance => "hd",
            Metric::VerticalDistance => "vd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.name() == name)
    }

    /// Value plotted for `sample`, or `None` when the sample is filtered out:
    /// tcpa and tcoa only while converging, hmd and taumod only when
    /// strictly positive.
    pub fn value(self, sample: &MetricSample) -> Option<f64> {
        match self {
            Metric::Tcpa => sample.tcpa.time(),
            Metric::Tcoa => sample.tcoa.time(),
            Metric::Hmd => Some(sample.hmd).filter(|v| *v > 0.0),
            Metric::Taumod => sample.taumod.time().filter(|v| *v > 0.0),
            Metric::Vmd => Some(sample.vmd),
            Metric::HorizontalDistance => Some(sample.horizontal_distance),
            Metric::VerticalDistance => Some(sample.vertical_distance),
        }
    }
}

/// Metric samples of one intruder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntruderMetrics {
    pub intruder_id: String,
    pub samples: Vec<MetricSample>,
}

impl IntruderMetrics {
    /// `(time, value)` pairs for `metric`, skipping filtered samples.
    pub fn series(&self, metric: Metric) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter_map(|sample| metric.value(sample).map(|value| (sample.time, value)))
            .collect()
    }

    /// Timestamps where the violation predicate holds.
    pub fn violation_times(&self) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|sample| sample.violation)
            .map(|sample| sample.time)
            .collect()
    }
}

/// Evaluate every metric for every intruder and timestep.
pub fn evaluate(encounter: &Encounter, detector: &Detector) -> Vec<IntruderMetrics> {
    encounter
        .relative
        .iter()
        .map(|series| IntruderMetrics {
            intruder_id: series.intruder_id.clone(),
            samples: series
                .states
                .iter()
                .map(|state| MetricSample::from_state(state, detector))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{Cd3dThresholds, Threshold, WellClearThresholds};
    use crate::vectors::Vect2;

    fn state(time: f64, s: Vect2, v: Vect2, sz: f64, vz: f64) -> RelativeState {
        RelativeState {
            time,
            position: s,
            velocity: v,
            vertical_separation: sz,
            vertical_rate: vz,
        }
    }

    fn wcv_detector() -> Detector {
        Detector::WellClear(WellClearThresholds {
            dmod: Threshold::new(1220.0, "m"),
            taumod: Threshold::new(35.0, "s"),
            zthr: Threshold::new(140.0, "m"),
            tcoa: Threshold::new(0.0, "s"),
        })
    }

    #[test]
    fn test_sample_from_converging_state() {
        let sample = MetricSample::from_state(
            &state(
                4.0,
                Vect2::new(3000.0, 0.0),
                Vect2::new(-100.0, 0.0),
                100.0,
                -10.0,
            ),
            &wcv_detector(),
        );
        assert_eq!(sample.time, 4.0);
        assert_eq!(sample.horizontal_distance, 3000.0);
        assert_eq!(sample.tcpa, Convergence::Converging(30.0));
        assert_eq!(sample.hmd, 0.0);
        assert_eq!(sample.tcoa, Convergence::Converging(10.0));
        assert_eq!(sample.vmd, 0.0);
        assert!(sample.taumod.within(35.0));
        assert!(sample.violation);
    }

    #[test]
    fn test_series_filters_sentinels() {
        let detector = wcv_detector();
        let metrics = IntruderMetrics {
            intruder_id: "intr".to_string(),
            samples: vec![
                MetricSample::from_state(
                    &state(0.0, Vect2::new(100.0, 0.0), Vect2::new(0.0, -10.0), 500.0, 5.0),
                    &detector,
                ),
                MetricSample::from_state(
                    &state(1.0, Vect2::new(2000.0, 0.0), Vect2::new(-100.0, 10.0), 500.0, -50.0),
                    &detector,
                ),
            ],
        };

        let tcpa = metrics.series(Metric::Tcpa);
        assert_eq!(tcpa.len(), 1);
        assert_eq!(tcpa[0].0, 1.0);
        assert_eq!(metrics.series(Metric::Tcoa), vec![(1.0, 10.0)]);
        assert_eq!(metrics.series(Metric::Taumod).len(), 1);
        assert_eq!(metrics.series(Metric::Vmd).len(), 2);
        assert_eq!(metrics.series(Metric::HorizontalDistance)[0], (0.0, 100.0));
        assert_eq!(metrics.series(Metric::VerticalDistance)[1], (1.0, 500.0));
    }

    #[test]
    fn test_cd3d_detector_uses_loss_of_separation() {
        let detector = Detector::Cd3d(Cd3dThresholds {
            d: Threshold::new(200.0, "m"),
            h: Threshold::new(50.0, "m"),
        });
        let inside = MetricSample::from_state(
            &state(0.0, Vect2::new(100.0, 0.0), Vect2::ZERO, 10.0, 0.0),
            &detector,
        );
        let above = MetricSample::from_state(
            &state(1.0, Vect2::new(100.0, 0.0), Vect2::ZERO, 80.0, 0.0),
            &detector,
        );
        assert!(inside.violation);
        assert!(!above.violation);
        assert_eq!(inside.taumod, Convergence::NotConverging);
    }

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(Metric::from_name("bogus"), None);
    }
}
