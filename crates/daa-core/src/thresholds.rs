//! Well-clear and CD3D thresholds.
//!
//! Values are supplied by the configuration layer and only read here. Every
//! threshold keeps the unit tag it was declared with so renderers can label
//! plots; the metric functions themselves assume meters and seconds.

use serde::{Deserialize, Serialize};

/// A scalar threshold with its declared unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    pub unit: String,
}

impl Threshold {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Zero-valued threshold in `unit`.
    pub fn zero(unit: &str) -> Self {
        Self::new(0.0, unit)
    }
}

/// Thresholds of the well-clear (WCV) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellClearThresholds {
    /// Horizontal distance threshold
    pub dmod: Threshold,
    /// Modified tau time threshold
    pub taumod: Threshold,
    /// Vertical distance threshold
    pub zthr: Threshold,
    /// Time to co-altitude threshold
    pub tcoa: Threshold,
}

impl Default for WellClearThresholds {
    fn default() -> Self {
        Self {
            dmod: Threshold::zero("m"),
            taumod: Threshold::zero("s"),
            zthr: Threshold::zero("m"),
            tcoa: Threshold::zero("s"),
        }
    }
}

/// Thresholds of the CD3D (cylinder) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cd3dThresholds {
    /// Horizontal separation
    pub d: Threshold,
    /// Vertical separation
    pub h: Threshold,
}

impl Default for Cd3dThresholds {
    fn default() -> Self {
        Self {
            d: Threshold::zero("m"),
            h: Threshold::zero("m"),
        }
    }
}

/// Which detector the violation predicate is evaluated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Detector {
    WellClear(WellClearThresholds),
    Cd3d(Cd3dThresholds),
}

impl Default for Detector {
    fn default() -> Self {
        Detector::WellClear(WellClearThresholds::default())
    }
}

impl Detector {
    /// Threshold a horizontal distance series is drawn against.
    pub fn horizontal_threshold(&self) -> &Threshold {
        match self {
            Detector::WellClear(wcv) => &wcv.dmod,
            Detector::Cd3d(cd3d) => &cd3d.d,
        }
    }

    /// Threshold a vertical distance series is drawn against.
    pub fn vertical_threshold(&self) -> &Threshold {
        match self {
            Detector::WellClear(wcv) => &wcv.zthr,
            Detector::Cd3d(cd3d) => &cd3d.h,
        }
    }

    /// DMOD used for modified tau. The CD3D model has none, so it is zero.
    pub fn dmod(&self) -> f64 {
        match self {
            Detector::WellClear(wcv) => wcv.dmod.value,
            Detector::Cd3d(_) => 0.0,
        }
    }
}
