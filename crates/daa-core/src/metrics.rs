//! Well-clear conflict metrics.
//!
//! All functions work on a single relative-state sample: relative position
//! `s` and velocity `v` in the horizontal plane (ownship minus intruder), or
//! relative vertical separation `sz` and rate `vz`. Callers iterate over
//! timestamps and intruders themselves.
//!
//! Time-valued metrics return [`Convergence`] instead of the legacy `0` / `-1`
//! sentinels so that "not converging" cannot be mistaken for "conflict now".

use crate::thresholds::{Cd3dThresholds, WellClearThresholds};
use crate::vectors::Vect2;
use serde::{Deserialize, Serialize};

/// Outcome of a time-to-event computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Convergence {
    /// Aircraft are closing; the time (seconds) until the event.
    Converging(f64),
    /// Aircraft are not closing on this axis.
    NotConverging,
}

impl Convergence {
    pub fn time(self) -> Option<f64> {
        match self {
            Convergence::Converging(t) => Some(t),
            Convergence::NotConverging => None,
        }
    }

    pub fn is_converging(self) -> bool {
        matches!(self, Convergence::Converging(_))
    }

    /// Collapse to a scalar, substituting `sentinel` when not converging.
    pub fn or_sentinel(self, sentinel: f64) -> f64 {
        self.time().unwrap_or(sentinel)
    }

    /// True when converging with a time inside `[0, limit]`.
    pub fn within(self, limit: f64) -> bool {
        matches!(self, Convergence::Converging(t) if 0.0 <= t && t <= limit)
    }
}

/// Legacy scalar for a non-converging tcoa/tcpa.
pub const NO_TIME_SENTINEL: f64 = 0.0;
/// Legacy scalar for a non-converging taumod.
pub const NO_TAUMOD_SENTINEL: f64 = -1.0;

/// Time to co-altitude.
pub fn tcoa(sz: f64, vz: f64) -> Convergence {
    if sz * vz < 0.0 && vz != 0.0 {
        Convergence::Converging(-sz / vz)
    } else {
        Convergence::NotConverging
    }
}

/// Vertical separation at the predicted co-altitude time.
pub fn vmd(sz: f64, vz: f64) -> f64 {
    (sz + tcoa(sz, vz).or_sentinel(NO_TIME_SENTINEL) * vz).abs()
}

/// Time to horizontal closest point of approach.
pub fn tcpa(s: Vect2, v: Vect2) -> Convergence {
    let sv = s.dot(v);
    let vv = v.norm_squared();
    if sv < 0.0 && vv != 0.0 {
        Convergence::Converging(-sv / vv)
    } else {
        Convergence::NotConverging
    }
}

/// Horizontal separation at tcpa.
pub fn hmd(s: Vect2, v: Vect2) -> f64 {
    s.add(v.scale(tcpa(s, v).or_sentinel(NO_TIME_SENTINEL)))
        .norm()
}

/// Modified tau relative to the distance threshold `dmod`.
pub fn taumod(s: Vect2, v: Vect2, dmod: f64) -> Convergence {
    let sv = s.dot(v);
    if sv < 0.0 {
        Convergence::Converging((dmod * dmod - s.norm_squared()) / sv)
    } else {
        Convergence::NotConverging
    }
}

/// Horizontal miss distance filter.
pub fn hmdf(s: Vect2, v: Vect2, hmd_threshold: f64) -> bool {
    hmd(s, v) <= hmd_threshold
}

/// Vertical well-clear violation.
pub fn vertical_wcv(sz: f64, vz: f64, zthr: f64, tcoa_threshold: f64) -> bool {
    sz.abs() <= zthr || tcoa(sz, vz).within(tcoa_threshold)
}

/// Horizontal well-clear violation.
pub fn horizontal_wcv(s: Vect2, v: Vect2, dmod: f64, taumod_threshold: f64) -> bool {
    s.norm() <= dmod || (hmdf(s, v, dmod) && taumod(s, v, dmod).within(taumod_threshold))
}

/// Combined well-clear violation.
pub fn wcv(s: Vect2, sz: f64, v: Vect2, vz: f64, thresholds: &WellClearThresholds) -> bool {
    horizontal_wcv(s, v, thresholds.dmod.value, thresholds.taumod.value)
        && vertical_wcv(sz, vz, thresholds.zthr.value, thresholds.tcoa.value)
}

/// CD3D loss of separation: strictly inside the `D` by `H` cylinder.
pub fn los_cd3d(s: Vect2, sz: f64, thresholds: &Cd3dThresholds) -> bool {
    let d = thresholds.d.value;
    s.norm_squared() < d * d && sz.abs() < thresholds.h.value
}
