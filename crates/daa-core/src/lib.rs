//! DAA encounter analysis core.
//!
//! Ingests multi-aircraft trajectory logs, reduces them to ownship-relative
//! state series per intruder, and evaluates well-clear conflict metrics over
//! those series.

pub mod analysis;
pub mod error;
pub mod metrics;
pub mod projection;
pub mod schema;
pub mod thresholds;
pub mod trajectory;
pub mod vectors;

pub use analysis::{evaluate, IntruderMetrics, Metric, MetricSample};
pub use error::{IngestError, Result};
pub use metrics::{
    hmd, hmdf, horizontal_wcv, los_cd3d, taumod, tcoa, tcpa, vertical_wcv, vmd, wcv, Convergence,
};
pub use projection::{
    local_frame, project_to_plane, spherical_to_xyz, spherical_to_xyz_with_radius, LocalFrame,
    EARTH_RADIUS_M,
};
pub use schema::{PositionKind, Schema, VelocityKind};
pub use thresholds::{Cd3dThresholds, Detector, Threshold, WellClearThresholds};
pub use trajectory::{
    parse_log, read_log, AircraftTrajectory, Encounter, Position, RelativeSeries, RelativeState,
    TrackSample, Velocity,
};
pub use vectors::{Vect2, Vect3};
