//! Threshold configuration from DAIDALUS-style parameter files.
//!
//! Each line is `key = value [unit]`. Lines starting with `#` and blank lines
//! are skipped; a missing unit is recorded as `unitless`.

use daa_core::{Cd3dThresholds, Detector, Threshold, WellClearThresholds};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected `key = value [unit]`")]
    Syntax { line: usize },
    #[error("parameter {key} is not a number: {value:?}")]
    NotANumber { key: String, value: String },
    #[error("parameter {name} is declared in [{unit}]; only [{expected}] is supported")]
    UnsupportedUnit {
        name: String,
        unit: String,
        expected: &'static str,
    },
}

/// Raw parameter entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: String,
    pub unit: String,
}

/// Parameters of one configuration file, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    entries: HashMap<String, Parameter>,
}

impl ParameterTable {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cleaned: String = line
                .chars()
                .map(|c| if c == '=' { ' ' } else { c })
                .filter(|c| *c != '[' && *c != ']')
                .collect();
            let columns: Vec<&str> = cleaned.split_whitespace().collect();
            let (Some(key), Some(value)) = (columns.first(), columns.get(1)) else {
                return Err(ConfigError::Syntax { line: idx + 1 });
            };
            entries.insert(
                key.to_string(),
                Parameter {
                    value: value.to_string(),
                    unit: columns.get(2).unwrap_or(&"unitless").to_string(),
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn get(&self, key: &str) -> Option<&Parameter> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the detector selected by `conflict_level`, if any.
    pub fn detector_name(&self) -> Option<&str> {
        let level = self.get("conflict_level")?.value.parse::<f64>().ok()? as i64;
        self.get(&format!("alert_{level}_detector"))
            .map(|p| p.value.as_str())
    }

    /// Resolve the detector and its thresholds.
    ///
    /// Top-level `DMOD`, `TAUMOD`, `ZTHR`, `TCOA`, `D`, `H` are read first,
    /// then the keys of the detector selected by `conflict_level`. The CD3D
    /// model is used when the selected detector defines `D`/`H`, or when only
    /// top-level `D`/`H` are present.
    pub fn detector(&self) -> Result<Detector, ConfigError> {
        let mut wcv = WellClearThresholds::default();
        let mut cd3d = Cd3dThresholds::default();
        let mut has_wcv = false;
        let mut has_cd3d = false;
        let mut cd3d_from_detector = false;

        let mut key_sets = vec![ThresholdKeys::top_level()];
        if let Some(det) = self.detector_name() {
            tracing::debug!(detector = det, "using configured alert detector");
            key_sets.push(ThresholdKeys::for_detector(det));
        }

        for (level, keys) in key_sets.iter().enumerate() {
            for (key, slot, dimension) in [
                (&keys.dmod, &mut wcv.dmod, Dimension::Distance),
                (&keys.taumod, &mut wcv.taumod, Dimension::Time),
                (&keys.zthr, &mut wcv.zthr, Dimension::Distance),
                (&keys.tcoa, &mut wcv.tcoa, Dimension::Time),
            ] {
                if self.get(key).is_some() {
                    *slot = self.threshold(key, dimension)?;
                    has_wcv = true;
                }
            }
            if self.get(&keys.d).is_some() && self.get(&keys.h).is_some() {
                cd3d = Cd3dThresholds {
                    d: self.threshold(&keys.d, Dimension::Distance)?,
                    h: self.threshold(&keys.h, Dimension::Distance)?,
                };
                has_cd3d = true;
                cd3d_from_detector |= level > 0;
            }
        }

        if cd3d_from_detector || (has_cd3d && !has_wcv) {
            Ok(Detector::Cd3d(cd3d))
        } else {
            Ok(Detector::WellClear(wcv))
        }
    }

    fn threshold(&self, key: &str, dimension: Dimension) -> Result<Threshold, ConfigError> {
        let Some(param) = self.get(key) else {
            return Ok(Threshold::zero(dimension.unit()));
        };
        let value = param
            .value
            .parse::<f64>()
            .map_err(|_| ConfigError::NotANumber {
                key: key.to_string(),
                value: param.value.clone(),
            })?;
        if param.unit != dimension.unit() && param.unit != "unitless" {
            return Err(ConfigError::UnsupportedUnit {
                name: key.to_string(),
                unit: param.unit.clone(),
                expected: dimension.unit(),
            });
        }
        Ok(Threshold::new(value, dimension.unit()))
    }
}

/// Parameter names of one threshold set.
struct ThresholdKeys {
    dmod: String,
    taumod: String,
    zthr: String,
    tcoa: String,
    d: String,
    h: String,
}

impl ThresholdKeys {
    fn top_level() -> Self {
        Self {
            dmod: "DMOD".to_string(),
            taumod: "TAUMOD".to_string(),
            zthr: "ZTHR".to_string(),
            tcoa: "TCOA".to_string(),
            d: "D".to_string(),
            h: "H".to_string(),
        }
    }

    fn for_detector(det: &str) -> Self {
        Self {
            dmod: format!("{det}_WCV_DTHR"),
            taumod: format!("{det}_WCV_TTHR"),
            zthr: format!("{det}_WCV_ZTHR"),
            tcoa: format!("{det}_WCV_TCOA"),
            d: format!("{det}_D"),
            h: format!("{det}_H"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Dimension {
    Distance,
    Time,
}

impl Dimension {
    fn unit(self) -> &'static str {
        match self {
            Dimension::Distance => "m",
            Dimension::Time => "s",
        }
    }
}

/// Configuration file that goes with `log_path`: `<log>.conf`.
pub fn default_conf_path(log_path: &Path) -> PathBuf {
    log_path.with_extension("conf")
}

/// Load the detector for a run.
///
/// An explicitly given file must exist. The default `<log>.conf` is optional;
/// without it every threshold is zero.
pub fn load_detector(log_path: &Path, explicit: Option<&Path>) -> Result<Detector, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_conf_path(log_path);
            if !path.exists() {
                tracing::info!(path = %path.display(), "no configuration file, using default thresholds");
                return Ok(Detector::default());
            }
            path
        }
    };
    tracing::info!(path = %path.display(), "reading configuration file");
    let table = ParameterTable::load(&path)?;
    tracing::debug!(parameters = table.len(), "parsed configuration");
    table.detector()
}
