//! Evaluation scripts executed by the provider for each index
//!
//! Two builtin indices are bound to fixed scripts; `custom` carries a
//! caller-supplied script body. Unknown index names are rejected before any
//! provider request is built.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Visualized NDVI: default color map over (B08, B04), masked by dataMask
pub const NDVI_EVALSCRIPT: &str = r#"//VERSION=3

let viz = ColorMapVisualizer.createDefaultColorMap();

function setup() {
  return {
    input: [{
      bands: ["B04", "B08", "dataMask"]
    }],
    output: {
      bands: 4
    }
  };
}

function evaluatePixel(samples) {
  let val = index(samples.B08, samples.B04);
  val = viz.process(val);
  val.push(samples.dataMask);
  return val;
}
"#;

/// Soil moisture index: normalized difference of (B8A, B11) through a six-stop ramp
pub const SMI_EVALSCRIPT: &str = r#"//VERSION=3

function setup() {
  return {
    input: [{
      bands: ["B8A", "B11", "dataMask"]
    }],
    output: {
      bands: 4
    }
  };
}

function evaluatePixel(samples) {
  let smi = (samples.B8A - samples.B11) / (samples.B8A + samples.B11);
  let val = colorBlend(
    smi,
    [-0.8, -0.24, -0.032, 0.032, 0.24, 0.8],
    [[0.5, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 1], [0, 0, 1], [0, 0, 0.5]]
  );
  val.push(samples.dataMask);
  return val;
}
"#;

/// NDVI aggregation for the statistical API; out-of-range values are masked
pub const NDVI_STATS_EVALSCRIPT: &str = r#"//VERSION=3

function setup() {
  return {
    input: [{
      bands: ["B02", "B04", "B08", "dataMask"]
    }],
    output: [
      { id: "data", bands: 1 },
      { id: "dataMask", bands: 1 }
    ]
  };
}

function evaluatePixel(samples) {
  let ndvi = (samples.B08 - samples.B04) / (samples.B08 + samples.B04);

  let validValue = 1;
  if (ndvi < -1 || ndvi > 1) {
    validValue = 0;
  }

  return {
    data: [ndvi],
    dataMask: [samples.dataMask * validValue]
  };
}
"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("unsupported index '{0}' (expected ndvi, smi or custom)")]
    Unknown(String),
    #[error("index 'custom' requires a non-empty evalscript parameter")]
    MissingCustomScript,
    #[error("evalscript parameter is only accepted with index 'custom'")]
    UnexpectedScript,
}

/// Remote-sensing index requested by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    Ndvi,
    Smi,
    Custom(String),
}

impl Index {
    /// Resolve the `index` / `evalscript` query pair
    pub fn from_query(index: &str, evalscript: Option<&str>) -> Result<Self, IndexError> {
        let script = evalscript.map(str::trim).filter(|s| !s.is_empty());

        match (index.parse::<IndexName>()?, script) {
            (IndexName::Custom, Some(script)) => Ok(Index::Custom(script.to_string())),
            (IndexName::Custom, None) => Err(IndexError::MissingCustomScript),
            (_, Some(_)) => Err(IndexError::UnexpectedScript),
            (IndexName::Ndvi, None) => Ok(Index::Ndvi),
            (IndexName::Smi, None) => Ok(Index::Smi),
        }
    }

    /// Script text the provider executes for this index
    pub fn evalscript(&self) -> &str {
        match self {
            Index::Ndvi => NDVI_EVALSCRIPT,
            Index::Smi => SMI_EVALSCRIPT,
            Index::Custom(script) => script,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Index::Ndvi => "ndvi",
            Index::Smi => "smi",
            Index::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

enum IndexName {
    Ndvi,
    Smi,
    Custom,
}

impl FromStr for IndexName {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndvi" => Ok(IndexName::Ndvi),
            "smi" => Ok(IndexName::Smi),
            "custom" => Ok(IndexName::Custom),
            _ => Err(IndexError::Unknown(s.to_string())),
        }
    }
}
