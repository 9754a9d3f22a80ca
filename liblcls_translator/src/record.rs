use fxhash::FxHashMap;
use ndarray::{Array1, Array2};
use time::{Duration, OffsetDateTime};

use super::facility::PvValue;
use super::native::EventIdData;

/// Physical unit tag carried by every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millijoule,
    Electronvolt,
    Volt,
    /// Analog-digital units, the raw detector count scale
    Adu,
    Second,
    Dimensionless,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let abbrev = match self {
            Self::Millijoule => "mJ",
            Self::Electronvolt => "eV",
            Self::Volt => "V",
            Self::Adu => "ADU",
            Self::Second => "s",
            Self::Dimensionless => "",
        };
        write!(f, "{}", abbrev)
    }
}

/// The value payload of a decoded record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Scalar(f64),
    Array(Array1<f64>),
    /// Pixel-detector or camera frame, normalized to a common integer type
    Frame(Array2<i32>),
    /// Sampled trace with an explicit time axis
    Trace {
        samples: Array1<f64>,
        times: Array1<f64>,
    },
    Codes(Vec<u16>),
    Timestamp(EventIdData),
    Text(String),
}

impl From<PvValue> for RecordValue {
    fn from(pv: PvValue) -> Self {
        match pv {
            PvValue::Float(v) => Self::Scalar(v),
            PvValue::Int(v) => Self::Scalar(v as f64),
            PvValue::Text(s) => Self::Text(s),
            PvValue::FloatArray(v) => Self::Array(Array1::from_vec(v)),
        }
    }
}

/// A named, unit-tagged value produced by decoding one native item.
///
/// Records are the uniform representation handed to the downstream analysis
/// pipeline; nothing facility-specific survives past this point.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub value: RecordValue,
    pub unit: Unit,
}

impl Record {
    pub fn new(name: &str, value: RecordValue, unit: Unit) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit,
        }
    }

    /// Human-readable UTC time, only meaningful for timestamp records
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        match &self.value {
            RecordValue::Timestamp(id) => OffsetDateTime::from_unix_timestamp(i64::from(id.seconds))
                .ok()
                .map(|t| t + Duration::nanoseconds(i64::from(id.nanoseconds))),
            _ => None,
        }
    }
}

/// Decode output for one category of one event, keyed by record name
pub type RecordMap = FxHashMap<String, Record>;

/// Insert a freshly built record under its own name
pub fn add_record(values: &mut RecordMap, name: &str, value: RecordValue, unit: Unit) {
    values.insert(name.to_string(), Record::new(name, value, unit));
}
