use serde::{Deserialize, Serialize};

use crate::utils::deserialize_number_from_string;

/// A series of values recorded by the native sampler, for instance CPU usage or frame rates.
///
/// The unit is passed through unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Measurement {
    pub unit: String,
    pub values: Vec<MeasurementValue>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MeasurementValue {
    // nanoseconds elapsed since the start of the profile
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub elapsed_since_start_ns: u64,
    pub value: f64,
}
