//! Profiles recorded by the native platform samplers next to the Hermes profiler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::measurements::Measurement;
use crate::sample::{DebugMeta, ThreadCpuProfile};
use crate::utils::deserialize_number_from_string;

/// Profile captured by the Apple sampler, already in the sample format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeProfileEvent {
    pub profile: ThreadCpuProfile,
    #[serde(default, skip_serializing_if = "DebugMeta::is_empty")]
    pub debug_meta: DebugMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub measurements: BTreeMap<String, Measurement>,
}

/// Trace captured by the Android sampler.
///
/// The trace itself is carried opaquely as base64 in `sampled_profile`. Fields the sampler adds
/// beyond the known ones are kept and forwarded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeAndroidProfileEvent {
    pub sampled_profile: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub android_api_level: u32,
    #[serde(default)]
    pub build_id: String,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl NativeAndroidProfileEvent {
    /// Checks that the sampler returned a trace.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.sampled_profile.is_empty() {
            return Err(ProfileError::InvalidSampledProfile);
        }
        Ok(())
    }
}

/// Parses a profile returned by the Apple sampler.
pub fn parse_apple(payload: &[u8]) -> Result<NativeProfileEvent, ProfileError> {
    let d = &mut serde_json::Deserializer::from_slice(payload);
    serde_path_to_error::deserialize(d).map_err(ProfileError::InvalidJson)
}

/// Parses a trace returned by the Android sampler.
///
/// Fails with [`ProfileError::InvalidSampledProfile`] if the trace is empty.
pub fn parse_android(payload: &[u8]) -> Result<NativeAndroidProfileEvent, ProfileError> {
    let d = &mut serde_json::Deserializer::from_slice(payload);
    let profile: NativeAndroidProfileEvent =
        serde_path_to_error::deserialize(d).map_err(ProfileError::InvalidJson)?;
    profile.validate()?;
    Ok(profile)
}
