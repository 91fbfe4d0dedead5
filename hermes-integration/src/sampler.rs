//! Access to the Hermes profiler and the native platform samplers.

use hermes_profiling::{NativeAndroidProfileEvent, NativeProfileEvent, ProfileError, hermes};
use serde::Deserialize;

/// An error returned by a [`Sampler`].
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The native module refused to start or stop profiling.
    #[error("native profiler failed: {0}")]
    Native(String),
    /// Profiling stopped without returning the Hermes profile.
    #[error("missing hermes profile")]
    MissingProfile,
    /// A profile returned by the native module could not be parsed.
    #[error("invalid profile")]
    InvalidProfile(#[from] ProfileError),
}

/// The profile recorded by the native platform sampler, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NativeProfile {
    /// Native profiling was disabled or returned nothing.
    #[default]
    None,
    /// Profile of the Apple sampler in the sample format.
    Apple(Box<NativeProfileEvent>),
    /// Opaque trace of the Android sampler.
    Android(Box<NativeAndroidProfileEvent>),
}

impl NativeProfile {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Everything returned when sampling stops.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedProfiles {
    pub hermes_profile: hermes::Profile,
    pub native: NativeProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopResult {
    /// The Hermes dump as a JSON string.
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    native_profile: Option<NativeProfileEvent>,
    #[serde(default)]
    android_profile: Option<NativeAndroidProfileEvent>,
    #[serde(default)]
    error: Option<String>,
}

impl CollectedProfiles {
    /// Parses the result of the native module's stop call.
    ///
    /// The result carries the Hermes dump as a JSON string in `profile`, plus `nativeProfile` on
    /// iOS or `androidProfile` on Android. If both native profiles are present, the Android trace
    /// is used.
    pub fn from_json(payload: &[u8]) -> Result<Self, SamplerError> {
        let d = &mut serde_json::Deserializer::from_slice(payload);
        let result: StopResult =
            serde_path_to_error::deserialize(d).map_err(ProfileError::InvalidJson)?;

        if let Some(error) = result.error {
            return Err(SamplerError::Native(error));
        }

        let profile = result.profile.ok_or(SamplerError::MissingProfile)?;
        let hermes_profile = hermes::parse(profile.as_bytes())?;

        let native = match (result.android_profile, result.native_profile) {
            (Some(android), _) => {
                android.validate()?;
                NativeProfile::Android(Box::new(android))
            }
            (None, Some(apple)) => NativeProfile::Apple(Box::new(apple)),
            (None, None) => NativeProfile::None,
        };

        Ok(Self {
            hermes_profile,
            native,
        })
    }
}

/// Controls the Hermes profiler and, optionally, the native platform sampler.
///
/// Implementations are provided by the host application and bridge to its native module.
pub trait Sampler: Send + Sync {
    /// Starts profiling.
    ///
    /// With `platform_profilers` the native sampler runs next to the Hermes profiler.
    fn start(&self, platform_profilers: bool) -> Result<(), SamplerError>;

    /// Stops profiling and returns the recorded profiles.
    fn stop(&self) -> Result<CollectedProfiles, SamplerError>;
}
