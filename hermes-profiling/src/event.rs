//! Profile events, from the JavaScript profile collected when sampling stops to the enriched
//! profile item sent with a transaction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::measurements::Measurement;
use crate::native::NativeAndroidProfileEvent;
use crate::sample::{DebugMeta, ThreadCpuProfile, Version};
use crate::types::ProfileId;
use crate::utils::{deserialize_number_from_string, serialize_as_string};

/// Platform of profiles with a JavaScript profile at the top level.
pub const JAVASCRIPT_PLATFORM: &str = "javascript";

/// Platform of profiles wrapping an Android trace.
pub const ANDROID_PLATFORM: &str = "android";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveThread {
    pub active_thread_id: String,
}

/// A JavaScript profile, optionally merged with an Apple profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedProfileEvent {
    pub platform: String,
    pub version: Version,
    pub profile: ThreadCpuProfile,
    pub transaction: ActiveThread,
    #[serde(default, skip_serializing_if = "DebugMeta::is_empty")]
    pub debug_meta: DebugMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub measurements: BTreeMap<String, Measurement>,
}

impl CombinedProfileEvent {
    /// Wraps a normalized JavaScript profile.
    ///
    /// The active thread is the thread of the first sample.
    pub fn from_js(profile: ThreadCpuProfile) -> Self {
        let active_thread_id = profile.active_thread_id().unwrap_or_default().to_owned();

        Self {
            platform: JAVASCRIPT_PLATFORM.to_owned(),
            version: Version::V1,
            profile,
            transaction: ActiveThread { active_thread_id },
            debug_meta: DebugMeta::default(),
            measurements: BTreeMap::new(),
        }
    }

    pub fn active_thread_id(&self) -> &str {
        &self.transaction.active_thread_id
    }
}

/// An Android trace with the JavaScript profile attached in `js_profile`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AndroidCombinedProfileEvent {
    #[serde(flatten)]
    pub native: NativeAndroidProfileEvent,
    pub platform: String,
    pub js_profile: ThreadCpuProfile,
    #[serde(
        deserialize_with = "deserialize_number_from_string",
        serialize_with = "serialize_as_string"
    )]
    pub duration_ns: u64,
    pub active_thread_id: String,
}

/// A completed profile waiting for its transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectedProfile {
    Combined(Box<CombinedProfileEvent>),
    Android(Box<AndroidCombinedProfileEvent>),
}

impl CollectedProfile {
    /// Returns the JavaScript profile.
    pub fn js_profile(&self) -> &ThreadCpuProfile {
        match self {
            Self::Combined(profile) => &profile.profile,
            Self::Android(profile) => &profile.js_profile,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OSMetadata {
    pub name: String,
    pub version: String,
    pub build_number: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub architecture: String,
    pub is_emulator: bool,
    pub locale: String,
    pub manufacturer: String,
    pub model: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeMetadata {
    pub name: String,
    pub version: String,
}

/// The transaction a profile was taken for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub name: String,
    pub id: String,
    pub trace_id: String,
    pub active_thread_id: String,
}

/// A JavaScript or Apple profile enriched with its transaction, ready to be sent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleProfileEvent {
    pub event_id: ProfileId,
    pub version: Version,
    pub platform: String,
    pub release: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub runtime: RuntimeMetadata,
    pub os: OSMetadata,
    pub device: DeviceMetadata,
    pub transaction: TransactionMetadata,
    #[serde(skip_serializing_if = "DebugMeta::is_empty")]
    pub debug_meta: DebugMeta,
    pub profile: ThreadCpuProfile,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub measurements: BTreeMap<String, Measurement>,
}

/// An Android trace enriched with its transaction, in the flat Android layout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AndroidProfileEvent {
    #[serde(flatten)]
    pub profile: AndroidCombinedProfileEvent,
    pub profile_id: ProfileId,
    pub debug_meta: DebugMeta,
    pub device_cpu_frequencies: Vec<u32>,
    pub device_is_emulator: bool,
    pub device_locale: String,
    pub device_manufacturer: String,
    pub device_model: String,
    pub device_os_name: String,
    pub device_os_version: String,
    pub device_physical_memory_bytes: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub release: String,
    pub dist: String,
    pub transaction_id: String,
    pub transaction_name: String,
    pub trace_id: String,
    pub version_name: String,
    pub version_code: String,
}

/// Payload of a `profile` envelope item.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileEvent {
    Sample(Box<SampleProfileEvent>),
    Android(Box<AndroidProfileEvent>),
}

impl ProfileEvent {
    pub fn profile_id(&self) -> ProfileId {
        match self {
            Self::Sample(profile) => profile.event_id,
            Self::Android(profile) => profile.profile_id,
        }
    }

    /// Serializes the profile into the JSON payload of an envelope item.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, ProfileError> {
        serde_json::to_vec(self).map_err(|_| ProfileError::CannotSerializePayload)
    }
}
