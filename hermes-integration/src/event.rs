//! The parts of a transaction event read when attaching a profile.
//!
//! Fields that are not modeled are kept in `other` maps so that a rewritten payload only differs
//! in what was changed explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hermes_profiling::ProfileId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the trace context data entry linking a transaction to its profile.
pub const PROFILE_ID_KEY: &str = "profile_id";

type Object = BTreeMap<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TraceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Object>,
    #[serde(flatten)]
    pub other: Object,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OsContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(flatten)]
    pub other: Object,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DeviceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulator: Option<bool>,
    /// Total memory of the device in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<u64>,
    #[serde(flatten)]
    pub other: Object,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Contexts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceContext>,
    #[serde(flatten)]
    pub other: Object,
}

/// A transaction event as sent in a `transaction` envelope item.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Start of the transaction in seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Contexts>,
    #[serde(flatten)]
    pub other: Object,
}

impl Event {
    /// Parses a transaction payload.
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Returns the trace context, if any.
    pub fn trace_context(&self) -> Option<&TraceContext> {
        self.contexts.as_ref()?.trace.as_ref()
    }

    pub fn os_context(&self) -> Option<&OsContext> {
        self.contexts.as_ref()?.os.as_ref()
    }

    pub fn device_context(&self) -> Option<&DeviceContext> {
        self.contexts.as_ref()?.device.as_ref()
    }

    /// Returns the profile linked in the trace context data.
    ///
    /// Values that are not a valid profile id are ignored.
    pub fn profile_id(&self) -> Option<ProfileId> {
        self.trace_context()?
            .data
            .as_ref()?
            .get(PROFILE_ID_KEY)?
            .as_str()?
            .parse()
            .ok()
    }

    /// Removes the profile link from the trace context data and returns its raw value.
    ///
    /// The link is removed whenever it is a string, even if it is not a valid profile id. Other
    /// values are left in place.
    pub fn take_profile_id(&mut self) -> Option<String> {
        let data = self.contexts.as_mut()?.trace.as_mut()?.data.as_mut()?;
        if !data.get(PROFILE_ID_KEY)?.is_string() {
            return None;
        }

        match data.remove(PROFILE_ID_KEY)? {
            Value::String(profile_id) => Some(profile_id),
            _ => None,
        }
    }

    /// Returns the start of the transaction.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let timestamp = self.start_timestamp?;
        if !timestamp.is_finite() {
            return None;
        }

        let secs = timestamp.floor();
        let nanos = ((timestamp - secs) * 1e9).round().min(999_999_999.0);
        DateTime::from_timestamp(secs as i64, nanos as u32)
    }
}
