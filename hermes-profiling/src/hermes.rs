//! Raw profile format emitted by the Hermes sampling profiler.
//!
//! Hermes dumps its samples in the Chrome trace event format: a list of timestamped samples, each
//! referencing the innermost frame of its call stack, and a map of frames keyed by id that link
//! to their caller through `parent`. Numeric fields are frequently sent as strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::utils::{
    deserialize_number_from_string, deserialize_opt_number_from_string,
    deserialize_string_from_number,
};

/// Identifier of a frame in [`Profile::stack_frames`].
pub type StackFrameId = u64;

/// Category of frames executing JavaScript code.
pub const JAVASCRIPT_CATEGORY: &str = "JavaScript";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Timestamp of the sample in microseconds.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub ts: u64,
    /// Identifier of the thread the sample was taken on.
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub tid: String,
    /// Identifier of the leaf frame.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub sf: StackFrameId,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Name of the frame, usually in the form `function(path:line:column)`.
    #[serde(default)]
    pub name: String,
    /// Category of the frame, for instance `JavaScript`, `Native` or `root`.
    #[serde(default)]
    pub category: String,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub column: Option<u32>,
    /// Id of the calling frame. Root frames have no parent.
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<StackFrameId>,
    /// Virtual address of the function for frames in precompiled bytecode.
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub func_virt_addr: Option<u64>,
    /// Offset of the instruction into the function for frames in precompiled bytecode.
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub offset: Option<u64>,
}

impl StackFrame {
    pub fn is_javascript(&self) -> bool {
        self.category == JAVASCRIPT_CATEGORY
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub samples: Vec<Sample>,
    /// Frames keyed by id, iterated in ascending id order.
    #[serde(default)]
    pub stack_frames: BTreeMap<StackFrameId, StackFrame>,
}

/// Parses the JSON dump returned by the Hermes profiler.
pub fn parse(payload: &[u8]) -> Result<Profile, ProfileError> {
    let d = &mut serde_json::Deserializer::from_slice(payload);
    serde_path_to_error::deserialize(d).map_err(ProfileError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_encoded_numbers() {
        let payload = include_bytes!("../tests/fixtures/hermes/valid.json");
        let profile = parse(payload).unwrap();

        assert_eq!(profile.samples.len(), 4);
        assert_eq!(
            profile.samples[0],
            Sample {
                ts: 10,
                tid: "14509472".to_owned(),
                sf: 4,
            }
        );

        let keys: Vec<_> = profile.stack_frames.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3, 4]);

        let frame = &profile.stack_frames[&2];
        assert_eq!(frame.line, Some(1610));
        assert_eq!(frame.column, Some(33));
        assert_eq!(frame.parent, Some(1));
        assert!(frame.is_javascript());
        assert!(!profile.stack_frames[&1].is_javascript());
    }

    #[test]
    fn test_parse_bytecode_frame() {
        let payload = br#"{
            "samples": [{"ts": 1, "tid": 1, "sf": 1}],
            "stackFrames": {
                "1": {"name": "foo", "category": "JavaScript", "funcVirtAddr": "100", "offset": "5"}
            }
        }"#;
        let profile = parse(payload).unwrap();

        let frame = &profile.stack_frames[&1];
        assert_eq!(frame.func_virt_addr, Some(100));
        assert_eq!(frame.offset, Some(5));
        assert_eq!(profile.samples[0].tid, "1");
    }

    #[test]
    fn test_parse_reports_path() {
        let payload = br#"{"samples": [{"ts": "abc", "tid": "1", "sf": 1}], "stackFrames": {}}"#;
        let err = parse(payload).unwrap_err();
        assert_eq!(err.path(), "samples[0].ts");
    }
}
