//! Sample format of a normalized profile.
//!
//! A profile is a list of unique `frames`, a list of `stacks` referencing frames by index from
//! the innermost call outwards, and a list of `samples` referencing stacks by index. Identical
//! call stacks captured at different times share the same stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::debug_image::DebugImage;
use crate::types::Addr;
use crate::utils::{deserialize_number_from_string, deserialize_string_from_number, serialize_as_string};

/// Possible values for the version field of the Sample Format.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub enum Version {
    #[default]
    #[serde(rename = "1")]
    V1,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// `abs_path` contains the absolute path or URL of the file the function is defined in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>,
    /// `colno` contains the column number of where the function is called.
    #[serde(alias = "column", skip_serializing_if = "Option::is_none")]
    pub colno: Option<u32>,
    /// `filename` contains the file name only where the function is called.
    #[serde(alias = "file", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// `function` contains the function's name that was called.
    #[serde(alias = "name", skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// `in_app` indicates if the function is from the user application or a third-party/system
    /// library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_app: Option<bool>,
    /// `instruction_addr` contains the address in memory where the function is called.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_addr: Option<Addr>,
    /// `lineno` contains the line number of the file where the function is called.
    #[serde(alias = "line", skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    /// `module` contains the package or module name of the function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// `platform` marks frames of a hybrid profile that differ from the profile's platform, for
    /// instance `cocoa` frames next to JavaScript frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Index of the stack in the `stacks` field of the profile.
    pub stack_id: usize,
    /// Thread or queue identifier.
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub thread_id: String,
    /// Nanoseconds elapsed since the first sample of the profile.
    #[serde(
        deserialize_with = "deserialize_number_from_string",
        serialize_with = "serialize_as_string"
    )]
    pub elapsed_since_start_ns: u64,
    /// Address of the dispatch queue the sample was taken on, Apple only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_address: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    /// This contains the name of the thread or queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// This contains the given priority of a thread if needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueMetadata {
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadCpuProfile {
    /// `samples` contains the list of samples referencing a stack and thread identifier.
    pub samples: Vec<Sample>,
    /// `stacks` contains a list of stacks indicating the index of the frame in the `frames` field,
    /// innermost frame first.
    pub stacks: Vec<Vec<usize>>,
    /// `frames` contains a list of unique frames found in the profile.
    pub frames: Vec<Frame>,
    /// `thread_metadata` contains information about the thread or the queue.
    #[serde(default)]
    pub thread_metadata: BTreeMap<String, ThreadMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub queue_metadata: BTreeMap<String, QueueMetadata>,
}

impl ThreadCpuProfile {
    /// Returns the thread of the first sample, which is the thread the profile was started on.
    pub fn active_thread_id(&self) -> Option<&str> {
        self.samples.first().map(|sample| sample.thread_id.as_str())
    }

    /// Checks that all stacks referenced by the samples exist in the stacks.
    pub fn all_stacks_referenced_by_samples_exist(&self) -> bool {
        self.samples
            .iter()
            .all(|sample| self.stacks.get(sample.stack_id).is_some())
    }

    /// Checks that all frames referenced by the stacks exist in the frames.
    pub fn all_frames_referenced_by_stacks_exist(&self) -> bool {
        self.stacks.iter().all(|stack| {
            stack
                .iter()
                .all(|frame_id| self.frames.get(*frame_id).is_some())
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugMeta {
    /// A list of debug files needed to symbolicate this profile, such as source maps or images
    /// of native libraries.
    #[serde(default)]
    pub images: Vec<DebugImage>,
}

impl DebugMeta {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_elapsed_serialized_as_string() {
        let sample = Sample {
            stack_id: 0,
            thread_id: "259".to_owned(),
            elapsed_since_start_ns: 10_000,
            queue_address: None,
        };

        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(
            json,
            r#"{"stack_id":0,"thread_id":"259","elapsed_since_start_ns":"10000"}"#
        );
    }

    #[test]
    fn test_frame_aliases() {
        let frame: Frame =
            serde_json::from_str(r#"{"name":"foo","file":"a.js","line":3,"column":4}"#).unwrap();

        assert_eq!(frame.function.as_deref(), Some("foo"));
        assert_eq!(frame.filename.as_deref(), Some("a.js"));
        assert_eq!(frame.lineno, Some(3));
        assert_eq!(frame.colno, Some(4));
    }

    #[test]
    fn test_reference_checks() {
        let mut profile = ThreadCpuProfile {
            samples: vec![Sample {
                stack_id: 0,
                thread_id: "1".to_owned(),
                elapsed_since_start_ns: 0,
                queue_address: None,
            }],
            stacks: vec![vec![0]],
            frames: vec![Frame::default()],
            ..Default::default()
        };
        assert!(profile.all_stacks_referenced_by_samples_exist());
        assert!(profile.all_frames_referenced_by_stacks_exist());
        assert_eq!(profile.active_thread_id(), Some("1"));

        profile.stacks = vec![vec![1]];
        assert!(!profile.all_frames_referenced_by_stacks_exist());

        profile.samples[0].stack_id = 3;
        assert!(!profile.all_stacks_referenced_by_samples_exist());
    }
}
