//! Conversion of raw Hermes profiles into the sample format.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::ProfileError;
use crate::hermes::{self, StackFrameId};
use crate::sample::{Frame, Sample, ThreadCpuProfile, ThreadMetadata};
use crate::types::Platform;

/// The longest a profile is allowed to run. Samples taken after this are discarded.
pub const MAX_PROFILE_DURATION: Duration = Duration::from_secs(30);

const JS_THREAD_NAME: &str = "JavaScriptThread";
const JS_THREAD_PRIORITY: u32 = 1;
const ANONYMOUS_FUNCTION_NAME: &str = "anonymous";

/// Returns [`MAX_PROFILE_DURATION`] in nanoseconds.
pub fn max_profile_duration_ns() -> u64 {
    MAX_PROFILE_DURATION.as_nanos() as u64
}

/// A sample with its timestamp resolved but its stack not yet assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct MappedSample {
    pub leaf: StackFrameId,
    pub thread_id: String,
    pub elapsed_since_start_ns: u64,
}

/// Converts raw samples into elapsed time relative to the first sample.
///
/// Samples are ordered by timestamp first, keeping the recorded order of samples taken at the
/// same instant. Conversion stops at the first sample past `max_elapsed_ns`.
pub fn map_samples(samples: &[hermes::Sample], max_elapsed_ns: u64) -> Vec<MappedSample> {
    let mut sorted: Vec<&hermes::Sample> = samples.iter().collect();
    sorted.sort_by_key(|sample| sample.ts);

    let Some(start) = sorted.first().map(|sample| sample.ts) else {
        return Vec::new();
    };

    let mut mapped = Vec::with_capacity(sorted.len());
    for sample in sorted {
        let elapsed_since_start_ns = sample.ts.saturating_sub(start).saturating_mul(1_000);

        if elapsed_since_start_ns > max_elapsed_ns {
            hermes_log::warn!(
                "discarding profile samples after {} ns, profile exceeded maximum duration",
                max_elapsed_ns
            );
            break;
        }

        mapped.push(MappedSample {
            leaf: sample.sf,
            thread_id: sample.tid.clone(),
            elapsed_since_start_ns,
        });
    }

    mapped
}

/// Extracts the function from a frame name of the form `function(path:line:column)`.
///
/// Names that do not follow this pattern, such as `[root]` or native function names, are
/// returned verbatim. Frames without a function name are anonymous.
fn parse_function_name(name: &str) -> &str {
    static FRAME_NAME_RE: OnceLock<Regex> = OnceLock::new();

    let frame_name_re = FRAME_NAME_RE
        .get_or_init(|| Regex::new(r"^(?P<function>[^(]*)\(.*:\d+:\d+\)$").unwrap());

    match frame_name_re.captures(name) {
        Some(captures) => captures
            .name("function")
            .map(|m| m.as_str())
            .filter(|f| !f.is_empty())
            .unwrap_or(ANONYMOUS_FUNCTION_NAME),
        None => name,
    }
}

fn convert_frame(frame: &hermes::StackFrame, platform: Platform) -> Frame {
    let function = parse_function_name(&frame.name).to_owned();

    if !frame.is_javascript() {
        return Frame {
            function: Some(function),
            in_app: Some(false),
            ..Default::default()
        };
    }

    let (lineno, colno) = match (frame.line, frame.column, frame.func_virt_addr, frame.offset) {
        (None, None, Some(func_virt_addr), Some(offset)) => {
            // Bytecode frames have no source location, encode the address in the column.
            let column = func_virt_addr.saturating_add(offset).saturating_add(1);
            (Some(1), u32::try_from(column).ok())
        }
        (line, column, _, _) => (line, column),
    };

    Frame {
        function: Some(function),
        abs_path: Some(platform.default_bundle_name().to_owned()),
        lineno,
        colno,
        ..Default::default()
    }
}

/// Walks from `leaf` to the root of the frame tree and returns frame indices, leaf first.
fn build_stack(
    leaf: StackFrameId,
    stack_frames: &BTreeMap<StackFrameId, hermes::StackFrame>,
    frame_indices: &HashMap<StackFrameId, usize>,
) -> Result<Option<Vec<usize>>, ProfileError> {
    let mut stack = Vec::new();
    let mut current = Some(leaf);

    while let Some(frame_id) = current {
        let entry = (stack_frames.get(&frame_id), frame_indices.get(&frame_id));
        let (Some(frame), Some(&index)) = entry else {
            if stack.is_empty() {
                return Ok(None);
            }
            hermes_log::debug!("frame {} has unknown parent {}", leaf, frame_id);
            break;
        };

        if stack.len() >= stack_frames.len() {
            hermes_log::error!("cycle in stack frames of leaf {}", leaf);
            return Err(ProfileError::MalformedStacks);
        }

        stack.push(index);
        current = frame.parent;
    }

    Ok(Some(stack))
}

/// Converts a raw Hermes profile into a [`ThreadCpuProfile`].
///
/// Frames keep the ascending order of their ids. Stacks are created in the order their leaf
/// frames are first sampled. Samples referencing a leaf frame that does not exist are dropped.
pub fn normalize(profile: &hermes::Profile, platform: Platform) -> Result<ThreadCpuProfile, ProfileError> {
    if profile.samples.is_empty() {
        return Err(ProfileError::NotEnoughSamples);
    }

    let mut frames = Vec::with_capacity(profile.stack_frames.len());
    let mut frame_indices = HashMap::with_capacity(profile.stack_frames.len());
    for (&frame_id, frame) in &profile.stack_frames {
        frame_indices.insert(frame_id, frames.len());
        frames.push(convert_frame(frame, platform));
    }

    let mapped = map_samples(&profile.samples, max_profile_duration_ns());

    let mut stacks = Vec::new();
    let mut stack_indices: HashMap<StackFrameId, Option<usize>> = HashMap::new();
    let mut samples = Vec::with_capacity(mapped.len());
    let mut thread_metadata = BTreeMap::new();

    for sample in mapped {
        let stack_id = match stack_indices.get(&sample.leaf) {
            Some(stack_id) => *stack_id,
            None => {
                let stack_id = build_stack(sample.leaf, &profile.stack_frames, &frame_indices)?
                    .map(|stack| {
                        stacks.push(stack);
                        stacks.len() - 1
                    });
                stack_indices.insert(sample.leaf, stack_id);
                stack_id
            }
        };

        let Some(stack_id) = stack_id else {
            hermes_log::error!("dropping sample with unknown leaf frame {}", sample.leaf);
            continue;
        };

        thread_metadata
            .entry(sample.thread_id.clone())
            .or_insert_with(|| ThreadMetadata {
                name: Some(JS_THREAD_NAME.to_owned()),
                priority: Some(JS_THREAD_PRIORITY),
            });

        samples.push(Sample {
            stack_id,
            thread_id: sample.thread_id,
            elapsed_since_start_ns: sample.elapsed_since_start_ns,
            queue_address: None,
        });
    }

    if samples.is_empty() {
        return Err(ProfileError::NotEnoughSamples);
    }

    Ok(ThreadCpuProfile {
        samples,
        stacks,
        frames,
        thread_metadata,
        queue_metadata: BTreeMap::new(),
    })
}
