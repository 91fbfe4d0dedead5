//! Merging of the JavaScript profile with profiles of the native samplers.

use crate::event::{ANDROID_PLATFORM, AndroidCombinedProfileEvent, CombinedProfileEvent};
use crate::native::{NativeAndroidProfileEvent, NativeProfileEvent};

/// Platform of frames captured by the Apple sampler.
const COCOA_PLATFORM: &str = "cocoa";

/// Keys written by [`merge_android`] that must not be duplicated from the native trace.
const ANDROID_RESERVED_KEYS: &[&str] = &["platform", "js_profile", "duration_ns", "active_thread_id"];

/// Appends an Apple profile to the JavaScript profile.
///
/// Native frames and stacks are appended after the JavaScript ones with their indices shifted.
/// Native samples on the JavaScript thread are skipped, the JavaScript profile already covers it.
/// Thread and queue metadata of the JavaScript profile take precedence.
pub fn merge_native(mut js: CombinedProfileEvent, native: NativeProfileEvent) -> CombinedProfileEvent {
    let NativeProfileEvent {
        profile: native_profile,
        debug_meta: native_debug_meta,
        measurements,
    } = native;
    let profile = &mut js.profile;

    let mut thread_metadata = native_profile.thread_metadata;
    thread_metadata.append(&mut profile.thread_metadata);
    profile.thread_metadata = thread_metadata;

    let mut queue_metadata = native_profile.queue_metadata;
    queue_metadata.append(&mut profile.queue_metadata);
    profile.queue_metadata = queue_metadata;

    let frame_offset = profile.frames.len();
    let stack_offset = profile.stacks.len();

    profile
        .frames
        .extend(native_profile.frames.into_iter().map(|mut frame| {
            frame.platform.get_or_insert_with(|| COCOA_PLATFORM.to_owned());
            frame
        }));

    profile.stacks.extend(
        native_profile
            .stacks
            .into_iter()
            .map(|stack| stack.into_iter().map(|index| index + frame_offset).collect()),
    );

    let active_thread_id = js.transaction.active_thread_id.as_str();
    profile.samples.extend(
        native_profile
            .samples
            .into_iter()
            .filter(|sample| sample.thread_id != active_thread_id)
            .map(|mut sample| {
                sample.stack_id += stack_offset;
                sample
            }),
    );

    js.debug_meta.images.extend(native_debug_meta.images);
    js.measurements = measurements;

    js
}

/// Wraps an Android trace together with the JavaScript profile.
///
/// The trace is not decoded, the JavaScript profile is attached unchanged.
pub fn merge_android(
    js: CombinedProfileEvent,
    mut android: NativeAndroidProfileEvent,
    duration_ns: u64,
) -> AndroidCombinedProfileEvent {
    android
        .other
        .retain(|key, _| !ANDROID_RESERVED_KEYS.contains(&key.as_str()));

    AndroidCombinedProfileEvent {
        native: android,
        platform: ANDROID_PLATFORM.to_owned(),
        js_profile: js.profile,
        duration_ns,
        active_thread_id: js.transaction.active_thread_id,
    }
}
