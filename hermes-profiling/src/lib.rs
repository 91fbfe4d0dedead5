//! Profile normalization for the Hermes JavaScript engine.
//!
//! The Hermes sampling profiler records a tree of stack frames and a list of timestamped samples
//! pointing at the innermost frame of each call stack. This crate converts that dump into the
//! sample format, merges it with the profile recorded by the native platform sampler, and
//! defines the events that are finally attached to transactions.
//!
//! # Sample Format
//!
//! ```json
//! {
//!   "platform": "javascript",
//!   "version": "1",
//!   "transaction": {
//!     "active_thread_id": "14509472"
//!   },
//!   "profile": {
//!     "samples": [
//!       {
//!         "stack_id": 0,
//!         "thread_id": "14509472",
//!         "elapsed_since_start_ns": "0"
//!       }
//!     ],
//!     "stacks": [[1, 0]],
//!     "frames": [
//!       {
//!         "function": "[root]",
//!         "in_app": false
//!       },
//!       {
//!         "abs_path": "app:///main.jsbundle",
//!         "function": "render",
//!         "lineno": 1610,
//!         "colno": 33
//!       }
//!     ],
//!     "thread_metadata": {
//!       "14509472": {
//!         "name": "JavaScriptThread",
//!         "priority": 1
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! On iOS, the profile of the Apple sampler is merged into the same structure. On Android, the
//! native trace is forwarded as is and the JavaScript profile is attached in `js_profile`.

mod convert;
mod debug_image;
mod error;
mod event;
mod measurements;
mod merge;
mod native;
mod outcomes;
mod sample;
mod types;
mod utils;

pub mod hermes;

pub use crate::convert::{MAX_PROFILE_DURATION, MappedSample, map_samples, max_profile_duration_ns, normalize};
pub use crate::debug_image::{DebugImage, ImageType};
pub use crate::error::ProfileError;
pub use crate::event::*;
pub use crate::measurements::{Measurement, MeasurementValue};
pub use crate::merge::{merge_android, merge_native};
pub use crate::native::{NativeAndroidProfileEvent, NativeProfileEvent, parse_android, parse_apple};
pub use crate::outcomes::discard_reason;
pub use crate::sample::*;
pub use crate::types::{Addr, Platform, ProfileId};
