//! Profiling integration for React Native applications running on Hermes.
//!
//! [`HermesProfiling`] hooks into the span lifecycle of the host application. When a sampled root
//! span starts, it starts the Hermes profiler through a [`Sampler`] and links the span to a new
//! profile id. When the span ends, the recorded profile is normalized, merged with the profile of
//! the native platform sampler and kept in a [`ProfileQueue`]. Before an [`Envelope`] is sent, the
//! profiles of its transactions are enriched with their context and appended as `profile` items.
//!
//! ```ignore
//! let integration = HermesProfiling::new(config, sampler);
//! integration.setup(active_span);
//!
//! integration.on_span_start(&span);
//! integration.on_span_end(&span);
//! integration.on_before_envelope(&mut envelope);
//! ```

mod cache;
mod enrich;
mod integration;
mod sampler;
mod span;
mod timeout;

pub mod envelope;
pub mod event;

pub use crate::cache::{FifoCache, ProfileQueue};
pub use crate::enrich::enrich_profile;
pub use crate::envelope::{Envelope, EnvelopeError, Item, ItemType};
pub use crate::event::Event;
pub use crate::integration::HermesProfiling;
pub use crate::sampler::{CollectedProfiles, NativeProfile, Sampler, SamplerError};
pub use crate::span::Span;
pub use crate::timeout::TimeoutHandle;
