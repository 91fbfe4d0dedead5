use std::error::Error;
use std::sync::{Arc, Weak};

use chrono::Utc;
use hermes_config::Config;
use hermes_log::LogError;
use hermes_profiling::{
    CollectedProfile, CombinedProfileEvent, MAX_PROFILE_DURATION, Platform, ProfileError,
    ProfileId, discard_reason, merge_android, merge_native, normalize,
};
use parking_lot::Mutex;

use crate::cache::ProfileQueue;
use crate::enrich::enrich_profile;
use crate::envelope::{CONTENT_TYPE_JSON, Envelope, Item, ItemType};
use crate::event::{Event, PROFILE_ID_KEY};
use crate::sampler::{CollectedProfiles, NativeProfile, Sampler};
use crate::span::Span;
use crate::timeout::TimeoutHandle;

/// The profile currently being recorded.
#[derive(Debug)]
struct ProfileSession {
    profile_id: ProfileId,
    span_id: String,
    start_timestamp_ns: u64,
    timeout: TimeoutHandle,
}

struct Inner {
    config: Arc<Config>,
    sampler: Box<dyn Sampler>,
    queue: ProfileQueue,
    /// Held across a whole session transition, from finishing a profile to starting the next.
    /// The timeout may fire on another thread than the span callbacks.
    transition: Mutex<()>,
    session: Mutex<Option<ProfileSession>>,
}

/// Records a profile for every sampled transaction and attaches it to the outgoing envelope.
///
/// At most one profile is recorded at a time. Starting a new root span finishes the running
/// profile, and profiles are finished at the latest after [`MAX_PROFILE_DURATION`]. Completed
/// profiles wait in a bounded queue until the envelope of their transaction is sent.
///
/// The host application forwards its span and envelope callbacks:
///
///  - [`on_span_start`](Self::on_span_start) when a span starts,
///  - [`on_span_end`](Self::on_span_end) when a span ends,
///  - [`on_before_envelope`](Self::on_before_envelope) before an envelope is sent.
#[derive(Clone)]
pub struct HermesProfiling {
    inner: Arc<Inner>,
}

impl HermesProfiling {
    /// Creates the integration with the given configuration and sampler.
    pub fn new<S>(config: Arc<Config>, sampler: S) -> Self
    where
        S: Sampler + 'static,
    {
        let queue = ProfileQueue::new(config.queue_capacity());

        Self {
            inner: Arc::new(Inner {
                config,
                sampler: Box::new(sampler),
                queue,
                transition: Mutex::new(()),
                session: Mutex::new(None),
            }),
        }
    }

    /// Starts profiling the span that is already running when the integration is installed.
    ///
    /// Does nothing if a profile is already being recorded.
    pub fn setup(&self, active_span: Option<&dyn Span>) {
        if self.is_profiling() {
            return;
        }

        if let Some(span) = active_span {
            self.on_span_start(span);
        }
    }

    /// Handles the start of a span.
    ///
    /// Root spans finish the running profile and, if sampled, start a new one.
    pub fn on_span_start(&self, span: &dyn Span) {
        if !span.is_root() {
            return;
        }

        let _transition = self.inner.transition.lock();
        self.inner.finish_active();

        if !self.should_profile(span) {
            return;
        }

        let config = &self.inner.config;
        if let Err(error) = self.inner.sampler.start(config.platform_profilers()) {
            hermes_log::error!(
                error = &error as &dyn Error,
                "failed to start profiling"
            );
            return;
        }

        let profile_id = ProfileId::new();
        span.set_attribute(PROFILE_ID_KEY, profile_id.to_string());

        let weak = Arc::downgrade(&self.inner);
        let timeout = TimeoutHandle::spawn(MAX_PROFILE_DURATION, move || {
            finish_timed_out(weak, profile_id)
        });

        *self.inner.session.lock() = Some(ProfileSession {
            profile_id,
            span_id: span.span_id().to_owned(),
            start_timestamp_ns: now_ns(),
            timeout,
        });

        hermes_log::debug!(%profile_id, "started profiling");
    }

    /// Handles the end of a span.
    ///
    /// Finishes the running profile if it was started for this span.
    pub fn on_span_end(&self, span: &dyn Span) {
        if !span.is_root() {
            return;
        }

        let _transition = self.inner.transition.lock();
        let session = {
            let mut guard = self.inner.session.lock();
            let Some(session) = guard.as_ref() else {
                return;
            };

            if session.span_id != span.span_id() {
                hermes_log::debug!(
                    span_id = span.span_id(),
                    profiled_span_id = session.span_id.as_str(),
                    "ended span does not match the profiled span"
                );
                return;
            }

            guard.take()
        };

        if let Some(session) = session {
            self.inner.finish(session);
        }
    }

    /// Attaches completed profiles to the transactions in an outgoing envelope.
    ///
    /// Transactions link their profile through `profile_id` in the trace context data. The link
    /// is removed from the transaction, and the enriched profile is appended as `profile` item.
    pub fn on_before_envelope(&self, envelope: &mut Envelope) {
        if self.inner.queue.is_empty() {
            return;
        }

        let mut profiles = Vec::new();

        for item in envelope.items_mut() {
            if item.ty() != &ItemType::Transaction {
                continue;
            }

            let mut event = match Event::parse(&item.payload()) {
                Ok(event) => event,
                Err(error) => {
                    hermes_log::debug!(
                        error = &error as &dyn Error,
                        "failed to parse transaction payload"
                    );
                    continue;
                }
            };

            let Some(raw_profile_id) = event.take_profile_id() else {
                continue;
            };

            match serde_json::to_vec(&event) {
                Ok(payload) => item.set_payload(CONTENT_TYPE_JSON, payload),
                Err(error) => hermes_log::warn!(
                    error = &error as &dyn Error,
                    "failed to serialize transaction payload"
                ),
            }

            let Ok(profile_id) = raw_profile_id.parse::<ProfileId>() else {
                hermes_log::debug!(
                    profile_id = raw_profile_id.as_str(),
                    "transaction references an invalid profile id"
                );
                continue;
            };

            if let Some(payload) = self.inner.create_profile_for(profile_id, &event) {
                profiles.push(payload);
            }
        }

        for payload in profiles {
            let mut item = Item::new(ItemType::Profile);
            item.set_payload(CONTENT_TYPE_JSON, payload);
            envelope.add_item(item);
        }
    }

    /// Returns `true` while a profile is being recorded.
    pub fn is_profiling(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    /// Returns the id of the profile being recorded.
    pub fn active_profile_id(&self) -> Option<ProfileId> {
        self.inner
            .session
            .lock()
            .as_ref()
            .map(|session| session.profile_id)
    }

    /// Returns the completed profiles waiting for their transaction.
    pub fn queue(&self) -> &ProfileQueue {
        &self.inner.queue
    }

    fn should_profile(&self, span: &dyn Span) -> bool {
        if !span.is_sampled() {
            hermes_log::debug!("transaction is not sampled, skipping profiling");
            return false;
        }

        let Some(sample_rate) = self.inner.config.profiles_sample_rate() else {
            hermes_log::debug!("profiling disabled, profiles_sample_rate is not set");
            return false;
        };

        if rand::random::<f64>() > sample_rate {
            hermes_log::debug!("skip profiling transaction due to sampling");
            return false;
        }

        true
    }
}

impl Inner {
    fn finish_active(&self) {
        let session = self.session.lock().take();
        if let Some(session) = session {
            self.finish(session);
        }
    }

    fn finish(&self, mut session: ProfileSession) {
        session.timeout.cancel();
        let profile_id = session.profile_id;

        let collected = match self.sampler.stop() {
            Ok(collected) => collected,
            Err(error) => {
                hermes_log::warn!(
                    %profile_id,
                    "failed to stop profiling, dropping profile: {}",
                    LogError(&error)
                );
                return;
            }
        };

        let duration_ns = now_ns().saturating_sub(session.start_timestamp_ns);
        match self.combine(collected, duration_ns) {
            Ok(profile) => {
                self.queue.add(profile_id, profile);
                hermes_log::debug!(%profile_id, "finished profiling");
            }
            Err(error) => hermes_log::warn!(
                %profile_id,
                reason = discard_reason(&error),
                error = &error as &dyn Error,
                "dropping invalid profile"
            ),
        }
    }

    fn combine(
        &self,
        collected: CollectedProfiles,
        duration_ns: u64,
    ) -> Result<CollectedProfile, ProfileError> {
        let platform = self.config.platform();

        if self.config.platform_profilers() && collected.native.is_none() {
            match platform {
                Platform::Ios => hermes_log::warn!("profiling stopped without a native profile"),
                Platform::Android => {
                    hermes_log::warn!("profiling stopped without an android profile")
                }
            }
        }

        let js = CombinedProfileEvent::from_js(normalize(&collected.hermes_profile, platform)?);

        Ok(match collected.native {
            NativeProfile::None => CollectedProfile::Combined(Box::new(js)),
            NativeProfile::Apple(native) => {
                CollectedProfile::Combined(Box::new(merge_native(js, *native)))
            }
            NativeProfile::Android(android) => {
                CollectedProfile::Android(Box::new(merge_android(js, *android, duration_ns)))
            }
        })
    }

    fn create_profile_for(&self, profile_id: ProfileId, event: &Event) -> Option<Vec<u8>> {
        let event_id = event.event_id.as_deref().unwrap_or_default();

        let Some(profile) = self.queue.take(&profile_id) else {
            hermes_log::debug!(
                %profile_id,
                event_id,
                "cannot find profile for transaction"
            );
            return None;
        };

        let result = enrich_profile(profile_id, profile, event, &self.config)
            .and_then(|profile| profile.to_json_vec());

        match result {
            Ok(payload) => {
                hermes_log::debug!(%profile_id, event_id, "created profile for transaction");
                Some(payload)
            }
            Err(error) => {
                hermes_log::debug!(
                    %profile_id,
                    reason = discard_reason(&error),
                    "discarding profile"
                );
                None
            }
        }
    }
}

fn finish_timed_out(inner: Weak<Inner>, profile_id: ProfileId) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let _transition = inner.transition.lock();
    let session = {
        let mut guard = inner.session.lock();
        let is_current = guard
            .as_ref()
            .is_some_and(|session| session.profile_id == profile_id);
        if is_current { guard.take() } else { None }
    };

    if let Some(session) = session {
        hermes_log::debug!(%profile_id, "profile reached the maximum duration");
        inner.finish(session);
    }
}

fn now_ns() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .map_or(0, |ns| ns.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;
    use hermes_profiling::{hermes, parse_android, parse_apple};
    use serde_json::{Value, json};

    use super::*;
    use crate::sampler::SamplerError;

    const HERMES_DUMP: &[u8] = include_bytes!("../tests/fixtures/hermes.json");

    struct TestSampler {
        running: Mutex<bool>,
        starts: AtomicUsize,
        stops: AtomicUsize,
        fail_start: bool,
        stopping: AtomicBool,
        stop_delay: Duration,
        dump: &'static [u8],
        native: NativeProfile,
    }

    impl TestSampler {
        fn new() -> Self {
            Self {
                running: Mutex::new(false),
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                fail_start: false,
                stopping: AtomicBool::new(false),
                stop_delay: Duration::ZERO,
                dump: HERMES_DUMP,
                native: NativeProfile::None,
            }
        }
    }

    impl Sampler for Arc<TestSampler> {
        fn start(&self, _platform_profilers: bool) -> Result<(), SamplerError> {
            if self.fail_start {
                return Err(SamplerError::Native("start failed".to_owned()));
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.running.lock() = true;
            Ok(())
        }

        fn stop(&self) -> Result<CollectedProfiles, SamplerError> {
            self.stopping.store(true, Ordering::SeqCst);
            std::thread::sleep(self.stop_delay);

            let mut running = self.running.lock();
            if !*running {
                return Err(SamplerError::Native("not running".to_owned()));
            }
            *running = false;
            self.stops.fetch_add(1, Ordering::SeqCst);

            Ok(CollectedProfiles {
                hermes_profile: hermes::parse(self.dump)?,
                native: self.native.clone(),
            })
        }
    }

    struct TestSpan {
        id: &'static str,
        root: bool,
        sampled: bool,
        attributes: Mutex<BTreeMap<String, String>>,
    }

    impl TestSpan {
        fn root(id: &'static str) -> Self {
            Self {
                id,
                root: true,
                sampled: true,
                attributes: Mutex::default(),
            }
        }

        fn profile_id(&self) -> Option<String> {
            self.attributes.lock().get(PROFILE_ID_KEY).cloned()
        }
    }

    impl Span for TestSpan {
        fn span_id(&self) -> &str {
            self.id
        }

        fn is_root(&self) -> bool {
            self.root
        }

        fn is_sampled(&self) -> bool {
            self.sampled
        }

        fn set_attribute(&self, key: &str, value: String) {
            self.attributes.lock().insert(key.to_owned(), value);
        }
    }

    fn config(profiling: Value) -> Arc<Config> {
        Arc::new(Config::from_json_value(json!({ "profiling": profiling })).unwrap())
    }

    fn integration(sampler: &Arc<TestSampler>) -> HermesProfiling {
        HermesProfiling::new(config(json!({"profiles_sample_rate": 1.0})), sampler.clone())
    }

    fn transaction_envelope(profile_id: &str) -> Envelope {
        let payload = json!({
            "event_id": "41fa39be3ae0434e8cd5e1f5ec3f3db0",
            "type": "transaction",
            "transaction": "Home Screen",
            "start_timestamp": 1710958503.5,
            "contexts": {
                "trace": {
                    "trace_id": "12312012123120121231201212312012",
                    "span_id": "1121201211212012",
                    "data": {"profile_id": profile_id}
                }
            }
        });

        let mut envelope = Envelope::new(Some("41fa39be3ae0434e8cd5e1f5ec3f3db0".to_owned()));
        let mut item = Item::new(ItemType::Transaction);
        item.set_payload(CONTENT_TYPE_JSON, serde_json::to_vec(&payload).unwrap());
        envelope.add_item(item);
        envelope
    }

    fn payload_json(payload: Bytes) -> Value {
        serde_json::from_slice(&payload).unwrap()
    }

    #[test]
    fn test_profile_attached_to_transaction() {
        hermes_test::setup();
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");

        integration.on_span_start(&span);
        assert!(integration.is_profiling());
        let profile_id = span.profile_id().unwrap();
        assert_eq!(
            integration.active_profile_id().map(|id| id.to_string()),
            Some(profile_id.clone())
        );

        integration.on_span_end(&span);
        assert!(!integration.is_profiling());
        assert_eq!(integration.queue().size(), 1);

        let mut envelope = transaction_envelope(&profile_id);
        integration.on_before_envelope(&mut envelope);

        assert_eq!(envelope.len(), 2);
        assert!(integration.queue().is_empty());

        let items: Vec<_> = envelope.items().collect();
        let transaction = payload_json(items[0].payload());
        assert_eq!(transaction["contexts"]["trace"]["data"], json!({}));
        assert_eq!(transaction["contexts"]["trace"]["span_id"], "1121201211212012");

        assert_eq!(items[1].ty(), &ItemType::Profile);
        let profile = payload_json(items[1].payload());
        assert_eq!(profile["event_id"], profile_id.as_str());
        assert_eq!(profile["platform"], "javascript");
        assert_eq!(profile["transaction"]["id"], "41fa39be3ae0434e8cd5e1f5ec3f3db0");
        assert_eq!(profile["transaction"]["active_thread_id"], "14509472");
        assert_eq!(profile["timestamp"], "2024-03-20T18:15:03.500Z");
        assert_eq!(profile["profile"]["samples"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_profile_consumed_once() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");

        integration.on_span_start(&span);
        integration.on_span_end(&span);
        let profile_id = span.profile_id().unwrap();

        let mut first = transaction_envelope(&profile_id);
        let mut second = transaction_envelope(&profile_id);
        integration.on_before_envelope(&mut first);
        integration.on_before_envelope(&mut second);

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_ignores_non_root_spans() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan {
            root: false,
            ..TestSpan::root("child")
        };

        integration.on_span_start(&span);

        assert!(!integration.is_profiling());
        assert_eq!(sampler.starts.load(Ordering::SeqCst), 0);
        assert_eq!(span.profile_id(), None);
    }

    #[test]
    fn test_skips_unsampled_spans() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan {
            sampled: false,
            ..TestSpan::root("a")
        };

        integration.on_span_start(&span);

        assert!(!integration.is_profiling());
        assert_eq!(sampler.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_without_sample_rate() {
        let sampler = Arc::new(TestSampler::new());
        let integration = HermesProfiling::new(config(json!({})), sampler.clone());

        integration.on_span_start(&TestSpan::root("a"));

        assert!(!integration.is_profiling());
        assert_eq!(sampler.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_failure_leaves_no_session() {
        let sampler = Arc::new(TestSampler {
            fail_start: true,
            ..TestSampler::new()
        });
        let integration = integration(&sampler);
        let span = TestSpan::root("a");

        integration.on_span_start(&span);

        assert!(!integration.is_profiling());
        assert_eq!(span.profile_id(), None);
    }

    #[test]
    fn test_new_root_span_finishes_active_profile() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let first = TestSpan::root("a");
        let second = TestSpan::root("b");

        integration.on_span_start(&first);
        integration.on_span_start(&second);

        assert_eq!(sampler.starts.load(Ordering::SeqCst), 2);
        assert_eq!(sampler.stops.load(Ordering::SeqCst), 1);
        assert_eq!(integration.queue().size(), 1);

        let first_id = first.profile_id().unwrap().parse().unwrap();
        assert!(integration.queue().get(&first_id).is_some());
        assert_eq!(
            integration.active_profile_id().map(|id| id.to_string()),
            second.profile_id()
        );
    }

    #[test]
    fn test_span_end_mismatch_keeps_profiling() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);

        integration.on_span_start(&TestSpan::root("a"));
        integration.on_span_end(&TestSpan::root("b"));

        assert!(integration.is_profiling());
        assert_eq!(sampler.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_setup_is_idempotent() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");

        integration.setup(None);
        assert!(!integration.is_profiling());

        integration.setup(Some(&span as &dyn Span));
        integration.setup(Some(&span as &dyn Span));

        assert!(integration.is_profiling());
        assert_eq!(sampler.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_finished_after_max_duration() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");

        integration.on_span_start(&span);
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(integration.is_profiling());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!integration.is_profiling());
        assert_eq!(integration.queue().size(), 1);

        // Ending the span afterwards is a no-op.
        integration.on_span_end(&span);
        assert_eq!(sampler.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timeout_does_not_finish_next_profile() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let first = TestSpan::root("a");
        let second = TestSpan::root("b");

        integration.on_span_start(&first);
        tokio::time::sleep(Duration::from_secs(20)).await;
        integration.on_span_end(&first);
        integration.on_span_start(&second);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(integration.is_profiling());
        assert_eq!(
            integration.active_profile_id().map(|id| id.to_string()),
            second.profile_id()
        );
    }

    #[test]
    fn test_envelope_untouched_with_empty_queue() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);

        let mut envelope = transaction_envelope("b2b3d4f2a0a34c1b8e2e4bd5c2f1c3a0");
        let before = envelope.to_vec().unwrap();
        integration.on_before_envelope(&mut envelope);

        assert_eq!(envelope.to_vec().unwrap(), before);
    }

    #[test]
    fn test_missing_profile_is_not_an_error() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");
        integration.on_span_start(&span);
        integration.on_span_end(&span);

        let mut envelope = transaction_envelope("b2b3d4f2a0a34c1b8e2e4bd5c2f1c3a0");
        integration.on_before_envelope(&mut envelope);

        assert_eq!(envelope.len(), 1);
        assert_eq!(integration.queue().size(), 1);
        let transaction = payload_json(envelope.items().next().unwrap().payload());
        assert_eq!(transaction["contexts"]["trace"]["data"], json!({}));
    }

    #[test]
    fn test_invalid_profile_id_removed_from_transaction() {
        let sampler = Arc::new(TestSampler::new());
        let integration = integration(&sampler);
        let span = TestSpan::root("a");
        integration.on_span_start(&span);
        integration.on_span_end(&span);

        let mut envelope = transaction_envelope("not-a-uuid");
        integration.on_before_envelope(&mut envelope);

        assert_eq!(envelope.len(), 1);
        assert_eq!(integration.queue().size(), 1);
        let transaction = payload_json(envelope.items().next().unwrap().payload());
        assert_eq!(transaction["contexts"]["trace"]["data"], json!({}));
    }

    #[test]
    fn test_timeout_does_not_interleave_with_span_start() {
        let sampler = Arc::new(TestSampler {
            stop_delay: Duration::from_millis(200),
            ..TestSampler::new()
        });
        let integration = integration(&sampler);
        let first = TestSpan::root("a");
        let second = TestSpan::root("b");

        integration.on_span_start(&first);
        let first_id = integration.active_profile_id().unwrap();

        let weak = Arc::downgrade(&integration.inner);
        let timer = std::thread::spawn(move || finish_timed_out(weak, first_id));
        while !sampler.stopping.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }

        // The timed out profile is still being stopped on the other thread.
        integration.on_span_start(&second);
        timer.join().unwrap();
        integration.on_span_end(&second);

        assert_eq!(sampler.starts.load(Ordering::SeqCst), 2);
        assert_eq!(sampler.stops.load(Ordering::SeqCst), 2);
        assert_eq!(integration.queue().size(), 2);
        assert!(integration.queue().get(&first_id).is_some());
        let second_id = second.profile_id().unwrap().parse().unwrap();
        assert!(integration.queue().get(&second_id).is_some());
    }

    #[test]
    fn test_discards_profile_with_single_sample() {
        let sampler = Arc::new(TestSampler {
            dump: br#"{"samples": [{"ts": "10", "tid": "1", "sf": 1}], "stackFrames": {"1": {"name": "[root]", "category": "root"}}}"#,
            ..TestSampler::new()
        });
        let integration = integration(&sampler);
        let span = TestSpan::root("a");
        integration.on_span_start(&span);
        integration.on_span_end(&span);
        assert_eq!(integration.queue().size(), 1);

        let mut envelope = transaction_envelope(&span.profile_id().unwrap());
        integration.on_before_envelope(&mut envelope);

        assert_eq!(envelope.len(), 1);
        assert!(integration.queue().is_empty());
    }

    #[test]
    fn test_apple_profile_merged() {
        let sampler = Arc::new(TestSampler {
            native: NativeProfile::Apple(Box::new(
                parse_apple(include_bytes!("../tests/fixtures/apple.json")).unwrap(),
            )),
            ..TestSampler::new()
        });
        let integration = integration(&sampler);
        let span = TestSpan::root("a");
        integration.on_span_start(&span);
        integration.on_span_end(&span);

        let profile_id = span.profile_id().unwrap().parse().unwrap();
        let Some(CollectedProfile::Combined(profile)) = integration.queue().get(&profile_id)
        else {
            panic!("expected a combined profile");
        };

        assert_eq!(profile.profile.frames.len(), 6);
        assert_eq!(profile.profile.samples.len(), 6);
        assert_eq!(profile.debug_meta.images.len(), 1);
    }

    #[test]
    fn test_android_profile_attached() {
        let sampler = Arc::new(TestSampler {
            native: NativeProfile::Android(Box::new(
                parse_android(br#"{"sampled_profile": "AAAA", "android_api_level": 34}"#).unwrap(),
            )),
            ..TestSampler::new()
        });
        let integration = HermesProfiling::new(
            config(json!({"profiles_sample_rate": 1.0, "platform": "android"})),
            sampler.clone(),
        );
        let span = TestSpan::root("a");
        integration.on_span_start(&span);
        integration.on_span_end(&span);

        let profile_id = span.profile_id().unwrap();
        let mut envelope = transaction_envelope(&profile_id);
        integration.on_before_envelope(&mut envelope);

        let item = envelope.items().nth(1).unwrap();
        let profile = payload_json(item.payload());
        assert_eq!(profile["platform"], "android");
        assert_eq!(profile["profile_id"], profile_id.as_str());
        assert_eq!(profile["sampled_profile"], "AAAA");
        assert_eq!(profile["transaction_name"], "Home Screen");
        assert_eq!(profile["active_thread_id"], "14509472");
        assert_eq!(
            profile["js_profile"]["frames"][1]["abs_path"],
            "app:///index.android.bundle"
        );
    }
}
