//! Attaches the context of a transaction to a completed profile.

use chrono::Utc;
use hermes_config::Config;
use hermes_profiling::{
    AndroidCombinedProfileEvent, AndroidProfileEvent, CollectedProfile, CombinedProfileEvent,
    DebugMeta, DeviceMetadata, OSMetadata, ProfileError, ProfileEvent, ProfileId, RuntimeMetadata,
    SampleProfileEvent, TransactionMetadata,
};

use crate::event::Event;

/// Name of the runtime reported with JavaScript profiles.
const RUNTIME_NAME: &str = "hermes";

/// Length of a trace id formatted as hex without dashes.
const TRACE_ID_LENGTH: usize = 32;

/// Builds the profile item payload for a transaction.
///
/// Sample profiles with less than two samples are rejected with
/// [`ProfileError::NotEnoughSamples`].
pub fn enrich_profile(
    profile_id: ProfileId,
    profile: CollectedProfile,
    event: &Event,
    config: &Config,
) -> Result<ProfileEvent, ProfileError> {
    match profile {
        CollectedProfile::Combined(profile) => {
            enrich_sample_profile(profile_id, *profile, event, config)
                .map(|profile| ProfileEvent::Sample(Box::new(profile)))
        }
        CollectedProfile::Android(profile) => Ok(ProfileEvent::Android(Box::new(
            enrich_android_profile(profile_id, *profile, event, config),
        ))),
    }
}

fn trace_id(event: &Event) -> String {
    let trace_id = event
        .trace_context()
        .and_then(|trace| trace.trace_id.clone())
        .unwrap_or_default();

    if !trace_id.is_empty() && trace_id.len() != TRACE_ID_LENGTH {
        hermes_log::debug!(trace_id = %trace_id, "invalid trace id on profiled transaction");
    }

    trace_id
}

fn environment(event: &Event, config: &Config) -> String {
    event
        .environment
        .clone()
        .unwrap_or_else(|| config.default_environment().to_owned())
}

fn enrich_sample_profile(
    profile_id: ProfileId,
    profile: CombinedProfileEvent,
    event: &Event,
    config: &Config,
) -> Result<SampleProfileEvent, ProfileError> {
    if profile.profile.samples.len() < 2 {
        hermes_log::debug!(%profile_id, "discarding profile with less than 2 samples");
        return Err(ProfileError::NotEnoughSamples);
    }

    let os = event.os_context();
    let device = event.device_context();

    let mut images = config.debug_images().to_vec();
    images.extend(profile.debug_meta.images);

    Ok(SampleProfileEvent {
        event_id: profile_id,
        version: profile.version,
        platform: profile.platform,
        release: event.release.clone().unwrap_or_default(),
        environment: environment(event, config),
        timestamp: event.start_time().unwrap_or_else(Utc::now),
        runtime: RuntimeMetadata {
            name: RUNTIME_NAME.to_owned(),
            version: String::new(),
        },
        os: OSMetadata {
            name: os.and_then(|os| os.name.clone()).unwrap_or_default(),
            version: os.and_then(|os| os.version.clone()).unwrap_or_default(),
            build_number: os.and_then(|os| os.build.clone()).unwrap_or_default(),
        },
        device: DeviceMetadata {
            architecture: device.and_then(|d| d.arch.clone()).unwrap_or_default(),
            is_emulator: device.and_then(|d| d.simulator).unwrap_or(false),
            locale: device.and_then(|d| d.locale.clone()).unwrap_or_default(),
            manufacturer: device.and_then(|d| d.manufacturer.clone()).unwrap_or_default(),
            model: device.and_then(|d| d.model.clone()).unwrap_or_default(),
        },
        transaction: TransactionMetadata {
            name: event.transaction.clone().unwrap_or_default(),
            id: event.event_id.clone().unwrap_or_default(),
            trace_id: trace_id(event),
            active_thread_id: profile.transaction.active_thread_id,
        },
        debug_meta: DebugMeta { images },
        profile: profile.profile,
        measurements: profile.measurements,
    })
}

fn enrich_android_profile(
    profile_id: ProfileId,
    profile: AndroidCombinedProfileEvent,
    event: &Event,
    config: &Config,
) -> AndroidProfileEvent {
    let os = event.os_context();
    let device = event.device_context();
    let release = event.release.clone().unwrap_or_default();
    let dist = event.dist.clone().unwrap_or_default();

    AndroidProfileEvent {
        profile,
        profile_id,
        debug_meta: DebugMeta {
            images: config.debug_images().to_vec(),
        },
        device_cpu_frequencies: Vec::new(),
        device_is_emulator: device.and_then(|d| d.simulator).unwrap_or(false),
        device_locale: device.and_then(|d| d.locale.clone()).unwrap_or_default(),
        device_manufacturer: device.and_then(|d| d.manufacturer.clone()).unwrap_or_default(),
        device_model: device.and_then(|d| d.model.clone()).unwrap_or_default(),
        device_os_name: os.and_then(|os| os.name.clone()).unwrap_or_default(),
        device_os_version: os.and_then(|os| os.version.clone()).unwrap_or_default(),
        device_physical_memory_bytes: device
            .and_then(|d| d.memory_size)
            .map(|size| size.to_string())
            .unwrap_or_default(),
        environment: environment(event, config),
        timestamp: event.start_time().unwrap_or_else(Utc::now),
        version_name: release.clone(),
        version_code: dist.clone(),
        release,
        dist,
        transaction_id: event.event_id.clone().unwrap_or_default(),
        transaction_name: event.transaction.clone().unwrap_or_default(),
        trace_id: trace_id(event),
    }
}
