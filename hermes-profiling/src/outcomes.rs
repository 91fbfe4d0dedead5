use crate::ProfileError;

/// Maps a [`ProfileError`] to the stable reason string reported when a profile is dropped.
pub fn discard_reason(err: &ProfileError) -> &'static str {
    match err {
        ProfileError::CannotSerializePayload => "profiling_failed_serialization",
        ProfileError::InvalidJson(_) => "profiling_invalid_json",
        ProfileError::InvalidSampledProfile => "profiling_invalid_sampled_profile",
        ProfileError::MalformedStacks => "profiling_malformed_stacks",
        ProfileError::NotEnoughSamples => "profiling_not_enough_samples",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_are_distinct() {
        let reasons = [
            discard_reason(&ProfileError::CannotSerializePayload),
            discard_reason(&ProfileError::InvalidSampledProfile),
            discard_reason(&ProfileError::MalformedStacks),
            discard_reason(&ProfileError::NotEnoughSamples),
        ];

        let mut unique = reasons.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), reasons.len());
    }

    #[test]
    fn test_invalid_json_reason() {
        let err = crate::hermes::parse(b"{").unwrap_err();
        assert_eq!(discard_reason(&err), "profiling_invalid_json");
    }
}
