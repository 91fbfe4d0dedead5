use thiserror::Error;

#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ProfileError {
    #[error(transparent)]
    InvalidJson(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("invalid sampled profile")]
    InvalidSampledProfile,
    #[error("cannot serialize payload")]
    CannotSerializePayload,
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("malformed stacks")]
    MalformedStacks,
}

impl ProfileError {
    /// Returns the path to the field in the JSON payload at which the error occurred.
    ///
    /// This is only available for [`InvalidJson`](Self::InvalidJson). Returns `""` otherwise.
    pub fn path(&self) -> String {
        match self {
            Self::InvalidJson(err) => err.path().to_string(),
            _ => "".into(),
        }
    }
}
