use thiserror::Error;

/// Why a pipeline call did not produce a value.
///
/// The `Display` text of each variant is the stable failure reason shown to
/// callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("transport exhausted")]
    TransportExhausted,

    #[error("invalid json")]
    InvalidJson,

    #[error("response is not a json object")]
    NotAnObject,

    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("no valid clothes ids")]
    NoValidClothesIds,

    #[error("no candidates")]
    NoCandidates,

    #[error("recommended garments unavailable")]
    RecommendedGarmentsUnavailable,
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The model endpoint could not be reached or answered with a bad envelope.
    Transport,
    /// The model answered with text that is not a JSON object.
    MalformedOutput,
    /// The JSON was readable but incomplete or unusable.
    ContractViolation,
    /// The model picked garments that are not in the caller's pool.
    OwnershipViolation,
    /// Nothing was left to choose from before the model was consulted.
    NoCandidates,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransportExhausted => ErrorKind::Transport,
            Self::InvalidJson | Self::NotAnObject => ErrorKind::MalformedOutput,
            Self::MissingFields(_) | Self::NoValidClothesIds => ErrorKind::ContractViolation,
            Self::RecommendedGarmentsUnavailable => ErrorKind::OwnershipViolation,
            Self::NoCandidates => ErrorKind::NoCandidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_names_every_field() {
        let err = PipelineError::MissingFields(vec!["name".to_string(), "clothes_ids".to_string()]);
        assert_eq!(err.to_string(), "missing fields: name, clothes_ids");
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
    }

    #[test]
    fn test_reasons() {
        assert_eq!(
            PipelineError::TransportExhausted.to_string(),
            "transport exhausted"
        );
        assert_eq!(
            PipelineError::RecommendedGarmentsUnavailable.to_string(),
            "recommended garments unavailable"
        );
        assert_eq!(
            PipelineError::InvalidJson.kind(),
            ErrorKind::MalformedOutput
        );
    }
}
