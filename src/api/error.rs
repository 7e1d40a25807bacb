use thiserror::Error;

/// Failures surfaced by the remote data service. A procedure can fail on
/// the transport, on the HTTP status, or return normally while signalling
/// a business failure in its payload; callers must handle all three.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("falha de comunicação com o serviço: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Business(String),

    #[error("resposta inesperada do serviço: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Message as surfaced to the user, verbatim for remote errors.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Duplicate-result violation raised by the match uniqueness
    /// constraint on the server.
    pub fn is_duplicate_match(&self) -> bool {
        self.message().contains("unique_match_per_round")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_match_detected_from_constraint_name() {
        let err = ApiError::Status {
            status: 409,
            message: "duplicate key value violates unique constraint \
                      \"unique_match_per_round\""
                .to_string(),
        };
        assert!(err.is_duplicate_match());

        let other = ApiError::Business("capacity reached".to_string());
        assert!(!other.is_duplicate_match());
    }
}
