use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("role {0} is not allowed by this verification's requirements")]
    RoleNotAllowed(String),

    #[error("role {role} already has its maximum of {limit} parties")]
    RoleLimitExceeded { role: String, limit: u32 },

    #[error("biometric quality below threshold: {}", .issues.join("; "))]
    BiometricQualityFailed { issues: Vec<String> },

    #[error("liveness check failed with confidence {confidence:.1}")]
    LivenessFailed { confidence: f64 },

    #[error("party {0} not found on this record")]
    PartyNotFound(String),

    #[error("party {0} has already been added to this record")]
    PartyAlreadyAdded(String),

    #[error("party {0} has not been verified")]
    PartyNotVerified(String),

    #[error("party {0} has already signed this record")]
    DuplicateSignature(String),

    #[error("critical fraud signal raised: {evidence}")]
    FraudDetected { evidence: String },

    #[error("record is in terminal state {0}; no further operations allowed")]
    TerminalState(String),

    #[error("operation {operation} is not valid in state {from}")]
    InvalidTransition { from: String, operation: String },

    #[error("completion validation failed: {}", .issues.join("; "))]
    ValidationFailed { issues: Vec<String> },

    #[error("threshold signing failed: {0}")]
    Signing(#[from] tenure_crypto::CryptoError),
}
