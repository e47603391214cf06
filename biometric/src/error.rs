use thiserror::Error;

#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("no biometric modality present in capture")]
    NoModalities,

    #[error("biometric quality below threshold: {}", .issues.join("; "))]
    QualityFailed { issues: Vec<String> },

    #[error("liveness check failed with confidence {confidence:.1}")]
    LivenessFailed { confidence: f64 },
}
