//! Privacy-preserving biometric verification for the Tenure protocol.
//!
//! Raw biometric captures are never retained: each modality is reduced to a
//! salted one-way SHA3-512 hash bound to the subject, plus the quality
//! metadata the capture device reported. Matching recomputes candidate
//! hashes under stored salts; liveness is a heuristic score over the
//! capture metadata.

pub mod data;
pub mod error;
pub mod spoofing;
pub mod verifier;

pub use data::{
    BiometricData, BiometricHash, BiometricMatch, FaceSample, FingerprintSample, LivenessResult,
    Modality, QualityReport, VoiceSample,
};
pub use error::BiometricError;
pub use spoofing::AntiSpoofingChecker;
pub use verifier::BiometricVerifier;
