//! Verification workflow for land transactions.
//!
//! A `VerificationRecord` tracks one transaction from initiation through
//! party admission, biometric capture, signature collection, threshold
//! signing, and completion validation. `VerificationWorkflow` is the only
//! mutator and enforces the state machine, role caps, expiry, and fraud
//! checks on every operation.

pub mod error;
pub mod fraud;
pub mod record;
pub mod validation;
pub mod workflow;

pub use error::VerificationError;
pub use fraud::{FraudDetector, FraudPolicy, FraudSeverity, FraudSignal, FraudSignalType};
pub use record::{
    DeviceInfo, DisputeNote, HistoryEntry, PartyProfile, PartySignature, VerificationParty,
    VerificationRecord, VerificationStatus,
};
pub use validation::{validate, ValidationReport};
pub use workflow::VerificationWorkflow;
