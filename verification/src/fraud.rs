//! Fraud signal detection over verification records.
//!
//! Detectors are pure over their inputs and never mutate the record; the
//! workflow decides what to do with the signals they emit.

use crate::record::{DeviceInfo, VerificationParty, VerificationRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tenure_types::Timestamp;

/// Category of suspicious activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FraudSignalType {
    /// A party attempted to sign the same record twice.
    DuplicateSignature,
    /// Signature arrival rate exceeds the policy window limit.
    VelocityAnomaly,
    /// Signing device is implausibly far from the biometric capture site.
    LocationMismatch,
}

impl FraudSignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateSignature => "duplicate_signature",
            Self::VelocityAnomaly => "velocity_anomaly",
            Self::LocationMismatch => "location_mismatch",
        }
    }
}

impl fmt::Display for FraudSignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FraudSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// One detected anomaly, kept on the record for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudSignal {
    pub signal_type: FraudSignalType,
    pub severity: FraudSeverity,
    pub evidence: String,
    pub recommended_action: String,
    pub detected_at: Timestamp,
}

impl FraudSignal {
    /// Only critical signals abort the operation that raised them.
    pub fn is_blocking(&self) -> bool {
        self.severity == FraudSeverity::Critical
    }
}

/// Tunable thresholds for the detectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudPolicy {
    /// Maximum signatures accepted on one record inside the rolling window.
    pub max_signatures_per_window: usize,
    /// Rolling window length in seconds.
    pub velocity_window_secs: u64,
    /// Maximum plausible distance between capture site and signing device.
    pub max_capture_distance_km: f64,
}

impl Default for FraudPolicy {
    fn default() -> Self {
        Self {
            max_signatures_per_window: 10,
            velocity_window_secs: 86_400,
            max_capture_distance_km: 30.0,
        }
    }
}

/// Runs the individual detectors against a record.
#[derive(Clone, Debug, Default)]
pub struct FraudDetector {
    policy: FraudPolicy,
}

impl FraudDetector {
    pub fn new(policy: FraudPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FraudPolicy {
        &self.policy
    }

    /// A second signature attempt by the same party. Always critical.
    pub fn duplicate_signature(&self, party_id: &str, now: Timestamp) -> FraudSignal {
        FraudSignal {
            signal_type: FraudSignalType::DuplicateSignature,
            severity: FraudSeverity::Critical,
            evidence: format!("party {party_id} attempted to sign twice"),
            recommended_action: "reject signature and flag the party for review".to_string(),
            detected_at: now,
        }
    }

    /// Signature velocity over the rolling window, counting the signature
    /// about to be accepted.
    pub fn check_velocity(&self, record: &VerificationRecord, now: Timestamp) -> Option<FraudSignal> {
        let window_start = now.as_secs().saturating_sub(self.policy.velocity_window_secs);
        let recent = record
            .signatures
            .iter()
            .filter(|s| s.signed_at.as_secs() >= window_start)
            .count();
        if recent + 1 > self.policy.max_signatures_per_window {
            return Some(FraudSignal {
                signal_type: FraudSignalType::VelocityAnomaly,
                severity: FraudSeverity::High,
                evidence: format!(
                    "{} signatures within {} seconds exceeds limit of {}",
                    recent + 1,
                    self.policy.velocity_window_secs,
                    self.policy.max_signatures_per_window
                ),
                recommended_action: "pause collection and review signing activity".to_string(),
                detected_at: now,
            });
        }
        None
    }

    /// Distance between the party's biometric capture site and the signing
    /// device. Skipped when either location is unknown.
    pub fn check_location(
        &self,
        party: &VerificationParty,
        device: &DeviceInfo,
        now: Timestamp,
    ) -> Option<FraudSignal> {
        let capture = party.capture_location.as_ref()?;
        let signing = device.location.as_ref()?;
        let distance = capture.distance_km(signing);
        if distance > self.policy.max_capture_distance_km {
            return Some(FraudSignal {
                signal_type: FraudSignalType::LocationMismatch,
                severity: FraudSeverity::Medium,
                evidence: format!(
                    "party {} signed {:.1} km from their capture site (limit {:.1} km)",
                    party.id.as_str(),
                    distance,
                    self.policy.max_capture_distance_km
                ),
                recommended_action: "confirm the party's presence through a second channel"
                    .to_string(),
                detected_at: now,
            });
        }
        None
    }
}
