//! The verification record aggregate and its constituent types.

use crate::fraud::FraudSignal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tenure_biometric::BiometricHash;
use tenure_crypto::ThresholdSignature;
use tenure_types::{
    GeoPoint, ParcelId, PartyId, PartyRole, RecordId, Timestamp, VerificationRequirements,
    VerificationType,
};

/// Workflow status of a verification record.
///
/// The progression is linear; `Expired` and `Rejected` are absorbing and
/// reachable from any non-terminal state. Status never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Record created, nothing collected yet.
    Initiated,
    /// Admitting parties until every mandatory role is staffed.
    CollectingParties,
    /// Waiting for every admitted party to present verified biometrics.
    BiometricCapture,
    /// Collecting party signatures toward the policy threshold.
    SignatureCollection,
    /// Threshold reached; the k-of-n signature can be produced.
    ThresholdSigning,
    /// All evidence in; awaiting completion validation.
    Validation,
    /// Verification complete and valid.
    Completed,
    /// The record's expiry deadline passed.
    Expired,
    /// The verification was rejected.
    Rejected,
}

impl VerificationStatus {
    /// Whether this state absorbs all further operations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Rejected)
    }

    /// Position in the forward progression. Terminal states compare greatest
    /// so monotonicity holds across expiry/rejection from any state.
    pub fn sequence(&self) -> u8 {
        match self {
            Self::Initiated => 0,
            Self::CollectingParties => 1,
            Self::BiometricCapture => 2,
            Self::SignatureCollection => 3,
            Self::ThresholdSigning => 4,
            Self::Validation => 5,
            Self::Completed | Self::Expired | Self::Rejected => u8::MAX,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::CollectingParties => "collecting_parties",
            Self::BiometricCapture => "biometric_capture",
            Self::SignatureCollection => "signature_collection",
            Self::ThresholdSigning => "threshold_signing",
            Self::Validation => "validation",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied identity attributes for a party being admitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyProfile {
    pub id: PartyId,
    pub full_name: String,
    pub role: PartyRole,
    /// National identity document number, when presented.
    pub national_id: Option<String>,
}

/// One physical participant admitted to a verification record.
///
/// Parties are never removed once admitted (audit retention); only the
/// verification flag and timestamp ever change after admission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationParty {
    pub id: PartyId,
    pub full_name: String,
    pub role: PartyRole,
    pub national_id: Option<String>,
    /// Salted one-way hashes of the party's biometric capture, if presented.
    pub biometrics: Vec<BiometricHash>,
    /// Where the biometric capture happened, for location fraud checks.
    pub capture_location: Option<GeoPoint>,
    pub is_verified: bool,
    pub verified_at: Option<Timestamp>,
    pub added_at: Timestamp,
}

/// The device a signature was submitted from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub location: Option<GeoPoint>,
}

/// One party's cryptographic signature over a specific payload hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartySignature {
    pub party_id: PartyId,
    /// The party's signature, transport-encoded.
    pub signature: String,
    /// Hex hash of the payload the party signed.
    pub signed_hash: String,
    pub device: DeviceInfo,
    pub signed_at: Timestamp,
}

/// A dispute raised against the verification. Unresolved disputes block
/// completion validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeNote {
    pub raised_by: PartyId,
    pub detail: String,
    pub resolved: bool,
}

/// Append-only audit log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: Timestamp,
    pub action: String,
    pub detail: String,
}

/// The aggregate root: one land transaction's verification state.
///
/// Mutation goes exclusively through `VerificationWorkflow`; everything else
/// reads. Invariant: `current_signatures == signatures.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: RecordId,
    pub parcel_id: ParcelId,
    pub verification_type: VerificationType,
    pub status: VerificationStatus,
    pub parties: Vec<VerificationParty>,
    pub signatures: Vec<PartySignature>,
    pub requirements: VerificationRequirements,
    pub current_signatures: u32,
    pub required_signatures: u32,
    /// The finalized k-of-n signature, once threshold signing ran.
    pub threshold_signature: Option<ThresholdSignature>,
    pub fraud_signals: Vec<FraudSignal>,
    pub disputes: Vec<DisputeNote>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub history: Vec<HistoryEntry>,
}

impl VerificationRecord {
    pub fn new(
        id: RecordId,
        parcel_id: ParcelId,
        verification_type: VerificationType,
        requirements: VerificationRequirements,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        let required_signatures = requirements.minimum_signatures;
        let mut record = Self {
            id,
            parcel_id,
            verification_type,
            status: VerificationStatus::Initiated,
            parties: Vec::new(),
            signatures: Vec::new(),
            requirements,
            current_signatures: 0,
            required_signatures,
            threshold_signature: None,
            fraud_signals: Vec::new(),
            disputes: Vec::new(),
            expires_at,
            created_at,
            history: Vec::new(),
        };
        record.log(created_at, "initiated", "verification record created");
        record
    }

    pub fn party(&self, id: &PartyId) -> Option<&VerificationParty> {
        self.parties.iter().find(|p| &p.id == id)
    }

    pub(crate) fn party_mut(&mut self, id: &PartyId) -> Option<&mut VerificationParty> {
        self.parties.iter_mut().find(|p| &p.id == id)
    }

    /// Number of admitted parties holding a role.
    pub fn role_count(&self, role: PartyRole) -> u32 {
        self.parties.iter().filter(|p| p.role == role).count() as u32
    }

    pub fn has_signature_from(&self, id: &PartyId) -> bool {
        self.signatures.iter().any(|s| &s.party_id == id)
    }

    /// Whether the wall clock has passed this record's expiry.
    pub fn is_past_expiry(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Append to the audit history. The history is never truncated or
    /// rewritten.
    pub(crate) fn log(&mut self, now: Timestamp, action: &str, detail: impl Into<String>) {
        self.history.push(HistoryEntry {
            at: now,
            action: action.to_string(),
            detail: detail.into(),
        });
    }

    /// Whether any dispute remains unresolved.
    pub fn has_unresolved_dispute(&self) -> bool {
        self.disputes.iter().any(|d| !d.resolved)
    }
}
