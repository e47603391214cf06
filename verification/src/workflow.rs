//! The verification workflow state machine.
//!
//! `VerificationWorkflow` owns a record and is its only mutator. Every
//! operation takes the caller's clock so expiry is enforced consistently and
//! tests stay deterministic.

use crate::error::VerificationError;
use crate::fraud::{FraudDetector, FraudPolicy, FraudSignal};
use crate::record::{
    DeviceInfo, PartyProfile, PartySignature, VerificationParty, VerificationRecord,
    VerificationStatus,
};
use crate::validation::{self, ValidationReport};
use tenure_biometric::{AntiSpoofingChecker, BiometricData, BiometricVerifier};
use tenure_crypto::{
    LandVerificationPayload, SecretShare, ThresholdSignatureManager,
};
use tenure_types::{PartyId, Timestamp};
use tracing::{debug, info, warn};

pub struct VerificationWorkflow {
    record: VerificationRecord,
    biometrics: BiometricVerifier,
    spoofing: AntiSpoofingChecker,
    fraud: FraudDetector,
}

impl VerificationWorkflow {
    pub fn new(record: VerificationRecord) -> Self {
        Self::with_fraud_policy(record, FraudPolicy::default())
    }

    pub fn with_fraud_policy(record: VerificationRecord, policy: FraudPolicy) -> Self {
        Self {
            record,
            biometrics: BiometricVerifier::new(),
            spoofing: AntiSpoofingChecker::new(),
            fraud: FraudDetector::new(policy),
        }
    }

    pub fn record(&self) -> &VerificationRecord {
        &self.record
    }

    pub fn into_record(self) -> VerificationRecord {
        self.record
    }

    /// Admit a party to the record, hashing any presented biometrics.
    ///
    /// Allowed while the record is in `Initiated` or `CollectingParties`.
    /// The first admission moves an `Initiated` record into
    /// `CollectingParties`.
    pub fn add_party(
        &mut self,
        profile: PartyProfile,
        biometric: Option<&BiometricData>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.guard(now)?;

        if !matches!(
            self.record.status,
            VerificationStatus::Initiated | VerificationStatus::CollectingParties
        ) {
            return Err(VerificationError::InvalidTransition {
                from: self.record.status.to_string(),
                operation: "add_party".to_string(),
            });
        }

        if self.record.party(&profile.id).is_some() {
            return Err(VerificationError::PartyAlreadyAdded(profile.id.to_string()));
        }

        let requirement = self
            .record
            .requirements
            .requirement_for(profile.role)
            .ok_or_else(|| VerificationError::RoleNotAllowed(profile.role.as_str().to_string()))?;
        if self.record.role_count(profile.role) >= requirement.count {
            return Err(VerificationError::RoleLimitExceeded {
                role: profile.role.as_str().to_string(),
                limit: requirement.count,
            });
        }

        let mut hashes = Vec::new();
        let mut capture_location = None;
        if let Some(data) = biometric {
            let quality = self.biometrics.validate_biometric_quality(data);
            if !quality.is_valid {
                warn!(party = %profile.id, issues = ?quality.issues, "biometric quality gate failed");
                return Err(VerificationError::BiometricQualityFailed {
                    issues: quality.issues,
                });
            }

            let liveness = self.spoofing.check_liveness(data);
            if !liveness.is_live {
                warn!(party = %profile.id, confidence = liveness.confidence, "liveness check failed");
                return Err(VerificationError::LivenessFailed {
                    confidence: liveness.confidence,
                });
            }

            hashes = self
                .biometrics
                .process_biometric_data(data, &profile.id)
                .map_err(|e| VerificationError::BiometricQualityFailed {
                    issues: vec![e.to_string()],
                })?;
            capture_location = data.capture_location;
        }

        debug!(record = %self.record.id, party = %profile.id, role = profile.role.as_str(), "party admitted");
        self.record.log(
            now,
            "party_added",
            format!("{} admitted as {}", profile.id, profile.role.as_str()),
        );
        self.record.parties.push(VerificationParty {
            id: profile.id,
            full_name: profile.full_name,
            role: profile.role,
            national_id: profile.national_id,
            biometrics: hashes,
            capture_location,
            is_verified: false,
            verified_at: None,
            added_at: now,
        });

        if self.record.status == VerificationStatus::Initiated {
            self.transition(VerificationStatus::CollectingParties, now);
        }

        Ok(())
    }

    /// Mark an admitted party as identity-verified.
    ///
    /// When the policy requires biometrics, the party must already carry
    /// biometric hashes.
    pub fn mark_party_verified(
        &mut self,
        party_id: &PartyId,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.guard(now)?;

        let biometric_required = self.record.requirements.biometric_required;
        let party = self
            .record
            .party_mut(party_id)
            .ok_or_else(|| VerificationError::PartyNotFound(party_id.to_string()))?;

        if biometric_required && party.biometrics.is_empty() {
            return Err(VerificationError::BiometricQualityFailed {
                issues: vec![format!("party {party_id} has no biometric hashes on record")],
            });
        }

        party.is_verified = true;
        party.verified_at = Some(now);
        self.record
            .log(now, "party_verified", format!("{party_id} verified"));
        Ok(())
    }

    /// Accept a party's signature, running the fraud detectors first.
    ///
    /// Returns the non-blocking fraud signals raised by this submission; they
    /// are also attached to the record. A blocking signal rejects the
    /// signature and is still attached.
    pub fn collect_signature(
        &mut self,
        party_id: &PartyId,
        signature: String,
        signed_hash: String,
        device: DeviceInfo,
        now: Timestamp,
    ) -> Result<Vec<FraudSignal>, VerificationError> {
        self.guard(now)?;

        if self.record.status != VerificationStatus::SignatureCollection {
            return Err(VerificationError::InvalidTransition {
                from: self.record.status.to_string(),
                operation: "collect_signature".to_string(),
            });
        }

        let party = self
            .record
            .party(party_id)
            .ok_or_else(|| VerificationError::PartyNotFound(party_id.to_string()))?
            .clone();

        if self.record.has_signature_from(party_id) {
            let signal = self.fraud.duplicate_signature(party_id.as_str(), now);
            warn!(record = %self.record.id, party = %party_id, "duplicate signature attempt");
            self.record.log(
                now,
                "fraud_signal",
                format!("{}: {}", signal.signal_type, signal.evidence),
            );
            self.record.fraud_signals.push(signal);
            return Err(VerificationError::DuplicateSignature(party_id.to_string()));
        }

        if !party.is_verified {
            return Err(VerificationError::PartyNotVerified(party_id.to_string()));
        }

        let mut signals = Vec::new();
        if let Some(signal) = self.fraud.check_velocity(&self.record, now) {
            signals.push(signal);
        }
        if let Some(signal) = self.fraud.check_location(&party, &device, now) {
            signals.push(signal);
        }

        for signal in &signals {
            warn!(
                record = %self.record.id,
                signal = signal.signal_type.as_str(),
                severity = ?signal.severity,
                "fraud signal raised"
            );
            self.record.log(
                now,
                "fraud_signal",
                format!("{}: {}", signal.signal_type, signal.evidence),
            );
        }
        self.record.fraud_signals.extend(signals.iter().cloned());

        if let Some(blocking) = signals.iter().find(|s| s.is_blocking()) {
            return Err(VerificationError::FraudDetected {
                evidence: blocking.evidence.clone(),
            });
        }

        self.record.signatures.push(PartySignature {
            party_id: party_id.clone(),
            signature,
            signed_hash,
            device,
            signed_at: now,
        });
        self.record.current_signatures += 1;
        info!(
            record = %self.record.id,
            party = %party_id,
            collected = self.record.current_signatures,
            required = self.record.required_signatures,
            "signature collected"
        );
        self.record.log(
            now,
            "signature_collected",
            format!(
                "{party_id} signed ({}/{})",
                self.record.current_signatures, self.record.required_signatures
            ),
        );

        Ok(signals)
    }

    /// Advance the record one step along the progression, when its
    /// preconditions hold. Returns the (possibly unchanged) status.
    ///
    /// A record past its expiry is forced into `Expired` regardless of phase.
    pub fn advance(&mut self, now: Timestamp) -> Result<VerificationStatus, VerificationError> {
        if self.record.status.is_terminal() {
            return Err(VerificationError::TerminalState(
                self.record.status.to_string(),
            ));
        }
        if self.record.is_past_expiry(now) {
            self.transition(VerificationStatus::Expired, now);
            return Ok(VerificationStatus::Expired);
        }

        match self.record.status {
            VerificationStatus::Initiated => {
                self.transition(VerificationStatus::CollectingParties, now);
            }
            VerificationStatus::CollectingParties => {
                if self.mandatory_roles_staffed() {
                    let next = if self.record.requirements.biometric_required {
                        VerificationStatus::BiometricCapture
                    } else {
                        VerificationStatus::SignatureCollection
                    };
                    self.transition(next, now);
                }
            }
            VerificationStatus::BiometricCapture => {
                let all_captured = self
                    .record
                    .parties
                    .iter()
                    .all(|p| !p.biometrics.is_empty() && p.is_verified);
                if all_captured {
                    self.transition(VerificationStatus::SignatureCollection, now);
                }
            }
            VerificationStatus::SignatureCollection => {
                if self.record.current_signatures >= self.record.required_signatures {
                    self.transition(VerificationStatus::ThresholdSigning, now);
                }
            }
            VerificationStatus::ThresholdSigning => {
                if self.record.threshold_signature.is_some() {
                    self.transition(VerificationStatus::Validation, now);
                }
            }
            VerificationStatus::Validation => {
                let report = validation::validate(&self.record);
                if !report.is_valid {
                    return Err(VerificationError::ValidationFailed {
                        issues: report.issues,
                    });
                }
                self.transition(VerificationStatus::Completed, now);
            }
            VerificationStatus::Completed
            | VerificationStatus::Expired
            | VerificationStatus::Rejected => {}
        }

        Ok(self.record.status)
    }

    /// Produce and attach the k-of-n threshold signature over this record.
    ///
    /// Only valid in `ThresholdSigning`; the subsequent `advance` moves the
    /// record into `Validation`.
    pub fn finalize_threshold_signature(
        &mut self,
        manager: &ThresholdSignatureManager,
        shares: &[SecretShare],
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.guard(now)?;

        if self.record.status != VerificationStatus::ThresholdSigning {
            return Err(VerificationError::InvalidTransition {
                from: self.record.status.to_string(),
                operation: "finalize_threshold_signature".to_string(),
            });
        }

        let payload = LandVerificationPayload {
            record_id: self.record.id.to_string(),
            parcel_id: self.record.parcel_id.to_string(),
            verification_type: self.record.verification_type.as_str().to_string(),
            party_ids: self
                .record
                .signatures
                .iter()
                .map(|s| s.party_id.to_string())
                .collect(),
            timestamp: now.as_secs(),
        };

        let signature = manager.create_land_verification_signature(&payload, shares)?;
        info!(record = %self.record.id, hash = %signature.payload_hash, "threshold signature finalized");
        self.record.log(
            now,
            "threshold_signed",
            format!("payload hash {}", signature.payload_hash),
        );
        self.record.threshold_signature = Some(signature);
        Ok(())
    }

    /// Reject the verification. Terminal.
    pub fn reject(&mut self, reason: &str, now: Timestamp) -> Result<(), VerificationError> {
        if self.record.status.is_terminal() {
            return Err(VerificationError::TerminalState(
                self.record.status.to_string(),
            ));
        }
        self.record.log(now, "rejected", reason);
        self.transition(VerificationStatus::Rejected, now);
        Ok(())
    }

    /// Raise a dispute against the record. Unresolved disputes block
    /// completion but do not halt evidence collection.
    pub fn raise_dispute(
        &mut self,
        raised_by: PartyId,
        detail: String,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.guard(now)?;
        self.record
            .log(now, "dispute_raised", format!("{raised_by}: {detail}"));
        self.record.disputes.push(crate::record::DisputeNote {
            raised_by,
            detail,
            resolved: false,
        });
        Ok(())
    }

    /// Resolve the dispute at `index`.
    pub fn resolve_dispute(
        &mut self,
        index: usize,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.guard(now)?;
        let Some(dispute) = self.record.disputes.get_mut(index) else {
            return Err(VerificationError::InvalidTransition {
                from: self.record.status.to_string(),
                operation: format!("resolve_dispute({index})"),
            });
        };
        dispute.resolved = true;
        self.record
            .log(now, "dispute_resolved", format!("dispute {index} resolved"));
        Ok(())
    }

    /// Run completion validation without mutating the record.
    pub fn validate_verification(&self) -> ValidationReport {
        validation::validate(&self.record)
    }

    fn mandatory_roles_staffed(&self) -> bool {
        self.record
            .requirements
            .mandatory_roles()
            .all(|req| self.record.role_count(req.role) >= req.count)
    }

    /// Reject operations on a terminal record and force expiry when the
    /// deadline has passed.
    fn guard(&mut self, now: Timestamp) -> Result<(), VerificationError> {
        if self.record.status.is_terminal() {
            return Err(VerificationError::TerminalState(
                self.record.status.to_string(),
            ));
        }
        if self.record.is_past_expiry(now) {
            self.transition(VerificationStatus::Expired, now);
            return Err(VerificationError::TerminalState(
                VerificationStatus::Expired.to_string(),
            ));
        }
        Ok(())
    }

    fn transition(&mut self, to: VerificationStatus, now: Timestamp) {
        let from = self.record.status;
        if from == to {
            return;
        }
        info!(record = %self.record.id, from = %from, to = %to, "status transition");
        self.record
            .log(now, "status_changed", format!("{from} -> {to}"));
        self.record.status = to;
    }
}
