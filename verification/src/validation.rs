//! Completion validation over a verification record.

use crate::record::VerificationRecord;
use serde::{Deserialize, Serialize};
use tenure_types::PartyRole;

/// Outcome of completion validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Check a record against its policy for completion.
///
/// Pure read over the record; the workflow runs this before the transition
/// into `Completed`.
pub fn validate(record: &VerificationRecord) -> ValidationReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if record.current_signatures < record.required_signatures {
        issues.push(format!(
            "{} of {} required signatures collected",
            record.current_signatures, record.required_signatures
        ));
        recommendations.push("collect the remaining party signatures".to_string());
    }

    for req in record.requirements.mandatory_roles() {
        let present = record.role_count(req.role);
        if present < req.count {
            issues.push(format!(
                "role {} has {present} of {} required parties",
                req.role.as_str(),
                req.count
            ));
            recommendations.push(format!("admit more parties with role {}", req.role.as_str()));
        }
    }

    if record.requirements.biometric_required {
        for party in &record.parties {
            if party.biometrics.is_empty() {
                issues.push(format!(
                    "party {} has no biometric hashes on record",
                    party.id.as_str()
                ));
            }
            if !party.is_verified {
                issues.push(format!("party {} is not verified", party.id.as_str()));
            }
        }
        if record.parties.iter().any(|p| p.biometrics.is_empty() || !p.is_verified) {
            recommendations.push("complete biometric capture for all parties".to_string());
        }
    }

    if record.requirements.government_approval_required {
        let approved = record
            .parties
            .iter()
            .any(|p| p.role.is_government() && p.is_verified);
        if !approved {
            issues.push("no verified government official on record".to_string());
            recommendations
                .push("obtain approval from a verified government official".to_string());
        }
    }

    if record.has_unresolved_dispute() {
        let open = record.disputes.iter().filter(|d| !d.resolved).count();
        issues.push(format!("{open} unresolved dispute(s)"));
        recommendations.push("resolve all open disputes before completion".to_string());
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        recommendations,
    }
}
