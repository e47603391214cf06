//! Verification requirement policies and the factory that produces them.
//!
//! A `VerificationRequirements` value is an immutable policy: which roles must
//! participate, how many of each, and how many threshold signatures complete
//! the verification. The factory derives the policy from the transaction kind,
//! the land classification, and the district category.

use crate::land::{DistrictCategory, District, LandType, VerificationType};
use crate::role::PartyRole;
use serde::{Deserialize, Serialize};

/// One role's participation requirement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role: PartyRole,
    /// How many parties with this role must (or may) participate.
    /// This is also the admission cap for the role.
    pub count: u32,
    /// Mandatory roles gate the transition out of party collection;
    /// optional roles may participate but are not required.
    pub mandatory: bool,
}

/// The immutable policy a verification record is constructed around.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequirements {
    pub required_roles: Vec<RoleRequirement>,
    /// Minimum number of collected party signatures before threshold signing.
    pub minimum_signatures: u32,
    /// Whether every admitted party must present verified biometrics.
    pub biometric_required: bool,
    /// Whether a government official must be among the verified parties.
    pub government_approval_required: bool,
}

impl VerificationRequirements {
    /// Look up the requirement entry for a role, if the policy allows it.
    pub fn requirement_for(&self, role: PartyRole) -> Option<&RoleRequirement> {
        self.required_roles.iter().find(|r| r.role == role)
    }

    /// Whether a role is allowed to participate at all.
    pub fn allows_role(&self, role: PartyRole) -> bool {
        self.requirement_for(role).is_some()
    }

    /// Roles that must be fully staffed before signatures can be collected.
    pub fn mandatory_roles(&self) -> impl Iterator<Item = &RoleRequirement> {
        self.required_roles.iter().filter(|r| r.mandatory)
    }
}

/// Produces a `VerificationRequirements` policy from transaction context.
pub struct VerificationRequirementsFactory;

impl VerificationRequirementsFactory {
    /// Derive the policy for a verification.
    ///
    /// The base policy depends on the verification type; communal land adds a
    /// chief where the base policy has none (customary tenure requires stool
    /// consent); rural districts double the required chief count.
    pub fn create(
        land_type: LandType,
        district: &District,
        verification_type: VerificationType,
    ) -> VerificationRequirements {
        let mut requirements = Self::base_policy(verification_type);

        if land_type == LandType::Communal
            && !requirements.required_roles.iter().any(|r| r.role == PartyRole::Chief)
        {
            requirements.required_roles.push(RoleRequirement {
                role: PartyRole::Chief,
                count: 1,
                mandatory: true,
            });
        }

        if district.category() == DistrictCategory::Rural {
            for req in &mut requirements.required_roles {
                if req.role == PartyRole::Chief {
                    req.count *= 2;
                }
            }
        }

        requirements
    }

    fn base_policy(verification_type: VerificationType) -> VerificationRequirements {
        let role = |role, count, mandatory| RoleRequirement {
            role,
            count,
            mandatory,
        };

        match verification_type {
            VerificationType::InitialRegistration => VerificationRequirements {
                required_roles: vec![
                    role(PartyRole::PropertyOwner, 1, true),
                    role(PartyRole::Chief, 1, true),
                    role(PartyRole::CommunityLeader, 2, true),
                    role(PartyRole::Neighbor, 2, true),
                    role(PartyRole::GovernmentOfficial, 1, true),
                ],
                minimum_signatures: 5,
                biometric_required: true,
                government_approval_required: true,
            },
            VerificationType::OwnershipTransfer => VerificationRequirements {
                required_roles: vec![
                    role(PartyRole::PropertyOwner, 2, true),
                    role(PartyRole::Witness, 2, true),
                    role(PartyRole::GovernmentOfficial, 1, true),
                    role(PartyRole::Lawyer, 1, false),
                ],
                minimum_signatures: 4,
                biometric_required: true,
                government_approval_required: true,
            },
            VerificationType::DisputeResolution => VerificationRequirements {
                required_roles: vec![
                    role(PartyRole::PropertyOwner, 2, true),
                    role(PartyRole::Chief, 2, true),
                    role(PartyRole::CommunityLeader, 3, true),
                    role(PartyRole::GovernmentOfficial, 1, true),
                ],
                minimum_signatures: 6,
                biometric_required: true,
                government_approval_required: true,
            },
        }
    }
}
