//! Party roles in a land verification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a physical participant plays in a land verification.
///
/// This enum is closed: policy requirements are expressed over these roles
/// and nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyRole {
    /// The property owner (or a claimed owner in transfers/disputes).
    PropertyOwner,
    /// A recognized community leader vouching for the transaction.
    CommunityLeader,
    /// The traditional chief with authority over the land area.
    Chief,
    /// A government land-registry official.
    GovernmentOfficial,
    /// An adjacent-parcel neighbor confirming boundaries.
    Neighbor,
    /// An independent witness.
    Witness,
    /// A licensed surveyor.
    Surveyor,
    /// A lawyer acting for one of the parties.
    Lawyer,
}

impl PartyRole {
    /// Stable lowercase identifier used in logs and fraud evidence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertyOwner => "property_owner",
            Self::CommunityLeader => "community_leader",
            Self::Chief => "chief",
            Self::GovernmentOfficial => "government_official",
            Self::Neighbor => "neighbor",
            Self::Witness => "witness",
            Self::Surveyor => "surveyor",
            Self::Lawyer => "lawyer",
        }
    }

    /// Whether this role represents state authority (satisfies the
    /// government-approval requirement).
    pub fn is_government(&self) -> bool {
        matches!(self, Self::GovernmentOfficial)
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
