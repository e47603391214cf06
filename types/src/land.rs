//! Land classification, district, and verification-type enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The registered use of a land parcel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandType {
    Residential,
    Agricultural,
    Commercial,
    /// Stool/family land held communally under customary tenure.
    Communal,
}

/// The kind of transaction being verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationType {
    /// First registration of a previously unregistered parcel.
    InitialRegistration,
    /// Transfer of ownership between parties.
    OwnershipTransfer,
    /// Resolution of a contested claim.
    DisputeResolution,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialRegistration => "initial_registration",
            Self::OwnershipTransfer => "ownership_transfer",
            Self::DisputeResolution => "dispute_resolution",
        }
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urban or rural. Drives policy adjustments: rural areas lean more
/// heavily on traditional authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistrictCategory {
    Urban,
    Rural,
}

/// An administrative district, classified by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct District(String);

/// Districts classified as urban. Every other district is treated as rural,
/// which is the conservative policy (more traditional-authority sign-off).
const URBAN_DISTRICTS: &[&str] = &["accra", "tema", "kumasi", "takoradi", "tamale", "cape coast"];

impl District {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Classify this district. Unknown names default to rural.
    pub fn category(&self) -> DistrictCategory {
        let lower = self.0.to_lowercase();
        if URBAN_DISTRICTS.iter().any(|u| lower.contains(u)) {
            DistrictCategory::Urban
        } else {
            DistrictCategory::Rural
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_urban_districts_classified_urban() {
        assert_eq!(District::new("Accra").category(), DistrictCategory::Urban);
        assert_eq!(
            District::new("Kumasi Metropolitan").category(),
            DistrictCategory::Urban
        );
    }

    #[test]
    fn unknown_district_defaults_to_rural() {
        assert_eq!(
            District::new("Nkwanta South").category(),
            DistrictCategory::Rural
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(District::new("TAMALE").category(), DistrictCategory::Urban);
    }
}
