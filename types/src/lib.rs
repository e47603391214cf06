//! Fundamental types for the Tenure land verification protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, party roles, land and district classifications,
//! timestamps, geolocation, and verification requirement policies.

pub mod geo;
pub mod id;
pub mod land;
pub mod requirements;
pub mod role;
pub mod time;

pub use geo::GeoPoint;
pub use id::{ParcelId, PartyId, RecordId};
pub use land::{District, DistrictCategory, LandType, VerificationType};
pub use requirements::{RoleRequirement, VerificationRequirements, VerificationRequirementsFactory};
pub use role::PartyRole;
pub use time::Timestamp;
