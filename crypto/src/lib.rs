//! Threshold signature primitives for the Tenure protocol.
//!
//! - **Finite field**: fixed-width 256-bit arithmetic modulo the secp256k1
//!   group order, the scalar field Shamir shares live in.
//! - **Shamir secret sharing**: k-of-n share generation and Lagrange
//!   reconstruction. Fewer than k shares reveal nothing about the secret.
//! - **Threshold signing**: an ECDSA (secp256k1) signature over a
//!   deterministically-canonicalized land verification payload, produced from
//!   a signing key that only exists once k shares recombine.

pub mod error;
pub mod field;
pub mod shamir;
pub mod threshold;

pub use error::CryptoError;
pub use field::FieldElement;
pub use shamir::{canonical_secret, SecretShare, ThresholdScheme};
pub use threshold::{
    canonical_payload_hash, LandVerificationPayload, ThresholdSignature, ThresholdSignatureManager,
};
