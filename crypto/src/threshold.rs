//! Threshold ECDSA signing over land verification payloads.
//!
//! No single share proves agreement: the signing key only exists once k
//! shares recombine, and it is derived from a one-way hash of the
//! reconstructed secret rather than the secret itself, so the raw secret
//! never doubles as key material.

use crate::error::CryptoError;
use crate::shamir::{SecretShare, ThresholdScheme};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Domain separation tag for signing-key derivation.
const KEY_DERIVATION_TAG: &[u8] = b"tenure/threshold-signing/v1";

/// The payload every party's consensus is bound to.
///
/// Field values are strings/integers only so canonicalization has no
/// float or null ambiguity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandVerificationPayload {
    pub record_id: String,
    pub parcel_id: String,
    pub verification_type: String,
    /// Parties whose collected signatures back this threshold signature.
    pub party_ids: Vec<String>,
    /// Unix seconds at signing time.
    pub timestamp: u64,
}

/// A finalized threshold signature in transport encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSignature {
    /// ECDSA signature, DER, base64.
    pub signature: String,
    /// SEC1 compressed public key, base64.
    pub public_key: String,
    /// SHA-256 of the canonical payload, hex.
    pub payload_hash: String,
}

/// Generates shares, recombines them, and signs/verifies payloads under a
/// k-of-n policy.
pub struct ThresholdSignatureManager {
    scheme: ThresholdScheme,
}

impl ThresholdSignatureManager {
    /// Create a manager for a k-of-n policy. Rejects k < 2 and k > n.
    pub fn new(threshold: u32, total_shares: u32) -> Result<Self, CryptoError> {
        Ok(Self {
            scheme: ThresholdScheme::new(threshold, total_shares)?,
        })
    }

    pub fn scheme(&self) -> &ThresholdScheme {
        &self.scheme
    }

    /// Split a signing secret into distributable shares.
    pub fn generate_shares(&self, secret: &[u8]) -> Result<Vec<SecretShare>, CryptoError> {
        self.scheme.generate_shares(secret)
    }

    /// Recombine at least k shares into the signing secret.
    pub fn reconstruct_secret(&self, shares: &[SecretShare]) -> Result<[u8; 32], CryptoError> {
        self.scheme.reconstruct_secret(shares)
    }

    /// Produce the threshold signature over `payload` from at least k shares.
    pub fn create_land_verification_signature(
        &self,
        payload: &LandVerificationPayload,
        shares: &[SecretShare],
    ) -> Result<ThresholdSignature, CryptoError> {
        let hash = canonical_payload_hash(payload)?;

        let secret = Zeroizing::new(self.scheme.reconstruct_secret(shares)?);
        let signing_key = derive_signing_key(&secret)?;

        let signature: Signature = signing_key
            .sign_prehash(&hash)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        let public_key = signing_key.verifying_key().to_encoded_point(true);

        Ok(ThresholdSignature {
            signature: BASE64.encode(signature.to_der().as_bytes()),
            public_key: BASE64.encode(public_key.as_bytes()),
            payload_hash: hex::encode(hash),
        })
    }

    /// Verify a threshold signature against a payload.
    ///
    /// Signature invalidity is an expected outcome, not a programming error:
    /// every malformed input path returns `false` rather than an error.
    pub fn verify_signature(
        &self,
        payload: &LandVerificationPayload,
        signature_b64: &str,
        public_key_b64: &str,
    ) -> bool {
        let Ok(hash) = canonical_payload_hash(payload) else {
            return false;
        };
        let Ok(sig_der) = BASE64.decode(signature_b64) else {
            return false;
        };
        let Ok(pk_sec1) = BASE64.decode(public_key_b64) else {
            return false;
        };
        let Ok(signature) = Signature::from_der(&sig_der) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&pk_sec1) else {
            return false;
        };
        verifying_key.verify_prehash(&hash, &signature).is_ok()
    }
}

/// SHA-256 over the canonical serialization of a payload.
///
/// Canonical form is the `serde_json` value rendering, whose object maps are
/// BTree-backed: keys always serialize in sorted order, so two equal payloads
/// hash identically regardless of construction order.
pub fn canonical_payload_hash(payload: &LandVerificationPayload) -> Result<[u8; 32], CryptoError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| CryptoError::Canonicalization(e.to_string()))?;
    let canonical = value.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(digest.into())
}

/// Derive the ephemeral ECDSA signing key from a reconstructed secret.
///
/// The key seed is a hash of the secret under a domain tag, never the secret
/// itself: one-way, and reproducible for the same share set. The counter
/// re-hash covers the negligible case of a seed outside the curve order.
fn derive_signing_key(secret: &[u8; 32]) -> Result<SigningKey, CryptoError> {
    for counter in 0u8..=255 {
        let mut hasher = Sha256::new();
        hasher.update(KEY_DERIVATION_TAG);
        hasher.update(secret);
        hasher.update([counter]);
        let seed = hasher.finalize();
        if let Ok(key) = SigningKey::from_slice(&seed) {
            return Ok(key);
        }
    }
    Err(CryptoError::Signing(
        "could not derive a valid signing key from secret".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> LandVerificationPayload {
        LandVerificationPayload {
            record_id: "rec-001".into(),
            parcel_id: "GA-034-8821".into(),
            verification_type: "initial_registration".into(),
            party_ids: vec!["p1".into(), "p2".into(), "p3".into()],
            timestamp: 1_756_250_000,
        }
    }

    fn signed() -> (ThresholdSignatureManager, ThresholdSignature) {
        let manager = ThresholdSignatureManager::new(3, 5).unwrap();
        let shares = manager.generate_shares(b"registry signing secret").unwrap();
        let sig = manager
            .create_land_verification_signature(&payload(), &shares[1..4])
            .unwrap();
        (manager, sig)
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(ThresholdSignatureManager::new(1, 5).is_err());
        assert!(ThresholdSignatureManager::new(7, 5).is_err());
        assert!(ThresholdSignatureManager::new(2, 2).is_ok());
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let (manager, sig) = signed();
        assert!(manager.verify_signature(&payload(), &sig.signature, &sig.public_key));
    }

    #[test]
    fn signing_fails_below_threshold() {
        let manager = ThresholdSignatureManager::new(3, 5).unwrap();
        let shares = manager.generate_shares(b"registry signing secret").unwrap();
        let result = manager.create_land_verification_signature(&payload(), &shares[0..2]);
        assert!(matches!(
            result,
            Err(CryptoError::InsufficientShares { have: 2, need: 3 })
        ));
    }

    #[test]
    fn any_share_subset_signs_identically_verifiable() {
        let manager = ThresholdSignatureManager::new(3, 5).unwrap();
        let shares = manager.generate_shares(b"registry signing secret").unwrap();

        let s1 = manager
            .create_land_verification_signature(&payload(), &shares[0..3])
            .unwrap();
        let s2 = manager
            .create_land_verification_signature(&payload(), &shares[2..5])
            .unwrap();

        // Same reconstructed secret, same derived key.
        assert_eq!(s1.public_key, s2.public_key);
        assert!(manager.verify_signature(&payload(), &s2.signature, &s1.public_key));
    }

    #[test]
    fn tampering_with_any_field_breaks_verification() {
        let (manager, sig) = signed();

        let mut p = payload();
        p.record_id = "rec-002".into();
        assert!(!manager.verify_signature(&p, &sig.signature, &sig.public_key));

        let mut p = payload();
        p.parcel_id = "GA-034-8822".into();
        assert!(!manager.verify_signature(&p, &sig.signature, &sig.public_key));

        let mut p = payload();
        p.verification_type = "ownership_transfer".into();
        assert!(!manager.verify_signature(&p, &sig.signature, &sig.public_key));

        let mut p = payload();
        p.party_ids.push("intruder".into());
        assert!(!manager.verify_signature(&p, &sig.signature, &sig.public_key));

        let mut p = payload();
        p.timestamp += 1;
        assert!(!manager.verify_signature(&p, &sig.signature, &sig.public_key));
    }

    #[test]
    fn malformed_transport_encodings_verify_false() {
        let (manager, sig) = signed();
        assert!(!manager.verify_signature(&payload(), "not base64!!", &sig.public_key));
        assert!(!manager.verify_signature(&payload(), &sig.signature, "not base64!!"));
        // Valid base64, invalid DER / SEC1.
        let junk = BASE64.encode(b"junk bytes");
        assert!(!manager.verify_signature(&payload(), &junk, &sig.public_key));
        assert!(!manager.verify_signature(&payload(), &sig.signature, &junk));
    }

    #[test]
    fn canonical_hash_is_deterministic() {
        let h1 = canonical_payload_hash(&payload()).unwrap();
        let h2 = canonical_payload_hash(&payload()).unwrap();
        assert_eq!(h1, h2);

        let mut changed = payload();
        changed.timestamp += 1;
        assert_ne!(h1, canonical_payload_hash(&changed).unwrap());
    }

    #[test]
    fn key_derivation_is_one_way_indirection() {
        // The derived public key must not equal the key a raw secret would give.
        let manager = ThresholdSignatureManager::new(2, 3).unwrap();
        let secret = [42u8; 32];
        let shares = manager.generate_shares(&secret).unwrap();
        let sig = manager
            .create_land_verification_signature(&payload(), &shares)
            .unwrap();

        let raw_key = SigningKey::from_slice(&secret).unwrap();
        let raw_pub = BASE64.encode(raw_key.verifying_key().to_encoded_point(true).as_bytes());
        assert_ne!(sig.public_key, raw_pub);
    }
}
