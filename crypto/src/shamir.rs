//! Shamir secret sharing over the scalar field.
//!
//! A secret is embedded as the constant term of a random degree-(k-1)
//! polynomial; shares are evaluations at x = 1..=n. Any k shares recover the
//! secret by Lagrange interpolation at x = 0; any k-1 shares are
//! information-theoretically independent of it.

use crate::error::CryptoError;
use crate::field::FieldElement;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// One share of a split secret: the evaluation of the sharing polynomial
/// at `x = index`.
///
/// Shares are ephemeral: they exist to be distributed to parties and
/// recombined, never persisted alongside each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretShare {
    /// Evaluation point, 1-based. Zero is never used (it would leak the secret).
    pub index: u32,
    /// Polynomial value at `index`.
    pub value: FieldElement,
}

/// A k-of-n secret sharing configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdScheme {
    threshold: u32,
    total_shares: u32,
}

impl ThresholdScheme {
    /// Create a scheme requiring `threshold` of `total_shares` shares.
    ///
    /// Thresholds below 2 defeat the purpose (a single party could forge
    /// consensus) and thresholds above the share count are unsatisfiable;
    /// both are rejected.
    pub fn new(threshold: u32, total_shares: u32) -> Result<Self, CryptoError> {
        if threshold < 2 {
            return Err(CryptoError::InvalidConfig(format!(
                "threshold must be at least 2, got {threshold}"
            )));
        }
        if threshold > total_shares {
            return Err(CryptoError::InvalidConfig(format!(
                "threshold {threshold} exceeds total shares {total_shares}"
            )));
        }
        Ok(Self {
            threshold,
            total_shares,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn total_shares(&self) -> u32 {
        self.total_shares
    }

    /// Split a secret into `total_shares` shares.
    ///
    /// The polynomial's non-constant coefficients are drawn fresh from the
    /// OS randomness source on every call, so two runs over the same secret
    /// produce statistically independent share sets.
    pub fn generate_shares(&self, secret: &[u8]) -> Result<Vec<SecretShare>, CryptoError> {
        let secret_fe = secret_to_field(secret)?;

        let mut coefficients = Vec::with_capacity(self.threshold as usize);
        coefficients.push(secret_fe);
        for _ in 1..self.threshold {
            coefficients.push(FieldElement::random(&mut OsRng));
        }

        let shares = (1..=self.total_shares)
            .map(|index| {
                let x = FieldElement::from_u64(index as u64);
                // Horner evaluation from the highest coefficient down.
                let value = coefficients
                    .iter()
                    .rev()
                    .fold(FieldElement::ZERO, |acc, c| acc * x + *c);
                SecretShare { index, value }
            })
            .collect();

        Ok(shares)
    }

    /// Recombine shares into the secret (canonical 32-byte big-endian form).
    ///
    /// Uses Lagrange interpolation at x = 0 over the first `threshold`
    /// shares supplied; which k shares they are, and in what order, does not
    /// affect the result. Duplicate indices make a Lagrange denominator
    /// zero and fail with `NotInvertible`.
    pub fn reconstruct_secret(&self, shares: &[SecretShare]) -> Result<[u8; 32], CryptoError> {
        let need = self.threshold as usize;
        if shares.len() < need {
            return Err(CryptoError::InsufficientShares {
                have: shares.len(),
                need,
            });
        }

        let shares = &shares[..need];
        let mut secret = FieldElement::ZERO;

        for (i, share) in shares.iter().enumerate() {
            let xi = FieldElement::from_u64(share.index as u64);
            let mut numerator = FieldElement::ONE;
            let mut denominator = FieldElement::ONE;

            for (j, other) in shares.iter().enumerate() {
                if i == j {
                    continue;
                }
                let xj = FieldElement::from_u64(other.index as u64);
                numerator = numerator * xj;
                denominator = denominator * (xj - xi);
            }

            let inv = denominator.inverse().ok_or(CryptoError::NotInvertible)?;
            secret = secret + share.value * numerator * inv;
        }

        Ok(secret.to_be_bytes())
    }
}

/// Interpret secret bytes as a field element (big-endian, at most 32 bytes,
/// value below the modulus).
fn secret_to_field(secret: &[u8]) -> Result<FieldElement, CryptoError> {
    if secret.is_empty() || secret.len() > 32 {
        return Err(CryptoError::InvalidSecret);
    }
    let mut padded = [0u8; 32];
    padded[32 - secret.len()..].copy_from_slice(secret);
    FieldElement::from_be_bytes(&padded).ok_or(CryptoError::InvalidSecret)
}

/// Left-pad arbitrary secret bytes to the canonical 32-byte encoding that
/// `reconstruct_secret` returns.
pub fn canonical_secret(secret: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let len = secret.len().min(32);
    padded[32 - len..].copy_from_slice(&secret[secret.len() - len..]);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_threshold_below_two() {
        assert!(matches!(
            ThresholdScheme::new(1, 5),
            Err(CryptoError::InvalidConfig(_))
        ));
        assert!(matches!(
            ThresholdScheme::new(0, 5),
            Err(CryptoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_threshold_above_total() {
        assert!(matches!(
            ThresholdScheme::new(6, 5),
            Err(CryptoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn three_of_five_round_trip_with_shares_0_2_4() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let secret: Vec<u8> = (0..32).map(|i| i as u8 ^ 0x5A).collect();
        let shares = scheme.generate_shares(&secret).unwrap();
        assert_eq!(shares.len(), 5);

        let subset = vec![shares[0].clone(), shares[2].clone(), shares[4].clone()];
        let recovered = scheme.reconstruct_secret(&subset).unwrap();
        assert_eq!(recovered, canonical_secret(&secret));
    }

    #[test]
    fn any_share_subset_reconstructs_identically() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let secret = b"tenure land parcel secret";
        let shares = scheme.generate_shares(secret).unwrap();

        let a = scheme.reconstruct_secret(&shares[0..3]).unwrap();
        let b = scheme.reconstruct_secret(&shares[2..5]).unwrap();
        let mut reversed = shares[0..3].to_vec();
        reversed.reverse();
        let c = scheme.reconstruct_secret(&reversed).unwrap();

        assert_eq!(a, canonical_secret(secret));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn too_few_shares_fail_loudly() {
        let scheme = ThresholdScheme::new(3, 5).unwrap();
        let shares = scheme.generate_shares(b"secret").unwrap();
        let err = scheme.reconstruct_secret(&shares[0..2]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InsufficientShares { have: 2, need: 3 }
        ));
    }

    #[test]
    fn duplicate_indices_not_invertible() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        let shares = scheme.generate_shares(b"secret").unwrap();
        let degenerate = vec![shares[0].clone(), shares[0].clone()];
        assert!(matches!(
            scheme.reconstruct_secret(&degenerate),
            Err(CryptoError::NotInvertible)
        ));
    }

    #[test]
    fn shares_are_fresh_across_runs() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        let first = scheme.generate_shares(b"same secret").unwrap();
        let second = scheme.generate_shares(b"same secret").unwrap();
        // Same secret, new random polynomial: share values must differ.
        assert_ne!(first[0].value, second[0].value);
    }

    #[test]
    fn empty_and_oversized_secrets_rejected() {
        let scheme = ThresholdScheme::new(2, 3).unwrap();
        assert!(matches!(
            scheme.generate_shares(b""),
            Err(CryptoError::InvalidSecret)
        ));
        assert!(matches!(
            scheme.generate_shares(&[0xFF; 33]),
            Err(CryptoError::InvalidSecret)
        ));
    }

    #[test]
    fn short_secret_round_trips_left_padded() {
        let scheme = ThresholdScheme::new(2, 4).unwrap();
        let shares = scheme.generate_shares(&[7, 7, 7]).unwrap();
        let recovered = scheme.reconstruct_secret(&shares[1..3]).unwrap();
        assert_eq!(recovered, canonical_secret(&[7, 7, 7]));
    }
}
