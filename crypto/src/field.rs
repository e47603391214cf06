//! Fixed-width 256-bit modular arithmetic.
//!
//! `FieldElement` is a scalar in the prime field defined by the secp256k1
//! group order. Values are 4 x 64-bit limbs in little-endian order, always
//! kept below the modulus. Widths are fixed (no heap big integers) so
//! arithmetic cost is independent of value magnitude.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// The secp256k1 group order
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141,
/// little-endian limbs.
const MODULUS: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// 2^256 mod n = 2^256 - n. Used to fold the high half of a 512-bit
/// product back into the field.
const FOLD: [u64; 4] = [
    0x402D_A173_2FC9_BEBF,
    0x4551_2319_50B7_5FC4,
    0x0000_0000_0000_0001,
    0x0000_0000_0000_0000,
];

/// An element of the scalar field, invariant: value < MODULUS.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldElement {
    /// Limbs in little-endian order (limbs[0] least significant).
    limbs: [u64; 4],
}

impl FieldElement {
    pub const ZERO: Self = Self { limbs: [0; 4] };
    pub const ONE: Self = Self { limbs: [1, 0, 0, 0] };

    pub fn from_u64(val: u64) -> Self {
        Self {
            limbs: [val, 0, 0, 0],
        }
    }

    /// Parse a 32-byte big-endian value. Returns `None` if it is not below
    /// the modulus.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[offset..offset + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        let fe = Self { limbs };
        if cmp_limbs(&fe.limbs, &MODULUS) == Ordering::Less {
            Some(fe)
        } else {
            None
        }
    }

    /// Canonical 32-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in self.limbs.iter().enumerate() {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 4]
    }

    /// Draw a uniformly random element below the modulus (rejection sampling).
    pub fn random(rng: &mut (impl rand::RngCore + rand::CryptoRng)) -> Self {
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Some(fe) = Self::from_be_bytes(&bytes) {
                return fe;
            }
        }
    }

    /// Modular addition.
    pub fn add(&self, other: &Self) -> Self {
        let (sum, carry) = add_limbs(&self.limbs, &other.limbs);
        if carry || cmp_limbs(&sum, &MODULUS) != Ordering::Less {
            let (reduced, _) = sub_limbs(&sum, &MODULUS);
            Self { limbs: reduced }
        } else {
            Self { limbs: sum }
        }
    }

    /// Modular subtraction.
    pub fn sub(&self, other: &Self) -> Self {
        let (diff, borrow) = sub_limbs(&self.limbs, &other.limbs);
        if borrow {
            let (wrapped, _) = add_limbs(&diff, &MODULUS);
            Self { limbs: wrapped }
        } else {
            Self { limbs: diff }
        }
    }

    /// Modular negation.
    pub fn neg(&self) -> Self {
        if self.is_zero() {
            *self
        } else {
            let (limbs, _) = sub_limbs(&MODULUS, &self.limbs);
            Self { limbs }
        }
    }

    /// Modular multiplication: full 512-bit schoolbook product, then fold
    /// reduction using 2^256 ≡ FOLD (mod n).
    pub fn mul(&self, other: &Self) -> Self {
        reduce_wide(mul_wide(&self.limbs, &other.limbs))
    }

    /// Modular exponentiation, square-and-multiply over the exponent bits.
    pub fn pow(&self, exp: &Self) -> Self {
        let mut result = Self::ONE;
        let mut base = *self;
        for i in 0..4 {
            let mut limb = exp.limbs[i];
            for _ in 0..64 {
                if limb & 1 == 1 {
                    result = result.mul(base);
                }
                base = base.mul(base);
                limb >>= 1;
            }
        }
        result
    }

    /// Modular inverse via Fermat's little theorem: a^(n-2) mod n.
    /// Returns `None` for zero, which has no inverse.
    pub fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        // n - 2
        let exp = Self { limbs: MODULUS }.sub(Self::from_u64(2));
        Some(self.pow(&exp))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x{})", hex::encode(self.to_be_bytes()))
    }
}

impl Add for FieldElement {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        FieldElement::add(&self, &other)
    }
}

impl Sub for FieldElement {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        FieldElement::sub(&self, &other)
    }
}

impl Mul for FieldElement {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        FieldElement::mul(&self, &other)
    }
}

impl Neg for FieldElement {
    type Output = Self;
    fn neg(self) -> Self {
        FieldElement::neg(&self)
    }
}

fn cmp_limbs(a: &[u64; 4], b: &[u64; 4]) -> Ordering {
    for i in (0..4).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

fn add_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut carry = 0u128;
    for i in 0..4 {
        let sum = a[i] as u128 + b[i] as u128 + carry;
        out[i] = sum as u64;
        carry = sum >> 64;
    }
    (out, carry != 0)
}

fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (d1, b1) = a[i].overflowing_sub(b[i]);
        let (d2, b2) = d1.overflowing_sub(borrow);
        out[i] = d2;
        borrow = (b1 | b2) as u64;
    }
    (out, borrow != 0)
}

/// Schoolbook 256x256 -> 512-bit multiplication.
fn mul_wide(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut product = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..4 {
            let t = product[i + j] as u128 + a[i] as u128 * b[j] as u128 + carry;
            product[i + j] = t as u64;
            carry = t >> 64;
        }
        product[i + 4] = carry as u64;
    }
    product
}

/// Add a 512-bit value and a 256-bit value (zero-extended). The callers'
/// operand bounds guarantee no overflow out of 8 limbs.
fn add_wide(a: &[u64; 8], b: &[u64; 4]) -> [u64; 8] {
    let mut out = [0u64; 8];
    let mut carry = 0u128;
    for i in 0..8 {
        let rhs = if i < 4 { b[i] as u128 } else { 0 };
        let sum = a[i] as u128 + rhs + carry;
        out[i] = sum as u64;
        carry = sum >> 64;
    }
    debug_assert_eq!(carry, 0);
    out
}

/// Reduce a 512-bit product modulo n.
///
/// Each pass rewrites H*2^256 + L as H*FOLD + L, shrinking the value until
/// the high half is zero; a final conditional subtraction lands below n.
fn reduce_wide(mut wide: [u64; 8]) -> FieldElement {
    loop {
        let high = [wide[4], wide[5], wide[6], wide[7]];
        if high == [0; 4] {
            break;
        }
        let low = [wide[0], wide[1], wide[2], wide[3]];
        wide = add_wide(&mul_wide(&high, &FOLD), &low);
    }

    let mut limbs = [wide[0], wide[1], wide[2], wide[3]];
    while cmp_limbs(&limbs, &MODULUS) != Ordering::Less {
        let (reduced, _) = sub_limbs(&limbs, &MODULUS);
        limbs = reduced;
    }
    FieldElement { limbs }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    fn modulus_minus_one() -> FieldElement {
        FieldElement { limbs: MODULUS }.sub(FieldElement::ONE)
    }

    #[test]
    fn small_arithmetic() {
        assert_eq!(fe(2) + fe(3), fe(5));
        assert_eq!(fe(10) - fe(4), fe(6));
        assert_eq!(fe(7) * fe(6), fe(42));
    }

    #[test]
    fn addition_wraps_at_modulus() {
        // (n - 1) + 1 == 0
        assert_eq!(modulus_minus_one() + FieldElement::ONE, FieldElement::ZERO);
    }

    #[test]
    fn subtraction_wraps_below_zero() {
        // 0 - 1 == n - 1
        assert_eq!(FieldElement::ZERO - FieldElement::ONE, modulus_minus_one());
    }

    #[test]
    fn negation_of_minus_one() {
        assert_eq!(modulus_minus_one().neg(), FieldElement::ONE);
        assert_eq!(FieldElement::ZERO.neg(), FieldElement::ZERO);
    }

    #[test]
    fn minus_one_squared_is_one() {
        // Exercises the full 512-bit reduction path.
        let m1 = modulus_minus_one();
        assert_eq!(m1 * m1, FieldElement::ONE);
    }

    #[test]
    fn two_pow_256_equals_fold_constant() {
        let r = fe(2).pow(&fe(256));
        assert_eq!(r, FieldElement { limbs: FOLD });
    }

    #[test]
    fn inverse_round_trips() {
        for v in [1u64, 2, 3, 0xDEAD_BEEF, u64::MAX] {
            let a = fe(v);
            let inv = a.inverse().unwrap();
            assert_eq!(a * inv, FieldElement::ONE, "v = {v}");
        }
    }

    #[test]
    fn zero_has_no_inverse() {
        assert!(FieldElement::ZERO.inverse().is_none());
    }

    #[test]
    fn byte_round_trip() {
        let a = fe(0x0123_4567_89AB_CDEF);
        let b = FieldElement::from_be_bytes(&a.to_be_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn modulus_rejected_as_bytes() {
        let m = FieldElement { limbs: MODULUS };
        // to_be_bytes of a raw modulus-valued element is out of range.
        assert!(FieldElement::from_be_bytes(&m.to_be_bytes()).is_none());
    }

    #[test]
    fn random_elements_differ() {
        let mut rng = rand::rngs::OsRng;
        let a = FieldElement::random(&mut rng);
        let b = FieldElement::random(&mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn mul_commutes_and_associates() {
        let a = fe(0xAAAA_BBBB_CCCC_DDDD);
        let b = fe(0x1111_2222_3333_4444);
        let c = fe(0x9999_8888_7777_6666);
        assert_eq!(a * b, b * a);
        assert_eq!((a * b) * c, a * (b * c));
    }

    #[test]
    fn distributive_law() {
        let a = fe(123_456_789);
        let b = fe(987_654_321);
        let c = fe(555_555_555);
        assert_eq!(a * (b + c), a * b + a * c);
    }
}
