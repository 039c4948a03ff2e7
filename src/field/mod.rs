use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub mod goldilocks;
pub use goldilocks::{Goldilocks, GOLDILOCKS_MODULUS};

pub const MERSENNE61_MODULUS: u64 = (1 << 61) - 1;

/// Default field of the sumcheck and GKR protocols.
pub type Mersenne61 = Fp<MERSENNE61_MODULUS>;

pub trait FromUniformBytes: Sized {
    const NUM_BYTES: usize;
    /// Reduces the leading `NUM_BYTES` bytes into the field.
    fn from_bytes(bytes: &[u8]) -> Self;
    /// Inverse of `to_bytes`. Encodings at or above the modulus are rejected.
    fn from_canonical_bytes(bytes: &[u8]) -> Option<Self>;
    fn to_bytes(&self) -> Vec<u8>;
}

// 16 bytes little endian, shared by every field in the crate
fn read_u128(bytes: &[u8]) -> u128 {
    assert!(bytes.len() >= 16);
    bincode::deserialize(&bytes[..16]).unwrap_or_default()
}

fn reduce_u128(wide: u128, modulus: u64) -> u64 {
    (wide % modulus as u128) as u64
}

fn canonical_u128(bytes: &[u8], modulus: u64) -> Option<u64> {
    let wide = read_u128(bytes);
    (wide < modulus as u128).then_some(wide as u64)
}

/// Capability set the protocols are written against.
pub trait Field:
    Copy
    + Clone
    + Debug
    + Display
    + Default
    + Eq
    + Hash
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + Sum
    + Product
    + FromUniformBytes
{
    const ZERO: Self;
    const ONE: Self;
    const MODULUS: u64;

    fn from_u64(v: u64) -> Self;
    fn as_u64(&self) -> u64;

    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    fn double(&self) -> Self {
        *self + *self
    }

    fn square(&self) -> Self {
        *self * *self
    }

    /// Square-and-multiply with the exponent reduced modulo `p - 1`.
    fn pow(&self, e: u64) -> Self {
        let mut e = e % (Self::MODULUS - 1);
        let mut base = *self;
        let mut acc = Self::ONE;
        while e > 0 {
            if e & 1 == 1 {
                acc *= base;
            }
            base = base.square();
            e >>= 1;
        }
        acc
    }

    /// Fermat inverse. Zero maps to zero.
    fn inverse(&self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        self.pow(Self::MODULUS - 2)
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_u64(rng.random_range(0..Self::MODULUS))
    }
}

/// Fields carrying a multiplicative subgroup of order `2^TWO_ADICITY`.
pub trait TwoAdicField: Field {
    const TWO_ADICITY: usize;

    /// Generator of the subgroup of order `2^bits`.
    fn two_adic_generator(bits: usize) -> Self;

    /// The order-`n` subgroup as `[1, w, w^2, ..., w^(n-1)]`.
    fn roots_of_unity(n: usize) -> Vec<Self> {
        assert!(n.is_power_of_two());
        let omega = Self::two_adic_generator(crate::utils::log2_strict(n));
        std::iter::successors(Some(Self::ONE), |&x| Some(x * omega))
            .take(n)
            .collect()
    }
}

/// Prime field with the modulus fixed by the type.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Fp<const P: u64>(u64);

impl<const P: u64> Fp<P> {
    pub const fn new(v: u64) -> Self {
        Self(v % P)
    }
}

impl<const P: u64> Field for Fp<P> {
    const ZERO: Self = Self(0);
    const ONE: Self = Self(1);
    const MODULUS: u64 = P;

    fn from_u64(v: u64) -> Self {
        Self::new(v)
    }

    fn as_u64(&self) -> u64 {
        self.0
    }
}

impl<const P: u64> FromUniformBytes for Fp<P> {
    const NUM_BYTES: usize = 16;

    // the bias is below 2^-64 for both moduli in use
    fn from_bytes(bytes: &[u8]) -> Self {
        Self(reduce_u128(read_u128(bytes), P))
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Option<Self> {
        canonical_u128(bytes, P).map(Self)
    }

    fn to_bytes(&self) -> Vec<u8> {
        (self.0 as u128).to_le_bytes().to_vec()
    }
}

impl<const P: u64> From<u64> for Fp<P> {
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl<const P: u64> From<Fp<P>> for u64 {
    fn from(v: Fp<P>) -> Self {
        v.0
    }
}

impl<const P: u64> Debug for Fp<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fp({}, {})", self.0, P)
    }
}

impl<const P: u64> Display for Fp<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const P: u64> Add for Fp<P> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (sum, over) = self.0.overflowing_add(rhs.0);
        if over || sum >= P {
            Self(sum.wrapping_sub(P))
        } else {
            Self(sum)
        }
    }
}

impl<const P: u64> Sub for Fp<P> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self(P - (rhs.0 - self.0))
        }
    }
}

impl<const P: u64> Mul for Fp<P> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(reduce_u128(self.0 as u128 * rhs.0 as u128, P))
    }
}

impl<const P: u64> Neg for Fp<P> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u64> AddAssign for Fp<P> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const P: u64> SubAssign for Fp<P> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const P: u64> MulAssign for Fp<P> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const P: u64> Sum for Fp<P> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl<const P: u64> Product for Fp<P> {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc * x)
    }
}

impl<const P: u64> Distribution<Fp<P>> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fp<P> {
        Fp::random(rng)
    }
}

#[cfg(test)]
mod test {
    use super::{
        Field, FromUniformBytes, Goldilocks, Mersenne61, GOLDILOCKS_MODULUS, MERSENNE61_MODULUS,
    };
    use rand::Rng;

    fn field_laws<F: Field>(mut rng: impl Rng) {
        for _ in 0..200 {
            let a = F::random(&mut rng);
            let b = F::random(&mut rng);
            assert_eq!(a + b - b, a);
            assert_eq!(a - a, F::ZERO);
            assert_eq!(a + (-a), F::ZERO);
            assert_eq!(a * (b + F::ONE), a * b + a);
            if !a.is_zero() {
                assert_eq!(a * a.inverse(), F::ONE);
                assert_eq!(a.pow(F::MODULUS - 1), F::ONE);
            }
        }
        assert_eq!(F::ZERO.inverse(), F::ZERO);
        assert_eq!((-F::ONE) * (-F::ONE), F::ONE);
    }

    #[test]
    fn test_field_laws() {
        let mut rng = crate::test::seed_rng();
        field_laws::<Mersenne61>(&mut rng);
        field_laws::<Goldilocks>(&mut rng);
    }

    #[test]
    fn test_pow_reduces_exponent() {
        let a = Mersenne61::from_u64(3);
        assert_eq!(a.pow(MERSENNE61_MODULUS - 1 + 5), a.pow(5));
        assert_eq!(a.pow(5), Mersenne61::from_u64(243));
        assert_eq!(Mersenne61::from_u64(MERSENNE61_MODULUS + 7), Mersenne61::from_u64(7));
    }

    #[test]
    fn test_bytes() {
        let a = Mersenne61::from_u64(0x0102);
        let bytes = a.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..3], &[0x02, 0x01, 0x00]);
        assert_eq!(Mersenne61::from_bytes(&bytes), a);

        let wide = u128::MAX.to_le_bytes();
        let expect = (u128::MAX % MERSENNE61_MODULUS as u128) as u64;
        assert_eq!(Mersenne61::from_bytes(&wide).as_u64(), expect);
    }

    #[test]
    fn test_canonical_bytes() {
        let a = Mersenne61::from_u64(MERSENNE61_MODULUS - 1);
        assert_eq!(Mersenne61::from_canonical_bytes(&a.to_bytes()), Some(a));
        let p = (MERSENNE61_MODULUS as u128).to_le_bytes();
        assert_eq!(Mersenne61::from_canonical_bytes(&p), None);
        assert_eq!(Mersenne61::from_bytes(&p), Mersenne61::ZERO);

        let a = Goldilocks::from_u64(GOLDILOCKS_MODULUS - 1);
        assert_eq!(a.to_bytes().len(), 16);
        assert_eq!(Goldilocks::from_canonical_bytes(&a.to_bytes()), Some(a));
        let p = (GOLDILOCKS_MODULUS as u128).to_le_bytes();
        assert_eq!(Goldilocks::from_canonical_bytes(&p), None);
        assert_eq!(Goldilocks::from_canonical_bytes(&u128::MAX.to_le_bytes()), None);
    }

    #[test]
    fn test_serde() {
        let a = Mersenne61::from_u64(123456789);
        let bytes = bincode::serialize(&a).unwrap();
        assert_eq!(bytes, 123456789u64.to_le_bytes());
        let b: Mersenne61 = bincode::deserialize(&bytes).unwrap();
        assert_eq!(a, b);
    }
}
