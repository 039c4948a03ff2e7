use super::{canonical_u128, read_u128, reduce_u128, Field, FromUniformBytes, TwoAdicField};
use p3_field::{PrimeCharacteristicRing, PrimeField64};

/// `2^64 - 2^32 + 1`, the field used wherever roots of unity are needed.
pub use p3_goldilocks::Goldilocks;

pub const GOLDILOCKS_MODULUS: u64 = <Goldilocks as PrimeField64>::ORDER_U64;

// p3's own traits are in scope here, so every call below names its trait.
impl Field for Goldilocks {
    const ZERO: Self = <Self as PrimeCharacteristicRing>::ZERO;
    const ONE: Self = <Self as PrimeCharacteristicRing>::ONE;
    const MODULUS: u64 = GOLDILOCKS_MODULUS;

    fn from_u64(v: u64) -> Self {
        <Self as PrimeCharacteristicRing>::from_u64(v)
    }

    fn as_u64(&self) -> u64 {
        <Self as PrimeField64>::as_canonical_u64(self)
    }

    fn square(&self) -> Self {
        <Self as PrimeCharacteristicRing>::square(self)
    }

    fn inverse(&self) -> Self {
        <Self as p3_field::Field>::try_inverse(self).unwrap_or(<Self as Field>::ZERO)
    }
}

impl FromUniformBytes for Goldilocks {
    const NUM_BYTES: usize = 16;

    fn from_bytes(bytes: &[u8]) -> Self {
        <Self as Field>::from_u64(reduce_u128(read_u128(bytes), GOLDILOCKS_MODULUS))
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Option<Self> {
        canonical_u128(bytes, GOLDILOCKS_MODULUS).map(<Self as Field>::from_u64)
    }

    fn to_bytes(&self) -> Vec<u8> {
        (<Self as Field>::as_u64(self) as u128).to_le_bytes().to_vec()
    }
}

impl TwoAdicField for Goldilocks {
    const TWO_ADICITY: usize = <Self as p3_field::TwoAdicField>::TWO_ADICITY;

    fn two_adic_generator(bits: usize) -> Self {
        assert!(bits <= <Self as TwoAdicField>::TWO_ADICITY);
        <Self as p3_field::TwoAdicField>::two_adic_generator(bits)
    }
}

#[cfg(test)]
mod test {
    use super::{Goldilocks, GOLDILOCKS_MODULUS};
    use crate::field::{Field, TwoAdicField};

    type F = Goldilocks;

    #[test]
    fn test_goldilocks_arithmetic() {
        let mut rng = crate::test::seed_rng();
        let p = GOLDILOCKS_MODULUS as u128;
        for _ in 0..1000 {
            let a = F::random(&mut rng);
            let b = F::random(&mut rng);
            let (x, y) = (a.as_u64() as u128, b.as_u64() as u128);
            assert_eq!((a * b).as_u64() as u128, x * y % p);
            assert_eq!((a + b).as_u64() as u128, (x + y) % p);
            assert_eq!((a - b).as_u64() as u128, (x + p - y) % p);
        }
        assert_eq!(F::from_u64(GOLDILOCKS_MODULUS).as_u64(), 0);
        assert_eq!((-F::ONE).as_u64(), GOLDILOCKS_MODULUS - 1);
        assert_eq!(F::MODULUS, 0xffff_ffff_0000_0001);
    }

    #[test]
    fn test_roots_of_unity() {
        let g = F::two_adic_generator(32);
        assert_eq!(g.pow(1 << 31), -F::ONE);
        for bits in 1..=32 {
            assert_eq!(F::two_adic_generator(bits).square(), F::two_adic_generator(bits - 1));
        }

        for k in 0..8 {
            let n = 1 << k;
            let roots = F::roots_of_unity(n);
            assert_eq!(roots.len(), n);
            assert_eq!(roots[0], F::ONE);
            if n > 1 {
                assert_eq!(roots[n / 2], -F::ONE);
                assert_eq!(roots[1].pow(n as u64), F::ONE);
                assert_ne!(roots[1].pow(n as u64 / 2), F::ONE);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_roots_of_unity_not_power_of_two() {
        F::roots_of_unity(6);
    }

    #[test]
    #[should_panic]
    fn test_two_adicity_exceeded() {
        F::two_adic_generator(33);
    }
}
