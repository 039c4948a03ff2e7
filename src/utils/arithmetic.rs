use super::{log2_strict, reverse_index_bits};
use crate::field::Field;
use itertools::Itertools;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

pub trait BatchInverse<F> {
    fn inverse(self) -> F;
}

impl<'a, F, I> BatchInverse<F> for I
where
    F: Field,
    I: IntoIterator<Item = &'a mut F>,
{
    fn inverse(self) -> F {
        let mut acc = F::ONE;
        let inter = self
            .into_iter()
            .map(|p| {
                let prev = acc;
                if !p.is_zero() {
                    acc *= *p
                }
                (prev, p)
            })
            .collect_vec();
        acc = acc.inverse();
        let prod = acc;
        for (mut tmp, p) in inter.into_iter().rev() {
            tmp *= acc;
            if !p.is_zero() {
                acc *= *p;
                *p = tmp;
            }
        }
        prod
    }
}

impl<V: Field> VecOps<V> for Vec<V> {}
impl<V: Field> VecOps<V> for &[V] {}
impl<V: Field> VecOps<V> for &mut [V] {}

pub trait VecOps<F: Field>: core::ops::Deref<Target = [F]> {
    fn hadamard(&self, other: &[F]) -> Vec<F> {
        assert_eq!(self.len(), other.len());
        self.iter()
            .zip_eq(other.iter())
            .map(|(&a, &b)| a * b)
            .collect()
    }

    fn dot(&self, other: &[F]) -> F {
        assert_eq!(self.len(), other.len());
        self.iter().zip_eq(other.iter()).map(|(&a, &b)| a * b).sum()
    }

    fn par_dot(&self, other: &[F]) -> F {
        assert_eq!(self.len(), other.len());
        self.par_iter()
            .zip_eq(other.par_iter())
            .map(|(&a, &b)| a * b)
            .sum()
    }

    fn horner(&self, x: F) -> F {
        self.iter().rfold(F::ZERO, |acc, &coeff| acc * x + coeff)
    }
}

/// Radix-2 transform of `values` over `domain`, where `domain[i] = domain[1]^i`.
///
/// With coefficients as input this evaluates the polynomial at every domain point, output in domain
/// order. Passing the inverted domain runs the transform backwards up to the `n` scaling, see [`ifft`].
pub fn fft<F: Field>(values: &mut [F], domain: &[F]) {
    let n = values.len();
    assert_eq!(n, domain.len());
    let k = log2_strict(n);
    reverse_index_bits(values);

    for s in 1..=k {
        let size = 1 << s;
        let half = size >> 1;
        let stride = n >> s;
        values.par_chunks_mut(size).for_each(|chunk| {
            let (lo, hi) = chunk.split_at_mut(half);
            lo.iter_mut()
                .zip(hi.iter_mut())
                .enumerate()
                .for_each(|(j, (a, b))| {
                    let t = *b * domain[j * stride];
                    *b = *a - t;
                    *a += t;
                });
        });
    }
}

pub fn ifft<F: Field>(values: &mut [F], domain: &[F]) {
    let n = values.len();
    assert_eq!(n, domain.len());
    let inverted = std::iter::once(domain[0])
        .chain(domain[1..].iter().rev().copied())
        .collect_vec();
    fft(values, &inverted);
    let divisor = F::from_u64(n as u64).inverse();
    values.iter_mut().for_each(|v| *v *= divisor);
}
