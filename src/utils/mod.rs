use crate::field::Field;
use itertools::Itertools;
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

pub mod arithmetic;
pub use arithmetic::*;

pub fn n_rand<F>(mut rng: impl Rng, n: usize) -> Vec<F>
where
    StandardUniform: Distribution<F>,
{
    std::iter::repeat_with(|| rng.random()).take(n).collect_vec()
}

#[inline(always)]
pub fn log2_strict(n: usize) -> usize {
    let res = n.trailing_zeros();
    assert_eq!(n.wrapping_shr(res), 1, "{n} is not a power of two");
    res as usize
}

pub(crate) trait TwoAdicSlice<T>: core::ops::Deref<Target = [T]> {
    #[inline(always)]
    fn k(&self) -> usize {
        log2_strict(self.len())
    }
}

impl<V> TwoAdicSlice<V> for Vec<V> {}
impl<V> TwoAdicSlice<V> for &[V] {}
impl<V> TwoAdicSlice<V> for &mut [V] {}

/// Points of `{0,1}^k` in index order, most significant coordinate first.
pub fn hypercube<F: Field>(k: usize) -> impl Iterator<Item = Vec<F>> {
    (0..1usize << k).map(move |i| {
        (0..k)
            .rev()
            .map(|bit| F::from_u64(((i >> bit) & 1) as u64))
            .collect()
    })
}

#[inline(always)]
pub fn reverse_bits(x: usize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    x.reverse_bits() >> (usize::BITS as usize - log2_strict(n))
}

pub fn reverse_index_bits<V>(values: &mut [V]) {
    let n = values.len();
    for i in 0..n {
        let j = reverse_bits(i, n);
        if i < j {
            values.swap(i, j);
        }
    }
}
