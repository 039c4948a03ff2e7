use crate::field::Field;
use crate::utils::log2_strict;
use rand::distr::{Distribution, StandardUniform};
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSlice;

#[allow(clippy::len_without_is_empty)]
pub trait Storage {
    fn len(&self) -> usize;
}

impl<V> Storage for &[V] {
    fn len(&self) -> usize {
        <[V]>::len(self)
    }
}

impl<V> Storage for Vec<V> {
    fn len(&self) -> usize {
        self.len()
    }
}

/// Row-major matrix over any slice-like storage.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Matrix<S> {
    pub storage: S,
    width: usize,
}

pub type MatrixRef<'a, V> = Matrix<&'a [V]>;
pub type MatrixOwn<V> = Matrix<Vec<V>>;

impl<V> Matrix<Vec<V>> {
    pub fn zero(width: usize, height: usize) -> Self
    where
        V: Default + Copy,
    {
        Self::new(width, vec![V::default(); width * height])
    }

    pub fn rand(rng: impl rand::Rng, width: usize, height: usize) -> Self
    where
        StandardUniform: Distribution<V>,
    {
        let values = crate::utils::n_rand(rng, width * height);
        Self::new(width, values)
    }

    pub fn as_ref(&self) -> Matrix<&[V]> {
        Matrix {
            storage: self.storage.as_ref(),
            width: self.width,
        }
    }
}

impl<S: Storage> Matrix<S> {
    pub fn new(width: usize, storage: S) -> Self {
        assert!(width > 0);
        assert_eq!(storage.len() % width, 0);
        Self { storage, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.storage.len() / self.width
    }

    /// Number of row variables, the height must be a power of two.
    pub fn k(&self) -> usize {
        log2_strict(self.height())
    }

    /// Number of column variables, the width must be a power of two.
    pub fn k_width(&self) -> usize {
        log2_strict(self.width)
    }

    pub fn row<V>(&self, i: usize) -> &[V]
    where
        S: AsRef<[V]>,
    {
        let start = i * self.width;
        let end = start + self.width;
        &self.storage.as_ref()[start..end]
    }

    pub fn iter<'a, V: 'a>(&'a self) -> impl DoubleEndedIterator<Item = &'a [V]>
    where
        S: AsRef<[V]>,
    {
        self.storage.as_ref().chunks_exact(self.width)
    }

    pub fn par_iter<'a, V>(&'a self) -> impl IndexedParallelIterator<Item = &'a [V]>
    where
        S: AsRef<[V]>,
        V: Send + Sync + 'a,
    {
        self.storage.as_ref().par_chunks_exact(self.width)
    }

    /// Values flattened row by row, the order the multilinear extension of the matrix is taken in.
    pub fn values<V>(&self) -> &[V]
    where
        S: AsRef<[V]>,
    {
        self.storage.as_ref()
    }

    pub fn transpose<V>(&self) -> Matrix<Vec<V>>
    where
        S: AsRef<[V]>,
        V: Copy + Default,
    {
        let height = self.height();
        let mut out = vec![V::default(); self.storage.len()];
        transpose::transpose(self.storage.as_ref(), &mut out, self.width, height);
        Matrix::new(height, out)
    }

    pub fn mul<V, T>(&self, other: &Matrix<T>) -> Matrix<Vec<V>>
    where
        S: AsRef<[V]>,
        T: Storage + AsRef<[V]>,
        V: Field,
    {
        assert_eq!(self.width, other.height());
        let other_t = other.transpose();
        let out = self
            .par_iter()
            .flat_map_iter(|row| {
                other_t
                    .iter()
                    .map(move |col| row.iter().zip(col.iter()).map(|(&a, &b)| a * b).sum())
                    .collect::<Vec<V>>()
            })
            .collect::<Vec<_>>();
        Matrix::new(other.width(), out)
    }
}

#[cfg(test)]
mod test {
    use super::MatrixOwn;
    use crate::field::{Field, Mersenne61};

    #[test]
    fn test_transpose_mul() {
        type F = Mersenne61;
        let f = F::from_u64;
        let a = MatrixOwn::new(3, [1, 2, 3, 4, 5, 6].map(f).to_vec());
        let b = MatrixOwn::new(2, [1, 0, 0, 1, 1, 1].map(f).to_vec());

        let at = a.transpose();
        assert_eq!(at.width(), 2);
        assert_eq!(at.row(0), &[f(1), f(4)]);
        assert_eq!(at.row(2), &[f(3), f(6)]);

        let c = a.mul(&b);
        assert_eq!(c.width(), 2);
        assert_eq!(c.height(), 2);
        assert_eq!(c.values(), &[4, 5, 10, 11].map(f));

        let mut rng = crate::test::seed_rng();
        let m = MatrixOwn::<F>::rand(&mut rng, 4, 8);
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.k(), 3);
        assert_eq!(m.k_width(), 2);
    }
}
