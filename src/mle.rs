use crate::{
    field::Field,
    poly::MultivariatePolynomial,
    utils::{hypercube, TwoAdicSlice, VecOps},
};
use itertools::Itertools;
use rayon::iter::{
    IndexedParallelIterator, IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelIterator,
};

/// Equality basis `eq(x, zs)` over `{0,1}^k`, `zs[0]` being the most significant coordinate.
pub fn eq<F: Field>(zs: &[F]) -> Vec<F> {
    eq_scaled(zs, F::ONE)
}

pub fn eq_scaled<F: Field>(zs: &[F], scale: F) -> Vec<F> {
    let k = zs.len();
    let mut eq = vec![F::ZERO; 1 << k];
    eq[0] = scale;
    for (i, &zi) in zs.iter().rev().enumerate() {
        let (lo, hi) = eq.split_at_mut(1 << i);
        lo.par_iter_mut()
            .zip(hi[..1 << i].par_iter_mut())
            .for_each(|(lo, hi)| {
                *hi = *lo * zi;
                *lo -= *hi;
            });
    }
    eq
}

/// Multilinear extension of `evals` at `point` through the equality basis.
pub fn eval_mle<F: Field>(evals: &[F], point: &[F]) -> F {
    assert_eq!(evals.k(), point.len());
    eq(point).par_dot(evals)
}

/// Same value as [`eval_mle`], computed by binding one variable at a time.
pub fn eval_poly<F: Field>(poly: &[F], zs: &[F]) -> F {
    assert_eq!(poly.k(), zs.len());
    let mut ml = poly.to_vec();
    zs.iter().for_each(|&zi| fix_var(&mut ml, zi));
    ml[0]
}

/// Binds the first (most significant) variable to `zi`.
pub fn fix_var<F: Field>(poly: &mut Vec<F>, zi: F) {
    let mid = poly.len() / 2;
    let (p0, p1) = poly.split_at_mut(mid);
    p0.par_iter_mut()
        .zip(p1.par_iter())
        .for_each(|(a0, a1)| *a0 += zi * (*a1 - *a0));
    poly.truncate(mid);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilinearExtension<F> {
    evals: Vec<F>,
}

impl<F: Field> MultilinearExtension<F> {
    pub fn new(evals: Vec<F>) -> Self {
        assert!(evals.len().is_power_of_two());
        Self { evals }
    }

    pub fn zeros(k: usize) -> Self {
        Self::new(vec![F::ZERO; 1 << k])
    }

    pub fn from_polynomial(poly: &MultivariatePolynomial<F>) -> Self {
        let evals = hypercube(poly.num_vars())
            .map(|point| poly.evaluate(&point))
            .collect();
        Self::new(evals)
    }

    /// 0/1 table over `{0,1}^k` with ones exactly at `indices`.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>, k: usize) -> Self {
        let mut evals = vec![F::ZERO; 1 << k];
        indices.into_iter().for_each(|i| {
            assert!(i < evals.len());
            evals[i] = F::ONE;
        });
        Self::new(evals)
    }

    /// Like [`Self::from_indices`] with every index spelled as binary digits, most significant first.
    pub fn from_wiring_predicate<W: AsRef<[u8]>>(wires: &[W], length: usize) -> Self {
        let indices = wires
            .iter()
            .map(|w| {
                let digits = w.as_ref();
                assert_eq!(digits.len(), length);
                digits.iter().fold(0usize, |acc, &d| {
                    assert!(d <= 1);
                    (acc << 1) | d as usize
                })
            })
            .collect_vec();
        Self::from_indices(indices, length)
    }

    pub fn num_vars(&self) -> usize {
        self.evals.k()
    }

    pub fn evals(&self) -> &[F] {
        &self.evals
    }

    pub fn into_evals(self) -> Vec<F> {
        self.evals
    }

    pub fn eval(&self, point: &[F]) -> F {
        eval_mle(&self.evals, point)
    }

    pub fn fix_first(&mut self, r: F) {
        assert!(self.num_vars() > 0);
        fix_var(&mut self.evals, r);
    }

    /// Binds the leading `point.len()` variables.
    pub fn fix_prefix(&self, point: &[F]) -> Self {
        assert!(point.len() <= self.num_vars());
        let mut evals = self.evals.clone();
        point.iter().for_each(|&r| fix_var(&mut evals, r));
        Self { evals }
    }

    pub fn hypercube_sum(&self) -> F {
        self.evals.par_iter().copied().sum()
    }
}

impl<F: Field> std::ops::Add for &MultilinearExtension<F> {
    type Output = MultilinearExtension<F>;

    fn add(self, rhs: Self) -> MultilinearExtension<F> {
        assert_eq!(self.evals.len(), rhs.evals.len());
        let evals = self
            .evals
            .iter()
            .zip_eq(rhs.evals.iter())
            .map(|(&a, &b)| a + b)
            .collect();
        MultilinearExtension { evals }
    }
}

impl<F: Field> std::ops::Mul for &MultilinearExtension<F> {
    type Output = MultilinearExtension<F>;

    fn mul(self, rhs: Self) -> MultilinearExtension<F> {
        assert_eq!(self.evals.len(), rhs.evals.len());
        MultilinearExtension {
            evals: self.evals.hadamard(&rhs.evals),
        }
    }
}

#[cfg(test)]
mod test {
    use super::MultilinearExtension;
    use crate::field::{Field, Goldilocks, Mersenne61};
    use crate::poly::MultivariatePolynomial;
    use crate::utils::{hypercube, n_rand, VecOps};
    use rand::Rng;

    #[test]
    fn test_eq() {
        type F = Goldilocks;
        let k = 4;
        let mut rng = crate::test::seed_rng();

        let zs: Vec<F> = n_rand(&mut rng, k);
        let poly: Vec<F> = n_rand(&mut rng, 1 << k);

        let e0 = super::eq(&zs).dot(&poly);

        let beta = rng.random();
        let e1 = super::eq_scaled(&zs, beta).dot(&poly);
        assert_eq!(e0 * beta, e1);

        // eq at a corner is the indicator of that corner
        for (i, point) in hypercube::<F>(k).enumerate() {
            let basis = super::eq(&point);
            assert_eq!(basis[i], F::ONE);
            assert_eq!(basis.iter().copied().sum::<F>(), F::ONE);
        }
    }

    #[test]
    fn test_eval() {
        type F = Mersenne61;
        let mut rng = crate::test::seed_rng();

        for k in 0..10 {
            let zs: Vec<F> = n_rand(&mut rng, k);
            let poly: Vec<F> = n_rand(&mut rng, 1 << k);
            let e0 = super::eval_mle(&poly, &zs);
            let e1 = super::eval_poly(&poly, &zs);
            assert_eq!(e0, e1);

            for (i, point) in hypercube::<F>(k).enumerate() {
                assert_eq!(super::eval_mle(&poly, &point), poly[i]);
            }
        }
    }

    #[test]
    fn test_eval_formula() {
        // f(x0, x1) = (1-x0)(1-x1) a + (1-x0) x1 b + x0 (1-x1) c + x0 x1 d
        type F = Mersenne61;
        let mut rng = crate::test::seed_rng();
        let evals: Vec<F> = n_rand(&mut rng, 4);
        let (a, b, c, d) = (evals[0], evals[1], evals[2], evals[3]);
        for _ in 0..2 {
            let x0 = F::random(&mut rng);
            let x1 = F::random(&mut rng);
            let (y0, y1) = (F::ONE - x0, F::ONE - x1);
            let expect = y0 * y1 * a + y0 * x1 * b + x0 * y1 * c + x0 * x1 * d;
            assert_eq!(super::eval_mle(&evals, &[x0, x1]), expect);
        }
    }

    #[test]
    fn test_mle_ops() {
        type F = Mersenne61;
        let mut rng = crate::test::seed_rng();
        let k = 3;
        let p = MultilinearExtension::new(n_rand::<F>(&mut rng, 1 << k));
        let q = MultilinearExtension::new(n_rand::<F>(&mut rng, 1 << k));
        let point: Vec<F> = n_rand(&mut rng, k);

        assert_eq!((&p + &q).eval(&point), p.eval(&point) + q.eval(&point));
        let pq = &p * &q;
        for (i, x) in hypercube::<F>(k).enumerate() {
            assert_eq!(pq.eval(&x), p.evals()[i] * q.evals()[i]);
        }

        let mut bound = p.clone();
        bound.fix_first(point[0]);
        assert_eq!(bound.num_vars(), k - 1);
        assert_eq!(bound.eval(&point[1..]), p.eval(&point));
        assert_eq!(p.fix_prefix(&point[..2]).eval(&point[2..]), p.eval(&point));

        let sum = hypercube::<F>(k).map(|x| p.eval(&x)).sum::<F>();
        assert_eq!(p.hypercube_sum(), sum);
        assert_eq!(MultilinearExtension::<F>::zeros(2).hypercube_sum(), F::ZERO);
    }

    #[test]
    fn test_wiring_predicate() {
        type F = Mersenne61;
        let wires = [[0u8, 1, 1], [1, 0, 0]];
        let mle = MultilinearExtension::<F>::from_wiring_predicate(&wires, 3);
        assert_eq!(mle.evals()[3], F::ONE);
        assert_eq!(mle.evals()[4], F::ONE);
        assert_eq!(mle.hypercube_sum(), F::from_u64(2));
        assert_eq!(mle, MultilinearExtension::from_indices([3, 4], 3));
    }

    #[test]
    fn test_from_polynomial() {
        // 2 x0^3 + x0 x2 + x1 x2
        type F = Mersenne61;
        let poly = MultivariatePolynomial::<F>::new(
            3,
            [
                (vec![3, 0, 0], F::from_u64(2)),
                (vec![1, 0, 1], F::ONE),
                (vec![0, 1, 1], F::ONE),
            ],
        );
        let mle = MultilinearExtension::from_polynomial(&poly);
        assert_eq!(mle.num_vars(), 3);
        assert_eq!(mle.hypercube_sum(), F::from_u64(12));
        for (i, x) in hypercube::<F>(3).enumerate() {
            assert_eq!(mle.evals()[i], poly.evaluate(&x));
        }
    }
}
