use crate::{field::Field, mle::fix_var, mle::MultilinearExtension, poly::MultivariatePolynomial};
use itertools::Itertools;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Prover side of one sumcheck instance over the variables that are still free.
pub trait SumcheckProver<F: Field> {
    /// Variables not bound yet.
    fn num_vars(&self) -> usize;
    /// Degree bound of every round polynomial.
    fn degree(&self) -> usize;
    /// `g_i(0), g_i(1), ..., g_i(degree)` for the current round.
    fn round_evals(&self) -> Vec<F>;
    /// Binds the current first variable to the verifier challenge.
    fn bind(&mut self, r: F);
}

/// Pointwise combination of multilinear factor tables.
pub trait Composition<F>: Send + Sync {
    /// Total degree as a function of the factors.
    fn degree(&self) -> usize;
    fn evaluate(&self, values: &[F]) -> F;
}

/// Single multilinear table. The reported degree may be raised above one.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub degree: usize,
}

impl Default for Identity {
    fn default() -> Self {
        Self { degree: 1 }
    }
}

impl<F: Field> Composition<F> for Identity {
    fn degree(&self) -> usize {
        self.degree
    }

    fn evaluate(&self, values: &[F]) -> F {
        values[0]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub arity: usize,
}

impl<F: Field> Composition<F> for Product {
    fn degree(&self) -> usize {
        self.arity
    }

    fn evaluate(&self, values: &[F]) -> F {
        debug_assert_eq!(values.len(), self.arity);
        values.iter().copied().product()
    }
}

/// Sumcheck over `sum_x c(t_0(x), ..., t_m(x))` for equal length tables `t_j`.
#[derive(Debug, Clone)]
pub struct CompositionProver<F, C> {
    tables: Vec<Vec<F>>,
    composition: C,
}

impl<F: Field, C: Composition<F>> CompositionProver<F, C> {
    pub fn new(tables: Vec<Vec<F>>, composition: C) -> Self {
        assert!(!tables.is_empty());
        let len = tables[0].len();
        assert!(len.is_power_of_two());
        assert!(tables.iter().all(|t| t.len() == len));
        Self {
            tables,
            composition,
        }
    }

    pub fn from_mles(mles: Vec<MultilinearExtension<F>>, composition: C) -> Self {
        Self::new(
            mles.into_iter()
                .map(MultilinearExtension::into_evals)
                .collect(),
            composition,
        )
    }

    pub fn tables(&self) -> &[Vec<F>] {
        &self.tables
    }

    /// Sum of the composition over the remaining hypercube.
    pub fn sum(&self) -> F {
        (0..self.tables[0].len())
            .into_par_iter()
            .map(|i| {
                let values = self.tables.iter().map(|t| t[i]).collect_vec();
                self.composition.evaluate(&values)
            })
            .sum()
    }

    /// Composition of the fully bound tables, the value the verifier's claim must reduce to.
    pub fn final_value(&self) -> F {
        assert_eq!(self.tables[0].len(), 1);
        let values = self.tables.iter().map(|t| t[0]).collect_vec();
        self.composition.evaluate(&values)
    }
}

impl<F: Field, C: Composition<F>> SumcheckProver<F> for CompositionProver<F, C> {
    fn num_vars(&self) -> usize {
        crate::utils::log2_strict(self.tables[0].len())
    }

    fn degree(&self) -> usize {
        self.composition.degree()
    }

    fn round_evals(&self) -> Vec<F> {
        let d = self.degree();
        let half = self.tables[0].len() / 2;
        (0..half)
            .into_par_iter()
            .map(|j| {
                let mut values = self.tables.iter().map(|t| t[j]).collect_vec();
                let diffs = self.tables.iter().map(|t| t[j + half] - t[j]).collect_vec();
                let mut evals = Vec::with_capacity(d + 1);
                evals.push(self.composition.evaluate(&values));
                for _ in 0..d {
                    values
                        .iter_mut()
                        .zip(diffs.iter())
                        .for_each(|(v, &diff)| *v += diff);
                    evals.push(self.composition.evaluate(&values));
                }
                evals
            })
            .reduce(
                || vec![F::ZERO; d + 1],
                |a, b| a.iter().zip(b.iter()).map(|(&a, &b)| a + b).collect(),
            )
    }

    fn bind(&mut self, r: F) {
        self.tables.iter_mut().for_each(|t| fix_var(t, r));
    }
}

/// Sumcheck straight over a sparse polynomial of any per-variable degree.
#[derive(Debug, Clone)]
pub struct PolynomialProver<F> {
    poly: MultivariatePolynomial<F>,
    degree: usize,
}

impl<F: Field> PolynomialProver<F> {
    pub fn new(poly: MultivariatePolynomial<F>) -> Self {
        let degree = poly.max_degree();
        Self { poly, degree }
    }

    pub fn sum(&self) -> F {
        MultilinearExtension::from_polynomial(&self.poly).hypercube_sum()
    }

    fn bind_first(&self, x: F) -> MultivariatePolynomial<F> {
        let mut vals = vec![None; self.poly.num_vars()];
        vals[0] = Some(x);
        self.poly.partial_eval(&vals)
    }
}

impl<F: Field> SumcheckProver<F> for PolynomialProver<F> {
    fn num_vars(&self) -> usize {
        self.poly.num_vars()
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn round_evals(&self) -> Vec<F> {
        (0..=self.degree as u64)
            .map(|t| {
                let rest = self.bind_first(F::from_u64(t));
                MultilinearExtension::from_polynomial(&rest).hypercube_sum()
            })
            .collect()
    }

    fn bind(&mut self, r: F) {
        self.poly = self.bind_first(r);
    }
}
