use crate::field::Field;
use crate::utils::{fft, VecOps};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Dense univariate polynomial, `coeffs[i]` multiplying `x^i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnivariatePolynomial<F> {
    coeffs: Vec<F>,
}

impl<F: Field> UnivariatePolynomial<F> {
    pub fn new(coeffs: Vec<F>) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[F] {
        &self.coeffs
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree ignoring trailing zero coefficients, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|c| !c.is_zero())
    }

    pub fn evaluate(&self, x: F) -> F {
        self.coeffs.horner(x)
    }

    /// `p(x) = e(x^2) + x o(x)` becomes `e(x) + r o(x)`.
    pub fn fold(&self, r: F) -> Self {
        let coeffs = self
            .coeffs
            .chunks(2)
            .map(|pair| pair[0] + r * pair.get(1).copied().unwrap_or(F::ZERO))
            .collect();
        Self { coeffs }
    }

    /// Evaluations over a cyclic `domain` whose size is a power of two no smaller than the length.
    pub fn evaluate_over(&self, domain: &[F]) -> Vec<F> {
        assert!(self.coeffs.len() <= domain.len());
        let mut values = self.coeffs.clone();
        values.resize(domain.len(), F::ZERO);
        fft(&mut values, domain);
        values
    }
}

/// Result of a possibly partial evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation<F> {
    Scalar(F),
    Polynomial(MultivariatePolynomial<F>),
}

/// Sparse polynomial keyed by exponent vectors, one exponent per variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultivariatePolynomial<F> {
    num_vars: usize,
    terms: BTreeMap<Vec<usize>, F>,
}

impl<F: Field> MultivariatePolynomial<F> {
    pub fn new(num_vars: usize, terms: impl IntoIterator<Item = (Vec<usize>, F)>) -> Self {
        let mut poly = Self::zero(num_vars);
        terms.into_iter().for_each(|(exp, coeff)| poly.add_term(exp, coeff));
        poly.prune();
        poly
    }

    pub fn zero(num_vars: usize) -> Self {
        Self {
            num_vars,
            terms: BTreeMap::new(),
        }
    }

    pub fn constant(num_vars: usize, c: F) -> Self {
        Self::new(num_vars, [(vec![0; num_vars], c)])
    }

    fn add_term(&mut self, exp: Vec<usize>, coeff: F) {
        assert_eq!(exp.len(), self.num_vars);
        *self.terms.entry(exp).or_insert(F::ZERO) += coeff;
    }

    fn prune(&mut self) {
        self.terms.retain(|_, c| !c.is_zero());
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Vec<usize>, &F)> {
        self.terms.iter()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Highest exponent of variable `i` across all terms.
    pub fn degree_in(&self, i: usize) -> usize {
        assert!(i < self.num_vars);
        self.terms.keys().map(|exp| exp[i]).max().unwrap_or(0)
    }

    pub fn max_degree(&self) -> usize {
        (0..self.num_vars).map(|i| self.degree_in(i)).max().unwrap_or(0)
    }

    /// Binds every `Some` coordinate of `vals`, keeping the `None` ones as variables.
    pub fn partial_eval(&self, vals: &[Option<F>]) -> Self {
        assert_eq!(vals.len(), self.num_vars);
        let num_vars = vals.iter().filter(|v| v.is_none()).count();
        let mut out = Self::zero(num_vars);
        self.terms.iter().for_each(|(exp, &coeff)| {
            let mut coeff = coeff;
            let mut rest = Vec::with_capacity(num_vars);
            exp.iter().zip_eq(vals.iter()).for_each(|(&e, v)| match v {
                Some(v) => coeff *= v.pow(e as u64),
                None => rest.push(e),
            });
            out.add_term(rest, coeff);
        });
        out.prune();
        out
    }

    pub fn eval(&self, vals: &[Option<F>]) -> Evaluation<F> {
        if vals.iter().all(Option::is_some) {
            let point = vals.iter().flatten().copied().collect_vec();
            Evaluation::Scalar(self.evaluate(&point))
        } else {
            Evaluation::Polynomial(self.partial_eval(vals))
        }
    }

    pub fn evaluate(&self, point: &[F]) -> F {
        assert_eq!(point.len(), self.num_vars);
        self.terms
            .iter()
            .map(|(exp, &coeff)| {
                exp.iter()
                    .zip(point.iter())
                    .fold(coeff, |acc, (&e, x)| acc * x.pow(e as u64))
            })
            .sum()
    }
}

impl<F: Field> std::ops::Add for &MultivariatePolynomial<F> {
    type Output = MultivariatePolynomial<F>;

    fn add(self, rhs: Self) -> MultivariatePolynomial<F> {
        assert_eq!(self.num_vars, rhs.num_vars);
        let mut out = self.clone();
        rhs.terms
            .iter()
            .for_each(|(exp, &coeff)| out.add_term(exp.clone(), coeff));
        out.prune();
        out
    }
}

impl<F: Field> std::ops::Mul for &MultivariatePolynomial<F> {
    type Output = MultivariatePolynomial<F>;

    fn mul(self, rhs: Self) -> MultivariatePolynomial<F> {
        assert_eq!(self.num_vars, rhs.num_vars);
        let mut out = MultivariatePolynomial::zero(self.num_vars);
        self.terms
            .iter()
            .cartesian_product(rhs.terms.iter())
            .for_each(|((e0, &c0), (e1, &c1))| {
                let exp = e0.iter().zip_eq(e1.iter()).map(|(a, b)| a + b).collect();
                out.add_term(exp, c0 * c1);
            });
        out.prune();
        out
    }
}
