use crate::field::Field;
use std::collections::HashMap;

/// Evaluates at `r` the polynomial of degree `< evals.len()` passing through `(i, evals[i])`.
pub fn eval_ule<F: Field>(evals: &[F], r: F) -> F {
    let n = evals.len();
    if n == 0 {
        return F::ZERO;
    }
    if r.as_u64() < n as u64 {
        return evals[r.as_u64() as usize];
    }

    use crate::utils::BatchInverse;

    // den[0] = prod_{k>0} (-k), den[i] = (r - i) * i
    let mut den = Vec::with_capacity(n);
    den.push((1..n as u64).map(|k| -F::from_u64(k)).product::<F>());
    den.extend((1..n as u64).map(|i| (r - F::from_u64(i)) * F::from_u64(i)));
    den.iter_mut().inverse();

    let mut basis = (1..n as u64).map(|k| r - F::from_u64(k)).product::<F>() * den[0];
    let mut acc = basis * evals[0];
    for (i, (&e, &d)) in evals.iter().zip(den.iter()).enumerate().skip(1) {
        let num = (r - F::from_u64(i as u64 - 1)) * -F::from_u64((n - i) as u64);
        basis *= num * d;
        acc += basis * e;
    }
    acc
}

/// Product of linear factors `(a x + b)^m` where negative `m` places the factor in the denominator.
///
/// Multiplying two products cancels matching numerator and denominator factors, so evaluation only
/// inverts what survives. Constant factors are folded eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terms<F: Field> {
    factors: HashMap<(F, F), i64>,
    num: F,
    den: F,
}

impl<F: Field> Default for Terms<F> {
    fn default() -> Self {
        Self {
            factors: HashMap::new(),
            num: F::ONE,
            den: F::ONE,
        }
    }
}

impl<F: Field> Terms<F> {
    pub fn new(factors: impl IntoIterator<Item = ((F, F), i64)>) -> Self {
        let mut terms = Self::default();
        factors
            .into_iter()
            .for_each(|(factor, m)| terms.insert(factor, m));
        terms
    }

    pub fn numerator(a: F, b: F) -> Self {
        Self::new([((a, b), 1)])
    }

    pub fn denominator(a: F, b: F) -> Self {
        Self::new([((a, b), -1)])
    }

    fn insert(&mut self, (a, b): (F, F), m: i64) {
        if m == 0 {
            return;
        }
        if a.is_zero() {
            let c = b.pow(m.unsigned_abs());
            if m > 0 {
                self.num *= c;
            } else {
                self.den *= c;
            }
            return;
        }
        let entry = self.factors.entry((a, b)).or_insert(0);
        *entry += m;
        if *entry == 0 {
            self.factors.remove(&(a, b));
        }
    }

    /// Number of linear factors still stored, after cancellation.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn eval(&self, x: F) -> F {
        let mut num = self.num;
        let mut den = self.den;
        self.factors.iter().for_each(|(&(a, b), &m)| {
            let v = (a * x + b).pow(m.unsigned_abs());
            if m > 0 {
                num *= v;
            } else {
                den *= v;
            }
        });
        num * den.inverse()
    }
}

impl<F: Field> std::ops::Mul for Terms<F> {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self.num *= rhs.num;
        self.den *= rhs.den;
        rhs.factors
            .into_iter()
            .for_each(|(factor, m)| self.insert(factor, m));
        self
    }
}

/// Same interpolant as [`eval_ule`], walking the Lagrange basis as a cancelling product of terms.
pub fn eval_le<F: Field>(evals: &[F], r: F) -> F {
    let n = evals.len() as u64;
    if n == 0 {
        return F::ZERO;
    }
    let f = F::from_u64;

    // L_0 = prod_{k>0} (x - k) / (-k)
    let mut basis = (1..n).fold(Terms::default(), |acc, k| {
        acc * Terms::new([((F::ONE, -f(k)), 1), ((F::ZERO, -f(k)), -1)])
    });
    let mut acc = basis.eval(r) * evals[0];

    // L_i = L_{i-1} (x - (i-1)) (-(n-i)) / ((x - i) i)
    for (i, &e) in (1..n).zip(evals.iter().skip(1)) {
        basis = basis
            * Terms::new([
                ((F::ONE, -f(i - 1)), 1),
                ((F::ONE, -f(i)), -1),
                ((F::ZERO, f(i)), -1),
                ((F::ZERO, -f(n - i)), 1),
            ]);
        acc += basis.eval(r) * e;
    }
    acc
}

/// Point at `t` of the curve of degree `< points.len()` with `l(i) = points[i]`, interpolated one
/// coordinate at a time.
pub fn curve<F: Field>(points: &[&[F]], t: F) -> Vec<F> {
    assert!(!points.is_empty());
    let k = points[0].len();
    assert!(points.iter().all(|p| p.len() == k));
    (0..k)
        .map(|i| {
            let coordinate = points.iter().map(|p| p[i]).collect::<Vec<_>>();
            eval_ule(&coordinate, t)
        })
        .collect()
}
