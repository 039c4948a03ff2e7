use crate::{field::Field, hash::transcript::Challenge, lagrange::eval_ule, Error};

/// Claim that a polynomial evaluates to `value` at `point`, left over after the last round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalClaim<F> {
    pub point: Vec<F>,
    pub value: F,
}

impl<F: Field> EvalClaim<F> {
    pub fn check(&self, oracle: impl FnOnce(&[F]) -> F) -> Result<(), Error> {
        if oracle(&self.point) == self.value {
            Ok(())
        } else {
            tracing::warn!("terminal evaluation mismatch");
            Err(Error::Oracle)
        }
    }
}

#[derive(Debug, Clone)]
pub struct SumcheckVerifier<F> {
    claim: F,
    degree: usize,
    n_vars: usize,
    rs: Vec<F>,
}

impl<F: Field> SumcheckVerifier<F> {
    pub fn new(claim: F, n_vars: usize, degree: usize) -> Self {
        Self {
            claim,
            degree,
            n_vars,
            rs: Vec::with_capacity(n_vars),
        }
    }

    /// One-based index of the next round.
    pub fn round(&self) -> usize {
        self.rs.len() + 1
    }

    pub fn is_done(&self) -> bool {
        self.rs.len() == self.n_vars
    }

    pub fn claim(&self) -> F {
        self.claim
    }

    /// Checks `g(0) + g(1)` against the running claim, then moves the claim to `g(r)`.
    pub fn reduce_claim<T>(&mut self, evals: &[F], transcript: &mut T) -> Result<F, Error>
    where
        T: Challenge<F>,
    {
        assert!(!self.is_done());
        let round = self.round();
        if evals.is_empty() || evals.len() > self.degree + 1 {
            tracing::warn!(round, len = evals.len(), "round polynomial exceeds degree bound");
            return Err(Error::Degree { round });
        }
        if eval_ule(evals, F::ZERO) + eval_ule(evals, F::ONE) != self.claim {
            tracing::warn!(round, "round sum mismatch");
            return Err(Error::Sum { round });
        }
        let r: F = transcript.draw();
        self.claim = eval_ule(evals, r);
        self.rs.push(r);
        Ok(r)
    }

    pub fn into_claim(self) -> EvalClaim<F> {
        assert!(self.is_done());
        EvalClaim {
            point: self.rs,
            value: self.claim,
        }
    }
}
