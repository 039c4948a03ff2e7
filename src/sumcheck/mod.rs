pub mod prover;
pub mod verifier;
pub use prover::*;
pub use verifier::*;

use crate::{
    field::Field,
    hash::transcript::{Challenge, Reader, Writer},
    Error,
};

/// Interactive run: prover messages go through `transcript`, the verifier checks each one before the
/// challenge is drawn. Returns the evaluation claim the verifier is left with.
#[tracing::instrument(skip_all, fields(n_vars = prover.num_vars(), degree = degree))]
pub fn run<F, T, P>(
    transcript: &mut T,
    claim: F,
    degree: usize,
    prover: &mut P,
) -> Result<EvalClaim<F>, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    P: SumcheckProver<F> + ?Sized,
{
    let mut verifier = SumcheckVerifier::new(claim, prover.num_vars(), degree);
    while !verifier.is_done() {
        let evals = prover.round_evals();
        transcript.write_many(&evals)?;
        let r = verifier.reduce_claim(&evals, transcript)?;
        tracing::debug!(round = verifier.round() - 1, claim = %verifier.claim());
        prover.bind(r);
    }
    Ok(verifier.into_claim())
}

/// [`run`] followed by the terminal check against `oracle`. Returns the challenge vector.
pub fn execute<F, T, P>(
    transcript: &mut T,
    claim: F,
    degree: usize,
    prover: &mut P,
    oracle: impl FnOnce(&[F]) -> F,
) -> Result<Vec<F>, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    P: SumcheckProver<F> + ?Sized,
{
    let claim = run(transcript, claim, degree, prover)?;
    claim.check(oracle)?;
    tracing::info!("sumcheck verified");
    Ok(claim.point)
}

/// Non-interactive prover, writes `degree + 1` evaluations per round.
#[tracing::instrument(skip_all, fields(n_vars = prover.num_vars()))]
pub fn prove<F, T, P>(transcript: &mut T, prover: &mut P) -> Result<Vec<F>, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    P: SumcheckProver<F> + ?Sized,
{
    let degree = prover.degree();
    let mut rs = Vec::with_capacity(prover.num_vars());
    while prover.num_vars() > 0 {
        let evals = prover.round_evals();
        debug_assert_eq!(evals.len(), degree + 1);
        transcript.write_many(&evals)?;
        let r: F = transcript.draw();
        prover.bind(r);
        rs.push(r);
    }
    Ok(rs)
}

/// Replays a proof written by [`prove`].
#[tracing::instrument(skip_all, fields(n_vars = n_vars, degree = degree))]
pub fn verify<F, T>(
    transcript: &mut T,
    claim: F,
    n_vars: usize,
    degree: usize,
) -> Result<EvalClaim<F>, Error>
where
    F: Field,
    T: Reader<F> + Challenge<F>,
{
    let mut verifier = SumcheckVerifier::new(claim, n_vars, degree);
    while !verifier.is_done() {
        let evals = transcript.read_many(degree + 1)?;
        verifier.reduce_claim(&evals, transcript)?;
    }
    Ok(verifier.into_claim())
}
