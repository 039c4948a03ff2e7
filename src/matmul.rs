//! Sumcheck argument for `C = A B`.
//!
//! The verifier picks a random entry `(i, j)` of the extended product and reduces
//! `C(i, j) = sum_k A(i, k) B(k, j)` to one evaluation each of `A` and `B`.

use crate::{
    data::{Matrix, MatrixOwn, Storage},
    field::Field,
    hash::transcript::{Challenge, Reader, Writer},
    mle::{eval_mle, MultilinearExtension},
    sumcheck::{self, CompositionProver, Product},
    Error,
};

fn check_dims<S: Storage>(a: &Matrix<S>, b: &Matrix<S>) {
    assert_eq!(a.width(), b.height());
    assert!(a.height().is_power_of_two());
    assert!(a.width().is_power_of_two());
    assert!(b.width().is_power_of_two());
}

/// `(A(i, .), B(., j))` as tables over the inner dimension.
pub(crate) fn factor_tables<F, S>(a: &Matrix<S>, b: &Matrix<S>, i: &[F], j: &[F]) -> Vec<Vec<F>>
where
    F: Field,
    S: Storage + AsRef<[F]>,
{
    let row = MultilinearExtension::new(a.values().to_vec()).fix_prefix(i);
    let col = MultilinearExtension::new(b.transpose().storage).fix_prefix(j);
    vec![row.into_evals(), col.into_evals()]
}

/// Writes `C = A B` followed by the product sumcheck, returns `C`.
#[tracing::instrument(skip_all, fields(rows = a.height(), inner = a.width(), cols = b.width()))]
pub fn prove<F, T, S>(transcript: &mut T, a: &Matrix<S>, b: &Matrix<S>) -> Result<MatrixOwn<F>, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    S: Storage + AsRef<[F]>,
{
    check_dims(a, b);
    let c: MatrixOwn<F> = a.mul(b);
    let c_values: &[F] = c.values();
    transcript.write_many(c_values)?;

    let i = transcript.draw_n(a.k());
    let j = transcript.draw_n(b.k_width());
    let mut prover = CompositionProver::new(factor_tables(a, b, &i, &j), Product { arity: 2 });
    sumcheck::prove(transcript, &mut prover)?;
    Ok(c)
}

#[tracing::instrument(skip_all, fields(rows = a.height(), inner = a.width(), cols = b.width()))]
pub fn verify<F, T, S>(
    transcript: &mut T,
    a: &Matrix<S>,
    b: &Matrix<S>,
    c: &Matrix<S>,
) -> Result<(), Error>
where
    F: Field,
    T: Reader<F> + Challenge<F>,
    S: Storage + AsRef<[F]>,
{
    check_dims(a, b);
    assert_eq!((c.width(), c.height()), (b.width(), a.height()));

    let c_values: &[F] = c.values();
    let claimed: Vec<F> = transcript.read_many(c_values.len())?;
    if claimed != c_values {
        tracing::warn!("proof is for a different product");
        return Err(Error::Claim);
    }

    let i = transcript.draw_n(a.k());
    let j = transcript.draw_n(b.k_width());
    let claim = eval_mle(c_values, &[i.as_slice(), j.as_slice()].concat());

    let reduced = sumcheck::verify(transcript, claim, a.k_width(), 2)?;
    let b_t: MatrixOwn<F> = b.transpose();
    reduced.check(|r| {
        let a_ir = eval_mle(a.values(), &[i.as_slice(), r].concat());
        let b_rj = eval_mle(b_t.values(), &[j.as_slice(), r].concat());
        a_ir * b_rj
    })?;
    tracing::info!("product verified");
    Ok(())
}
