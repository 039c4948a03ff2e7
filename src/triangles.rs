//! Sumcheck argument for `sum_{i,j} (A^2)_{ij} A_{ij}`, six times the number of triangles of an
//! undirected graph with adjacency matrix `A`.
//!
//! A product sumcheck over `(i, j)` leaves claims on `A^2(i, j)` and `A(i, j)`. A second one reduces
//! `A^2(i, j)` to `A(i, k)` and `A(k, j)`. The three evaluations of `A` are sent together as `A`
//! restricted to the quadratic curve through `i || j`, `k || j` and `i || k`.

use crate::{
    data::{Matrix, MatrixOwn, Storage},
    field::Field,
    hash::transcript::{Challenge, Reader, Writer},
    lagrange::{curve, eval_le},
    matmul::factor_tables,
    mle::eval_mle,
    sumcheck::{self, CompositionProver, Product},
    Error,
};

fn check_square<S: Storage>(a: &Matrix<S>) {
    assert_eq!(a.width(), a.height());
    assert!(a.width().is_power_of_two());
}

/// `i || j`, `k || j` and `i || k`.
fn curve_points<F: Field>(i: &[F], j: &[F], k: &[F]) -> [Vec<F>; 3] {
    [[i, j].concat(), [k, j].concat(), [i, k].concat()]
}

/// `A(l(t))` for `t = 0..=2 n_vars`, enough to fix the restriction of `A` to the curve.
fn restrict<F: Field>(values: &[F], points: &[Vec<F>; 3]) -> Vec<F> {
    let points = points.each_ref().map(Vec::as_slice);
    let n_vars = points[0].len();
    (0..=2 * n_vars as u64)
        .map(|t| eval_mle(values, &curve(&points, F::from_u64(t))))
        .collect()
}

/// `sum_{i,j} (A^2)_{ij} A_{ij}` computed directly.
pub fn triangle_sum<F, S>(a: &Matrix<S>) -> F
where
    F: Field,
    S: Storage + AsRef<[F]>,
{
    check_square(a);
    let a2: MatrixOwn<F> = a.mul(a);
    let (a2_values, values): (&[F], &[F]) = (a2.values(), a.values());
    a2_values.iter().zip(values).map(|(&x, &y)| x * y).sum()
}

/// Writes the graph and a proof of its triangle sum, returns the sum.
#[tracing::instrument(skip_all, fields(n = a.width()))]
pub fn prove<F, T, S>(transcript: &mut T, a: &Matrix<S>) -> Result<F, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    S: Storage + AsRef<[F]>,
{
    check_square(a);
    let values: &[F] = a.values();
    transcript.write_many(values)?;
    prove_sum(transcript, a)
}

fn prove_sum<F, T, S>(transcript: &mut T, a: &Matrix<S>) -> Result<F, Error>
where
    F: Field,
    T: Writer<F> + Challenge<F>,
    S: Storage + AsRef<[F]>,
{
    let values: &[F] = a.values();
    let a2: MatrixOwn<F> = a.mul(a);
    let a2_values: &[F] = a2.values();

    let mut outer = CompositionProver::new(
        vec![a2_values.to_vec(), values.to_vec()],
        Product { arity: 2 },
    );
    let sum = outer.sum();
    transcript.write(sum)?;
    let r = sumcheck::prove(transcript, &mut outer)?;
    let (i, j) = r.split_at(a.k());

    transcript.write(eval_mle(a2_values, &r))?;
    let mut inner = CompositionProver::new(factor_tables(a, a, i, j), Product { arity: 2 });
    let k = sumcheck::prove(transcript, &mut inner)?;

    let q = restrict(values, &curve_points(i, j, &k));
    transcript.write_many(&q)?;
    Ok(sum)
}

/// Checks a proof against the graph `a` and returns the proven triangle sum.
#[tracing::instrument(skip_all, fields(n = a.width()))]
pub fn verify<F, T, S>(transcript: &mut T, a: &Matrix<S>) -> Result<F, Error>
where
    F: Field,
    T: Reader<F> + Challenge<F>,
    S: Storage + AsRef<[F]>,
{
    check_square(a);
    let values: &[F] = a.values();
    let graph: Vec<F> = transcript.read_many(values.len())?;
    if graph != values {
        tracing::warn!("proof is for a different graph");
        return Err(Error::Claim);
    }

    let n_vars = a.k() + a.k_width();
    let sum: F = transcript.read()?;
    let outer = sumcheck::verify(transcript, sum, n_vars, 2)?;
    let (i, j) = outer.point.split_at(a.k());

    let a2_ij: F = transcript.read()?;
    let inner = sumcheck::verify(transcript, a2_ij, a.k(), 2)?;

    let points = curve_points(i, j, &inner.point);
    let q: Vec<F> = transcript.read_many(2 * n_vars + 1)?;
    let t: F = transcript.draw();
    let on_curve = curve(&points.each_ref().map(Vec::as_slice), t);
    if eval_le(&q, t) != eval_mle(values, &on_curve) {
        tracing::warn!("curve restriction disagrees with the graph");
        return Err(Error::Oracle);
    }

    // q(0) = A(i, j), q(1) = A(k, j), q(2) = A(i, k)
    outer.check(|_| q[0] * a2_ij)?;
    inner.check(|_| q[2] * q[1])?;
    tracing::info!(sum = %sum, "triangle sum verified");
    Ok(sum)
}
