use crate::{
    field::Field,
    hash::transcript::{Challenge, Writer},
    lagrange::{curve, eval_le},
    mle::{eval_mle, MultilinearExtension},
    sumcheck::{self, Composition, CompositionProver, EvalClaim},
    utils::log2_strict,
    Error,
};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod test;

/// Gate of layer `i - 1` reading two wires of layer `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    pub out: usize,
    pub left: usize,
    pub right: usize,
}

impl Gate {
    pub fn new(out: usize, left: usize, right: usize) -> Self {
        Self { out, left, right }
    }

    /// Hypercube index `out || left || right`, most significant bits first.
    pub fn index(&self, k_in: usize) -> usize {
        (self.out << (2 * k_in)) | (self.left << k_in) | self.right
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerWiring {
    pub add: Vec<Gate>,
    pub mult: Vec<Gate>,
}

impl LayerWiring {
    pub fn add_gate(mut self, out: usize, left: usize, right: usize) -> Self {
        self.add.push(Gate::new(out, left, right));
        self
    }

    pub fn mult_gate(mut self, out: usize, left: usize, right: usize) -> Self {
        self.mult.push(Gate::new(out, left, right));
        self
    }

    /// Panics unless every gate fits a layer of `2^k_out` gates over `2^k_in` wires.
    pub fn check_range(&self, k_out: usize, k_in: usize) {
        self.add.iter().chain(self.mult.iter()).for_each(|g| {
            assert!(
                g.out < 1 << k_out && g.left < 1 << k_in && g.right < 1 << k_in,
                "gate {g:?} out of range"
            )
        });
    }

    /// `add` and `mult` predicates over `k_out + 2 k_in` variables.
    pub fn predicates<F: Field>(
        &self,
        k_out: usize,
        k_in: usize,
    ) -> (MultilinearExtension<F>, MultilinearExtension<F>) {
        self.check_range(k_out, k_in);
        let k = k_out + 2 * k_in;
        let predicate = |gates: &[Gate]| {
            MultilinearExtension::from_indices(gates.iter().map(|g| g.index(k_in)), k)
        };
        (predicate(&self.add), predicate(&self.mult))
    }

    /// Values of layer `i - 1` given layer `i`.
    pub fn evaluate<F: Field>(&self, inputs: &[F], k_out: usize) -> Vec<F> {
        let mut out = vec![F::ZERO; 1 << k_out];
        self.add
            .iter()
            .for_each(|g| out[g.out] = inputs[g.left] + inputs[g.right]);
        self.mult
            .iter()
            .for_each(|g| out[g.out] = inputs[g.left] * inputs[g.right]);
        out
    }
}

/// `add (x + y) + mult x y` over the tables `[add_r, mult_r, w(x), w(y)]`.
#[derive(Debug, Clone, Copy)]
pub struct GkrComposition;

impl<F: Field> Composition<F> for GkrComposition {
    fn degree(&self) -> usize {
        2
    }

    fn evaluate(&self, values: &[F]) -> F {
        let (add, mult, x, y) = (values[0], values[1], values[2], values[3]);
        add * (x + y) + mult * x * y
    }
}

/// Point `l(t)` on the line with `l(0) = b` and `l(1) = c`.
pub fn line<F: Field>(b: &[F], c: &[F], t: F) -> Vec<F> {
    curve(&[b, c], t)
}

/// Number of evaluations of `w o l` sent for a layer of `k` variables.
fn restriction_len(k: usize) -> usize {
    k.max(2) + 1
}

/// Prover for one layer, holding that layer's values.
#[derive(Debug, Clone)]
pub struct GkrProver<'a, F> {
    values: &'a [F],
    k: usize,
}

impl<'a, F: Field> GkrProver<'a, F> {
    pub fn new(values: &'a [F]) -> Self {
        let k = log2_strict(values.len());
        Self { values, k }
    }

    /// Sumcheck prover for `sum_{x,y} add(r,x,y) (w(x) + w(y)) + mult(r,x,y) w(x) w(y)`.
    pub fn round_prover(
        &self,
        add: &MultilinearExtension<F>,
        mult: &MultilinearExtension<F>,
        r: &[F],
    ) -> CompositionProver<F, GkrComposition> {
        assert_eq!(add.num_vars(), r.len() + 2 * self.k);
        let add_r = add.fix_prefix(r).into_evals();
        let mult_r = mult.fix_prefix(r).into_evals();
        let n = self.values.len();
        let wx = (0..n * n).map(|i| self.values[i / n]).collect();
        let wy = (0..n * n).map(|i| self.values[i % n]).collect();
        CompositionProver::new(vec![add_r, mult_r, wx, wy], GkrComposition)
    }

    /// `w(l(t))` for `t = 0, 1, ..` up to the degree of the restriction.
    pub fn restrict(&self, b: &[F], c: &[F]) -> Vec<F> {
        (0..restriction_len(self.k) as u64)
            .map(|t| eval_mle(self.values, &line(b, c, F::from_u64(t))))
            .collect()
    }
}

/// Verifier state: a claimed evaluation of the current layer.
#[derive(Debug, Clone)]
pub struct GkrVerifier<F> {
    point: Vec<F>,
    claim: F,
}

impl<F: Field> GkrVerifier<F> {
    /// Absorbs the claimed outputs and opens a claim on them at a random point.
    pub fn start<T>(outputs: &[F], transcript: &mut T) -> Result<Self, Error>
    where
        T: Writer<F> + Challenge<F>,
    {
        transcript.write_many(outputs)?;
        let point = transcript.draw_n(log2_strict(outputs.len()));
        let claim = eval_mle(outputs, &point);
        Ok(Self { point, claim })
    }

    pub fn point(&self) -> &[F] {
        &self.point
    }

    pub fn claim(&self) -> F {
        self.claim
    }

    /// Terminal check of a layer sumcheck through the line restriction `q`, then moves the claim to
    /// the next layer at a random point on the line.
    pub fn reduce<T: Challenge<F>>(
        &mut self,
        round: usize,
        add: &MultilinearExtension<F>,
        mult: &MultilinearExtension<F>,
        reduced: &EvalClaim<F>,
        q: &[F],
        transcript: &mut T,
    ) -> Result<(), Error> {
        let k_in = reduced.point.len() / 2;
        if q.len() != restriction_len(k_in) {
            tracing::warn!(round, len = q.len(), "line restriction has wrong length");
            return Err(Error::Degree { round });
        }

        let (b, c) = reduced.point.split_at(k_in);
        let (q0, q1) = (q[0], q[1]);
        let wiring_point = [self.point.as_slice(), b, c].concat();
        reduced.check(|_| {
            add.eval(&wiring_point) * (q0 + q1) + mult.eval(&wiring_point) * q0 * q1
        })?;

        let r_a: F = transcript.draw();
        self.point = line(b, c, r_a);
        self.claim = eval_le(q, r_a);
        Ok(())
    }

    pub fn finish(self, inputs: &[F]) -> Result<(), Error> {
        if eval_mle(inputs, &self.point) == self.claim {
            Ok(())
        } else {
            tracing::warn!("input layer mismatch");
            Err(Error::InputLayer)
        }
    }
}

/// A layered circuit evaluation: `evals[0]` is the output layer, the last entry the input layer and
/// `wiring[i]` connects `evals[i]` to `evals[i + 1]`.
#[derive(Debug, Clone)]
pub struct GkrProtocol<F> {
    evals: Vec<Vec<F>>,
    wiring: Vec<LayerWiring>,
}

impl<F: Field> GkrProtocol<F> {
    pub fn new(evals: Vec<Vec<F>>, wiring: Vec<LayerWiring>) -> Self {
        assert!(!evals.is_empty());
        assert_eq!(wiring.len() + 1, evals.len());
        evals
            .iter()
            .for_each(|layer| assert!(layer.len().is_power_of_two()));
        wiring.iter().zip(evals.windows(2)).for_each(|(w, layers)| {
            w.check_range(log2_strict(layers[0].len()), log2_strict(layers[1].len()))
        });
        Self { evals, wiring }
    }

    /// Evaluates the circuit bottom up from its input layer.
    pub fn from_inputs(inputs: Vec<F>, wiring: Vec<LayerWiring>, widths: &[usize]) -> Self {
        assert_eq!(widths.len(), wiring.len());
        let mut evals = vec![inputs];
        wiring.iter().zip(widths.iter()).rev().for_each(|(w, &k)| {
            let next = w.evaluate(&evals[evals.len() - 1], k);
            evals.push(next);
        });
        evals.reverse();
        Self::new(evals, wiring)
    }

    pub fn evals(&self) -> &[Vec<F>] {
        &self.evals
    }

    #[tracing::instrument(skip_all, fields(layers = self.evals.len()))]
    pub fn execute<T>(&self, transcript: &mut T) -> Result<(), Error>
    where
        T: Writer<F> + Challenge<F>,
    {
        let mut verifier = GkrVerifier::start(&self.evals[0], transcript)?;

        for (i, wiring) in self.wiring.iter().enumerate() {
            let round = i + 1;
            let values = &self.evals[round];
            let prover = GkrProver::new(values);
            let (add, mult) = wiring.predicates(verifier.point().len(), prover.k);

            let mut round_prover = prover.round_prover(&add, &mult, verifier.point());
            #[cfg(feature = "prover-sanity")]
            assert_eq!(round_prover.sum(), verifier.claim());

            let reduced = sumcheck::run(transcript, verifier.claim(), 2, &mut round_prover)?;
            let (b, c) = reduced.point.split_at(prover.k);
            let q = prover.restrict(b, c);
            transcript.write_many(&q)?;

            verifier.reduce(round, &add, &mult, &reduced, &q, transcript)?;
            tracing::debug!(round, claim = %verifier.claim());
        }

        verifier.finish(&self.evals[self.evals.len() - 1])?;
        tracing::info!("circuit verified");
        Ok(())
    }
}
