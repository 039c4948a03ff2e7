use super::{GkrProtocol, GkrProver, LayerWiring};
use crate::field::{Field, Mersenne61};
use crate::hash::random::RandomSource;
use crate::hash::rust_crypto::RustCryptoWriter;
use crate::hash::transcript::Challenge;
use crate::mle::{eval_mle, MultilinearExtension};
use crate::utils::n_rand;
use crate::Error;

type F = Mersenne61;

fn f(v: u64) -> F {
    F::from_u64(v)
}

// out0 = in0 + in1, out1 = in2 * in3
fn two_layer() -> (Vec<Vec<F>>, Vec<LayerWiring>) {
    let wiring = LayerWiring::default().add_gate(0, 0, 1).mult_gate(1, 2, 3);
    let inputs = vec![f(3), f(5), f(2), f(7)];
    let outputs = vec![f(8), f(14)];
    (vec![outputs, inputs], vec![wiring])
}

fn three_layer(inputs: Vec<F>) -> GkrProtocol<F> {
    let top = LayerWiring::default().mult_gate(0, 0, 1).add_gate(1, 2, 3);
    let middle = LayerWiring::default()
        .add_gate(0, 0, 1)
        .mult_gate(1, 1, 2)
        .add_gate(2, 2, 3)
        .mult_gate(3, 3, 0);
    GkrProtocol::from_inputs(inputs, vec![top, middle], &[1, 2])
}

#[test]
fn test_gkr_two_layer() {
    crate::test::init_tracing();
    let (evals, wiring) = two_layer();
    assert_eq!(wiring[0].evaluate(&evals[1], 1), evals[0]);

    let protocol = GkrProtocol::new(evals, wiring);
    let mut transcript = RandomSource::new(crate::test::seed_rng());
    protocol.execute(&mut transcript).unwrap();

    let mut transcript = RustCryptoWriter::<Vec<u8>, sha3::Keccak256>::init("gkr");
    protocol.execute(&mut transcript).unwrap();
}

#[test]
fn test_gkr_three_layer() {
    let protocol = three_layer(vec![f(1), f(2), f(3), f(4)]);
    let evals = protocol.evals();
    assert_eq!(evals[1], vec![f(3), f(6), f(7), f(4)]);
    assert_eq!(evals[0], vec![f(18), f(11)]);

    let mut transcript = RandomSource::new(crate::test::seed_rng());
    protocol.execute(&mut transcript).unwrap();

    let mut rng = crate::test::seed_rng();
    for _ in 0..4 {
        let protocol = three_layer(n_rand(&mut rng, 4));
        protocol.execute(&mut transcript).unwrap();
    }
}

#[test]
fn test_gkr_single_layer() {
    let protocol = GkrProtocol::new(vec![vec![f(1), f(2)]], vec![]);
    let mut transcript = RandomSource::new(crate::test::seed_rng());
    protocol.execute(&mut transcript).unwrap();
}

#[test]
#[cfg(not(feature = "prover-sanity"))]
fn test_gkr_corrupted() {
    let mut transcript = RandomSource::new(crate::test::seed_rng());

    let (evals, wiring) = two_layer();
    for layer in 0..evals.len() {
        for i in 0..evals[layer].len() {
            let mut evals = evals.clone();
            evals[layer][i] += F::ONE;
            let res = GkrProtocol::new(evals, wiring.clone()).execute(&mut transcript);
            assert!(res.is_err());
        }
    }

    let honest = three_layer(vec![f(1), f(2), f(3), f(4)]);
    for i in 0..4 {
        let mut evals = honest.evals().to_vec();
        evals[1][i] += F::ONE;
        let res = GkrProtocol::new(evals, honest.wiring.clone()).execute(&mut transcript);
        assert!(matches!(
            res,
            Err(Error::Sum { .. } | Error::Oracle | Error::InputLayer)
        ));
    }

    // wrong input only shows up in the final check
    let mut evals = honest.evals().to_vec();
    evals[2][0] += F::ONE;
    let res = GkrProtocol::new(evals, honest.wiring.clone()).execute(&mut transcript);
    assert!(res.is_err());
}

#[test]
fn test_wiring_predicate_layout() {
    let (_, wiring) = two_layer();
    let (add, mult) = wiring[0].predicates::<F>(1, 2);
    assert_eq!(add.num_vars(), 5);

    // out || left || right as binary digits
    let add_digits = [[0u8, 0, 0, 0, 1]];
    let mult_digits = [[1u8, 1, 0, 1, 1]];
    assert_eq!(add, MultilinearExtension::from_wiring_predicate(&add_digits, 5));
    assert_eq!(mult, MultilinearExtension::from_wiring_predicate(&mult_digits, 5));
}

#[test]
fn test_line_restriction() {
    let mut rng = crate::test::seed_rng();
    for k in 0..4 {
        let values: Vec<F> = n_rand(&mut rng, 1 << k);
        let prover = GkrProver::new(&values);
        let b: Vec<F> = n_rand(&mut rng, k);
        let c: Vec<F> = n_rand(&mut rng, k);
        let q = prover.restrict(&b, &c);
        assert_eq!(q.len(), k.max(2) + 1);
        assert_eq!(q[0], eval_mle(&values, &b));
        assert_eq!(q[1], eval_mle(&values, &c));

        let t = F::random(&mut rng);
        let expect = eval_mle(&values, &super::line(&b, &c, t));
        assert_eq!(crate::lagrange::eval_le(&q, t), expect);
    }
}

#[test]
#[cfg(not(feature = "prover-sanity"))]
fn test_gkr_outputs_bound_to_challenge() {
    type Keccak = sha3::Keccak256;
    let (evals, wiring) = two_layer();

    // a delta whose extension vanishes at the first challenge of a fresh chain
    let r: F = RustCryptoWriter::<Vec<u8>, Keccak>::init("gkr").draw();
    let mut forged = evals.clone();
    forged[0][0] += r;
    forged[0][1] += r - F::ONE;
    assert_eq!(eval_mle(&forged[0], &[r]), eval_mle(&evals[0], &[r]));

    let mut transcript = RustCryptoWriter::<Vec<u8>, Keccak>::init("gkr");
    let res = GkrProtocol::new(forged, wiring.clone()).execute(&mut transcript);
    assert!(matches!(res, Err(Error::Sum { round: 1 })));

    let mut transcript = RustCryptoWriter::<Vec<u8>, Keccak>::init("gkr");
    GkrProtocol::new(evals, wiring).execute(&mut transcript).unwrap();
}

#[test]
#[should_panic]
fn test_gate_out_of_range() {
    // wire 2 does not exist in a two wire layer
    let wiring = LayerWiring::default().add_gate(0, 2, 0);
    GkrProtocol::new(vec![vec![f(0), f(6)], vec![f(3), f(5)]], vec![wiring]);
}

#[test]
#[should_panic]
fn test_gate_output_out_of_range() {
    let wiring = LayerWiring::default().add_gate(2, 0, 1);
    wiring.predicates::<F>(1, 1);
}
