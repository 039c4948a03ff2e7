use super::transcript::{Challenge, ChallengeBits, Writer};
use crate::field::Field;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Interactive challenger backed by an external random source.
///
/// Prover messages are only counted, they never influence the challenges.
#[derive(Debug, Clone)]
pub struct RandomSource<R: Rng> {
    rng: R,
    messages: usize,
}

impl RandomSource<ThreadRng> {
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, messages: 0 }
    }

    pub fn messages(&self) -> usize {
        self.messages
    }
}

impl<R: Rng, T> Writer<T> for RandomSource<R> {
    fn write(&mut self, _: T) -> Result<(), crate::Error> {
        self.messages += 1;
        Ok(())
    }
}

impl<R: Rng, F: Field> Challenge<F> for RandomSource<R> {
    fn draw(&mut self) -> F {
        F::random(&mut self.rng)
    }
}

impl<R: Rng> ChallengeBits for RandomSource<R> {
    fn draw_bits(&mut self, bit_size: usize) -> usize {
        self.rng.random_range(0..1usize << bit_size)
    }
}
