pub mod data;
pub mod field;
pub mod fri;
pub mod gkr;
pub mod hash;
pub mod lagrange;
pub mod matmul;
pub mod merkle;
pub mod mle;
pub mod poly;
pub mod sumcheck;
pub mod triangles;
pub mod utils;

/// Rejection reasons of the verifiers. Precondition violations are panics, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Copy, thiserror::Error)]
pub enum Error {
    #[error("transcript stream failed")]
    Transcript,
    #[error("round {round}: g(0) + g(1) does not match the running claim")]
    Sum { round: usize },
    #[error("round {round}: message exceeds the degree bound")]
    Degree { round: usize },
    #[error("terminal evaluation does not match the reduced claim")]
    Oracle,
    #[error("claimed evaluation does not match the statement")]
    Claim,
    #[error("input layer evaluation does not match the final claim")]
    InputLayer,
    #[error("merkle opening rejected")]
    Merkle,
    #[error("round {round}: folding consistency check failed")]
    Folding { round: usize },
    #[error("final polynomial rejected")]
    FinalPoly,
}

#[cfg(test)]
pub(crate) mod test {
    use rand::{rngs::SmallRng, SeedableRng};

    #[allow(dead_code)]
    pub(crate) fn seed_rng() -> SmallRng {
        SmallRng::seed_from_u64(1)
    }

    #[allow(dead_code)]
    pub(crate) fn init_tracing() {
        use tracing_forest::util::LevelFilter;
        use tracing_forest::ForestLayer;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        use tracing_subscriber::{EnvFilter, Registry};

        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = Registry::default()
            .with(env_filter)
            .with(ForestLayer::default())
            .try_init();
    }
}
