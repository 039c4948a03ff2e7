use crate::{
    field::{Field, TwoAdicField},
    hash::{
        transcript::{Challenge, ChallengeBits, Writer},
        Compress, Hasher,
    },
    merkle::{CommitmentData, MerkleTree, Opening},
    poly::UnivariatePolynomial,
    utils::log2_strict,
    Error,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


pub type Digest = [u8; 32];
pub type FriOpening<F> = Opening<F, Digest>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FriConfig {
    /// Inverse blowup, `0 < rate <= 1`.
    pub rate: f64,
    pub queries: usize,
}

impl FriConfig {
    pub fn new(rate: f64, queries: usize) -> Self {
        assert!(rate > 0.0 && rate <= 1.0);
        Self { rate, queries }
    }

    /// Smallest power of two covering `len / rate`.
    pub fn domain_size(&self, len: usize) -> usize {
        ((len as f64 / self.rate).ceil() as usize)
            .max(1)
            .next_power_of_two()
    }

    pub fn rounds(len: usize) -> usize {
        assert!(len > 0);
        len.ilog2() as usize
    }
}

/// Maximum length of the polynomial left after `rounds` folds of a length `len` polynomial.
fn final_len(len: usize, rounds: usize) -> usize {
    len.div_ceil(1 << rounds)
}

/// Every `2^round`-th element of the original domain.
fn round_domain<F: Copy>(domain: &[F], round: usize) -> Vec<F> {
    domain.iter().step_by(1 << round).copied().collect()
}

fn index_map<F: Field>(domain: &[F]) -> HashMap<F, usize> {
    domain.iter().enumerate().map(|(i, &d)| (d, i)).collect()
}

/// Evaluations of one round over its domain, Merkle committed.
#[derive(Debug, Clone)]
pub struct FriCommitment<F> {
    domain_mapping: HashMap<F, usize>,
    data: CommitmentData<F, Digest>,
}

impl<F: Field> FriCommitment<F> {
    pub fn commit<H, C>(tree: &MerkleTree<F, Digest, H, C>, evals: Vec<F>, domain: &[F]) -> Self
    where
        H: Hasher<F, Digest>,
        C: Compress<Digest, 2>,
    {
        assert_eq!(evals.len(), domain.len());
        Self {
            domain_mapping: index_map(domain),
            data: tree.commit_data(evals),
        }
    }

    pub fn root(&self) -> Digest {
        self.data.root()
    }

    pub fn evals(&self) -> &[F] {
        self.data.data()
    }

    pub fn open(&self, element: F) -> FriOpening<F> {
        self.data.open(self.domain_mapping[&element])
    }
}

pub struct FriProver<'a, F, H: Hasher<F, Digest>, C: Compress<Digest, 2>> {
    tree: &'a MerkleTree<F, Digest, H, C>,
    domain: Vec<F>,
    polys: Vec<UnivariatePolynomial<F>>,
    commits: Vec<FriCommitment<F>>,
}

impl<'a, F, H, C> FriProver<'a, F, H, C>
where
    F: TwoAdicField,
    H: Hasher<F, Digest>,
    C: Compress<Digest, 2>,
{
    /// Commits to `poly` over `domain`.
    pub fn new(
        tree: &'a MerkleTree<F, Digest, H, C>,
        poly: UnivariatePolynomial<F>,
        domain: Vec<F>,
    ) -> Self {
        let evals = poly.evaluate_over(&domain);
        let commit = FriCommitment::commit(tree, evals, &domain);
        Self {
            tree,
            domain,
            polys: vec![poly],
            commits: vec![commit],
        }
    }

    pub fn root(&self) -> Digest {
        self.commits[self.commits.len() - 1].root()
    }

    /// Folds the latest polynomial by `r` and commits to it over the next, halved domain.
    pub fn commit(&mut self, r: F) -> Digest {
        let poly = self.polys[self.polys.len() - 1].fold(r);
        let domain = round_domain(&self.domain, self.polys.len());
        let evals = poly.evaluate_over(&domain);
        self.commits.push(FriCommitment::commit(self.tree, evals, &domain));
        self.polys.push(poly);
        self.root()
    }

    /// Openings of round `round` at `s` and its partner, and of round `round + 1` at `s^2`.
    pub fn query(&self, round: usize, s: F) -> [FriOpening<F>; 3] {
        let s_prime = -s;
        let commit = &self.commits[round];
        let next = &self.commits[round + 1];
        [commit.open(s), commit.open(s_prime), next.open(s.square())]
    }

    pub fn final_poly(&self) -> &UnivariatePolynomial<F> {
        &self.polys[self.polys.len() - 1]
    }
}

pub struct FriVerifier<'a, F, H: Hasher<F, Digest>, C: Compress<Digest, 2>> {
    tree: &'a MerkleTree<F, Digest, H, C>,
    domain: Vec<F>,
    index_of: HashMap<F, usize>,
    s_prime: HashMap<F, F>,
    rounds: usize,
    max_final_len: usize,
    roots: Vec<Digest>,
    rs: Vec<F>,
    final_poly: UnivariatePolynomial<F>,
    s: F,
}

impl<'a, F, H, C> FriVerifier<'a, F, H, C>
where
    F: TwoAdicField,
    H: Hasher<F, Digest>,
    C: Compress<Digest, 2>,
{
    /// Verifier for a polynomial of at most `len` coefficients committed over `domain`.
    pub fn new(tree: &'a MerkleTree<F, Digest, H, C>, domain: Vec<F>, len: usize) -> Self {
        let rounds = FriConfig::rounds(len);
        let half = domain.len() / 2;
        // partner of x sits half the domain ahead, wrapping
        let s_prime = domain
            .iter()
            .zip(domain[half..].iter().chain(domain[..half].iter()))
            .map(|(&x, &y)| (x, y))
            .collect();
        Self {
            tree,
            index_of: index_map(&domain),
            domain,
            s_prime,
            rounds,
            max_final_len: final_len(len, rounds),
            roots: Vec::with_capacity(rounds + 1),
            rs: Vec::with_capacity(rounds),
            final_poly: UnivariatePolynomial::default(),
            s: F::ONE,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Records a round root and answers with the folding challenge.
    pub fn commit<T>(&mut self, root: Digest, transcript: &mut T) -> Result<F, Error>
    where
        T: Writer<Digest> + Challenge<F>,
    {
        assert!(self.roots.len() < self.rounds);
        Writer::<Digest>::write(transcript, root)?;
        self.roots.push(root);
        let r = transcript.draw();
        self.rs.push(r);
        Ok(r)
    }

    /// Records the last root, no challenge follows it, and the prover's final polynomial.
    pub fn receive_final<T>(
        &mut self,
        root: Digest,
        poly: UnivariatePolynomial<F>,
        transcript: &mut T,
    ) -> Result<(), Error>
    where
        T: Writer<Digest> + Writer<F>,
    {
        assert_eq!(self.roots.len(), self.rounds);
        Writer::<Digest>::write(transcript, root)?;
        Writer::<F>::write_many(transcript, poly.coeffs())?;
        self.roots.push(root);
        if poly.len() > self.max_final_len {
            tracing::warn!(len = poly.len(), max = self.max_final_len, "final polynomial too long");
            return Err(Error::FinalPoly);
        }
        self.final_poly = poly;
        Ok(())
    }

    /// Samples the starting point of a new query.
    pub fn query<T: ChallengeBits>(&mut self, transcript: &mut T) -> F {
        let index = transcript.draw_bits(log2_strict(self.domain.len()));
        self.s = self.domain[index];
        self.s
    }

    fn check_index(&self, opening: &FriOpening<F>, x: F, round: usize) -> Result<(), Error> {
        match self.index_of.get(&x) {
            Some(&i) if i >> round == opening.index => Ok(()),
            _ => Err(Error::Merkle),
        }
    }

    pub fn verify(&mut self, round: usize, openings: &[FriOpening<F>; 3]) -> Result<(), Error> {
        assert!(round < self.rounds);
        let s = self.s;
        let s_prime = self.s_prime[&s];
        let s2 = s.square();

        self.check_index(&openings[0], s, round)?;
        self.check_index(&openings[1], s_prime, round)?;
        self.check_index(&openings[2], s2, round + 1)?;
        self.tree.verify_opening(self.roots[round], &openings[0])?;
        self.tree.verify_opening(self.roots[round], &openings[1])?;
        self.tree.verify_opening(self.roots[round + 1], &openings[2])?;

        let (p, p_prime, p2) = (openings[0].value, openings[1].value, openings[2].value);
        if Self::next(s, s_prime, p, p_prime, self.rs[round]) != p2 {
            tracing::warn!(round, "folding mismatch");
            return Err(Error::Folding { round });
        }
        if round + 1 == self.rounds && self.final_poly.evaluate(s2) != p2 {
            tracing::warn!("final polynomial disagrees with the last commitment");
            return Err(Error::FinalPoly);
        }
        self.s = s2;
        Ok(())
    }

    /// Line through `(s, p)` and `(s', p')` evaluated at `r`.
    fn next(s: F, s_prime: F, p: F, p_prime: F, r: F) -> F {
        (r - s) * (s_prime - s).inverse() * p_prime + (r - s_prime) * (s - s_prime).inverse() * p
    }
}

/// Low degree test of `poly` with the prover and verifier driven in lockstep.
pub struct FriProtocol<F, H: Hasher<F, Digest>, C: Compress<Digest, 2>> {
    tree: MerkleTree<F, Digest, H, C>,
    config: FriConfig,
    poly: UnivariatePolynomial<F>,
    domain: Vec<F>,
}

impl<F, H, C> FriProtocol<F, H, C>
where
    F: TwoAdicField,
    H: Hasher<F, Digest>,
    C: Compress<Digest, 2>,
{
    pub fn new(
        tree: MerkleTree<F, Digest, H, C>,
        config: FriConfig,
        poly: UnivariatePolynomial<F>,
    ) -> Self {
        assert!(!poly.is_empty());
        let domain = F::roots_of_unity(config.domain_size(poly.len()));
        Self {
            tree,
            config,
            poly,
            domain,
        }
    }

    pub fn domain(&self) -> &[F] {
        &self.domain
    }

    #[tracing::instrument(skip_all, fields(len = self.poly.len(), domain = self.domain.len()))]
    pub fn execute<T>(&self, transcript: &mut T) -> Result<(), Error>
    where
        T: Writer<Digest> + Writer<F> + Challenge<F> + ChallengeBits,
    {
        let mut prover = FriProver::new(&self.tree, self.poly.clone(), self.domain.clone());
        let mut verifier = FriVerifier::new(&self.tree, self.domain.clone(), self.poly.len());
        let rounds = verifier.rounds();

        let mut root = prover.root();
        for round in 0..rounds {
            let r = verifier.commit(root, transcript)?;
            root = prover.commit(r);
            tracing::debug!(round, "committed");
        }
        verifier.receive_final(root, prover.final_poly().clone(), transcript)?;

        for _ in 0..self.config.queries {
            let mut s = verifier.query(transcript);
            for round in 0..rounds {
                let openings = prover.query(round, s);
                verifier.verify(round, &openings)?;
                s = s.square();
            }
        }
        tracing::info!(queries = self.config.queries, "low degree test passed");
        Ok(())
    }
}
