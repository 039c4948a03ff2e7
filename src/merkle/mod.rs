use crate::{
    field::Field,
    hash::{rust_crypto::RustCrypto, Compress, Hasher},
    utils::{log2_strict, TwoAdicSlice},
    Error,
};
use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSlice,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub fn verify_merkle_proof<C, Node>(
    c: &C,
    claim: Node,
    mut index: usize,
    leaf: Node,
    witness: &[Node],
) -> Result<(), Error>
where
    C: Compress<Node, 2>,
    Node: Copy + Clone + Send + Sync + Debug + Eq + PartialEq,
{
    if witness.len() >= usize::BITS as usize || index >= 1 << witness.len() {
        return Err(Error::Merkle);
    }
    let found = witness.iter().fold(leaf, |acc, &w| {
        let acc = c.compress(if index & 1 == 1 { [w, acc] } else { [acc, w] });
        index >>= 1;
        acc
    });
    (claim == found).then_some(()).ok_or(Error::Merkle)
}

/// A committed value together with its authentication path, siblings listed leaf level first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening<F, Digest> {
    pub index: usize,
    pub value: F,
    pub path: Vec<Digest>,
}

/// Values of one commitment and every digest level above them, leaves first and root last.
#[derive(Debug, Clone)]
pub struct CommitmentData<F, Digest> {
    pub(crate) data: Vec<F>,
    pub(crate) layers: Vec<Vec<Digest>>,
}

impl<F: Copy, Digest: Copy> CommitmentData<F, Digest> {
    pub fn k(&self) -> usize {
        self.data.k()
    }

    pub fn root(&self) -> Digest {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn data(&self) -> &[F] {
        &self.data
    }

    pub fn leaves(&self) -> &[Digest] {
        &self.layers[0]
    }

    pub fn open(&self, index: usize) -> Opening<F, Digest> {
        Opening {
            index,
            value: self.data[index],
            path: path(&self.layers, index),
        }
    }
}

fn path<Digest: Copy>(layers: &[Vec<Digest>], mut index: usize) -> Vec<Digest> {
    assert!(index < layers[0].len());
    layers[..layers.len() - 1]
        .iter()
        .map(|layer| {
            let sibling = layer[index ^ 1];
            index >>= 1;
            sibling
        })
        .collect()
}

pub struct MerkleTree<F, Digest, H: Hasher<F, Digest>, C: Compress<Digest, 2>> {
    pub(crate) h: H,
    pub(crate) c: C,
    pub(crate) _phantom: std::marker::PhantomData<(F, Digest)>,
}

pub type Sha256Tree<F> =
    MerkleTree<F, [u8; 32], RustCrypto<sha2::Sha256>, RustCrypto<sha2::Sha256>>;

impl<F: Field> Sha256Tree<F> {
    pub fn sha256() -> Self {
        Self::new(RustCrypto::new(), RustCrypto::new())
    }
}

impl<F, Digest, H, C> MerkleTree<F, Digest, H, C>
where
    F: Field,
    Digest: Copy + Clone + Debug + Send + Sync + Eq + PartialEq,
    H: Hasher<F, Digest>,
    C: Compress<Digest, 2>,
{
    pub fn new(h: H, c: C) -> Self {
        Self {
            h,
            c,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn hash_felt(&self, x: F) -> Digest {
        self.h.hash(&[x])
    }

    pub fn hash_felts(&self, xs: &[F]) -> Vec<Digest> {
        xs.par_iter().map(|&x| self.hash_felt(x)).collect()
    }

    pub(crate) fn layers(&self, leaves: Vec<Digest>) -> Vec<Vec<Digest>> {
        let k = log2_strict(leaves.len());
        let mut layers = Vec::with_capacity(k + 1);
        layers.push(leaves);
        for _ in 0..k {
            let next = layers[layers.len() - 1]
                .par_chunks(2)
                .map(|pair| self.c.compress([pair[0], pair[1]]))
                .collect::<Vec<_>>();
            layers.push(next);
        }
        layers
    }

    /// Hashes `data` into leaves and keeps every level for later openings.
    pub fn commit_data(&self, data: Vec<F>) -> CommitmentData<F, Digest> {
        let layers = self.layers(self.hash_felts(&data));
        CommitmentData { data, layers }
    }

    /// Root over a power-of-two number of leaves. A single leaf is its own root.
    pub fn commit(&self, leaves: &[Digest]) -> Digest {
        let layers = self.layers(leaves.to_vec());
        layers[layers.len() - 1][0]
    }

    pub fn open(&self, leaves: &[Digest], index: usize) -> Vec<Digest> {
        path(&self.layers(leaves.to_vec()), index)
    }

    pub fn verify(&self, root: Digest, index: usize, leaf: Digest, path: &[Digest]) -> bool {
        verify_merkle_proof(&self.c, root, index, leaf, path).is_ok()
    }

    pub fn verify_opening(&self, root: Digest, opening: &Opening<F, Digest>) -> Result<(), Error> {
        let leaf = self.hash_felt(opening.value);
        verify_merkle_proof(&self.c, root, opening.index, leaf, &opening.path)
    }
}
