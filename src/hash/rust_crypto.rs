use crate::field::FromUniformBytes;
use crate::Error;
use digest::{Digest, FixedOutputReset, Output};
use std::io::{Read, Write};

use super::transcript::{Challenge, ChallengeBits, Reader, Writer};
use super::{Compress, Hasher};

fn to_digest(out: &[u8]) -> [u8; 32] {
    let mut ret = [0u8; 32];
    ret.copy_from_slice(&out[..32]);
    ret
}

/// Leaf hasher and node compressor over any RustCrypto digest.
#[derive(Debug, Clone, Default)]
pub struct RustCrypto<D: Digest> {
    _0: std::marker::PhantomData<D>,
}

impl<D: Digest> RustCrypto<D> {
    pub fn new() -> Self {
        Self {
            _0: Default::default(),
        }
    }
}

impl<D: Digest + FixedOutputReset + Send + Sync, F: FromUniformBytes> Hasher<F, [u8; 32]>
    for RustCrypto<D>
{
    fn hash(&self, input: &[F]) -> [u8; 32] {
        let mut h = D::new();
        input
            .iter()
            .for_each(|el| Digest::update(&mut h, el.to_bytes()));
        to_digest(&Digest::finalize(h))
    }
}

impl<D: Digest + FixedOutputReset + Send + Sync, const N: usize> Compress<[u8; 32], N>
    for RustCrypto<D>
{
    fn compress(&self, input: [[u8; 32]; N]) -> [u8; 32] {
        let mut h = D::new();
        input.iter().for_each(|e| Digest::update(&mut h, e));
        to_digest(&Digest::finalize(h))
    }
}

/// Running hash of every message so far. Squeezing feeds the output back in, so
/// consecutive challenges differ even with no message in between.
#[derive(Debug, Clone)]
struct HashChain<D> {
    h: D,
}

impl<D: Digest + FixedOutputReset> HashChain<D> {
    fn new(prefix: impl AsRef<[u8]>) -> Self {
        Self {
            h: D::new_with_prefix(prefix),
        }
    }

    fn absorb(&mut self, data: &[u8]) {
        Digest::update(&mut self.h, data);
    }

    fn squeeze(&mut self) -> Output<D> {
        let out = self.h.finalize_reset();
        Digest::update(&mut self.h, &out);
        out
    }

    // big endian view of the digest, reduced into the field
    fn field<F: FromUniformBytes>(&mut self) -> F {
        let out: Vec<u8> = self.squeeze().iter().rev().copied().collect();
        F::from_bytes(&out)
    }

    fn bits(&mut self, bit_size: usize) -> usize {
        assert!(bit_size < usize::BITS as usize);
        let out = self.squeeze();
        let word = out[..usize::BITS as usize / 8]
            .iter()
            .rev()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        word & ((1 << bit_size) - 1)
    }
}

/// Prover side of the hash chain: every message is absorbed and appended to `writer`.
#[derive(Debug, Clone)]
pub struct RustCryptoWriter<W: Write, D: Digest + FixedOutputReset> {
    chain: HashChain<D>,
    pub(crate) writer: W,
}

impl<W: Write + Default, D: Digest + FixedOutputReset> RustCryptoWriter<W, D> {
    pub fn init(prefix: impl AsRef<[u8]>) -> Self {
        RustCryptoWriter {
            chain: HashChain::new(prefix),
            writer: W::default(),
        }
    }
}

impl<W: Write, D: Digest + FixedOutputReset> RustCryptoWriter<W, D> {
    pub fn finalize(self) -> W {
        self.writer
    }

    fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        self.writer.write_all(data).map_err(|_| Error::Transcript)?;
        self.chain.absorb(data);
        Ok(())
    }
}

impl<W: Write, D: Digest + FixedOutputReset, F: FromUniformBytes> Writer<F>
    for RustCryptoWriter<W, D>
{
    fn write(&mut self, e: F) -> Result<(), Error> {
        self.append(&e.to_bytes())
    }
}

impl<W: Write, D: Digest + FixedOutputReset> Writer<[u8; 32]> for RustCryptoWriter<W, D> {
    fn write(&mut self, e: [u8; 32]) -> Result<(), Error> {
        self.append(&e)
    }
}

impl<W: Write, D: Digest + FixedOutputReset, F: FromUniformBytes> Challenge<F>
    for RustCryptoWriter<W, D>
{
    fn draw(&mut self) -> F {
        self.chain.field()
    }
}

impl<W: Write, D: Digest + FixedOutputReset> ChallengeBits for RustCryptoWriter<W, D> {
    fn draw_bits(&mut self, bit_size: usize) -> usize {
        self.chain.bits(bit_size)
    }
}

/// Verifier side: replays a proof stream through the same hash chain.
#[derive(Debug, Clone)]
pub struct RustCryptoReader<R: Read, D: Digest + FixedOutputReset> {
    chain: HashChain<D>,
    reader: R,
}

impl<R: Read, D: Digest + FixedOutputReset> RustCryptoReader<R, D> {
    pub fn init(reader: R, prefix: impl AsRef<[u8]>) -> Self {
        RustCryptoReader {
            chain: HashChain::new(prefix),
            reader,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut data = [0u8; N];
        self.reader
            .read_exact(&mut data)
            .map_err(|_| Error::Transcript)?;
        Ok(data)
    }
}

impl<R: Read, D: Digest + FixedOutputReset, F: FromUniformBytes> Challenge<F>
    for RustCryptoReader<R, D>
{
    fn draw(&mut self) -> F {
        self.chain.field()
    }
}

impl<R: Read, D: Digest + FixedOutputReset> ChallengeBits for RustCryptoReader<R, D> {
    fn draw_bits(&mut self, bit_size: usize) -> usize {
        self.chain.bits(bit_size)
    }
}

impl<R: Read, D: Digest + FixedOutputReset, F: FromUniformBytes> Reader<F>
    for RustCryptoReader<R, D>
{
    // Only the canonical encoding is accepted, a proof has exactly one byte form.
    fn read(&mut self) -> Result<F, Error> {
        let mut data = vec![0u8; F::NUM_BYTES];
        self.reader
            .read_exact(&mut data)
            .map_err(|_| Error::Transcript)?;
        let e = F::from_canonical_bytes(&data).ok_or_else(|| {
            tracing::warn!("non canonical field element in proof");
            Error::Transcript
        })?;
        self.chain.absorb(&data);
        Ok(e)
    }
}

impl<R: Read, D: Digest + FixedOutputReset> Reader<[u8; 32]> for RustCryptoReader<R, D> {
    fn read(&mut self) -> Result<[u8; 32], Error> {
        let data = self.take::<32>()?;
        self.chain.absorb(&data);
        Ok(data)
    }
}

#[cfg(test)]
mod test {
    use super::{RustCryptoReader, RustCryptoWriter};
    use crate::field::{Field, FromUniformBytes, Goldilocks, Mersenne61};
    use crate::hash::transcript::{Challenge, ChallengeBits, Reader, Writer};
    use crate::Error;
    use digest::{Digest, FixedOutputReset};

    fn transcript_test<F: Field + FromUniformBytes, D: Digest + FixedOutputReset>() {
        let mut rng = crate::test::seed_rng();
        let a0 = F::random(&mut rng);
        let b0 = F::random(&mut rng);
        let c0 = F::random(&mut rng);
        let mut w = RustCryptoWriter::<Vec<u8>, D>::init("");

        w.write(a0).unwrap();
        w.write(b0).unwrap();
        let _: F = Challenge::<F>::draw(&mut w);
        w.write(c0).unwrap();
        w.write([7u8; 32]).unwrap();
        let u0: F = Challenge::<F>::draw(&mut w);
        w.write(a0).unwrap();
        let i0 = w.draw_bits(8);

        let stream = w.finalize();
        let mut r = RustCryptoReader::<&[u8], D>::init(&stream, "");
        let _: F = r.read().unwrap();
        let _: F = r.read().unwrap();
        let _: F = Challenge::<F>::draw(&mut r);
        let _: F = r.read().unwrap();
        let root: [u8; 32] = r.read().unwrap();
        let u1: F = Challenge::<F>::draw(&mut r);
        let a1: F = r.read().unwrap();
        let i1 = r.draw_bits(8);

        assert_eq!(root, [7u8; 32]);
        assert_eq!(u0, u1);
        assert_eq!(i0, i1);
        assert!(i0 < 1 << 8);
        assert_eq!(a0, a1);

        let res: Result<F, Error> = r.read();
        assert_eq!(res, Err(Error::Transcript));
    }

    #[test]
    fn test_transcript() {
        transcript_test::<Goldilocks, sha2::Sha256>();
        transcript_test::<Goldilocks, sha3::Keccak256>();
        transcript_test::<Mersenne61, sha2::Sha256>();
        transcript_test::<Mersenne61, sha3::Keccak256>();
    }

    #[test]
    fn test_non_canonical_element_rejected() {
        type F = Goldilocks;
        let mut w = RustCryptoWriter::<Vec<u8>, sha2::Sha256>::init("");
        w.write(F::from_u64(3)).unwrap();
        let mut stream = w.finalize();
        let honest = stream.clone();

        // 3 + p decodes to the same value but is a different proof
        let forged = (3 + F::MODULUS as u128).to_le_bytes();
        stream[..16].copy_from_slice(&forged);
        let mut r = RustCryptoReader::<&[u8], sha2::Sha256>::init(stream.as_slice(), "");
        let res: Result<F, Error> = r.read();
        assert_eq!(res, Err(Error::Transcript));

        let mut r = RustCryptoReader::<&[u8], sha2::Sha256>::init(honest.as_slice(), "");
        let e: F = r.read().unwrap();
        assert_eq!(e, F::from_u64(3));
    }

    #[test]
    fn test_prefix_separates_chains() {
        let mut w0 = RustCryptoWriter::<Vec<u8>, sha3::Keccak256>::init("a");
        let mut w1 = RustCryptoWriter::<Vec<u8>, sha3::Keccak256>::init("b");
        let u0: Mersenne61 = w0.draw();
        let u1: Mersenne61 = w1.draw();
        assert_ne!(u0, u1);
    }
}
