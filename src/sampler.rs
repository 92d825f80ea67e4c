use rand::Rng;

use crate::{IndexSampler, error::LotteryError, lottery::LotteryBox};

/// Uniform index sampler: picks an index in `0..n` with equal probability.
#[derive(Debug, Clone, Copy)]
pub struct UniformSampler {
    n: u64,
}

impl UniformSampler {
    pub fn new(n: u64) -> Result<Self, LotteryError> {
        if n == 0 {
            return Err(LotteryError::EmptyBox);
        }
        Ok(Self { n })
    }
}

impl IndexSampler for UniformSampler {
    #[inline]
    fn len(&self) -> u64 {
        self.n
    }
    #[inline]
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random_range(0..self.n)
    }
}

/// A box is sampled uniformly over its flat positions.
impl<T> IndexSampler for LotteryBox<'_, T> {
    #[inline]
    fn len(&self) -> u64 {
        // call the inherent method explicitly to avoid trait-recursion
        LotteryBox::len(self)
    }
    #[inline]
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        self.sampler().sample_index(rng)
    }
}
