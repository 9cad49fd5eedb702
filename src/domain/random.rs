//! Random source for draws.
//!
//! Draws must not be predictable or reproducible by the class, so the
//! production source reads the operating system's entropy pool rather than
//! a seeded generator. The trait exists so tests can substitute a
//! deterministic double.

use rand::Rng;
use rand::rngs::OsRng;

/// Produces uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Returns an integer in `[0, bound)`, uniformly distributed.
    ///
    /// `bound == 0` returns `0`; callers must not rely on that value for a
    /// meaningful draw.
    fn index(&self, bound: usize) -> usize;
}

/// Random source backed by [`OsRng`].
///
/// `gen_range` samples with rejection, so there is no modulo bias for
/// bounds that do not divide the generator's range.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl OsRandomSource {
    /// Creates a new OS-backed random source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandomSource {
    fn index(&self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        OsRng.gen_range(0..bound)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for std::sync::Arc<T> {
    fn index(&self, bound: usize) -> usize {
        (**self).index(bound)
    }
}
