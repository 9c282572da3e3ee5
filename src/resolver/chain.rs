//! Depth-bounded indirection.
//!
//! Texture slots point at other slots and models point at parent models.
//! Both are walked with [`follow_chain`], which gives up after a fixed
//! number of hops instead of trusting the data to be acyclic.

/// Result of looking up one link.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<K, T> {
    /// Keep going from this key.
    Next(K),
    /// The chain ended here.
    Done(T),
    /// The key does not exist.
    Missing,
}

/// Why a chain did not terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// More than `max_depth` hops, usually a cycle.
    TooDeep,
    /// A link referred to a key that does not exist.
    Missing,
}

/// Follow `lookup` from `start` until it reports [`Step::Done`].
///
/// `lookup` is called at most `max_depth + 1` times.
pub fn follow_chain<K, T, F>(start: K, max_depth: usize, mut lookup: F) -> Result<T, ChainError>
where
    F: FnMut(&K) -> Step<K, T>,
{
    let mut key = start;
    for _ in 0..=max_depth {
        match lookup(&key) {
            Step::Next(next) => key = next,
            Step::Done(value) => return Ok(value),
            Step::Missing => return Err(ChainError::Missing),
        }
    }
    Err(ChainError::TooDeep)
}
