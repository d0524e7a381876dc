//! Shared-permutation shuffle for parallel columns.

use crate::error::ApiError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Where shuffle entropy comes from, if shuffling at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "seed")]
pub enum ShuffleMode {
    Off,
    #[default]
    System,
    Seeded(u64),
}

impl ShuffleMode {
    /// A fresh generator for this mode, or `None` when shuffling is off.
    pub fn rng(&self) -> Option<StdRng> {
        match self {
            ShuffleMode::Off => None,
            ShuffleMode::System => Some(StdRng::from_entropy()),
            ShuffleMode::Seeded(seed) => Some(StdRng::seed_from_u64(*seed)),
        }
    }

    /// True when two runs with the same input produce the same order.
    pub fn is_reproducible(&self) -> bool {
        !matches!(self, ShuffleMode::System)
    }
}

/// Apply one uniformly random permutation to every sequence.
///
/// `output[k][i] == input[k][perm[i]]` for every sequence `k`, so values that
/// shared a position before the shuffle still share one afterwards.
pub fn shuffle_together<T, R>(
    sequences: Vec<Vec<T>>,
    rng: &mut R,
) -> Result<Vec<Vec<T>>, ApiError>
where
    R: Rng + ?Sized,
{
    let len = match sequences.first() {
        Some(first) => first.len(),
        None => return Ok(sequences),
    };
    if let Some((k, seq)) = sequences.iter().enumerate().find(|(_, s)| s.len() != len) {
        return Err(ApiError::Precondition(format!(
            "Sequences must share one length: sequence 0 has {}, sequence {} has {}",
            len,
            k,
            seq.len()
        )));
    }

    let mut perm: Vec<usize> = (0..len).collect();
    perm.shuffle(rng);

    // dest[src] = output position of input element `src`
    let mut dest = vec![0usize; len];
    for (i, &src) in perm.iter().enumerate() {
        dest[src] = i;
    }

    let shuffled = sequences
        .into_iter()
        .map(|seq| {
            let mut tagged: Vec<(usize, T)> = dest.iter().copied().zip(seq).collect();
            tagged.sort_unstable_by_key(|(pos, _)| *pos);
            tagged.into_iter().map(|(_, value)| value).collect()
        })
        .collect();
    Ok(shuffled)
}
