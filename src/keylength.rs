use crate::config::Config;
use crate::error::Result;
use itertools::Itertools;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// A key length hypothesis. Lower scores fit better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCandidate {
    pub length: usize,
    pub score: f64,
}

impl KeyCandidate {
    fn rank(&self, other: &KeyCandidate) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.length.cmp(&other.length))
    }
}

/// Number of differing bits between two byte sequences of equal length.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Mean Hamming distance per byte between adjacent leading chunks of
/// `length` bytes, or `None` when fewer than two whole chunks fit.
pub fn normalized_distance(ciphertext: &[u8], length: usize, num_chunks: usize) -> Option<f64> {
    if length == 0 {
        return None;
    }

    let chunks: Vec<&[u8]> = ciphertext.chunks_exact(length).take(num_chunks).collect();
    if chunks.len() < 2 {
        return None;
    }

    let distances: Vec<f64> = chunks
        .iter()
        .tuple_windows()
        .map(|(a, b)| hamming_distance(a, b) as f64 / length as f64)
        .collect();

    Some(distances.iter().sum::<f64>() / distances.len() as f64)
}

/// Ranks every key length in `config.min_len..=config.max_len`, best first.
///
/// Lengths too long for two chunks are left out, so a short ciphertext can
/// produce an empty ranking. A multiple of the true length often scores as
/// well as the length itself, which is why the whole ranking is returned.
pub fn estimate(ciphertext: &[u8], config: &Config) -> Result<Vec<KeyCandidate>> {
    config.validate()?;

    let mut candidates: Vec<KeyCandidate> = (config.min_len..=config.max_len)
        .into_par_iter()
        .filter_map(|length| {
            normalized_distance(ciphertext, length, config.num_chunks)
                .map(|score| KeyCandidate { length, score })
        })
        .collect();

    candidates.sort_by(KeyCandidate::rank);

    let leading: Vec<(usize, f64)> = candidates
        .iter()
        .take(5)
        .map(|c| (c.length, c.score))
        .collect();
    debug!(len = ciphertext.len(), ranked = ?leading, "estimated key lengths");

    Ok(candidates)
}
