use crate::encoding::ByteArray;
use crate::error::Result;
use crate::score::Scorer;
use rayon::prelude::*;
use tracing::trace;

/// One single-byte XOR hypothesis and how English its output looks.
#[derive(Debug, Clone, PartialEq)]
pub struct XorGuess {
    pub plaintext: Vec<u8>,
    pub key: u8,
    pub score: f64,
}

fn xor_byte(buffer: &[u8], key: u8) -> Vec<u8> {
    buffer.iter().map(|b| b ^ key).collect()
}

/// XORs `buffer` with every byte value and scores each result.
///
/// Always returns 256 guesses ordered by key byte. An empty buffer yields
/// empty plaintexts carrying the scorer's worst score.
pub fn solve<S: Scorer>(buffer: &[u8], scorer: &S) -> Vec<XorGuess> {
    (0..=255u8)
        .into_par_iter()
        .map(|key| {
            let plaintext = xor_byte(buffer, key);
            let score = if plaintext.is_empty() {
                scorer.worst()
            } else {
                scorer.score(&plaintext)
            };

            XorGuess {
                plaintext,
                key,
                score,
            }
        })
        .collect()
}

/// Best guess in `guesses`; on equal scores the earlier one wins.
pub fn best_guess<S: Scorer>(guesses: Vec<XorGuess>, scorer: &S) -> Option<XorGuess> {
    guesses.into_iter().fold(None, |best, guess| match best {
        Some(best) if !scorer.is_better(guess.score, best.score) => Some(best),
        _ => Some(guess),
    })
}

/// Brute-forces the single key byte of `buffer`. Ties go to the smaller byte.
pub fn find_key<S: Scorer>(buffer: &[u8], scorer: &S) -> XorGuess {
    match best_guess(solve(buffer, scorer), scorer) {
        Some(guess) => guess,
        None => XorGuess {
            plaintext: Vec::new(),
            key: 0,
            score: scorer.worst(),
        },
    }
}

/// The ciphertext most likely to be single-byte XOR'd English.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub index: usize,
    pub guess: XorGuess,
}

/// Solves every ciphertext and keeps the one whose best guess scores best.
/// Ties go to the earlier ciphertext.
pub fn detect_single_byte_xor<S: Scorer>(
    ciphertexts: &[Vec<u8>],
    scorer: &S,
) -> Option<Detection> {
    let detections: Vec<Detection> = ciphertexts
        .par_iter()
        .enumerate()
        .map(|(index, ciphertext)| Detection {
            index,
            guess: find_key(ciphertext, scorer),
        })
        .collect();

    detections.into_iter().fold(None, |best, detection| {
        trace!(
            index = detection.index,
            key = detection.guess.key,
            score = detection.guess.score,
            "best single-byte guess"
        );

        match best {
            Some(best) if !scorer.is_better(detection.guess.score, best.guess.score) => Some(best),
            _ => Some(detection),
        }
    })
}

/// Repeating-key XOR of `plaintext` under `key`, hex encoded.
pub fn encrypt(plaintext: &str, key: &str) -> Result<String> {
    let data = ByteArray::from_string(plaintext);
    Ok(data.repeating_xor(key.as_bytes())?.hex())
}
