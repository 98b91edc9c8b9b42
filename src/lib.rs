//! Statistical cryptanalysis of repeating-key XOR.
//!
//! Given only ciphertext, [`estimate_key_length`] ranks likely key lengths
//! and [`break_repeating_key_xor`] recovers the key and the plaintext.

pub mod breaker;
pub mod cipher;
pub mod config;
pub mod encoding;
pub mod error;
pub mod keylength;
pub mod lexicon;
pub mod score;
pub mod transpose;

pub use crate::breaker::{Breaker, Broken};
pub use crate::cipher::XorGuess;
pub use crate::config::Config;
pub use crate::encoding::ByteArray;
pub use crate::error::{Error, Result};
pub use crate::keylength::KeyCandidate;
pub use crate::lexicon::Lexicon;
pub use crate::score::{ChiSquared, FrequencyOrder, PhraseScorer, Scorer};

/// Ranks key lengths in `min_len..=max_len` for `ciphertext`, best first.
pub fn estimate_key_length(
    ciphertext: &[u8],
    min_len: usize,
    max_len: usize,
) -> Result<Vec<KeyCandidate>> {
    let config = Config::default().with_key_lengths(min_len, max_len);
    Breaker::new(config, ChiSquared).estimate(ciphertext)
}

/// Recovers the key of a repeating-key XOR ciphertext and decrypts it.
pub fn break_repeating_key_xor(
    ciphertext: &[u8],
    min_len: usize,
    max_len: usize,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let config = Config::default().with_key_lengths(min_len, max_len);
    let broken = Breaker::new(config, ChiSquared).break_cipher(ciphertext)?;
    Ok((broken.key, broken.plaintext))
}
