//! Scoring byte buffers for how much they look like English text.
//!
//! Every scorer is total over arbitrary bytes: invalid UTF-8, control bytes
//! and high-bit bytes are scored (usually badly), never rejected.

use crate::lexicon::{Lexicon, DEFAULT_PHRASE_THRESHOLD};
use std::cmp::Ordering;

/// Letters of English ordered from most to least frequent (Lewand).
pub const ETAOIN: &[u8; 26] = b"etaoinshrdlcumwfgypbvkjxqz";

/// Percentage of each letter `a..=z` among the letters of English text.
pub const LETTER_FREQUENCIES: [f64; 26] = [
    8.17, 1.29, 2.78, 4.25, 12.70, 2.23, 2.02, 6.09, 6.97, 0.15, 0.77, 4.03, 2.41, 6.75, 7.51,
    1.93, 0.10, 5.99, 6.33, 9.06, 2.76, 0.98, 2.36, 0.15, 1.97, 0.07,
];

/// Fraction of all characters in English text that are spaces.
pub const SPACE_FREQUENCY: f64 = 0.1918;

/// Added per printable byte that is neither a letter nor a space.
pub const PUNCTUATION_PENALTY: f64 = 5.0;

/// Added per control, DEL or non-ASCII byte.
pub const NON_TEXT_PENALTY: f64 = 50.0;

const MATCH_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

pub trait Scorer: Sync {
    fn score(&self, buffer: &[u8]) -> f64;

    fn polarity(&self) -> Polarity;

    /// Whether a score for a `len`-byte buffer is good enough to trust.
    fn is_plausible(&self, score: f64, len: usize) -> bool;

    /// Whether the score means anything for a transposed column, whose
    /// bytes are every n-th byte of the text rather than running text.
    fn ranks_columns(&self) -> bool {
        true
    }

    fn worst(&self) -> f64 {
        match self.polarity() {
            Polarity::HigherIsBetter => 0.0,
            Polarity::LowerIsBetter => f64::MAX,
        }
    }

    /// `Ordering::Less` when `a` is the better score.
    fn rank(&self, a: f64, b: f64) -> Ordering {
        match self.polarity() {
            Polarity::HigherIsBetter => b.total_cmp(&a),
            Polarity::LowerIsBetter => a.total_cmp(&b),
        }
    }

    fn is_better(&self, a: f64, b: f64) -> bool {
        self.rank(a, b) == Ordering::Less
    }
}

impl<'a, S: Scorer + ?Sized> Scorer for &'a S {
    fn score(&self, buffer: &[u8]) -> f64 {
        (**self).score(buffer)
    }

    fn polarity(&self) -> Polarity {
        (**self).polarity()
    }

    fn is_plausible(&self, score: f64, len: usize) -> bool {
        (**self).is_plausible(score, len)
    }

    fn ranks_columns(&self) -> bool {
        (**self).ranks_columns()
    }
}

fn fold_letter(byte: u8) -> Option<usize> {
    let lower = byte.to_ascii_lowercase();
    if lower.is_ascii_lowercase() {
        Some((lower - b'a') as usize)
    } else {
        None
    }
}

/// Counts of `a..=z` only. Uppercase is not folded, so a key byte and its
/// case-flipped twin (`k ^ 0x20`) score differently.
fn lowercase_counts(buffer: &[u8]) -> [usize; 26] {
    let mut counts = [0; 26];
    for &byte in buffer.iter().filter(|b| b.is_ascii_lowercase()) {
        counts[(byte - b'a') as usize] += 1;
    }
    counts
}

/// Lowercase letters `a..=z` ordered by descending count in `buffer`.
///
/// Letters with equal counts are placed in reverse English order, so a tie
/// never earns a match it did not observe.
pub fn frequency_order(buffer: &[u8]) -> [u8; 26] {
    let counts = lowercase_counts(buffer);
    let etaoin_rank = |letter: u8| ETAOIN.iter().position(|&c| c == letter).unwrap_or(0);

    let mut order: [u8; 26] = [0; 26];
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = b'a' + i as u8;
    }

    order.sort_by(|&a, &b| {
        let count_a = counts[(a - b'a') as usize];
        let count_b = counts[(b - b'a') as usize];
        count_b
            .cmp(&count_a)
            .then_with(|| etaoin_rank(b).cmp(&etaoin_rank(a)))
    });

    order
}

/// Counts how many of the six most and six least common English letters
/// sit at the same end of the observed frequency order. Ranges 0..=12.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyOrder;

impl Scorer for FrequencyOrder {
    fn score(&self, buffer: &[u8]) -> f64 {
        let order = frequency_order(buffer);
        let (top, bottom) = (&order[..MATCH_WINDOW], &order[26 - MATCH_WINDOW..]);

        let common = ETAOIN[..MATCH_WINDOW]
            .iter()
            .filter(|letter| top.contains(letter))
            .count();
        let uncommon = ETAOIN[26 - MATCH_WINDOW..]
            .iter()
            .filter(|letter| bottom.contains(letter))
            .count();

        (common + uncommon) as f64
    }

    fn polarity(&self) -> Polarity {
        Polarity::HigherIsBetter
    }

    fn is_plausible(&self, score: f64, _len: usize) -> bool {
        score > 0.0
    }
}

/// Pearson's chi-squared statistic of letter and space counts against
/// English, plus fixed penalties for bytes outside that alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiSquared;

impl ChiSquared {
    /// Expected fraction of each of `a..=z`, then space.
    pub fn expected() -> [f64; 27] {
        let mut expected = [0.0; 27];
        for (slot, pct) in expected.iter_mut().zip(LETTER_FREQUENCIES.iter()) {
            *slot = pct / 100.0 * (1.0 - SPACE_FREQUENCY);
        }
        expected[26] = SPACE_FREQUENCY;
        expected
    }
}

impl Scorer for ChiSquared {
    fn score(&self, buffer: &[u8]) -> f64 {
        if buffer.is_empty() {
            return self.worst();
        }

        let mut observed = [0usize; 27];
        let mut penalty = 0.0;

        for &byte in buffer {
            match byte {
                b' ' => observed[26] += 1,
                b'\t' | b'\n' | b'\r' => penalty += PUNCTUATION_PENALTY,
                _ => match fold_letter(byte) {
                    Some(index) => observed[index] += 1,
                    None if byte.is_ascii_graphic() => penalty += PUNCTUATION_PENALTY,
                    None => penalty += NON_TEXT_PENALTY,
                },
            }
        }

        let total = buffer.len() as f64;
        let statistic: f64 = Self::expected()
            .iter()
            .zip(observed.iter())
            .map(|(fraction, &count)| {
                let expected = fraction * total;
                let diff = count as f64 - expected;
                diff * diff / expected
            })
            .sum();

        statistic + penalty
    }

    fn polarity(&self) -> Polarity {
        Polarity::LowerIsBetter
    }

    fn is_plausible(&self, score: f64, len: usize) -> bool {
        score < NON_TEXT_PENALTY * len as f64
    }
}

/// Number of dictionary words in the buffer, read as Latin-1.
///
/// Only meaningful on whole messages, e.g. with
/// [`detect_single_byte_xor`](crate::cipher::detect_single_byte_xor). A
/// transposed column holds no whole words, so `Breaker` refuses this scorer.
#[derive(Debug, Clone, Copy)]
pub struct PhraseScorer<'a> {
    lexicon: &'a Lexicon,
    threshold: usize,
}

impl<'a> PhraseScorer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self::with_threshold(lexicon, DEFAULT_PHRASE_THRESHOLD)
    }

    pub fn with_threshold(lexicon: &'a Lexicon, threshold: usize) -> Self {
        Self { lexicon, threshold }
    }
}

impl<'a> Scorer for PhraseScorer<'a> {
    fn score(&self, buffer: &[u8]) -> f64 {
        let text: String = buffer.iter().map(|&b| b as char).collect();
        self.lexicon.english_word_count(&text) as f64
    }

    fn polarity(&self) -> Polarity {
        Polarity::HigherIsBetter
    }

    fn is_plausible(&self, score: f64, _len: usize) -> bool {
        score >= self.threshold as f64
    }

    fn ranks_columns(&self) -> bool {
        false
    }
}
