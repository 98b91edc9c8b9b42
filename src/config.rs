use crate::error::{Error, Result};

pub const DEFAULT_MIN_LEN: usize = 2;
pub const DEFAULT_MAX_LEN: usize = 40;
pub const DEFAULT_NUM_CHUNKS: usize = 10;
pub const DEFAULT_CANDIDATES: usize = 5;

/// Tuning for key length estimation and key recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Shortest key length considered.
    pub min_len: usize,
    /// Longest key length considered.
    pub max_len: usize,
    /// Leading chunks compared per candidate length.
    pub num_chunks: usize,
    /// Ranked key lengths solved before picking the best plaintext.
    pub candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            num_chunks: DEFAULT_NUM_CHUNKS,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

impl Config {
    pub fn with_key_lengths(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn with_num_chunks(mut self, num_chunks: usize) -> Self {
        self.num_chunks = num_chunks;
        self
    }

    pub fn with_candidates(mut self, candidates: usize) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_len < 1 {
            return Err(Error::invalid_input(format!(
                "min_len must be at least 1, got {}",
                self.min_len
            )));
        }

        if self.max_len < self.min_len {
            return Err(Error::invalid_input(format!(
                "max_len ({}) is smaller than min_len ({})",
                self.max_len, self.min_len
            )));
        }

        if self.num_chunks < 2 {
            return Err(Error::invalid_input(format!(
                "num_chunks must be at least 2, got {}",
                self.num_chunks
            )));
        }

        if self.candidates < 1 {
            return Err(Error::invalid_input("candidates must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_len, 2);
        assert_eq!(config.max_len, 40);
        assert_eq!(config.num_chunks, 10);
        assert_eq!(config.candidates, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        let config = Config::default().with_key_lengths(0, 10);
        assert!(config.validate().is_err());

        let config = Config::default().with_key_lengths(8, 4);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: max_len (4) is smaller than min_len (8)"
        );

        let config = Config::default().with_num_chunks(1);
        assert!(config.validate().is_err());

        let config = Config::default().with_candidates(0);
        assert!(config.validate().is_err());
    }
}
