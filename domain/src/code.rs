//! Short-code generation strategies.

use crate::base62::random_string;
use crate::{Code, CodeGenerator};

/// Default short-code length.
pub const DEFAULT_CODE_LEN: usize = 6;

/// Uniform random base62 codes of a fixed length, drawn from the thread RNG.
#[derive(Clone, Copy, Debug)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    /// `length` must be non-zero; configuration rejects zero before this is built.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LEN)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn next_code(&self) -> Code {
        // Non-empty and alphanumeric by construction
        Code(random_string(&mut rand::thread_rng(), self.length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_configured_length_and_alphabet() {
        for len in [1, 6, 10] {
            let g = RandomCodeGenerator::new(len);
            for _ in 0..200 {
                let c = g.next_code();
                assert_eq!(c.as_str().len(), len);
                assert!(c.as_str().chars().all(|ch| ch.is_ascii_alphanumeric()));
            }
        }
    }

    #[test]
    fn default_length_is_six() {
        assert_eq!(RandomCodeGenerator::default().next_code().as_str().len(), 6);
    }

    #[test]
    fn zero_length_is_clamped() {
        assert_eq!(RandomCodeGenerator::new(0).next_code().as_str().len(), 1);
    }

    #[test]
    fn codes_are_spread_out() {
        let g = RandomCodeGenerator::default();
        let codes: HashSet<String> = (0..500).map(|_| g.next_code().as_str().to_string()).collect();
        // 62^6 possibilities; a handful of duplicates would indicate a broken RNG
        assert!(codes.len() >= 495);
    }
}
