//! Base62 alphabet used for short codes.

use rand::Rng;

pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draw `len` characters uniformly from the alphabet.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn alphabet_is_62_distinct_alnum() {
        let mut seen = std::collections::HashSet::new();
        for b in ALPHABET {
            assert!(b.is_ascii_alphanumeric());
            assert!(seen.insert(*b));
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn random_string_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_string(&mut rng, 0), "");
        let s = random_string(&mut rng, 12);
        assert_eq!(s.len(), 12);
        assert!(s.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn same_seed_same_output() {
        let a = random_string(&mut StdRng::seed_from_u64(42), 8);
        let b = random_string(&mut StdRng::seed_from_u64(42), 8);
        assert_eq!(a, b);
    }
}
