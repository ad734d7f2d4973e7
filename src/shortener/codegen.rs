//! Deterministic short code generation.
//!
//! A short code is the base-62 representation of a record id, left-padded
//! with `'0'` to [`CODE_LENGTH`] characters.

/// Digit alphabet: `0-9`, then `a-z`, then `A-Z`
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Minimum width of a generated code
pub const CODE_LENGTH: usize = 6;

/// Number of ids that fit in [`CODE_LENGTH`] digits (62^6)
pub const CODE_SPACE: u64 = 56_800_235_584;

const BASE: u64 = ALPHABET.len() as u64;

/// Encode `id` as a zero-padded base-62 string.
///
/// Ids at or above [`CODE_SPACE`] produce codes longer than six characters
/// rather than wrapping, so distinct ids always yield distinct codes.
pub fn generate_short_code(mut id: u64) -> String {
    let mut digits = Vec::with_capacity(CODE_LENGTH);
    while id > 0 {
        digits.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    while digits.len() < CODE_LENGTH {
        digits.push(ALPHABET[0]);
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_alphabet(c: char) -> bool {
        c.is_ascii_alphanumeric()
    }

    #[test]
    fn test_zero_is_all_padding() {
        assert_eq!(generate_short_code(0), "000000");
    }

    #[test]
    fn test_known_values() {
        assert_eq!(generate_short_code(1), "000001");
        assert_eq!(generate_short_code(9), "000009");
        assert_eq!(generate_short_code(10), "00000a");
        assert_eq!(generate_short_code(35), "00000z");
        assert_eq!(generate_short_code(36), "00000A");
        assert_eq!(generate_short_code(61), "00000Z");
        assert_eq!(generate_short_code(62), "000010");
        assert_eq!(generate_short_code(62 * 62), "000100");
        assert_eq!(generate_short_code(125), "000021");
    }

    #[test]
    fn test_upper_bound_of_six_digits() {
        assert_eq!(CODE_SPACE, BASE.pow(CODE_LENGTH as u32));
        assert_eq!(generate_short_code(CODE_SPACE - 1), "ZZZZZZ");
        assert_eq!(generate_short_code(CODE_SPACE), "1000000");
    }

    #[test]
    fn test_deterministic() {
        for id in [0, 1, 61, 62, 3_843, 916_132_831, CODE_SPACE - 1] {
            assert_eq!(generate_short_code(id), generate_short_code(id));
        }
    }

    #[test]
    fn test_length_and_alphabet_across_range() {
        let samples = (0..100_000u64)
            .chain((0..1_000u64).map(|i| i * 56_800_235 + 7))
            .chain(CODE_SPACE - 1_000..CODE_SPACE);

        for id in samples {
            let code = generate_short_code(id);
            assert_eq!(code.len(), CODE_LENGTH, "id {id} produced {code}");
            assert!(code.chars().all(is_alphabet), "id {id} produced {code}");
        }
    }

    #[test]
    fn test_distinct_ids_give_distinct_codes() {
        let codes: HashSet<String> = (0..(62 * 62 * 2)).map(generate_short_code).collect();
        assert_eq!(codes.len(), 62 * 62 * 2);
    }

    #[test]
    fn test_decodes_back_to_id() {
        // Positional value check: reading the code as base-62 gives the id back
        for id in [0u64, 1, 62, 12_345, 987_654_321, CODE_SPACE - 1] {
            let code = generate_short_code(id);
            let value = code.bytes().fold(0u64, |acc, b| {
                let digit = ALPHABET.iter().position(|&a| a == b).unwrap() as u64;
                acc * BASE + digit
            });
            assert_eq!(value, id);
        }
    }
}
