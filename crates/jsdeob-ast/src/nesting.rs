//! Bracket-nesting prefilter (§4.1).
//!
//! Scans the first 100,000 bytes of a source buffer counting matched
//! `[ ( {` / `) } ]` pairs, returning the maximum nesting depth observed.
//! Returns early once the running depth exceeds `cap`, since callers only
//! ever want to know "is this too deep", not the exact maximum.

const SCAN_WINDOW: usize = 100_000;

/// Compute the maximum bracket-nesting depth in `source`, capped at `cap`.
///
/// This is a prefilter, not a parser: it does not understand strings,
/// comments, template literals, or regex literals, so it can over-count in
/// adversarial inputs. That is acceptable for a conservative reject-early
/// gate ahead of the real parser.
pub fn nesting_depth(source: &str, cap: usize) -> usize {
    let bytes = source.as_bytes();
    let window = &bytes[..bytes.len().min(SCAN_WINDOW)];

    let mut depth: usize = 0;
    let mut max_depth: usize = 0;

    for &byte in window {
        match byte {
            b'(' | b'[' | b'{' => {
                depth += 1;
                if depth > max_depth {
                    max_depth = depth;
                }
                if max_depth > cap {
                    return max_depth;
                }
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_source_has_zero_depth() {
        assert_eq!(nesting_depth("var x = 1;", 500), 0);
    }

    #[test]
    fn counts_matched_brackets() {
        assert_eq!(nesting_depth("f(g(h(1)))", 500), 3);
    }

    #[test]
    fn stops_early_past_cap() {
        let deeply_nested: String = "[".repeat(600) + "]".repeat(600).as_str();
        let depth = nesting_depth(&deeply_nested, 500);
        assert!(depth > 500);
    }

    #[test]
    fn exactly_at_cap_is_not_rejected() {
        let nested: String = "[".repeat(500) + "]".repeat(500).as_str();
        assert_eq!(nesting_depth(&nested, 500), 500);
    }
}
