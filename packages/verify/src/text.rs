//! Fuzzy string comparison for registry field matching.

use std::collections::HashMap;

/// Classic fuzzy ratio between two strings, 0-100.
///
/// Computed as `2 * M / T * 100` where `M` is the total length of the
/// longest matching blocks and `T` is the combined length, the same
/// measure `difflib.SequenceMatcher` produces. Inputs are trimmed and
/// lowercased before comparison; a blank side always scores 0.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matched = total_match_length(&a, &b);
    #[allow(clippy::cast_precision_loss)] // field strings are short
    let ratio = 2.0 * matched as f64 / (a.len() + b.len()) as f64;
    ratio * 100.0
}

/// Sums the sizes of all matching blocks by recursively splitting around
/// the longest match, tracked with an explicit queue.
fn total_match_length(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

/// Finds the longest block `a[i..i+size] == b[j..j+size]` within the
/// given windows. `j2len` carries run lengths ending at each `j` of the
/// previous `i` row.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(indices) = b2j.get(&a[i]) {
            // Indices are ascending, everything past bhi can be skipped.
            for &j in indices {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let size = if j == 0 {
                    1
                } else {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                new_j2len.insert(j, size);
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            }
        }
        j2len = new_j2len;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ratio(a: &str, b: &str, expected: f64) {
        let ratio = similarity_ratio(a, b);
        assert!((ratio - expected).abs() < 1e-9, "{a:?} vs {b:?}: {ratio}");
    }

    #[test]
    fn identical_strings_score_100() {
        assert_ratio("corolla", "corolla", 100.0);
    }

    #[test]
    fn classic_reference_pair_scores_75() {
        // One "bcd" block, 2 * 3 / 8.
        assert_ratio("abcd", "bcde", 75.0);
    }

    #[test]
    fn disjoint_strings_score_0() {
        assert_ratio("abc", "xyz", 0.0);
    }

    #[test]
    fn comparison_ignores_case_and_surrounding_whitespace() {
        assert_ratio("  Toyota ", "toyota", 100.0);
    }

    #[test]
    fn blank_sides_score_0() {
        assert_ratio("", "corolla", 0.0);
        assert_ratio("corolla", "   ", 0.0);
        assert_ratio("", "", 0.0);
    }

    #[test]
    fn single_letter_difference_scores_high() {
        // "toyo" block of 4 plus the trailing "a", 2*5/12.
        let expected = 2.0 * 5.0 / 12.0 * 100.0;
        assert_ratio("toyota", "toyoda", expected);
    }

    #[test]
    fn repeated_characters_are_counted_blockwise() {
        assert_ratio("aaaa", "aa", 2.0 * 2.0 / 6.0 * 100.0);
    }

    #[test]
    fn devanagari_strings_compare_by_codepoint() {
        assert_ratio("राम बहादुर", "राम बहादुर", 100.0);
        assert!(similarity_ratio("राम बहादुर", "राम कुमार") > 40.0);
    }
}
