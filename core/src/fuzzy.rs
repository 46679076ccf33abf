use rapidfuzz::fuzz;
use std::collections::BTreeSet;

/// Approximate string similarity on a 0-100 scale.
pub trait FuzzyRatio: Send + Sync {
    /// Best alignment of the shorter string inside the longer one.
    fn partial_ratio(&self, a: &str, b: &str) -> u8;
    /// Similarity of the whitespace token sets, insensitive to order and repeats.
    fn token_set_ratio(&self, a: &str, b: &str) -> u8;
}

/// [`FuzzyRatio`] backed by rapidfuzz's normalized Indel ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RapidFuzz;

// fuzz::ratio is normalized to [0, 1]; scores here are on a 0-100 scale.
fn ratio(a: &str, b: &str) -> f64 { fuzz::ratio(a.chars(), b.chars()) * 100.0 }

fn window_ratio(needle: &[char], window: &[char]) -> f64 {
    fuzz::ratio(needle.iter().copied(), window.iter().copied()) * 100.0
}

fn to_score(r: f64) -> u8 { r.round().clamp(0.0, 100.0) as u8 }

impl FuzzyRatio for RapidFuzz {
    fn partial_ratio(&self, a: &str, b: &str) -> u8 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        if short.is_empty() {
            return if long.is_empty() { 100 } else { 0 };
        }

        let n = short.len();
        let mut best = 0.0f64;
        for start in 0..=long.len() - n {
            best = best.max(window_ratio(short, &long[start..start + n]));
            if best >= 100.0 {
                return 100;
            }
        }
        // Needle hanging off either edge of the haystack.
        for len in 1..n.min(long.len()) {
            best = best.max(window_ratio(short, &long[..len]));
            best = best.max(window_ratio(short, &long[long.len() - len..]));
        }
        to_score(best)
    }

    fn token_set_ratio(&self, a: &str, b: &str) -> u8 {
        let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
        let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0;
        }

        let sect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
        let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
        let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();
        if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
            return 100;
        }

        let sect = sect.join(" ");
        let with_sect = |diff: &[&str]| {
            let diff = diff.join(" ");
            if sect.is_empty() { diff } else { format!("{sect} {diff}") }
        };
        let sect_ab = with_sect(&diff_ab);
        let sect_ba = with_sect(&diff_ba);

        let mut best = ratio(&sect_ab, &sect_ba);
        if !sect.is_empty() {
            best = best.max(ratio(&sect, &sect_ab)).max(ratio(&sect, &sect_ba));
        }
        to_score(best)
    }
}
