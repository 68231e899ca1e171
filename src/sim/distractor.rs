//! Distractor selection
//!
//! Picks wrong-answer definitions for a round from the other pairs. Pure:
//! all randomness comes from the caller's RNG.

use rand::Rng;

use super::pairs::Pair;

/// In-place Fisher-Yates: for i from last down to 1, swap with j in [0, i]
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Select up to `count` distractor definitions for the pair at `correct_index`.
///
/// Excludes the correct pair, any pair whose definition equals the correct
/// text, and repeated texts among the remaining pairs. Returns fewer than
/// `count` when not enough eligible definitions exist.
pub fn pick_distractors<R: Rng + ?Sized>(
    pairs: &[Pair],
    correct_index: usize,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let Some(correct) = pairs.get(correct_index) else {
        return Vec::new();
    };

    let mut eligible: Vec<&str> = Vec::with_capacity(pairs.len());
    for (i, pair) in pairs.iter().enumerate() {
        let text = pair.definition.as_str();
        if i == correct_index || text == correct.definition || eligible.contains(&text) {
            continue;
        }
        eligible.push(text);
    }

    shuffle(&mut eligible, rng);
    eligible.truncate(count);
    eligible.into_iter().map(str::to_owned).collect()
}
