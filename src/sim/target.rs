//! Rounds and the falling definition targets
//!
//! A round shows one term; its candidates (correct definition + distractors)
//! each become a target that drifts down the field carrying a text label.

use glam::Vec2;
use rand::Rng;

use super::collision::Aabb;
use super::distractor::{pick_distractors, shuffle};
use super::pairs::PairSet;
use crate::settings::Settings;

/// One displayed definition for the active round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub correct: bool,
}

/// One cycle of term + candidates + a single resolving shot
#[derive(Debug, Clone)]
pub struct Round {
    /// Index into the pair set
    pub index: usize,
    pub term: String,
    /// Shuffled display order
    pub candidates: Vec<Candidate>,
}

impl Round {
    /// Build round `index`: pick distractors, mix in the correct definition, shuffle.
    ///
    /// Correctness is text equality with the pair's definition, so a candidate
    /// that repeats the correct text also counts as correct.
    pub fn build<R: Rng + ?Sized>(
        pairs: &PairSet,
        index: usize,
        distractor_count: usize,
        rng: &mut R,
    ) -> Option<Self> {
        let pair = pairs.get(index)?;
        let mut texts = vec![pair.definition.clone()];
        texts.extend(pick_distractors(pairs.as_slice(), index, distractor_count, rng));
        shuffle(&mut texts, rng);

        let candidates = texts
            .into_iter()
            .map(|text| Candidate {
                correct: text == pair.definition,
                text,
            })
            .collect();

        Some(Self {
            index,
            term: pair.term.clone(),
            candidates,
        })
    }

    pub fn correct_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.correct).count()
    }
}

/// Target lifecycle (destroyed targets are removed from the live set)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLifecycle {
    /// Created this frame, not yet stepped
    Spawned,
    /// Stepped at least once
    Live,
}

/// Text label attached to a target; follows the body every tick
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub pos: Vec2,
}

/// A falling definition body
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub label: Label,
    pub correct: bool,
    pub lifecycle: TargetLifecycle,
}

impl Target {
    pub fn definition(&self) -> &str {
        &self.label.text
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Move the label onto the body
    #[inline]
    pub fn sync_label(&mut self) {
        self.label.pos = self.pos;
    }
}

/// Random velocity: small horizontal jitter, fixed downward speed
pub fn random_velocity<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Vec2 {
    let jitter = settings.target_jitter.max(0.0);
    let vx = if jitter > 0.0 {
        rng.random_range(-jitter..=jitter)
    } else {
        0.0
    };
    Vec2::new(vx, settings.target_speed)
}

/// Random spawn height above the visible field
pub fn random_spawn_y<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> f32 {
    let (lo, hi) = (
        settings.spawn_y_min.min(settings.spawn_y_max),
        settings.spawn_y_min.max(settings.spawn_y_max),
    );
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// Create one target per candidate along the horizontal cadence.
///
/// `next_id` allocates entity ids. The caller clears the previous round's
/// targets before calling.
pub fn spawn_targets<R: Rng + ?Sized>(
    round: &Round,
    settings: &Settings,
    rng: &mut R,
    mut next_id: impl FnMut() -> u32,
) -> Vec<Target> {
    let size = Vec2::new(settings.target_width, settings.target_height);
    round
        .candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let pos = Vec2::new(
                settings.target_start_x + i as f32 * settings.target_spacing,
                random_spawn_y(settings, rng),
            );
            Target {
                id: next_id(),
                pos,
                vel: random_velocity(settings, rng),
                size,
                label: Label {
                    text: candidate.text.clone(),
                    pos,
                },
                correct: candidate.correct,
                lifecycle: TargetLifecycle::Spawned,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pairs::Pair;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pairs() -> PairSet {
        PairSet::new(vec![
            Pair::new("API", "Interface between programs"),
            Pair::new("REST", "Stateless resource architecture"),
            Pair::new("JSON", "Text data interchange format"),
            Pair::new("HTTP", "Hypertext transfer protocol"),
            Pair::new("DNS", "Name to address lookup"),
        ])
        .expect("valid pairs")
    }

    #[test]
    fn test_round_has_one_correct_of_four() {
        let mut rng = Pcg32::seed_from_u64(3);
        let round = Round::build(&pairs(), 2, 3, &mut rng).expect("round");
        assert_eq!(round.term, "JSON");
        assert_eq!(round.candidates.len(), 4);
        assert_eq!(round.correct_count(), 1);
        let correct = round.candidates.iter().find(|c| c.correct).expect("correct");
        assert_eq!(correct.text, "Text data interchange format");
    }

    #[test]
    fn test_round_out_of_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(Round::build(&pairs(), 5, 3, &mut rng).is_none());
    }

    #[test]
    fn test_spawn_layout_above_field() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let round = Round::build(&pairs(), 0, 3, &mut rng).expect("round");
        let mut id = 0;
        let targets = spawn_targets(&round, &settings, &mut rng, || {
            id += 1;
            id
        });

        assert_eq!(targets.len(), 4);
        for (i, t) in targets.iter().enumerate() {
            assert_eq!(t.id, i as u32 + 1);
            assert_eq!(t.pos.x, 100.0 + 180.0 * i as f32);
            assert!((-100.0..=-50.0).contains(&t.pos.y));
            assert!(t.vel.x.abs() <= 30.0);
            assert_eq!(t.vel.y, 30.0);
            assert_eq!(t.label.pos, t.pos);
            assert_eq!(t.label.text, round.candidates[i].text);
            assert_eq!(t.correct, round.candidates[i].correct);
            assert_eq!(t.lifecycle, TargetLifecycle::Spawned);
        }
    }
}
