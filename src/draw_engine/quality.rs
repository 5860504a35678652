//! Quality diagnostics over a finished placement.
//!
//! Four metrics and one scalar:
//!
//! - `club_collisions_r1` / `nation_collisions_r1`: round-1 matches whose
//!   athletes share a club / nation (both sides non-null).
//! - `seed_protection`: fraction of top seeds that avoided another top
//!   seed in round 1.  Canonical seed positions make this 1.0 whenever
//!   seeds stay within half the bracket.
//! - `bye_fairness`: fraction of byes sitting next to a top seed; under
//!   `prefer_high_seeds` the placer drives this toward 1.0.
//! - `score`: 0..=100, collisions as strong negatives, the two fairness
//!   ratios as positives.  The nation term is halved on nationally
//!   homogeneous fields, matching the placer's adaptive rule: a clash that
//!   could not be avoided should not crater the score.

use std::collections::{HashMap, HashSet};

use crate::draw_engine::models::{Participant, Quality};
use crate::draw_engine::placement::{nation_entropy_bits, NATION_ENTROPY_FLOOR_BITS};
use crate::draw_engine::seeding::SeedAssignment;

const CLUB_COLLISION_WEIGHT: f64 = 12.0;
const NATION_COLLISION_WEIGHT: f64 = 6.0;
const SEED_PROTECTION_WEIGHT: f64 = 20.0;
const BYE_FAIRNESS_WEIGHT: f64 = 10.0;

pub fn compute_quality(
    slots: &[Option<String>],
    participants: &[Participant],
    seeds: &SeedAssignment,
    byes: u32,
) -> Quality {
    let by_id: HashMap<&str, &Participant> =
        participants.iter().map(|p| (p.athlete_id.as_str(), p)).collect();
    let seeded: HashSet<&str> = seeds.values().map(String::as_str).collect();

    let mut club_collisions = 0u32;
    let mut nation_collisions = 0u32;
    let mut unprotected_seeds = 0u32;
    let mut byes_on_seeds = 0u32;

    for pair in slots.chunks_exact(2) {
        match (&pair[0], &pair[1]) {
            (Some(red), Some(white)) => {
                let (p, q) = (by_id[red.as_str()], by_id[white.as_str()]);
                if both_match(&p.club_id, &q.club_id) {
                    club_collisions += 1;
                }
                if both_match(&p.nation_code, &q.nation_code) {
                    nation_collisions += 1;
                }
                if seeded.contains(red.as_str()) && seeded.contains(white.as_str()) {
                    unprotected_seeds += 2;
                }
            }
            (Some(athlete), None) | (None, Some(athlete)) => {
                if seeded.contains(athlete.as_str()) {
                    byes_on_seeds += 1;
                }
            }
            (None, None) => {}
        }
    }

    let seed_count = seeds.len() as u32;
    let seed_protection = if seed_count == 0 {
        1.0
    } else {
        f64::from(seed_count - unprotected_seeds) / f64::from(seed_count)
    };
    let bye_fairness = if byes == 0 || seed_count == 0 {
        1.0
    } else {
        f64::from(byes_on_seeds) / f64::from(byes)
    };

    let nation_weight = if nation_entropy_bits(participants) < NATION_ENTROPY_FLOOR_BITS {
        NATION_COLLISION_WEIGHT / 2.0
    } else {
        NATION_COLLISION_WEIGHT
    };

    let raw = 100.0
        - CLUB_COLLISION_WEIGHT * f64::from(club_collisions)
        - nation_weight * f64::from(nation_collisions)
        - SEED_PROTECTION_WEIGHT * (1.0 - seed_protection)
        - BYE_FAIRNESS_WEIGHT * (1.0 - bye_fairness);

    Quality {
        club_collisions_r1: club_collisions,
        nation_collisions_r1: nation_collisions,
        seed_protection,
        bye_fairness,
        score: raw.round().clamp(0.0, 100.0) as u8,
    }
}

fn both_match(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(id: &str, club: &str, nation: &str) -> Participant {
        Participant {
            club_id: Some(club.into()),
            nation_code: Some(nation.into()),
            ..Participant::new(id)
        }
    }

    fn slot(id: &str) -> Option<String> {
        Some(id.to_string())
    }

    #[test]
    fn clean_full_bracket_scores_100() {
        let field = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c2", "FRA"),
            athlete("c", "c3", "ESP"),
            athlete("d", "c4", "GER"),
        ];
        let seeds: SeedAssignment =
            [(1, "a".to_string()), (2, "d".to_string())].into_iter().collect();
        let slots = vec![slot("a"), slot("b"), slot("c"), slot("d")];
        let q = compute_quality(&slots, &field, &seeds, 0);
        assert_eq!(q.club_collisions_r1, 0);
        assert_eq!(q.nation_collisions_r1, 0);
        assert_eq!(q.seed_protection, 1.0);
        assert_eq!(q.bye_fairness, 1.0);
        assert_eq!(q.score, 100);
    }

    #[test]
    fn collisions_are_counted_per_round_one_pair() {
        let field = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c1", "ITA"),
            athlete("c", "c2", "FRA"),
            athlete("d", "c3", "ITA"),
        ];
        let slots = vec![slot("a"), slot("b"), slot("c"), slot("d")];
        let q = compute_quality(&slots, &field, &SeedAssignment::new(), 0);
        assert_eq!(q.club_collisions_r1, 1);
        assert_eq!(q.nation_collisions_r1, 1);
    }

    #[test]
    fn seed_pair_in_round_one_drops_protection() {
        let field = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c2", "FRA"),
            athlete("c", "c3", "ESP"),
            athlete("d", "c4", "GER"),
        ];
        // Both seeds in the same round-1 pair: zero protected seeds.
        let seeds: SeedAssignment =
            [(1, "a".to_string()), (2, "b".to_string())].into_iter().collect();
        let slots = vec![slot("a"), slot("b"), slot("c"), slot("d")];
        let q = compute_quality(&slots, &field, &seeds, 0);
        assert_eq!(q.seed_protection, 0.0);
        assert!(q.score < 100);
    }

    #[test]
    fn bye_fairness_tracks_who_got_the_byes() {
        let field = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c2", "FRA"),
            athlete("c", "c3", "ESP"),
        ];
        let seeds: SeedAssignment =
            [(1, "a".to_string()), (2, "b".to_string())].into_iter().collect();
        // Seed 1 keeps the bye.
        let q = compute_quality(
            &[slot("a"), None, slot("c"), slot("b")],
            &field,
            &seeds,
            1,
        );
        assert_eq!(q.bye_fairness, 1.0);
        // The unseeded athlete stole it.
        let q = compute_quality(
            &[slot("a"), slot("b"), slot("c"), None],
            &field,
            &seeds,
            1,
        );
        assert_eq!(q.bye_fairness, 0.0);
    }

    #[test]
    fn vacuous_ratios_default_to_one() {
        let field = vec![athlete("a", "c1", "ITA"), athlete("b", "c2", "FRA")];
        let q = compute_quality(&[slot("a"), slot("b")], &field, &SeedAssignment::new(), 0);
        assert_eq!(q.seed_protection, 1.0);
        assert_eq!(q.bye_fairness, 1.0);
    }

    #[test]
    fn homogeneous_nation_field_halves_the_nation_term() {
        let mixed = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c2", "ITA"),
            athlete("c", "c3", "FRA"),
            athlete("d", "c4", "GER"),
        ];
        let uniform = vec![
            athlete("a", "c1", "ITA"),
            athlete("b", "c2", "ITA"),
            athlete("c", "c3", "ITA"),
            athlete("d", "c4", "ITA"),
        ];
        let slots = vec![slot("a"), slot("b"), slot("c"), slot("d")];
        let none = SeedAssignment::new();
        let q_mixed = compute_quality(&slots, &mixed, &none, 0);
        let q_uniform = compute_quality(&slots, &uniform, &none, 0);
        // One collision at full weight vs two at half weight.
        assert_eq!(q_mixed.nation_collisions_r1, 1);
        assert_eq!(q_uniform.nation_collisions_r1, 2);
        assert_eq!(q_mixed.score, 94);
        assert_eq!(q_uniform.score, 94);
    }

    #[test]
    fn score_never_leaves_its_bounds() {
        let field: Vec<Participant> =
            (0..16).map(|i| athlete(&format!("p{i:02}"), "same", "ITA")).collect();
        let slots: Vec<Option<String>> =
            (0..16).map(|i| slot(&format!("p{i:02}"))).collect();
        let q = compute_quality(&slots, &field, &SeedAssignment::new(), 0);
        // 8 club collisions at weight 12 would go negative without clamping.
        assert_eq!(q.score, 0);
    }
}
