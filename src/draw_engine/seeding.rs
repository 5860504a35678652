//! Bracket sizing, seed selection, and canonical seed positions.
//!
//! ## Sizing
//! A field of N athletes fights in a bracket of `S = next_power_of_two(N)`
//! slots over `R = log2(S)` rounds, with `S - N` byes.
//!
//! ## Seed selection
//! `off` seeds nobody.  `auto` ranks by `(-ranking_points, athlete_id)` and
//! seeds the top `K = min(max_seeds, threshold, N, S/2)`, where the
//! threshold is `min_16` for fields of 16+ and `lt_16` below.  `manual`
//! takes explicit `seed` fields and rejects duplicates and out-of-range
//! ranks.
//!
//! ## Canonical positions
//! `seed_slots(S)` gives the slot of each seed rank under the standard
//! single-elimination convention: seed 1 at slot 0, seed 2 at slot S-1,
//! and seed i meeting seed `2^r - i + 1` no earlier than the final of
//! their shared half-bracket of size `2^r`.

use std::collections::BTreeMap;

use crate::draw_engine::error::{DrawError, DrawResult};
use crate::draw_engine::models::{Participant, Rules, SeedingMode};

/// Bracket dimensions derived from the field size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub size: u32,
    pub rounds: u32,
    pub byes: u32,
}

pub fn bracket_sizing(participants: usize) -> Sizing {
    let size = (participants as u32).next_power_of_two();
    Sizing { size, rounds: size.trailing_zeros(), byes: size - participants as u32 }
}

/// Seed ranks 1..=K mapped to athlete ids, in rank order.
pub type SeedAssignment = BTreeMap<u32, String>;

pub fn select_seeds(
    participants: &[Participant],
    rules: &Rules,
    size: u32,
) -> DrawResult<SeedAssignment> {
    match rules.seeding_mode {
        SeedingMode::Off => Ok(SeedAssignment::new()),
        SeedingMode::Auto => Ok(auto_seeds(participants, rules, size)),
        SeedingMode::Manual => manual_seeds(participants, rules, size),
    }
}

/// Rank the whole field the way auto seeding does: descending ranking
/// points (missing counts as 0), ties by ascending athlete id.
pub fn auto_rank<'a>(participants: &'a [Participant]) -> Vec<&'a Participant> {
    let mut ranked: Vec<&Participant> = participants.iter().collect();
    ranked.sort_by(|a, b| {
        let ra = a.ranking_points.unwrap_or(0);
        let rb = b.ranking_points.unwrap_or(0);
        rb.cmp(&ra).then_with(|| a.athlete_id.cmp(&b.athlete_id))
    });
    ranked
}

fn auto_seeds(participants: &[Participant], rules: &Rules, size: u32) -> SeedAssignment {
    let n = participants.len() as u32;
    let threshold = if n >= 16 {
        rules.seeding_thresholds.min_16
    } else {
        rules.seeding_thresholds.lt_16
    };
    let k = rules.max_seeds.min(threshold).min(n).min(size / 2);
    log::trace!("auto seeding: threshold {threshold}, effective seed count {k}");

    auto_rank(participants)
        .into_iter()
        .take(k as usize)
        .enumerate()
        .map(|(i, p)| (i as u32 + 1, p.athlete_id.clone()))
        .collect()
}

fn manual_seeds(
    participants: &[Participant],
    rules: &Rules,
    size: u32,
) -> DrawResult<SeedAssignment> {
    let cap = size / 2;
    if rules.max_seeds > cap && participants.iter().any(|p| p.seed.is_some()) {
        return Err(DrawError::InvalidRules(format!(
            "max_seeds {} exceeds half the bracket size ({cap})",
            rules.max_seeds
        )));
    }

    let mut seeds = SeedAssignment::new();
    for p in participants {
        let Some(rank) = p.seed else { continue };
        if rank == 0 || rank > rules.max_seeds {
            return Err(DrawError::InvalidSeeding(format!(
                "seed {rank} for {} is outside 1..={}",
                p.athlete_id, rules.max_seeds
            )));
        }
        if let Some(holder) = seeds.insert(rank, p.athlete_id.clone()) {
            return Err(DrawError::InvalidSeeding(format!(
                "seed {rank} assigned to both {holder} and {}",
                p.athlete_id
            )));
        }
    }
    Ok(seeds)
}

/// Slot index of each seed rank in a bracket of `size` slots:
/// `seed_slots(size)[rank - 1]` is where seed `rank` sits.
///
/// Built by recursive doubling.  At size 2 the slots are `[0, 1]`.  Going
/// from S to 2S, seed k keeps its size-S round-1 pair and takes the pair's
/// even slot in the top half (odd in the bottom half); its mirror seed
/// `2S + 1 - k` takes the remaining slot of the same pair.  Round-1
/// opponents therefore always sit at `slot XOR 1`.
pub fn seed_slots(size: usize) -> Vec<usize> {
    if size <= 1 {
        return vec![0];
    }
    if size == 2 {
        return vec![0, 1];
    }

    let pairs = seed_slots(size / 2);
    let mut slots = vec![0usize; size];
    for (k, &pair) in pairs.iter().enumerate() {
        let slot = if pair < size / 4 { 2 * pair } else { 2 * pair + 1 };
        slots[k] = slot;
        slots[size - 1 - k] = slot ^ 1;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_engine::models::SeedingThresholds;

    fn athlete(id: &str, points: u32) -> Participant {
        Participant { ranking_points: Some(points), ..Participant::new(id) }
    }

    #[test]
    fn sizing_covers_the_edges() {
        assert_eq!(bracket_sizing(1), Sizing { size: 1, rounds: 0, byes: 0 });
        assert_eq!(bracket_sizing(2), Sizing { size: 2, rounds: 1, byes: 0 });
        assert_eq!(bracket_sizing(3), Sizing { size: 4, rounds: 2, byes: 1 });
        assert_eq!(bracket_sizing(5), Sizing { size: 8, rounds: 3, byes: 3 });
        assert_eq!(bracket_sizing(16), Sizing { size: 16, rounds: 4, byes: 0 });
        assert_eq!(bracket_sizing(17), Sizing { size: 32, rounds: 5, byes: 15 });
        assert_eq!(bracket_sizing(128), Sizing { size: 128, rounds: 7, byes: 0 });
    }

    #[test]
    fn known_position_tables() {
        assert_eq!(seed_slots(2), vec![0, 1]);
        assert_eq!(seed_slots(4), vec![0, 3, 2, 1]);
        assert_eq!(seed_slots(8), vec![0, 7, 5, 2, 3, 4, 6, 1]);
        assert_eq!(
            seed_slots(16),
            vec![0, 15, 11, 4, 6, 9, 13, 2, 3, 12, 8, 7, 5, 10, 14, 1]
        );
    }

    #[test]
    fn positions_form_a_permutation_with_mirrored_pairs() {
        for size in [2usize, 4, 8, 16, 32, 64, 128, 256] {
            let slots = seed_slots(size);
            let mut seen = vec![false; size];
            for &s in &slots {
                assert!(!seen[s], "slot {s} used twice at size {size}");
                seen[s] = true;
            }
            assert_eq!(slots[0], 0, "seed 1 must open the bracket");
            assert_eq!(slots[1], size - 1, "seed 2 must close the bracket");
            for k in 0..size {
                // Seed k+1 and its mirror share a round-1 pair.
                assert_eq!(slots[k] ^ 1, slots[size - 1 - k], "size {size}, seed {}", k + 1);
            }
        }
    }

    #[test]
    fn top_seeds_split_across_quarters() {
        // Seeds 1..4 of a 16-bracket must land in four distinct quarters.
        let slots = seed_slots(16);
        let mut quarters: Vec<usize> = slots[..4].iter().map(|s| s / 4).collect();
        quarters.sort_unstable();
        assert_eq!(quarters, vec![0, 1, 2, 3]);
    }

    #[test]
    fn auto_seeding_ranks_by_points_then_id() {
        let field = vec![
            athlete("c", 90),
            athlete("a", 90),
            athlete("b", 100),
            Participant::new("d"),
        ];
        let rules = Rules { max_seeds: 3, ..Rules::default() };
        let seeds = select_seeds(&field, &rules, 4).unwrap();
        // size 4 caps the seed count at 2
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[&1], "b");
        assert_eq!(seeds[&2], "a");
    }

    #[test]
    fn auto_seeding_threshold_switches_at_16() {
        let small: Vec<Participant> = (0..15).map(|i| athlete(&format!("p{i:02}"), 100 - i)).collect();
        let large: Vec<Participant> = (0..16).map(|i| athlete(&format!("p{i:02}"), 100 - i)).collect();
        let rules = Rules {
            seeding_thresholds: SeedingThresholds { min_16: 8, lt_16: 4 },
            ..Rules::default()
        };
        assert_eq!(select_seeds(&small, &rules, 16).unwrap().len(), 4);
        assert_eq!(select_seeds(&large, &rules, 16).unwrap().len(), 8);
    }

    #[test]
    fn auto_seeding_never_reads_past_the_field() {
        let field = vec![athlete("a", 10), athlete("b", 20)];
        let rules = Rules { max_seeds: 8, ..Rules::default() };
        let seeds = select_seeds(&field, &rules, 2).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[&1], "b");
    }

    #[test]
    fn manual_seeding_rejects_duplicates() {
        let mut field = vec![Participant::new("a"), Participant::new("b")];
        field[0].seed = Some(1);
        field[1].seed = Some(1);
        let rules = Rules { seeding_mode: SeedingMode::Manual, max_seeds: 2, ..Rules::default() };
        let err = select_seeds(&field, &rules, 4).unwrap_err();
        assert_eq!(err.code(), "invalid_seeding");
    }

    #[test]
    fn manual_seeding_rejects_out_of_range_ranks() {
        let mut field = vec![Participant::new("a"), Participant::new("b")];
        field[0].seed = Some(3);
        let rules = Rules { seeding_mode: SeedingMode::Manual, max_seeds: 2, ..Rules::default() };
        assert_eq!(select_seeds(&field, &rules, 4).unwrap_err().code(), "invalid_seeding");

        field[0].seed = Some(0);
        assert_eq!(select_seeds(&field, &rules, 4).unwrap_err().code(), "invalid_seeding");
    }

    #[test]
    fn manual_seeding_rejects_oversized_max_seeds() {
        let mut field = vec![Participant::new("a"), Participant::new("b")];
        field[0].seed = Some(1);
        let rules = Rules { seeding_mode: SeedingMode::Manual, max_seeds: 8, ..Rules::default() };
        assert_eq!(select_seeds(&field, &rules, 4).unwrap_err().code(), "invalid_rules");

        // Without any explicit seed the oversized rule is inert.
        field[0].seed = None;
        assert!(select_seeds(&field, &rules, 4).unwrap().is_empty());
    }
}
