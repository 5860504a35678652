//! Constraint-aware greedy placement of unseeded athletes into slots.
//!
//! Seeds go to their canonical positions first.  Every remaining athlete is
//! then committed, one at a time, to the cheapest still-empty slot under a
//! penalty model built once per draw:
//!
//! - same club as the round-1 opponent (when `separate_by` lists clubs)
//! - same nation as the round-1 opponent (when listed; halved on
//!   nationally homogeneous fields, see [`NATION_ENTROPY_FLOOR_BITS`])
//! - a recent rematch against the round-1 opponent
//!
//! A slot whose round-1 opponent slot is still empty costs nothing.  On top
//! of the weighted base sits a strictly subordinate bye bias: slots
//! opposite high seeds cost slightly more than slots opposite low seeds,
//! so under `prefer_high_seeds` the placer fills low-seed pairs first and
//! byes stay with the top of the draw.  Ties resolve to the lowest slot
//! index, and a committed slot is never revisited.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::draw_engine::models::{
    ByesPolicy, History, Participant, Rules, SeedingMode, SeparationKey,
};
use crate::draw_engine::seed::DrawRng;
use crate::draw_engine::seeding::{self, SeedAssignment};

/// Fields whose nation distribution carries less than this many bits of
/// Shannon entropy count as homogeneous: nation clashes are unavoidable
/// there and the nation penalty is halved.
pub const NATION_ENTROPY_FLOOR_BITS: f64 = 1.0;

/// Base penalties are scaled by this before the bye bias is added, keeping
/// the bias strictly subordinate to any non-zero penalty weight.
const BIAS_SCALE: u64 = 1024;

/// Shannon entropy (bits) of the nation distribution over the field.
/// Athletes without a nation code are left out.
pub fn nation_entropy_bits(participants: &[Participant]) -> f64 {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for p in participants {
        if let Some(nation) = &p.nation_code {
            *counts.entry(nation.as_str()).or_default() += 1;
        }
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            let p = f64::from(c) / f64::from(total);
            -p * p.log2()
        })
        .sum()
}

/// The penalty model resolved once per draw: effective weights, separation
/// switches, and the set of rematch pairs inside the window.
pub struct PenaltyModel {
    same_club: u64,
    same_nation: u64,
    rematch: u64,
    separate_club: bool,
    separate_nation: bool,
    recent_pairs: HashSet<(String, String)>,
}

impl PenaltyModel {
    pub fn resolve(
        rules: &Rules,
        history: &History,
        participants: &[Participant],
        draw_date: Option<NaiveDate>,
    ) -> Self {
        let homogeneous = nation_entropy_bits(participants) < NATION_ENTROPY_FLOOR_BITS;
        let same_nation = if homogeneous {
            u64::from(rules.penalties.same_nation_r1) / 2
        } else {
            u64::from(rules.penalties.same_nation_r1)
        };

        let recent_pairs = history
            .recent_pairs
            .iter()
            .filter(|pair| within_window(&pair.date, rules.avoid_rematch_days, draw_date))
            .map(|pair| unordered(&pair.a, &pair.b))
            .collect();

        Self {
            same_club: u64::from(rules.penalties.same_club_r1),
            same_nation,
            rematch: u64::from(rules.penalties.rematch_recent),
            separate_club: rules.separate_by.contains(&SeparationKey::Club),
            separate_nation: rules.separate_by.contains(&SeparationKey::Nation),
            recent_pairs,
        }
    }

    /// Weighted cost of pairing `p` against `q` in round 1.
    pub fn base_penalty(&self, p: &Participant, q: &Participant) -> u64 {
        let mut penalty = 0;
        if self.separate_club && same_value(&p.club_id, &q.club_id) {
            penalty += self.same_club;
        }
        if self.separate_nation && same_value(&p.nation_code, &q.nation_code) {
            penalty += self.same_nation;
        }
        if self.recent_pairs.contains(&unordered(&p.athlete_id, &q.athlete_id)) {
            penalty += self.rematch;
        }
        penalty
    }
}

/// Place every athlete into the bracket: seeds at their canonical slots,
/// the rest greedily.  Returns `slots[i] = Some(athlete_id)` or `None` for
/// a bye slot.
pub fn place(
    participants: &[Participant],
    seeds: &SeedAssignment,
    rules: &Rules,
    history: &History,
    draw_date: Option<NaiveDate>,
    size: u32,
    _rng: &mut DrawRng, // the current rule set resolves every tie positionally
) -> Vec<Option<String>> {
    let size = size as usize;
    let mut slots: Vec<Option<String>> = vec![None; size];

    let positions = seeding::seed_slots(size);
    let mut seed_rank_by_slot: HashMap<usize, u32> = HashMap::new();
    for (&rank, athlete) in seeds {
        let slot = positions[rank as usize - 1];
        slots[slot] = Some(athlete.clone());
        seed_rank_by_slot.insert(slot, rank);
    }
    let top_rank = seeds.keys().next_back().copied().unwrap_or(0);

    let model = PenaltyModel::resolve(rules, history, participants, draw_date);
    let by_id: HashMap<&str, &Participant> =
        participants.iter().map(|p| (p.athlete_id.as_str(), p)).collect();

    for p in placement_order(participants, seeds, rules.seeding_mode) {
        let mut best: Option<(u64, usize)> = None;
        for slot in 0..size {
            if slots[slot].is_some() {
                continue;
            }
            let opponent = slot ^ 1;
            let base = match slots.get(opponent).and_then(|s| s.as_ref()) {
                Some(q_id) => model.base_penalty(p, by_id[q_id.as_str()]),
                None => 0,
            };
            let bias = match rules.byes_policy {
                ByesPolicy::PreferHighSeeds => seed_rank_by_slot
                    .get(&opponent)
                    .map(|rank| u64::from(top_rank - rank + 1))
                    .unwrap_or(0),
            };
            let cost = base * BIAS_SCALE + bias;
            // Strict comparison keeps the lowest index on ties.
            if best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, slot));
            }
        }
        let (cost, slot) = best.expect("more athletes than open slots");
        log::trace!("placing {} at slot {slot} (cost {cost})", p.athlete_id);
        slots[slot] = Some(p.athlete_id.clone());
    }

    slots
}

/// Unseeded athletes in the order they are placed: the auto-seeding rank
/// order in auto mode, ascending athlete id otherwise.  Independent of the
/// input order, so canonically equal requests place identically.
fn placement_order<'a>(
    participants: &'a [Participant],
    seeds: &SeedAssignment,
    mode: SeedingMode,
) -> Vec<&'a Participant> {
    let seeded: HashSet<&str> = seeds.values().map(String::as_str).collect();
    let mut order: Vec<&Participant> = match mode {
        SeedingMode::Auto => seeding::auto_rank(participants),
        SeedingMode::Off | SeedingMode::Manual => {
            let mut all: Vec<&Participant> = participants.iter().collect();
            all.sort_by(|a, b| a.athlete_id.cmp(&b.athlete_id));
            all
        }
    };
    order.retain(|p| !seeded.contains(p.athlete_id.as_str()));
    order
}

fn same_value(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

fn unordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn within_window(date: &str, window_days: u32, anchor: Option<NaiveDate>) -> bool {
    if window_days == 0 {
        // No window configured: the whole history counts as recent.
        return true;
    }
    let Some(anchor) = anchor else {
        // A window without an anchor date cannot be evaluated; count it.
        return true;
    };
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(fought) => (anchor - fought).num_days().abs() <= i64::from(window_days),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_engine::models::{Penalties, RecentPair};
    use crate::draw_engine::seeding::select_seeds;

    fn athlete(id: &str, club: Option<&str>, nation: Option<&str>) -> Participant {
        Participant {
            club_id: club.map(String::from),
            nation_code: nation.map(String::from),
            ..Participant::new(id)
        }
    }

    fn run_place(
        participants: &[Participant],
        rules: &Rules,
        history: &History,
        size: u32,
    ) -> Vec<Option<String>> {
        let seeds = select_seeds(participants, rules, size).unwrap();
        let mut rng = DrawRng::from_draw_seed("placement-test");
        place(participants, &seeds, rules, history, None, size, &mut rng)
    }

    #[test]
    fn entropy_of_uniform_nations() {
        let field = vec![
            athlete("a", None, Some("ITA")),
            athlete("b", None, Some("FRA")),
            athlete("c", None, Some("ESP")),
            athlete("d", None, Some("GER")),
        ];
        assert!((nation_entropy_bits(&field) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn entropy_of_homogeneous_field_is_zero() {
        let field = vec![athlete("a", None, Some("ITA")), athlete("b", None, Some("ITA"))];
        assert_eq!(nation_entropy_bits(&field), 0.0);
    }

    #[test]
    fn clubmates_are_separated_when_possible() {
        let rules = Rules { seeding_mode: SeedingMode::Off, ..Rules::default() };
        let field = vec![
            athlete("a1", Some("c1"), None),
            athlete("a2", Some("c1"), None),
            athlete("a3", Some("c2"), None),
            athlete("a4", Some("c3"), None),
        ];
        let slots = run_place(&field, &rules, &History::default(), 4);
        for pair in 0..2 {
            let red = slots[2 * pair].as_deref();
            let white = slots[2 * pair + 1].as_deref();
            assert!(
                !(red == Some("a1") && white == Some("a2"))
                    && !(red == Some("a2") && white == Some("a1")),
                "clubmates met in round 1: {slots:?}"
            );
        }
    }

    #[test]
    fn rematch_penalty_splits_recent_opponents() {
        let rules = Rules {
            seeding_mode: SeedingMode::Off,
            penalties: Penalties { same_club_r1: 0, same_nation_r1: 0, rematch_recent: 400 },
            ..Rules::default()
        };
        let history = History {
            recent_pairs: vec![RecentPair {
                a: "a2".into(),
                b: "a1".into(),
                date: "2026-07-01".into(),
            }],
        };
        let field = vec![
            athlete("a1", None, None),
            athlete("a2", None, None),
            athlete("a3", None, None),
            athlete("a4", None, None),
        ];
        let slots = run_place(&field, &rules, &history, 4);
        let pair_of = |id: &str| slots.iter().position(|s| s.as_deref() == Some(id)).unwrap() / 2;
        assert_ne!(pair_of("a1"), pair_of("a2"), "recent opponents met again: {slots:?}");
    }

    #[test]
    fn rematch_window_filters_old_pairs() {
        let anchor = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(within_window("2026-07-25", 30, Some(anchor)));
        assert!(!within_window("2025-01-01", 30, Some(anchor)));
        // Window disabled or unanchored: everything counts.
        assert!(within_window("2025-01-01", 0, Some(anchor)));
        assert!(within_window("2025-01-01", 30, None));
        // Unparseable dates count conservatively.
        assert!(within_window("last tuesday", 30, Some(anchor)));
    }

    #[test]
    fn byes_stay_with_the_top_seed() {
        // Three athletes, two seeds: the unseeded athlete must take the
        // slot opposite seed 2, leaving the bye with seed 1.
        let rules = Rules::default();
        let mut field = vec![
            athlete("s1", None, None),
            athlete("s2", None, None),
            athlete("u1", None, None),
        ];
        field[0].ranking_points = Some(100);
        field[1].ranking_points = Some(90);
        let slots = run_place(&field, &rules, &History::default(), 4);
        assert_eq!(slots[0].as_deref(), Some("s1"));
        assert_eq!(slots[3].as_deref(), Some("s2"));
        assert_eq!(slots[2].as_deref(), Some("u1"));
        assert!(slots[1].is_none(), "seed 1 lost its bye: {slots:?}");
    }

    #[test]
    fn bias_never_outweighs_a_real_penalty() {
        // Unseeded clubmate of seed 2: pairing with seed 1 costs the bias,
        // pairing with its clubmate seed 2 costs a full club penalty.  Even
        // a minimal club weight must win.
        let rules = Rules {
            penalties: Penalties { same_club_r1: 1, same_nation_r1: 0, rematch_recent: 0 },
            ..Rules::default()
        };
        let mut field = vec![
            athlete("s1", Some("x"), None),
            athlete("s2", Some("y"), None),
            athlete("u1", Some("y"), None),
            athlete("u2", Some("z"), None),
        ];
        field[0].ranking_points = Some(100);
        field[1].ranking_points = Some(90);
        let slots = run_place(&field, &rules, &History::default(), 4);
        let opponent_of = |slot: usize| slots[slot ^ 1].as_deref();
        let s2_slot = slots.iter().position(|s| s.as_deref() == Some("s2")).unwrap();
        assert_ne!(opponent_of(s2_slot), Some("u1"), "clubmates met in round 1: {slots:?}");
    }

    #[test]
    fn placement_ignores_input_order() {
        let rules = Rules { seeding_mode: SeedingMode::Off, ..Rules::default() };
        let forward = vec![
            athlete("a1", Some("c1"), None),
            athlete("a2", Some("c1"), None),
            athlete("a3", Some("c2"), None),
            athlete("a4", Some("c2"), None),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            run_place(&forward, &rules, &History::default(), 4),
            run_place(&reversed, &rules, &History::default(), 4),
        );
    }

    #[test]
    fn single_slot_bracket_places_the_lone_athlete() {
        let rules = Rules { seeding_mode: SeedingMode::Off, ..Rules::default() };
        let field = vec![athlete("only", None, None)];
        let slots = run_place(&field, &rules, &History::default(), 1);
        assert_eq!(slots, vec![Some("only".to_string())]);
    }
}
