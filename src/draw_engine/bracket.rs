//! Main-draw match graph construction.
//!
//! A bracket of S slots yields exactly `S - 1` matches: `S/2` in round 1
//! carrying the slot assignment, then half as many per round up to the
//! final.  Children link upward through `next_match_id`; athletes above
//! round 1 are filled at competition time, not at draw time.
//!
//! Match ids are `match-{counter}-{seed_prefix}`.  The counter increments
//! strictly in emission order (round 1 positions ascending, then round by
//! round) and the allocator is shared with the repechage builder, so ids
//! double as an audit trail of the whole draw.

use crate::draw_engine::models::{Match, MatchMeta, MatchType};

/// Allocates `match-{counter}-{prefix}` ids in strict emission order.
pub struct MatchIdAllocator {
    counter: u32,
    prefix: String,
}

impl MatchIdAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { counter: 0, prefix: prefix.into() }
    }

    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("match-{}-{}", self.counter, self.prefix)
    }
}

/// Emit the full main-draw graph for a placed bracket.  `rounds == 0`
/// (a one-slot bracket) yields no matches.
pub fn build_main_draw(
    slots: &[Option<String>],
    rounds: u32,
    ids: &mut MatchIdAllocator,
) -> Vec<Match> {
    let size = slots.len();
    if rounds == 0 {
        return Vec::new();
    }
    log::debug!("building main draw: {size} slots, {rounds} rounds");

    let mut matches: Vec<Match> = Vec::with_capacity(size - 1);

    for pos in 0..size / 2 {
        let red = slots[2 * pos].clone();
        let white = slots[2 * pos + 1].clone();
        let is_bye = red.is_none() || white.is_none();
        matches.push(Match {
            id: ids.next_id(),
            match_type: if rounds == 1 { MatchType::Final } else { MatchType::Main },
            round: 1,
            position: pos as u32 + 1,
            athlete_red: red,
            athlete_white: white,
            is_bye,
            next_match_id: None,
            metadata: MatchMeta::main(1, pos as u32 + 1),
        });
    }

    let mut prev_start = 0;
    let mut prev_len = size / 2;
    for round in 2..=rounds {
        let len = prev_len / 2;
        let start = matches.len();
        for pos in 0..len {
            let id = ids.next_id();
            matches[prev_start + 2 * pos].next_match_id = Some(id.clone());
            matches[prev_start + 2 * pos + 1].next_match_id = Some(id.clone());
            matches.push(Match {
                id,
                match_type: if round == rounds { MatchType::Final } else { MatchType::Main },
                round,
                position: pos as u32 + 1,
                athlete_red: None,
                athlete_white: None,
                is_bye: false,
                next_match_id: None,
                metadata: MatchMeta::main(round, pos as u32 + 1),
            });
        }
        prev_start = start;
        prev_len = len;
    }

    matches
}
