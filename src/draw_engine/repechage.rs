//! Repechage and bronze-medal sub-graph construction.
//!
//! The wiring rule is uniform: every repechage match consumes exactly one
//! main-draw loser (its `source_loser_match_id`); the other side is the
//! winner of the previous match in its chain, or nobody for a round-1
//! entry, which is a bye the incoming loser advances through.  Consumed
//! main-draw matches and repechage matches are therefore strictly 1:1.
//!
//! Two shapes are built on that rule:
//!
//! - **Judo convention** (`sport == "judo"`, quarterfinals exist): per
//!   bracket half, the two quarterfinal losers fight a pool (entry bye +
//!   pool final); the pool winner meets the losing semifinalist of the
//!   *opposite* half in a terminal bronze match.  Two bronze medals.
//! - **Generic minimum** (everything else with at least semifinals): one
//!   bronze match fed by the two semifinal losers, as an entry bye sourced
//!   from semifinal 1 chained into a terminal bronze sourced from
//!   semifinal 2.
//!
//! The main-draw final is never linked into the repechage; bronze matches
//! are reached only through repechage wiring.

use crate::draw_engine::bracket::MatchIdAllocator;
use crate::draw_engine::models::{Match, MatchMeta, MatchType, RepechageMatch};

/// Build the repechage sub-graph for a finished main draw.  Brackets
/// without semifinals (`rounds < 2`) have no losers to consume and yield
/// an empty graph even when repechage is requested.
pub fn build_repechage(
    main: &[Match],
    rounds: u32,
    sport: &str,
    ids: &mut MatchIdAllocator,
) -> Vec<RepechageMatch> {
    if rounds < 2 {
        return Vec::new();
    }

    if sport.eq_ignore_ascii_case("judo") && rounds >= 3 {
        judo_pools(main, rounds, ids)
    } else {
        bronze_only(main, rounds, ids)
    }
}

/// Two pool chains over the quarterfinal losers, crossing into bronze
/// matches against the opposite half's losing semifinalist.
fn judo_pools(main: &[Match], rounds: u32, ids: &mut MatchIdAllocator) -> Vec<RepechageMatch> {
    let qf_round = rounds - 2;
    let sf_round = rounds - 1;
    log::debug!("building judo repechage from round {qf_round} losers");

    let mut out = Vec::with_capacity(6);
    for half in 0..2u32 {
        let qf_first = id_at(main, qf_round, 2 * half + 1);
        let qf_second = id_at(main, qf_round, 2 * half + 2);
        let sf_opposite = id_at(main, sf_round, 2 - half);

        let entry_id = ids.next_id();
        let pool_id = ids.next_id();
        let bronze_id = ids.next_id();

        out.push(RepechageMatch {
            id: entry_id,
            match_type: MatchType::Repechage,
            round: 1,
            position: half + 1,
            source_loser_match_id: qf_first,
            next_match_id: Some(pool_id.clone()),
            is_bye: true,
            metadata: MatchMeta::repechage(1, half + 1),
        });
        out.push(RepechageMatch {
            id: pool_id,
            match_type: MatchType::Repechage,
            round: 2,
            position: half + 1,
            source_loser_match_id: qf_second,
            next_match_id: Some(bronze_id.clone()),
            is_bye: false,
            metadata: MatchMeta::repechage(2, half + 1),
        });
        out.push(RepechageMatch {
            id: bronze_id,
            match_type: MatchType::Bronze,
            round: 3,
            position: half + 1,
            source_loser_match_id: sf_opposite,
            next_match_id: None,
            is_bye: false,
            metadata: MatchMeta::repechage(3, half + 1),
        });
    }
    out
}

/// The minimum contract: a single bronze match fed by the two semifinal
/// losers.
fn bronze_only(main: &[Match], rounds: u32, ids: &mut MatchIdAllocator) -> Vec<RepechageMatch> {
    let sf_round = rounds - 1;
    log::debug!("building bronze match from round {sf_round} losers");

    let entry_id = ids.next_id();
    let bronze_id = ids.next_id();
    vec![
        RepechageMatch {
            id: entry_id,
            match_type: MatchType::Repechage,
            round: 1,
            position: 1,
            source_loser_match_id: id_at(main, sf_round, 1),
            next_match_id: Some(bronze_id.clone()),
            is_bye: true,
            metadata: MatchMeta::repechage(1, 1),
        },
        RepechageMatch {
            id: bronze_id,
            match_type: MatchType::Bronze,
            round: 2,
            position: 1,
            source_loser_match_id: id_at(main, sf_round, 2),
            next_match_id: None,
            is_bye: false,
            metadata: MatchMeta::repechage(2, 1),
        },
    ]
}

fn id_at(main: &[Match], round: u32, position: u32) -> String {
    main.iter()
        .find(|m| m.round == round && m.position == position)
        .map(|m| m.id.clone())
        .expect("main draw missing a designated loser source")
}
