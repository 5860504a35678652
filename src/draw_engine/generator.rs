//! Single entry point for draw generation.
//!
//! `generate_draw()` is the only public function in the crate.  It runs the
//! phases leaves-first:
//!
//! 1. Validate participants, size the bracket, validate the rules.
//! 2. Resolve the draw seed and open the deterministic stream.
//! 3. Select seeds and place everyone into slots.
//! 4. Emit the main-draw graph, then the repechage graph on the same id
//!    counter.
//! 5. Score the placement.
//! 6. Self-check every structural invariant, then assemble the response.
//!
//! The seed is resolved before anything touches the stream and the match-id
//! counter spans main draw then repechage.  This ordering is load-bearing;
//! changing it would break determinism tests.

use std::collections::{HashMap, HashSet};

use crate::draw_engine::bracket::{self, MatchIdAllocator};
use crate::draw_engine::error::{DrawError, DrawResult};
use crate::draw_engine::models::{
    GenerateRequest, GenerateResponse, Match, MatchType, Participant, ParticipantSlot, Summary,
};
use crate::draw_engine::placement;
use crate::draw_engine::quality;
use crate::draw_engine::repechage;
use crate::draw_engine::seed::{self, DrawRng};
use crate::draw_engine::seeding;

/// Generate a complete tournament draw.
///
/// Pure and synchronous: the response is a function of the request alone,
/// and identical requests produce byte-identical responses.  Canonically
/// equal requests (same content, different participant order) also produce
/// identical responses.
pub fn generate_draw(request: GenerateRequest) -> DrawResult<GenerateResponse> {
    validate_participants(&request.participants)?;

    let n = request.participants.len();
    let sizing = seeding::bracket_sizing(n);
    log::debug!(
        "sizing draw: {n} participants, size {}, {} rounds, {} byes",
        sizing.size,
        sizing.rounds,
        sizing.byes
    );

    let draw_seed = seed::resolve_draw_seed(&request)?;
    let mut rng = DrawRng::from_draw_seed(&draw_seed);
    log::debug!("draw seed resolved: {}", seed::seed_prefix(&draw_seed));

    let seeds = seeding::select_seeds(&request.participants, &request.rules, sizing.size)?;
    let slots = placement::place(
        &request.participants,
        &seeds,
        &request.rules,
        &request.history,
        request.context.draw_date,
        sizing.size,
        &mut rng,
    );

    let mut ids = MatchIdAllocator::new(seed::seed_prefix(&draw_seed));
    let matches = bracket::build_main_draw(&slots, sizing.rounds, &mut ids);
    let repechage_matches = if request.context.repechage {
        repechage::build_repechage(&matches, sizing.rounds, &request.context.sport, &mut ids)
    } else {
        Vec::new()
    };

    let quality = quality::compute_quality(&slots, &request.participants, &seeds, sizing.byes);
    log::debug!(
        "draw complete: {} matches, {} repechage, quality {}",
        matches.len(),
        repechage_matches.len(),
        quality.score
    );

    let seed_of: HashMap<&String, u32> = seeds.iter().map(|(rank, id)| (id, *rank)).collect();
    let participants_slots: Vec<ParticipantSlot> = slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            slot.as_ref().map(|athlete| ParticipantSlot {
                athlete_id: athlete.clone(),
                slot: index as u32 + 1,
                seed: seed_of.get(athlete).copied(),
            })
        })
        .collect();

    let response = GenerateResponse {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        summary: Summary {
            participants: n as u32,
            size: sizing.size,
            rounds: sizing.rounds,
            byes: sizing.byes,
            repechage: request.context.repechage,
            draw_seed,
            quality,
        },
        participants_slots,
        matches,
        repechage_matches,
    };

    // The response leaves the engine only after the self-check passes.
    verify_response(&request, &response)?;
    Ok(response)
}

fn validate_participants(participants: &[Participant]) -> DrawResult<()> {
    if participants.is_empty() {
        return Err(DrawError::InvalidParticipants(
            "at least one participant is required".into(),
        ));
    }
    let mut seen = HashSet::new();
    for p in participants {
        if p.athlete_id.is_empty() {
            return Err(DrawError::InvalidParticipants("empty athlete_id".into()));
        }
        if !seen.insert(p.athlete_id.as_str()) {
            return Err(DrawError::InvalidParticipants(format!(
                "duplicate athlete_id {}",
                p.athlete_id
            )));
        }
    }
    Ok(())
}

/// Structural self-check of a constructed response.  Any failure here is an
/// engine bug, reported as a 500-class internal error rather than a partial
/// draw.
fn verify_response(request: &GenerateRequest, response: &GenerateResponse) -> DrawResult<()> {
    let fail = |detail: String| Err(DrawError::InternalInvariant(detail));

    // Every input athlete sits in exactly one slot.
    let input: HashSet<&str> =
        request.participants.iter().map(|p| p.athlete_id.as_str()).collect();
    let mut placed = HashSet::new();
    for slot in &response.participants_slots {
        if !placed.insert(slot.athlete_id.as_str()) {
            return fail(format!("athlete {} appears in two slots", slot.athlete_id));
        }
        if !input.contains(slot.athlete_id.as_str()) {
            return fail(format!("unknown athlete {} in slots", slot.athlete_id));
        }
    }
    if placed.len() != input.len() {
        return fail(format!("{} athletes in, {} placed", input.len(), placed.len()));
    }

    // size - 1 main-draw matches, exactly one final on multi-slot brackets.
    let size = response.summary.size as usize;
    if response.matches.len() != size - 1 {
        return fail(format!(
            "expected {} main-draw matches, built {}",
            size - 1,
            response.matches.len()
        ));
    }
    let finals = response
        .matches
        .iter()
        .filter(|m| m.match_type == MatchType::Final)
        .count();
    if finals != usize::from(size > 1) {
        return fail(format!("{finals} final matches in a size-{size} bracket"));
    }

    // Graph well-formedness: non-final matches advance one round up, the
    // final advances nowhere.  Rounds only ever increase, so no cycles.
    let main_by_id: HashMap<&str, &Match> =
        response.matches.iter().map(|m| (m.id.as_str(), m)).collect();
    for m in &response.matches {
        match (&m.match_type, &m.next_match_id) {
            (MatchType::Final, Some(next)) => {
                return fail(format!("final links onward to {next}"));
            }
            (MatchType::Final, None) => {}
            (_, None) => return fail(format!("match {} has no next_match_id", m.id)),
            (_, Some(next)) => match main_by_id.get(next.as_str()) {
                Some(parent) if parent.round == m.round + 1 => {}
                Some(parent) => {
                    return fail(format!(
                        "match {} (round {}) links to round {}",
                        m.id, m.round, parent.round
                    ));
                }
                None => return fail(format!("match {} links to unknown {next}", m.id)),
            },
        }
        if let (Some(red), Some(white)) = (&m.athlete_red, &m.athlete_white) {
            if red == white {
                return fail(format!("match {} pairs {red} against itself", m.id));
            }
        }
    }

    // Repechage: sources are distinct existing main-draw matches, chains
    // resolve internally, bronze matches are terminal.
    let rep_ids: HashSet<&str> =
        response.repechage_matches.iter().map(|m| m.id.as_str()).collect();
    let mut sources = HashSet::new();
    for m in &response.repechage_matches {
        if !main_by_id.contains_key(m.source_loser_match_id.as_str()) {
            return fail(format!(
                "repechage {} sources unknown match {}",
                m.id, m.source_loser_match_id
            ));
        }
        if !sources.insert(m.source_loser_match_id.as_str()) {
            return fail(format!(
                "main-draw loser {} consumed twice",
                m.source_loser_match_id
            ));
        }
        match (&m.match_type, &m.next_match_id) {
            (MatchType::Bronze, Some(next)) => {
                return fail(format!("bronze {} links onward to {next}", m.id));
            }
            (MatchType::Bronze, None) => {}
            (_, Some(next)) if !rep_ids.contains(next.as_str()) => {
                return fail(format!("repechage {} links to unknown {next}", m.id));
            }
            (_, Some(_)) => {}
            (_, None) => return fail(format!("repechage {} has no next_match_id", m.id)),
        }
    }

    Ok(())
}
