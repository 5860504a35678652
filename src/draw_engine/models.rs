//! All shared data types used across the draw engine.
//!
//! This module defines the request side (Context, Rules, Participant,
//! History) and the response side (Summary, ParticipantSlot, Match,
//! RepechageMatch, Quality) of a single `generate_draw()` call.
//!
//! Every type derives `Serialize` + `Deserialize` so requests and draws can
//! be sent over the wire as JSON without any conversion layer.  Field names
//! and defaults follow the competition-platform wire format exactly:
//! `athlete_red`, `next_match_id`, `seeding_mode = "auto"`, and so on.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request: context, rules, participants, history
//
// Enumerated modes are Rust enums with snake_case wire names.  Unknown wire
// values fail at deserialization, which is where payload validation framing
// happens; the engine itself only checks semantic rules (duplicate seeds,
// seed ranges, participant uniqueness).
// ---------------------------------------------------------------------------

/// The only supported engine mode.  A draw is a pure function of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    #[default]
    Deterministic,
}

/// Tournament-level context: what sport, which format, and the seed that
/// makes the draw reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub sport: String,
    pub format: String,
    /// Build the repechage sub-graph from designated main-draw losers.
    #[serde(default = "default_repechage")]
    pub repechage: bool,
    /// `Some(seed)` for reproducible output; `None` derives a canonical
    /// seed from the request content (see the `seed` module).
    #[serde(default)]
    pub draw_seed: Option<String>,
    /// Reference date for the rematch window.  The engine never reads the
    /// clock, so date arithmetic is anchored here.
    #[serde(default)]
    pub draw_date: Option<NaiveDate>,
    #[serde(default)]
    pub engine_mode: EngineMode,
}

impl Context {
    /// Context with just a sport and format; repechage on, derived seed.
    pub fn new(sport: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            sport: sport.into(),
            format: format.into(),
            repechage: true,
            draw_seed: None,
            draw_date: None,
            engine_mode: EngineMode::Deterministic,
        }
    }
}

/// How seeds 1..K are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMode {
    /// No seeds at all; everyone is placed by the greedy placer.
    Off,
    /// Rank by `(-ranking_points, athlete_id)` and seed the top K.
    #[default]
    Auto,
    /// Take each participant's explicit `seed` field verbatim.
    Manual,
}

impl fmt::Display for SeedingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedingMode::Off => write!(f, "off"),
            SeedingMode::Auto => write!(f, "auto"),
            SeedingMode::Manual => write!(f, "manual"),
        }
    }
}

/// Attributes the placer keeps apart in round 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationKey {
    Club,
    Nation,
}

/// Where byes land when the bracket is not full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ByesPolicy {
    /// Byes attach to the highest-ranked seeds first.
    #[default]
    PreferHighSeeds,
}

/// Seed-count thresholds by field size: `min_16` applies from 16
/// participants upward, `lt_16` below that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedingThresholds {
    #[serde(default = "default_min_16")]
    pub min_16: u32,
    #[serde(default = "default_lt_16")]
    pub lt_16: u32,
}

impl Default for SeedingThresholds {
    fn default() -> Self {
        Self { min_16: default_min_16(), lt_16: default_lt_16() }
    }
}

/// Non-negative penalty weights for the greedy placer.  Relative magnitude
/// is what matters: a club clash is worse than a nation clash is worse
/// than a recent rematch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    #[serde(default = "default_same_club_r1")]
    pub same_club_r1: u32,
    #[serde(default = "default_same_nation_r1")]
    pub same_nation_r1: u32,
    #[serde(default = "default_rematch_recent")]
    pub rematch_recent: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            same_club_r1: default_same_club_r1(),
            same_nation_r1: default_same_nation_r1(),
            rematch_recent: default_rematch_recent(),
        }
    }
}

/// The full rules block.  Every field has a wire default, so a request may
/// send `"rules": {}` (or omit single fields) and still get the standard
/// auto-seeded, club-separated draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub seeding_mode: SeedingMode,
    #[serde(default = "default_max_seeds")]
    pub max_seeds: u32,
    #[serde(default)]
    pub seeding_thresholds: SeedingThresholds,
    #[serde(default = "default_separate_by")]
    pub separate_by: Vec<SeparationKey>,
    /// Rematch window in days around `Context::draw_date`.  Zero means the
    /// whole history counts.
    #[serde(default)]
    pub avoid_rematch_days: u32,
    #[serde(default)]
    pub byes_policy: ByesPolicy,
    #[serde(default)]
    pub penalties: Penalties,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            seeding_mode: SeedingMode::default(),
            max_seeds: default_max_seeds(),
            seeding_thresholds: SeedingThresholds::default(),
            separate_by: default_separate_by(),
            avoid_rematch_days: 0,
            byes_policy: ByesPolicy::default(),
            penalties: Penalties::default(),
        }
    }
}

/// One tournament entrant.  Borrowed by id only: the response references
/// athletes exclusively through `athlete_id` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub athlete_id: String,
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub nation_code: Option<String>,
    #[serde(default)]
    pub ranking_points: Option<u32>,
    /// Explicit seed rank, read only in manual seeding mode.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Free-form payload carried through untouched.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl Participant {
    /// Participant with just an id and no club, nation, ranking or seed.
    pub fn new(athlete_id: impl Into<String>) -> Self {
        Self {
            athlete_id: athlete_id.into(),
            club_id: None,
            nation_code: None,
            ranking_points: None,
            seed: None,
            meta: None,
        }
    }
}

/// A recently fought pairing.  `a`/`b` are unordered; `date` is ISO
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPair {
    pub a: String,
    pub b: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct History {
    #[serde(default)]
    pub recent_pairs: Vec<RecentPair>,
}

/// Input to [`generate_draw`](super::generate_draw).
///
/// Only `context` and `participants` are required; `rules` and `history`
/// fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub context: Context,
    #[serde(default)]
    pub rules: Rules,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub history: History,
}

// ---------------------------------------------------------------------------
// Response: summary, slots, matches, repechage
// ---------------------------------------------------------------------------

/// What kind of match a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Regular main-draw match.
    Main,
    /// The round-R main-draw match.  There is at most one.
    Final,
    /// Repechage pool match among designated losers.
    Repechage,
    /// Terminal bronze-medal match.
    Bronze,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Main => write!(f, "main"),
            MatchType::Final => write!(f, "final"),
            MatchType::Repechage => write!(f, "repechage"),
            MatchType::Bronze => write!(f, "bronze"),
        }
    }
}

/// Symbolic match coordinates carried alongside every match record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMeta {
    /// `"R{round}:M{position}"`, prefixed `"REP:"` for repechage records.
    pub path: String,
}

impl MatchMeta {
    pub fn main(round: u32, position: u32) -> Self {
        Self { path: format!("R{round}:M{position}") }
    }

    pub fn repechage(round: u32, position: u32) -> Self {
        Self { path: format!("REP:R{round}:M{position}") }
    }
}

/// One main-draw match.  Round-1 matches carry athletes from the slot
/// assignment; later rounds leave both sides empty until competition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// `match-{counter}-{seed_prefix}`: unique and an audit trail at once.
    pub id: String,
    pub match_type: MatchType,
    /// 1-based round number; round 1 is the slot round.
    pub round: u32,
    /// 1-based position within the round.
    pub position: u32,
    pub athlete_red: Option<String>,
    pub athlete_white: Option<String>,
    /// True iff a round-1 side is empty; the present athlete advances.
    pub is_bye: bool,
    /// The round-(r+1) match the winner advances to.  The final has none.
    pub next_match_id: Option<String>,
    pub metadata: MatchMeta,
}

/// One repechage-graph match.  The side not covered by
/// `source_loser_match_id` is the winner of the previous chain match, or
/// empty for a round-1 entry (a bye).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepechageMatch {
    pub id: String,
    pub match_type: MatchType,
    pub round: u32,
    pub position: u32,
    /// Main-draw match whose loser drops into this slot.  Each consumed
    /// main-draw match feeds exactly one repechage match.
    pub source_loser_match_id: String,
    /// Next chain match; bronze matches are terminal.
    pub next_match_id: Option<String>,
    /// True for round-1 entry slots whose loser advances unopposed.
    pub is_bye: bool,
    pub metadata: MatchMeta,
}

/// Diagnostic block over the final placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    /// Round-1 matches where both athletes share a non-null club.
    pub club_collisions_r1: u32,
    /// Round-1 matches where both athletes share a non-null nation.
    pub nation_collisions_r1: u32,
    /// Fraction of top seeds not paired against another top seed in round 1.
    pub seed_protection: f64,
    /// Fraction of byes attached to top-seed slots.
    pub bye_fairness: f64,
    /// Scalar 0..=100 combining the above.
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub participants: u32,
    /// Bracket size: the next power of two at or above the field size.
    pub size: u32,
    pub rounds: u32,
    pub byes: u32,
    pub repechage: bool,
    /// The resolved draw seed.  Feed it back as `context.draw_seed` to
    /// reproduce this draw exactly.
    pub draw_seed: String,
    pub quality: Quality,
}

/// One occupied slot of the bracket, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSlot {
    pub athlete_id: String,
    pub slot: u32,
    pub seed: Option<u32>,
}

/// The complete output of [`generate_draw`](super::generate_draw).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub engine_version: String,
    pub summary: Summary,
    pub participants_slots: Vec<ParticipantSlot>,
    pub matches: Vec<Match>,
    pub repechage_matches: Vec<RepechageMatch>,
}

// ---------------------------------------------------------------------------
// Wire defaults (mirroring the upstream service models)
// ---------------------------------------------------------------------------

fn default_repechage() -> bool {
    true
}

fn default_max_seeds() -> u32 {
    8
}

fn default_min_16() -> u32 {
    8
}

fn default_lt_16() -> u32 {
    4
}

fn default_separate_by() -> Vec<SeparationKey> {
    vec![SeparationKey::Club]
}

fn default_same_club_r1() -> u32 {
    1000
}

fn default_same_nation_r1() -> u32 {
    600
}

fn default_rematch_recent() -> u32 {
    400
}
