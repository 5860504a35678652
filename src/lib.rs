//! # bracket_draw_gen
//!
//! A fully offline, deterministic tournament bracket generator for
//! single-elimination competitions with optional repechage.
//!
//! Given a field of participants and a rules block, the engine produces a
//! fully wired draw: the slot assignment, the round-by-round match graph,
//! the repechage sub-graph, and quality diagnostics.  Supplying a
//! `draw_seed` pins the draw exactly; without one, a canonical seed is
//! derived from the request content, so equal requests always draw equal
//! brackets.
//!
//! ## Quick start
//!
//! ```rust
//! use bracket_draw_gen::draw_engine::{
//!     generate_draw, Context, GenerateRequest, History, Participant, Rules,
//! };
//!
//! let response = generate_draw(GenerateRequest {
//!     context: Context::new("judo", "single_elimination"),
//!     rules: Rules::default(),
//!     participants: vec![
//!         Participant::new("a1"),
//!         Participant::new("a2"),
//!         Participant::new("a3"),
//!         Participant::new("a4"),
//!     ],
//!     history: History::default(),
//! })
//! .expect("valid draw");
//!
//! println!("bracket of {} over {} rounds", response.summary.size, response.summary.rounds);
//! for m in &response.matches {
//!     println!("[{}] {} at {}", m.id, m.match_type, m.metadata.path);
//! }
//! ```

pub mod draw_engine;

// Convenience re-exports at crate root.
pub use draw_engine::{
    generate_draw, Context, DrawError, DrawResult, ErrorBody, GenerateRequest,
    GenerateResponse, History, Match, MatchType, Participant, ParticipantSlot, Quality,
    RecentPair, RepechageMatch, Rules, SeedingMode, Summary,
};
