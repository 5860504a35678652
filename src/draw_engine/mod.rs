//! Core draw engine: sizing, seeding, placement, and graph construction.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | All shared types: request/response structs, matches, quality |
//! | `error`     | Error taxonomy and the `{ code, detail }` wire body |
//! | `seed`      | Canonical seed derivation and the deterministic stream |
//! | `seeding`   | Bracket sizing, seed selection, canonical seed positions |
//! | `placement` | Penalty model and the greedy minimum-penalty placer |
//! | `bracket`   | Main-draw match graph with parent/child wiring |
//! | `repechage` | Repechage pools and bronze matches from designated losers |
//! | `quality`   | Collision counts, fairness ratios, the 0..=100 score |
//! | `generator` | Single entry point `generate_draw()` that runs the phases |

pub mod bracket;
pub mod error;
pub mod generator;
pub mod models;
pub mod placement;
pub mod quality;
pub mod repechage;
pub mod seed;
pub mod seeding;

// Re-export the public API surface so callers can use
// `draw_engine::generate_draw` without reaching into sub-modules.
pub use error::{DrawError, DrawResult, ErrorBody};
pub use generator::generate_draw;
pub use models::{
    ByesPolicy, Context, EngineMode, GenerateRequest, GenerateResponse, History, Match,
    MatchMeta, MatchType, Participant, ParticipantSlot, Penalties, Quality, RecentPair,
    RepechageMatch, Rules, SeedingMode, SeedingThresholds, SeparationKey, Summary,
};
