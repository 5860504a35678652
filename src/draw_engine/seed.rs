//! Canonical draw-seed derivation and the deterministic random stream.
//!
//! A caller may pin a draw with `context.draw_seed`.  When it is absent the
//! engine derives one by hashing a canonical rendering of the request:
//! participants sorted by `athlete_id`, object keys lexicographically
//! sorted, compact separators, optional fields as explicit `null`.  Derived
//! seeds carry a `sha256:` prefix so they are self-describing.
//!
//! Either way, the resolved seed parameterizes everything downstream: the
//! match-id prefix and the single [`DrawRng`] stream.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::draw_engine::error::{DrawError, DrawResult};
use crate::draw_engine::models::{GenerateRequest, Participant, Rules};

/// Scheme prefix of derived seeds.
pub const SEED_SCHEME: &str = "sha256:";

/// How many seed characters are embedded in every match id.
const ID_PREFIX_LEN: usize = 8;

#[derive(Serialize)]
struct CanonicalDraw<'a> {
    sport: &'a str,
    format: &'a str,
    rules: &'a Rules,
    participants: Vec<&'a Participant>,
}

/// Return `context.draw_seed` verbatim, or derive the canonical seed from
/// `(sport, format, rules, participants)`.
///
/// Canonically equal requests (e.g. the same participants in a different
/// order) resolve to the same seed.
pub fn resolve_draw_seed(request: &GenerateRequest) -> DrawResult<String> {
    if let Some(seed) = &request.context.draw_seed {
        return Ok(seed.clone());
    }

    let mut participants: Vec<&Participant> = request.participants.iter().collect();
    participants.sort_by(|a, b| a.athlete_id.cmp(&b.athlete_id));

    let canonical = CanonicalDraw {
        sport: &request.context.sport,
        format: &request.context.format,
        rules: &request.rules,
        participants,
    };

    // serde_json maps are BTreeMap-backed, so rendering through Value gives
    // lexicographically sorted keys and no insignificant whitespace.
    let value = serde_json::to_value(&canonical)
        .map_err(|e| DrawError::InternalInvariant(format!("canonical form failed: {e}")))?;

    Ok(format!("{SEED_SCHEME}{}", hex_digest(value.to_string().as_bytes())))
}

/// First 8 characters of the resolved seed, with a `sha256:` scheme prefix
/// stripped first.  Embedded in every match id.
pub fn seed_prefix(draw_seed: &str) -> String {
    let body = draw_seed.strip_prefix(SEED_SCHEME).unwrap_or(draw_seed);
    body.chars().take(ID_PREFIX_LEN).collect()
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

/// The explicit handle over the engine's single pseudo-random stream.
///
/// Every decision that needs a tiebreak or shuffle must draw from this
/// stream; no other entropy source exists in the engine.  The stream is
/// seeded from the leading 32 bits of SHA-256 over the resolved draw seed,
/// so equal seeds give equal streams on every platform.
pub struct DrawRng {
    inner: StdRng,
}

impl DrawRng {
    pub fn from_draw_seed(draw_seed: &str) -> Self {
        let digest = Sha256::digest(draw_seed.as_bytes());
        let lead = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        Self { inner: StdRng::seed_from_u64(u64::from(lead)) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Fisher-Yates shuffle from the stream.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.inner.gen_range(0..=i);
            items.swap(i, j);
        }
    }
}
