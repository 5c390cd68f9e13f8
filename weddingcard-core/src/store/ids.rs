//! Identifier generation for new records.

use rand::Rng;
use uuid::Uuid;

use super::StoreError;

/// Length of a public shareable id.
pub const SHAREABLE_ID_LEN: usize = 8;

/// Candidates tried before giving up on a shareable id.
pub const MAX_ID_ATTEMPTS: usize = 16;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Returns a fresh internal record id.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns a random short id suitable for public URLs.
pub fn random_shareable_id() -> String {
    let mut rng = rand::rng();
    (0..SHAREABLE_ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Draws shareable ids until `is_taken` rejects none of them.
///
/// `is_taken` must report ids already used as either a shareable id or an
/// internal id by any record.
pub fn allocate_shareable_id(
    mut is_taken: impl FnMut(&str) -> bool,
) -> Result<String, StoreError> {
    allocate_from(random_shareable_id, &mut is_taken)
}

fn allocate_from(
    mut candidate: impl FnMut() -> String,
    is_taken: &mut impl FnMut(&str) -> bool,
) -> Result<String, StoreError> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = candidate();
        if !is_taken(&id) {
            return Ok(id);
        }
        tracing::debug!(candidate = %id, "shareable id collision, drawing again");
    }
    Err(StoreError::IdsExhausted(MAX_ID_ATTEMPTS))
}
