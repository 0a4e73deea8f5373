//! Agent Ids
//!
//! Short random base-36 strings, unique within a run.

use rand::Rng;
use std::collections::HashSet;
use swarm_ledger::RESERVED_LEDGER_ID;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated ids
pub const ID_LENGTH: usize = 6;

/// Generate a random base-36 id
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Generate an id not in `issued` and not the reserved ledger account.
/// Redraws until one is found.
pub fn generate_unique_id<R: Rng + ?Sized>(issued: &HashSet<String>, rng: &mut R) -> String {
    loop {
        let id = random_id(rng);
        if id != RESERVED_LEDGER_ID && !issued.contains(&id) {
            return id;
        }
    }
}
