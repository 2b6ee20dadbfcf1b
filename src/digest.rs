use sha2::{Digest, Sha256};

use crate::address::normalize_address;

/// Fingerprint of a distribution: anyone holding the escrow address, chain
/// id, participant list and payout vector can recompute it.
pub fn settlement_digest(
    chain_id: u64,
    escrow: &str,
    participants: &[String],
    payouts: &[u32],
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(chain_id.to_be_bytes());
    hasher.update(normalize_address(escrow).as_bytes());

    for (participant, points) in participants.iter().zip(payouts) {
        hasher.update(normalize_address(participant).as_bytes());
        hasher.update(points.to_be_bytes());
    }

    hex::encode(hasher.finalize())
}
