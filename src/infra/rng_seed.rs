//! RngSeed: доменный seed для покерного RNG.
//!
//! Позволяет:
//!   - хранить базовый seed ([u8;32])
//!   - получать seed конкретной раздачи:
//!         new = H(domain || base || table_id || hand_id || hand_number)
//!   - создавать DeterministicRng из seed
//!
//! Так любую раздачу можно переиграть по базовому seed и её координатам.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{HandId, TableId};
use crate::infra::rng::DeterministicRng;

const DOMAIN_TAG: &[u8] = b"HOLDEM_ENGINE_HAND_SEED_V1";

/// 32-байтовый seed для RNG.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngSeed {
    pub bytes: [u8; 32],
}

impl RngSeed {
    /// Seed из u64 (младшие 8 байт).
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self { bytes: b }
    }

    /// Seed раздачи `hand_number` за столом `table_id`.
    pub fn for_hand(&self, table_id: TableId, hand_id: HandId, hand_number: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update(self.bytes);
        hasher.update(table_id.to_le_bytes());
        hasher.update(hand_id.to_le_bytes());
        hasher.update(hand_number.to_le_bytes());

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self { bytes }
    }

    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed(self.bytes)
    }
}
