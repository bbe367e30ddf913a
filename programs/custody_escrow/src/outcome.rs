//! Wager outcome resolution
//!
//! The rule is fixed in code before any order is funded:
//!
//! `winner = Creator` when the low bit of
//! `sha256("custody-wager" || order || acceptor || slot || slot_hash)` is 0,
//! `Acceptor` otherwise. `(slot, slot_hash)` is the newest `SlotHashes` entry
//! at the moment the accepting instruction executes.

use solana_program::{hash::hashv, pubkey::Pubkey};

use crate::error::CustodyError;

const DOMAIN: &[u8] = b"custody-wager";

/// Block-level entropy captured at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entropy {
    pub slot: u64,
    pub hash: [u8; 32],
}

impl Entropy {
    /// Read the newest entry from raw `SlotHashes` sysvar data
    /// (`u64` length followed by `(u64 slot, [u8; 32] hash)` entries).
    pub fn from_slot_hashes(data: &[u8]) -> Result<Self, CustodyError> {
        let len = data
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(CustodyError::EntropyUnavailable)?;
        if len == 0 {
            return Err(CustodyError::EntropyUnavailable);
        }
        let slot = data
            .get(8..16)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(CustodyError::EntropyUnavailable)?;
        let hash: [u8; 32] = data
            .get(16..48)
            .and_then(|b| b.try_into().ok())
            .ok_or(CustodyError::EntropyUnavailable)?;
        Ok(Self { slot, hash })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Creator,
    Acceptor,
}

pub fn resolve(order: &Pubkey, acceptor: &Pubkey, entropy: &Entropy) -> Side {
    let digest = hashv(&[
        DOMAIN,
        order.as_ref(),
        acceptor.as_ref(),
        &entropy.slot.to_le_bytes(),
        &entropy.hash,
    ]);
    if digest.to_bytes()[0] & 1 == 0 {
        Side::Creator
    } else {
        Side::Acceptor
    }
}
