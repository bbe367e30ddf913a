//! Host primitives the transition engine calls out to
//!
//! The engine never touches accounts directly. A host supplies balances, an
//! asset-transfer primitive and an account-allocation primitive; the on-chain
//! processor implements them with CPIs, `memory` implements them in process.

use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{error::CustodyError, state::OrderRecord};

/// An asset account, identified by the identity that controls it and the
/// asset it holds. A vault's owner is its order address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Holding {
    pub owner: Pubkey,
    pub asset: Pubkey,
}

impl Holding {
    pub fn new(owner: Pubkey, asset: Pubkey) -> Self {
        Self { owner, asset }
    }
}

/// One unit of value movement: `amount` of `from.asset` from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub from: Holding,
    pub to: Holding,
    pub amount: u64,
}

pub trait BalanceView {
    fn balance_of(&self, holding: &Holding) -> Result<u64, ProgramError>;
}

/// Asset-transfer primitive. Fails if the source cannot cover `leg.amount`.
pub trait CustodyLedger: BalanceView {
    fn transfer(&mut self, leg: &Leg) -> ProgramResult;

    /// Release whatever backing the vault of `order` still holds once the
    /// order is terminal. Hosts without account rent have nothing to do.
    fn drain_vault(&mut self, _order: &Pubkey, _record: &OrderRecord) -> ProgramResult {
        Ok(())
    }
}

/// Result of [`OrderStore::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Existing(OrderRecord),
    Created(OrderRecord),
}

/// Order record storage plus the account-allocation primitive.
pub trait OrderStore {
    fn load(&self, address: &Pubkey) -> Result<Option<OrderRecord>, ProgramError>;

    /// Allocate the record account and its vault at their derived addresses,
    /// paid for by `payer`. Fails if already allocated or if the payer cannot
    /// cover the allocation cost.
    fn allocate(&mut self, address: &Pubkey, payer: &Pubkey, record: &OrderRecord) -> ProgramResult;

    fn save(&mut self, address: &Pubkey, record: &OrderRecord) -> ProgramResult;

    fn get_or_create<F>(&mut self, address: &Pubkey, payer: &Pubkey, init: F) -> Result<Entry, ProgramError>
    where
        F: FnOnce() -> OrderRecord,
    {
        if let Some(existing) = self.load(address)? {
            return Ok(Entry::Existing(existing));
        }
        let record = init();
        self.allocate(address, payer, &record)?;
        self.save(address, &record)?;
        Ok(Entry::Created(record))
    }
}

/// Look up a record that must exist; an absent record is `Uninitialized`.
pub fn require_record<S: OrderStore + ?Sized>(
    store: &S,
    address: &Pubkey,
) -> Result<OrderRecord, ProgramError> {
    store
        .load(address)?
        .ok_or_else(|| CustodyError::InvalidState.into())
}
