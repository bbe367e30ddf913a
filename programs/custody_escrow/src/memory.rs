//! In-process host
//!
//! `MemoryLedger` keeps party balances and order records in hash maps and
//! implements the host traits directly, so the transition engine can run
//! against mock party accounts without a validator. `SharedLedger` wraps it
//! in a mutex and gives every operation an all-or-nothing commit unit.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::CustodyError,
    host::{BalanceView, CustodyLedger, Holding, Leg, OrderStore},
    state::OrderRecord,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<Holding, u64>,
    records: HashMap<Pubkey, OrderRecord>,
    /// Asset allocation costs are paid in
    native_asset: Pubkey,
    /// Charged to the payer per allocated order
    allocation_cost: u64,
}

impl MemoryLedger {
    pub fn new(native_asset: Pubkey, allocation_cost: u64) -> Self {
        Self {
            native_asset,
            allocation_cost,
            ..Self::default()
        }
    }

    pub fn native_asset(&self) -> Pubkey {
        self.native_asset
    }

    /// Mint `amount` into a holding.
    pub fn deposit(&mut self, holding: Holding, amount: u64) -> Result<(), CustodyError> {
        let balance = self.balances.entry(holding).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn balance(&self, holding: &Holding) -> u64 {
        self.balances.get(holding).copied().unwrap_or(0)
    }

    pub fn record(&self, address: &Pubkey) -> Option<&OrderRecord> {
        self.records.get(address)
    }

    /// Sum of every holding of `asset`.
    pub fn supply(&self, asset: &Pubkey) -> u128 {
        self.balances
            .iter()
            .filter(|(holding, _)| holding.asset == *asset)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }

    fn debit(&mut self, holding: &Holding, amount: u64) -> Result<(), CustodyError> {
        let balance = self
            .balances
            .get_mut(holding)
            .ok_or(CustodyError::InsufficientBalance)?;
        *balance = balance
            .checked_sub(amount)
            .ok_or(CustodyError::InsufficientBalance)?;
        Ok(())
    }
}

impl BalanceView for MemoryLedger {
    fn balance_of(&self, holding: &Holding) -> Result<u64, ProgramError> {
        Ok(self.balance(holding))
    }
}

impl CustodyLedger for MemoryLedger {
    fn transfer(&mut self, leg: &Leg) -> ProgramResult {
        if leg.from.asset != leg.to.asset {
            return Err(CustodyError::InvalidTokenAccount.into());
        }
        self.debit(&leg.from, leg.amount)?;
        self.deposit(leg.to, leg.amount)?;
        Ok(())
    }
}

impl OrderStore for MemoryLedger {
    fn load(&self, address: &Pubkey) -> Result<Option<OrderRecord>, ProgramError> {
        Ok(self.records.get(address).cloned())
    }

    /// The allocation cost moves from the payer to the order address itself,
    /// the way account rent sits on the allocated account.
    fn allocate(&mut self, address: &Pubkey, payer: &Pubkey, _record: &OrderRecord) -> ProgramResult {
        if self.records.contains_key(address) {
            return Err(CustodyError::AlreadyExists.into());
        }
        if self.allocation_cost > 0 {
            let leg = Leg {
                from: Holding::new(*payer, self.native_asset),
                to: Holding::new(*address, self.native_asset),
                amount: self.allocation_cost,
            };
            self.transfer(&leg)?;
        }
        Ok(())
    }

    fn save(&mut self, address: &Pubkey, record: &OrderRecord) -> ProgramResult {
        self.records.insert(*address, record.clone());
        Ok(())
    }
}

/// Thread-safe handle to a `MemoryLedger`.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<MemoryLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: MemoryLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` against a working copy and publish it only if `f` succeeds.
    ///
    /// Concurrent callers are serialized, so a status check made inside `f`
    /// still holds when its writes land.
    pub fn transact<T, F>(&self, f: F) -> Result<T, ProgramError>
    where
        F: FnOnce(&mut MemoryLedger) -> Result<T, ProgramError>,
    {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }

    pub fn snapshot(&self) -> MemoryLedger {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
