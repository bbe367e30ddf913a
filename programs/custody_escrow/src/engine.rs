//! Order lifecycle transitions
//!
//! Every operation is split in two phases. Planning loads the record, checks
//! the order's capability address, its status, the caller's role, the agreed
//! terms and every source balance, and computes all amounts with checked
//! arithmetic. Nothing is written while planning, so a failed check leaves
//! the vault, the parties and the record untouched. Committing then applies
//! the planned legs and stores the new record inside the host's atomic unit.

use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::CustodyError,
    events,
    fee::check_fee_recipient,
    host::{require_record, BalanceView, CustodyLedger, Entry, Holding, Leg, OrderStore},
    outcome::{self, Entropy, Side},
    pda::{derive_vault_address, OrderSeeds},
    state::{OrderRecord, OrderStatus, ProgramConfig, Variant},
};

/// Parameters of a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub variant: Variant,
    pub order_id: u64,
    pub creator: Pubkey,
    pub asset: Pubkey,
    pub quantity: u64,
    pub price: Option<u64>,
    pub counterparty: Option<Pubkey>,
    pub consideration_asset: Option<Pubkey>,
}

/// Settlement request from the party completing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleRequest {
    pub caller: Pubkey,
    /// Price (Trade), stake (Wager) or released amount (Escrow) the caller agrees to
    pub offered: u64,
    /// Owner of the fee account supplied with the request
    pub fee_recipient: Option<Pubkey>,
    /// Required for Wager settlement
    pub entropy: Option<Entropy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fund,
    Withdraw,
    Cancel,
    Release,
    Buy,
    Accept,
}

/// A fully validated state change, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub operation: Operation,
    pub record: OrderRecord,
    pub legs: Vec<Leg>,
    pub fee: u64,
}

pub struct TransitionEngine {
    program_id: Pubkey,
}

impl TransitionEngine {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn order_address(
        &self,
        variant: Variant,
        creator: &Pubkey,
        asset: &Pubkey,
        order_id: u64,
    ) -> Result<(Pubkey, u8), CustodyError> {
        OrderSeeds::new(variant.namespace(), creator, asset, order_id).derive(&self.program_id)
    }

    pub fn vault_holding(address: &Pubkey, record: &OrderRecord) -> Holding {
        Holding::new(*address, record.asset)
    }

    /// The record at `address` must be the one its own seeds derive to.
    pub fn authorize(&self, address: &Pubkey, record: &OrderRecord) -> Result<(), CustodyError> {
        OrderSeeds::of(record).verify(&self.program_id, record.bump, address)
    }

    // ========================================================================
    // CREATE
    // ========================================================================

    pub fn create<H>(
        &self,
        host: &mut H,
        config: &ProgramConfig,
        order: &CreateOrder,
    ) -> Result<(Pubkey, OrderRecord), ProgramError>
    where
        H: OrderStore + ?Sized,
    {
        if order.quantity == 0 {
            return Err(CustodyError::InvalidAmount.into());
        }
        if !config.is_asset_allowed(&order.asset) {
            return Err(CustodyError::AssetNotAllowed.into());
        }
        let settlement_value = match order.variant {
            Variant::Trade => {
                let price = match order.price {
                    Some(price) if price > 0 => price,
                    _ => return Err(CustodyError::InvalidPrice.into()),
                };
                let consideration = order
                    .consideration_asset
                    .ok_or(CustodyError::InvalidPrice)?;
                if !config.is_asset_allowed(&consideration) {
                    return Err(CustodyError::AssetNotAllowed.into());
                }
                price
            }
            Variant::Escrow | Variant::Wager => {
                if order.price.is_some() || order.consideration_asset.is_some() {
                    return Err(CustodyError::InvalidPrice.into());
                }
                if order.variant == Variant::Wager {
                    order
                        .quantity
                        .checked_add(order.quantity)
                        .ok_or(CustodyError::ArithmeticOverflow)?
                } else {
                    order.quantity
                }
            }
        };
        if order.counterparty == Some(order.creator) {
            return Err(CustodyError::InvalidCounterparty.into());
        }
        // The fee must fit inside the value the order settles for
        config
            .fee_policy
            .split(settlement_value)
            .map_err(|_| CustodyError::InvalidFeePolicy)?;

        let (address, bump) =
            self.order_address(order.variant, &order.creator, &order.asset, order.order_id)?;
        let (_, vault_bump) = derive_vault_address(&self.program_id, &address)?;
        let fee_recipient = if config.fee_policy.is_none() {
            None
        } else {
            Some(config.fee_recipient)
        };

        let entry = host.get_or_create(&address, &order.creator, || OrderRecord {
            discriminator: OrderRecord::DISCRIMINATOR,
            variant: order.variant,
            status: OrderStatus::Open,
            order_id: order.order_id,
            creator: order.creator,
            counterparty: order.counterparty,
            asset: order.asset,
            quantity: order.quantity,
            amount: 0,
            price: order.price,
            consideration_asset: order.consideration_asset,
            fee_policy: config.fee_policy,
            fee_recipient,
            winner: None,
            bump,
            vault_bump,
        })?;

        match entry {
            Entry::Existing(_) => Err(CustodyError::AlreadyExists.into()),
            Entry::Created(record) => {
                events::emit_order_created(&address, &record);
                Ok((address, record))
            }
        }
    }

    // ========================================================================
    // FUND / WITHDRAW / CANCEL
    // ========================================================================

    pub fn fund<H>(&self, host: &H, address: &Pubkey, caller: &Pubkey) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        let record = self.load_authorized(host, address)?;
        require_status(&record, &[OrderStatus::Open])?;
        require_creator(&record, caller)?;

        let vault = Self::vault_holding(address, &record);
        ensure_vault_backs(host, &vault, record.amount)?;
        let source = Holding::new(record.creator, record.asset);
        ensure_covers(host, &source, record.quantity)?;

        let mut next = record.clone();
        next.amount = record.quantity;
        next.status = OrderStatus::Funded;

        let mut legs = Vec::new();
        push_leg(&mut legs, source, vault, record.quantity);
        Ok(Transition {
            operation: Operation::Fund,
            record: next,
            legs,
            fee: 0,
        })
    }

    pub fn withdraw<H>(
        &self,
        host: &H,
        address: &Pubkey,
        caller: &Pubkey,
        amount: u64,
    ) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        let record = self.load_authorized(host, address)?;
        require_status(&record, &[OrderStatus::Funded])?;
        if record.variant != Variant::Escrow {
            return Err(CustodyError::UnsupportedOperation.into());
        }
        require_creator(&record, caller)?;
        if amount == 0 {
            return Err(CustodyError::InvalidAmount.into());
        }
        if amount > record.amount {
            return Err(CustodyError::InsufficientBalance.into());
        }

        let vault = Self::vault_holding(address, &record);
        ensure_vault_backs(host, &vault, record.amount)?;

        let mut next = record.clone();
        next.amount = record
            .amount
            .checked_sub(amount)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        if next.amount == 0 {
            next.status = OrderStatus::Settled;
        } else if record.fee_policy.split(next.amount).is_err() {
            // A remainder smaller than the fee could never be released
            return Err(CustodyError::InvalidAmount.into());
        }

        let mut legs = Vec::new();
        push_leg(&mut legs, vault, Holding::new(record.creator, record.asset), amount);
        Ok(Transition {
            operation: Operation::Withdraw,
            record: next,
            legs,
            fee: 0,
        })
    }

    /// Return the full vault balance to the creator.
    pub fn cancel<H>(&self, host: &H, address: &Pubkey, caller: &Pubkey) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        let record = self.load_authorized(host, address)?;
        require_status(&record, &[OrderStatus::Open, OrderStatus::Funded])?;
        require_creator(&record, caller)?;

        let vault = Self::vault_holding(address, &record);
        let refund = host.balance_of(&vault)?;

        let mut next = record.clone();
        next.amount = 0;
        next.status = OrderStatus::Cancelled;

        let mut legs = Vec::new();
        push_leg(&mut legs, vault, Holding::new(record.creator, record.asset), refund);
        Ok(Transition {
            operation: Operation::Cancel,
            record: next,
            legs,
            fee: 0,
        })
    }

    // ========================================================================
    // SETTLEMENT
    // ========================================================================

    /// Settle a funded order according to its variant.
    pub fn settle<H>(
        &self,
        host: &H,
        address: &Pubkey,
        request: &SettleRequest,
    ) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        let record = self.load_authorized(host, address)?;
        require_status(&record, &[OrderStatus::Funded])?;

        let vault = Self::vault_holding(address, &record);
        ensure_vault_backs(host, &vault, record.amount)?;

        match record.variant {
            Variant::Escrow => self.plan_release(record, vault, request),
            Variant::Trade => self.plan_buy(host, record, vault, request),
            Variant::Wager => self.plan_accept(host, address, record, vault, request),
        }
    }

    pub fn release<H>(&self, host: &H, address: &Pubkey, request: &SettleRequest) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        self.settle_as(host, address, request, Variant::Escrow)
    }

    pub fn buy<H>(&self, host: &H, address: &Pubkey, request: &SettleRequest) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        self.settle_as(host, address, request, Variant::Trade)
    }

    pub fn accept<H>(&self, host: &H, address: &Pubkey, request: &SettleRequest) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        self.settle_as(host, address, request, Variant::Wager)
    }

    fn settle_as<H>(
        &self,
        host: &H,
        address: &Pubkey,
        request: &SettleRequest,
        variant: Variant,
    ) -> Result<Transition, ProgramError>
    where
        H: OrderStore + BalanceView + ?Sized,
    {
        let record = require_record(host, address)?;
        if record.variant != variant {
            return Err(CustodyError::UnsupportedOperation.into());
        }
        self.settle(host, address, request)
    }

    /// Creator releases the deposit to the designated counterparty.
    fn plan_release(
        &self,
        record: OrderRecord,
        vault: Holding,
        request: &SettleRequest,
    ) -> Result<Transition, ProgramError> {
        require_creator(&record, &request.caller)?;
        let counterparty = record
            .counterparty
            .ok_or(CustodyError::InvalidCounterparty)?;
        if request.offered != record.amount {
            return Err(CustodyError::PriceMismatch.into());
        }
        check_fee_recipient(record.fee_recipient.as_ref(), request.fee_recipient.as_ref())?;
        let split = record.fee_policy.split(record.amount)?;

        let mut legs = Vec::new();
        push_leg(&mut legs, vault, Holding::new(counterparty, record.asset), split.remainder);
        if let Some(fee_recipient) = record.fee_recipient {
            push_leg(&mut legs, vault, Holding::new(fee_recipient, record.asset), split.fee);
        }

        let mut next = record;
        next.amount = 0;
        next.status = OrderStatus::Settled;
        Ok(Transition {
            operation: Operation::Release,
            record: next,
            legs,
            fee: split.fee,
        })
    }

    /// Taker pays `price` in the consideration asset and receives the escrowed asset.
    fn plan_buy<H>(
        &self,
        host: &H,
        record: OrderRecord,
        vault: Holding,
        request: &SettleRequest,
    ) -> Result<Transition, ProgramError>
    where
        H: BalanceView + ?Sized,
    {
        let taker = request.caller;
        require_taker(&record, &taker)?;
        let price = record.price.ok_or(CustodyError::InvalidPrice)?;
        let consideration = record
            .consideration_asset
            .ok_or(CustodyError::InvalidPrice)?;
        if request.offered != price {
            return Err(CustodyError::PriceMismatch.into());
        }
        check_fee_recipient(record.fee_recipient.as_ref(), request.fee_recipient.as_ref())?;
        let split = record.fee_policy.split(price)?;

        let payer = Holding::new(taker, consideration);
        ensure_covers(host, &payer, price)?;

        let mut legs = Vec::new();
        push_leg(&mut legs, payer, Holding::new(record.creator, consideration), split.remainder);
        if let Some(fee_recipient) = record.fee_recipient {
            push_leg(&mut legs, payer, Holding::new(fee_recipient, consideration), split.fee);
        }
        push_leg(&mut legs, vault, Holding::new(taker, record.asset), record.amount);

        let mut next = record;
        next.counterparty = Some(taker);
        next.amount = 0;
        next.status = OrderStatus::Settled;
        Ok(Transition {
            operation: Operation::Buy,
            record: next,
            legs,
            fee: split.fee,
        })
    }

    /// Taker matches the stake; the resolved winner takes the pool minus fee.
    fn plan_accept<H>(
        &self,
        host: &H,
        address: &Pubkey,
        record: OrderRecord,
        vault: Holding,
        request: &SettleRequest,
    ) -> Result<Transition, ProgramError>
    where
        H: BalanceView + ?Sized,
    {
        let taker = request.caller;
        require_taker(&record, &taker)?;
        let stake = record.amount;
        if request.offered != stake {
            return Err(CustodyError::PriceMismatch.into());
        }
        let entropy = request.entropy.ok_or(CustodyError::EntropyUnavailable)?;
        check_fee_recipient(record.fee_recipient.as_ref(), request.fee_recipient.as_ref())?;

        let taker_holding = Holding::new(taker, record.asset);
        ensure_covers(host, &taker_holding, stake)?;
        let pool = stake
            .checked_add(stake)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        let split = record.fee_policy.split(pool)?;

        // Both possible payouts and the fee leg must be deliverable before the
        // outcome is known, so no account choice can fail only on a loss.
        host.balance_of(&Holding::new(record.creator, record.asset))?;
        if let Some(fee_recipient) = record.fee_recipient {
            host.balance_of(&Holding::new(fee_recipient, record.asset))?;
        }

        let winner = match outcome::resolve(address, &taker, &entropy) {
            Side::Creator => record.creator,
            Side::Acceptor => taker,
        };

        let mut legs = Vec::new();
        push_leg(&mut legs, taker_holding, vault, stake);
        push_leg(&mut legs, vault, Holding::new(winner, record.asset), split.remainder);
        if let Some(fee_recipient) = record.fee_recipient {
            push_leg(&mut legs, vault, Holding::new(fee_recipient, record.asset), split.fee);
        }

        let mut next = record;
        next.counterparty = Some(taker);
        next.winner = Some(winner);
        next.amount = 0;
        next.status = OrderStatus::Settled;
        Ok(Transition {
            operation: Operation::Accept,
            record: next,
            legs,
            fee: split.fee,
        })
    }

    // ========================================================================
    // COMMIT
    // ========================================================================

    pub fn commit<H>(&self, host: &mut H, address: &Pubkey, transition: &Transition) -> ProgramResult
    where
        H: OrderStore + CustodyLedger + ?Sized,
    {
        for leg in &transition.legs {
            host.transfer(leg)?;
        }
        if transition.record.status.is_terminal() {
            host.drain_vault(address, &transition.record)?;
        }
        host.save(address, &transition.record)?;
        events::emit_transition(address, transition);
        Ok(())
    }

    // ========================================================================
    // ALLOW-LISTED TRANSFER
    // ========================================================================

    /// Direct party-to-party transfer of an allow-listed asset.
    pub fn plan_transfer<H>(
        &self,
        host: &H,
        config: &ProgramConfig,
        sender: &Pubkey,
        recipient: &Pubkey,
        asset: &Pubkey,
        amount: u64,
    ) -> Result<Leg, ProgramError>
    where
        H: BalanceView + ?Sized,
    {
        if amount == 0 {
            return Err(CustodyError::InvalidAmount.into());
        }
        if !config.is_asset_allowed(asset) {
            return Err(CustodyError::AssetNotAllowed.into());
        }
        if sender == recipient {
            return Err(CustodyError::InvalidCounterparty.into());
        }
        let from = Holding::new(*sender, *asset);
        ensure_covers(host, &from, amount)?;
        Ok(Leg {
            from,
            to: Holding::new(*recipient, *asset),
            amount,
        })
    }

    pub fn commit_transfer<L>(&self, ledger: &mut L, leg: &Leg) -> ProgramResult
    where
        L: CustodyLedger + ?Sized,
    {
        ledger.transfer(leg)?;
        events::emit_asset_transferred(leg);
        Ok(())
    }

    fn load_authorized<H>(&self, host: &H, address: &Pubkey) -> Result<OrderRecord, ProgramError>
    where
        H: OrderStore + ?Sized,
    {
        let record = require_record(host, address)?;
        self.authorize(address, &record)?;
        Ok(record)
    }
}

fn require_status(record: &OrderRecord, allowed: &[OrderStatus]) -> Result<(), CustodyError> {
    if !allowed.contains(&record.status) {
        return Err(CustodyError::InvalidState);
    }
    Ok(())
}

fn require_creator(record: &OrderRecord, caller: &Pubkey) -> Result<(), CustodyError> {
    if record.creator != *caller {
        return Err(CustodyError::Unauthorized);
    }
    Ok(())
}

/// Takers may not be the creator, and must be the designated counterparty if there is one.
fn require_taker(record: &OrderRecord, taker: &Pubkey) -> Result<(), CustodyError> {
    if record.creator == *taker {
        return Err(CustodyError::Unauthorized);
    }
    match record.counterparty {
        Some(designated) if designated != *taker => Err(CustodyError::Unauthorized),
        _ => Ok(()),
    }
}

fn ensure_covers<H>(host: &H, holding: &Holding, amount: u64) -> ProgramResult
where
    H: BalanceView + ?Sized,
{
    if host.balance_of(holding)? < amount {
        return Err(CustodyError::InsufficientBalance.into());
    }
    Ok(())
}

fn ensure_vault_backs<H>(host: &H, vault: &Holding, expected: u64) -> ProgramResult
where
    H: BalanceView + ?Sized,
{
    if host.balance_of(vault)? != expected {
        return Err(CustodyError::VaultImbalance.into());
    }
    Ok(())
}

fn push_leg(legs: &mut Vec<Leg>, from: Holding, to: Holding, amount: u64) {
    if amount > 0 {
        legs.push(Leg { from, to, amount });
    }
}
