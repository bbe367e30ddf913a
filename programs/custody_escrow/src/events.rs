//! Event definitions for the custody program.
//!
//! Events are emitted via solana_program::msg! and can be parsed from transaction logs.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    engine::{Operation, Transition},
    fee::FeePolicy,
    host::Leg,
    state::{OrderRecord, ProgramConfig},
};

/// Emitted when an order record and its vault are allocated.
pub fn emit_order_created(order: &Pubkey, record: &OrderRecord) {
    msg!(
        "OrderCreated: order={}, variant={:?}, order_id={}, creator={}, asset={}, quantity={}",
        order,
        record.variant,
        record.order_id,
        record.creator,
        record.asset,
        record.quantity
    );
}

/// Emitted once per committed transition.
pub fn emit_transition(order: &Pubkey, transition: &Transition) {
    let record = &transition.record;
    match transition.operation {
        Operation::Fund => msg!(
            "OrderFunded: order={}, creator={}, amount={}",
            order,
            record.creator,
            record.amount
        ),
        Operation::Withdraw => msg!(
            "OrderWithdrawn: order={}, withdrawn={}, remaining={}, status={:?}",
            order,
            moved(transition),
            record.amount,
            record.status
        ),
        Operation::Cancel => msg!(
            "OrderCancelled: order={}, creator={}, refunded={}",
            order,
            record.creator,
            moved(transition)
        ),
        Operation::Release | Operation::Buy => msg!(
            "OrderSettled: order={}, counterparty={}, fee={}",
            order,
            display(record.counterparty.as_ref()),
            transition.fee
        ),
        Operation::Accept => {
            msg!(
                "OrderSettled: order={}, counterparty={}, fee={}",
                order,
                display(record.counterparty.as_ref()),
                transition.fee
            );
            emit_wager_resolved(order, record, transition);
        }
    }
}

fn emit_wager_resolved(order: &Pubkey, record: &OrderRecord, transition: &Transition) {
    let payout = transition
        .legs
        .iter()
        .find(|leg| Some(leg.to.owner) == record.winner)
        .map(|leg| leg.amount)
        .unwrap_or(0);
    msg!(
        "WagerResolved: order={}, winner={}, payout={}",
        order,
        display(record.winner.as_ref()),
        payout
    );
}

/// Emitted for a direct allow-listed transfer.
pub fn emit_asset_transferred(leg: &Leg) {
    msg!(
        "AssetTransferred: from={}, to={}, asset={}, amount={}",
        leg.from.owner,
        leg.to.owner,
        leg.from.asset,
        leg.amount
    );
}

/// Emitted when the configuration is created or updated.
pub fn emit_config_updated(config: &ProgramConfig) {
    let fee = match config.fee_policy {
        FeePolicy::None => "none".to_string(),
        FeePolicy::Fixed { amount } => format!("fixed:{}", amount),
        FeePolicy::Proportional { bps } => format!("bps:{}", bps),
    };
    msg!(
        "ConfigUpdated: admin={}, fee_recipient={}, fee={}, allowed_assets={}",
        config.admin,
        config.fee_recipient,
        fee,
        config.allowed_assets.len()
    );
}

fn moved(transition: &Transition) -> u64 {
    transition.legs.iter().map(|leg| leg.amount).sum()
}

fn display(key: Option<&Pubkey>) -> String {
    key.map(|k| k.to_string()).unwrap_or_else(|| "none".to_string())
}
