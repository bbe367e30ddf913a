//! Account state definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{error::CustodyError, fee::FeePolicy};

/// Maximum number of entries in the asset allow-list.
pub const MAX_ALLOWED_ASSETS: usize = 16;

/// Lifecycle of an order. `Settled` and `Cancelled` are terminal.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Uninitialized,
    Open,
    Funded,
    Settled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Settled | OrderStatus::Cancelled)
    }
}

/// Escrow flavour. Each variant owns a separate address namespace.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Deposit held for the creator, withdrawable or releasable to a designated counterparty
    Escrow,
    /// Escrowed asset sold to a taker for `price` units of a consideration asset
    Trade,
    /// Matched stakes, paid to a resolved winner
    Wager,
}

impl Variant {
    pub fn namespace(&self) -> &'static [u8] {
        match self {
            Variant::Escrow => seeds::ESCROW_NAMESPACE,
            Variant::Trade => seeds::TRADE_NAMESPACE,
            Variant::Wager => seeds::WAGER_NAMESPACE,
        }
    }
}

/// Per-order state account.
/// PDA seeds: [namespace, creator, asset, order_id (u64 LE)]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    /// Discriminator for account type
    pub discriminator: [u8; 8],
    pub variant: Variant,
    pub status: OrderStatus,
    pub order_id: u64,
    /// Party that created and funds the order
    pub creator: Pubkey,
    /// Designated or matched counterparty
    pub counterparty: Option<Pubkey>,
    /// Mint of the escrowed asset
    pub asset: Pubkey,
    /// Quantity agreed at creation; `fund` moves exactly this much
    pub quantity: u64,
    /// Quantity currently held by the vault
    pub amount: u64,
    /// Trade price, in units of `consideration_asset`
    pub price: Option<u64>,
    /// Mint the taker pays with (Trade only)
    pub consideration_asset: Option<Pubkey>,
    /// Fee policy snapshotted from the config at creation
    pub fee_policy: FeePolicy,
    pub fee_recipient: Option<Pubkey>,
    /// Resolved wager winner
    pub winner: Option<Pubkey>,
    /// Derivation nonce of the order address
    pub bump: u8,
    /// Derivation nonce of the vault address
    pub vault_bump: u8,
}

impl OrderRecord {
    pub const DISCRIMINATOR: [u8; 8] = [0x43, 0x55, 0x53, 0x54, 0x4f, 0x52, 0x44, 0x52]; // "CUSTORDR"
    pub const LEN: usize = 8 // discriminator
        + 1 + 1 // variant, status
        + 8 // order_id
        + 32 + 33 // creator, counterparty
        + 32 + 8 + 8 // asset, quantity, amount
        + 9 + 33 // price, consideration_asset
        + FeePolicy::MAX_LEN + 33 // fee_policy, fee_recipient
        + 33 // winner
        + 1 + 1; // bumps

    /// Decode from account data. Trailing bytes past the encoded record are ignored.
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let record = Self::deserialize(&mut &data[..])
            .map_err(|_| CustodyError::AccountNotInitialized)?;
        if record.discriminator != Self::DISCRIMINATOR {
            return Err(CustodyError::AccountNotInitialized.into());
        }
        Ok(record)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut dst[..])?;
        Ok(())
    }
}

/// Program configuration account.
/// PDA seeds: ["config"]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Discriminator for account type
    pub discriminator: [u8; 8],
    /// Authority allowed to update this config
    pub admin: Pubkey,
    /// Receives the settlement fee of orders created under this config
    pub fee_recipient: Pubkey,
    pub fee_policy: FeePolicy,
    /// Assets accepted by the program. Empty means unrestricted.
    pub allowed_assets: Vec<Pubkey>,
    /// PDA bump seed
    pub bump: u8,
}

impl ProgramConfig {
    pub const DISCRIMINATOR: [u8; 8] = [0x43, 0x55, 0x53, 0x54, 0x43, 0x4f, 0x4e, 0x46]; // "CUSTCONF"
    pub const LEN: usize = 8 + 32 + 32 + FeePolicy::MAX_LEN + 4 + 32 * MAX_ALLOWED_ASSETS + 1;

    pub fn new(
        admin: Pubkey,
        fee_recipient: Pubkey,
        fee_policy: FeePolicy,
        allowed_assets: Vec<Pubkey>,
        bump: u8,
    ) -> Result<Self, CustodyError> {
        let config = Self {
            discriminator: Self::DISCRIMINATOR,
            admin,
            fee_recipient,
            fee_policy,
            allowed_assets,
            bump,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CustodyError> {
        self.fee_policy.validate()?;
        if self.allowed_assets.len() > MAX_ALLOWED_ASSETS {
            return Err(CustodyError::AssetNotAllowed);
        }
        Ok(())
    }

    pub fn is_asset_allowed(&self, asset: &Pubkey) -> bool {
        self.allowed_assets.is_empty() || self.allowed_assets.contains(asset)
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let config = Self::deserialize(&mut &data[..])
            .map_err(|_| CustodyError::AccountNotInitialized)?;
        if config.discriminator != Self::DISCRIMINATOR {
            return Err(CustodyError::AccountNotInitialized.into());
        }
        Ok(config)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut dst[..])?;
        Ok(())
    }
}

/// Seeds for PDA derivation
pub mod seeds {
    pub const CONFIG_SEED: &[u8] = b"config";
    pub const VAULT_SEED: &[u8] = b"vault";
    pub const ESCROW_NAMESPACE: &[u8] = b"escrow";
    pub const TRADE_NAMESPACE: &[u8] = b"trade";
    pub const WAGER_NAMESPACE: &[u8] = b"wager";
}
