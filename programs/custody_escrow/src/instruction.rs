//! Instruction definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{fee::FeePolicy, state::Variant};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum CustodyInstruction {
    /// Create the program configuration. The signer becomes admin.
    ///
    /// Accounts expected:
    /// 0. `[writable]` Config account (PDA)
    /// 1. `[writable, signer]` Admin (payer)
    /// 2. `[]` System program
    Initialize {
        fee_recipient: Pubkey,
        fee_policy: FeePolicy,
        allowed_assets: Vec<Pubkey>,
    },

    /// Update the program configuration (admin only)
    ///
    /// Accounts expected:
    /// 0. `[writable]` Config account (PDA)
    /// 1. `[signer]` Admin
    UpdateConfig {
        admin: Option<Pubkey>,
        fee_recipient: Option<Pubkey>,
        fee_policy: Option<FeePolicy>,
        allowed_assets: Option<Vec<Pubkey>>,
    },

    /// Allocate an order record and its vault
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[writable, signer]` Creator (payer)
    /// 3. `[]` Asset mint
    /// 4. `[]` Config account (PDA)
    /// 5. `[]` Token program
    /// 6. `[]` System program
    CreateOrder {
        variant: Variant,
        order_id: u64,
        quantity: u64,
        price: Option<u64>,
        counterparty: Option<Pubkey>,
        consideration_asset: Option<Pubkey>,
    },

    /// Move the agreed quantity from the creator into the vault
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[signer]` Creator
    /// 3. `[writable]` Creator token account
    /// 4. `[]` Token program
    Fund,

    /// Return part of an escrow deposit to the creator
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[writable, signer]` Creator (receives vault rent if the order settles)
    /// 3. `[writable]` Creator token account
    /// 4. `[]` Token program
    Withdraw { amount: u64 },

    /// Cancel an open or funded order and refund the vault
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[writable, signer]` Creator (receives vault rent)
    /// 3. `[writable]` Creator token account
    /// 4. `[]` Token program
    Cancel,

    /// Release an escrow deposit to its designated counterparty
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[writable, signer]` Creator (receives vault rent)
    /// 3. `[writable]` Counterparty token account
    /// 4. `[writable]` Fee recipient token account
    /// 5. `[]` Token program
    Release { expected: u64 },

    /// Buy a trade order at its listed price
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[signer]` Taker
    /// 3. `[writable]` Taker consideration token account (pays)
    /// 4. `[writable]` Taker asset token account (receives)
    /// 5. `[writable]` Creator consideration token account
    /// 6. `[writable]` Fee recipient consideration token account
    /// 7. `[writable]` Creator (receives vault rent)
    /// 8. `[]` Token program
    Buy { price: u64 },

    /// Match a wager stake; the resolved winner takes the pool.
    /// Must be a top-level instruction.
    ///
    /// Accounts expected:
    /// 0. `[writable]` Order account (PDA)
    /// 1. `[writable]` Vault (PDA)
    /// 2. `[signer]` Taker
    /// 3. `[writable]` Taker token account
    /// 4. `[writable]` Creator token account
    /// 5. `[writable]` Fee recipient token account
    /// 6. `[writable]` Creator (receives vault rent)
    /// 7. `[]` SlotHashes sysvar
    /// 8. `[]` Token program
    Accept { stake: u64 },

    /// Transfer an allow-listed asset directly between two parties
    ///
    /// Accounts expected:
    /// 0. `[]` Config account (PDA)
    /// 1. `[signer]` Sender
    /// 2. `[writable]` Sender token account
    /// 3. `[writable]` Recipient token account
    /// 4. `[]` Token program
    Transfer { amount: u64 },
}
