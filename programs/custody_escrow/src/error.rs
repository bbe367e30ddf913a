//! Error types

use solana_program::program_error::ProgramError;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Operation not valid for the current order status")]
    InvalidState,

    #[error("Caller lacks the required role or signature")]
    Unauthorized,

    #[error("Source account cannot cover the transfer")]
    InsufficientBalance,

    #[error("Offered consideration does not match the agreed terms")]
    PriceMismatch,

    #[error("Order already exists")]
    AlreadyExists,

    #[error("No valid derivation nonce found")]
    DerivationExhausted,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Fee account does not match the configured recipient")]
    InvalidFeeAccount,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Invalid counterparty")]
    InvalidCounterparty,

    #[error("Operation not supported for this order variant")]
    UnsupportedOperation,

    #[error("Asset is not on the allow-list")]
    AssetNotAllowed,

    #[error("Invalid fee policy")]
    InvalidFeePolicy,

    #[error("Vault balance does not match the order record")]
    VaultImbalance,

    #[error("Invalid PDA")]
    InvalidPda,

    #[error("Invalid account owner")]
    InvalidAccountOwner,

    #[error("Invalid token account")]
    InvalidTokenAccount,

    #[error("Account not initialized")]
    AccountNotInitialized,

    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Outcome entropy unavailable")]
    EntropyUnavailable,

    #[error("Instruction must not be invoked through CPI")]
    CpiNotAllowed,
}

impl From<CustodyError> for ProgramError {
    fn from(e: CustodyError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
