//! Settlement fee computation
//!
//! A fee is skimmed from the settlement value and routed to the fee recipient
//! fixed at order creation. Proportional fees round down to the unit; the
//! remainder stays with the value being paid out.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::CustodyError;

/// Denominator of proportional rates (basis points).
pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    None,
    /// Flat fee in units of the settled asset
    Fixed { amount: u64 },
    /// `floor(value * bps / 10_000)`
    Proportional { bps: u16 },
}

/// Settlement value divided between the fee recipient and the payee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: u64,
    pub remainder: u64,
}

impl FeePolicy {
    /// Borsh tag plus the largest payload.
    pub const MAX_LEN: usize = 1 + 8;

    pub fn validate(&self) -> Result<(), CustodyError> {
        match self {
            FeePolicy::Proportional { bps } if u64::from(*bps) > BPS_DENOMINATOR => {
                Err(CustodyError::InvalidFeePolicy)
            }
            _ => Ok(()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FeePolicy::None)
    }

    /// Fee owed on a settlement of `value` units.
    pub fn fee_for(&self, value: u64) -> Result<u64, CustodyError> {
        self.validate()?;
        let fee = match *self {
            FeePolicy::None => 0,
            FeePolicy::Fixed { amount } => amount,
            FeePolicy::Proportional { bps } => {
                let scaled = u128::from(value)
                    .checked_mul(u128::from(bps))
                    .ok_or(CustodyError::ArithmeticOverflow)?;
                u64::try_from(scaled / u128::from(BPS_DENOMINATOR))
                    .map_err(|_| CustodyError::ArithmeticOverflow)?
            }
        };
        Ok(fee)
    }

    pub fn split(&self, value: u64) -> Result<FeeSplit, CustodyError> {
        let fee = self.fee_for(value)?;
        let remainder = value
            .checked_sub(fee)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        Ok(FeeSplit { fee, remainder })
    }
}

/// Rejects a fee account that is not the recipient fixed on the order.
///
/// Orders without a fee recipient accept any supplied account, since no fee
/// leg is ever routed to it.
pub fn check_fee_recipient(
    configured: Option<&Pubkey>,
    supplied: Option<&Pubkey>,
) -> Result<(), CustodyError> {
    match configured {
        None => Ok(()),
        Some(expected) if supplied == Some(expected) => Ok(()),
        Some(_) => Err(CustodyError::InvalidFeeAccount),
    }
}
