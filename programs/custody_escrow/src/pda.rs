//! Program-derived addresses for orders and vaults
//!
//! An order address is derived from `(namespace, creator, asset, order_id)`
//! and lies off the ed25519 curve, so no private key can ever sign for it.
//! Only this program, holding the derivation inputs, can authorize the order
//! and the vault it controls.

use solana_program::pubkey::Pubkey;

use crate::{
    error::CustodyError,
    state::{seeds, OrderRecord},
};

/// Inputs to an order address derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSeeds<'a> {
    pub namespace: &'a [u8],
    pub owner: &'a Pubkey,
    pub asset: &'a Pubkey,
    pub order_id: u64,
}

impl<'a> OrderSeeds<'a> {
    pub fn new(namespace: &'a [u8], owner: &'a Pubkey, asset: &'a Pubkey, order_id: u64) -> Self {
        Self {
            namespace,
            owner,
            asset,
            order_id,
        }
    }

    pub fn of(record: &'a OrderRecord) -> Self {
        Self::new(
            record.variant.namespace(),
            &record.creator,
            &record.asset,
            record.order_id,
        )
    }

    /// Find the canonical `(address, bump)` pair.
    pub fn derive(&self, program_id: &Pubkey) -> Result<(Pubkey, u8), CustodyError> {
        let order_id = self.order_id.to_le_bytes();
        Pubkey::try_find_program_address(
            &[self.namespace, self.owner.as_ref(), self.asset.as_ref(), &order_id],
            program_id,
        )
        .ok_or(CustodyError::DerivationExhausted)
    }

    /// Recompute the address for a stored bump and compare it with `address`.
    pub fn verify(&self, program_id: &Pubkey, bump: u8, address: &Pubkey) -> Result<(), CustodyError> {
        let order_id = self.order_id.to_le_bytes();
        let derived = Pubkey::create_program_address(
            &[
                self.namespace,
                self.owner.as_ref(),
                self.asset.as_ref(),
                &order_id,
                &[bump],
            ],
            program_id,
        )
        .map_err(|_| CustodyError::InvalidPda)?;
        if derived != *address {
            return Err(CustodyError::InvalidPda);
        }
        Ok(())
    }

    /// Owned signer seeds for `invoke_signed`.
    pub fn signer_seeds(&self, bump: u8) -> Vec<Vec<u8>> {
        vec![
            self.namespace.to_vec(),
            self.owner.to_bytes().to_vec(),
            self.asset.to_bytes().to_vec(),
            self.order_id.to_le_bytes().to_vec(),
            vec![bump],
        ]
    }
}

pub fn derive_vault_address(program_id: &Pubkey, order: &Pubkey) -> Result<(Pubkey, u8), CustodyError> {
    Pubkey::try_find_program_address(&[seeds::VAULT_SEED, order.as_ref()], program_id)
        .ok_or(CustodyError::DerivationExhausted)
}

pub fn verify_vault_address(
    program_id: &Pubkey,
    order: &Pubkey,
    bump: u8,
    address: &Pubkey,
) -> Result<(), CustodyError> {
    let derived =
        Pubkey::create_program_address(&[seeds::VAULT_SEED, order.as_ref(), &[bump]], program_id)
            .map_err(|_| CustodyError::InvalidPda)?;
    if derived != *address {
        return Err(CustodyError::InvalidPda);
    }
    Ok(())
}

pub fn vault_signer_seeds(order: &Pubkey, bump: u8) -> Vec<Vec<u8>> {
    vec![seeds::VAULT_SEED.to_vec(), order.to_bytes().to_vec(), vec![bump]]
}

pub fn derive_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::CONFIG_SEED], program_id)
}
