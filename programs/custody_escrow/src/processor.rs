//! Instruction processing

#![allow(deprecated)] // system_instruction deprecation - will migrate when solana_system_interface is stable

use borsh::BorshDeserialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    instruction::{get_stack_height, TRANSACTION_LEVEL_STACK_HEIGHT},
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::{self, Sysvar},
};
use spl_token::state::Account as TokenAccount;

use crate::{
    engine::{CreateOrder, SettleRequest, TransitionEngine},
    error::CustodyError,
    events,
    fee::FeePolicy,
    host::{BalanceView, CustodyLedger, Holding, Leg, OrderStore},
    instruction::CustodyInstruction,
    outcome::Entropy,
    pda::{derive_config_address, vault_signer_seeds, verify_vault_address, OrderSeeds},
    state::{seeds, OrderRecord, ProgramConfig, Variant},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = CustodyInstruction::try_from_slice(instruction_data)
            .map_err(|_| CustodyError::InvalidInstructionData)?;

        match instruction {
            CustodyInstruction::Initialize {
                fee_recipient,
                fee_policy,
                allowed_assets,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, fee_recipient, fee_policy, allowed_assets)
            }
            CustodyInstruction::UpdateConfig {
                admin,
                fee_recipient,
                fee_policy,
                allowed_assets,
            } => {
                msg!("Instruction: UpdateConfig");
                Self::process_update_config(
                    program_id,
                    accounts,
                    admin,
                    fee_recipient,
                    fee_policy,
                    allowed_assets,
                )
            }
            CustodyInstruction::CreateOrder {
                variant,
                order_id,
                quantity,
                price,
                counterparty,
                consideration_asset,
            } => {
                msg!("Instruction: CreateOrder");
                Self::process_create_order(
                    program_id,
                    accounts,
                    CreateParams {
                        variant,
                        order_id,
                        quantity,
                        price,
                        counterparty,
                        consideration_asset,
                    },
                )
            }
            CustodyInstruction::Fund => {
                msg!("Instruction: Fund");
                Self::process_fund(program_id, accounts)
            }
            CustodyInstruction::Withdraw { amount } => {
                msg!("Instruction: Withdraw");
                Self::process_withdraw(program_id, accounts, amount)
            }
            CustodyInstruction::Cancel => {
                msg!("Instruction: Cancel");
                Self::process_cancel(program_id, accounts)
            }
            CustodyInstruction::Release { expected } => {
                msg!("Instruction: Release");
                Self::process_release(program_id, accounts, expected)
            }
            CustodyInstruction::Buy { price } => {
                msg!("Instruction: Buy");
                Self::process_buy(program_id, accounts, price)
            }
            CustodyInstruction::Accept { stake } => {
                msg!("Instruction: Accept");
                Self::process_accept(program_id, accounts, stake)
            }
            CustodyInstruction::Transfer { amount } => {
                msg!("Instruction: Transfer");
                Self::process_transfer(program_id, accounts, amount)
            }
        }
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        fee_recipient: Pubkey,
        fee_policy: FeePolicy,
        allowed_assets: Vec<Pubkey>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let config_account = next_account_info(account_info_iter)?;
        let admin = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        if !admin.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (config_pda, config_bump) = derive_config_address(program_id);
        if config_pda != *config_account.key {
            return Err(CustodyError::InvalidPda.into());
        }
        if !config_account.data_is_empty() {
            return Err(CustodyError::AlreadyExists.into());
        }

        let config = ProgramConfig::new(*admin.key, fee_recipient, fee_policy, allowed_assets, config_bump)?;

        create_pda_account(
            admin,
            config_account,
            system_program,
            ProgramConfig::LEN,
            program_id,
            &[seeds::CONFIG_SEED, &[config_bump]],
        )?;
        config.pack(&mut config_account.data.borrow_mut())?;

        events::emit_config_updated(&config);
        Ok(())
    }

    fn process_update_config(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        admin: Option<Pubkey>,
        fee_recipient: Option<Pubkey>,
        fee_policy: Option<FeePolicy>,
        allowed_assets: Option<Vec<Pubkey>>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let config_account = next_account_info(account_info_iter)?;
        let current_admin = next_account_info(account_info_iter)?;

        let mut config = load_config(program_id, config_account)?;
        if !current_admin.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if config.admin != *current_admin.key {
            return Err(CustodyError::Unauthorized.into());
        }

        if let Some(admin) = admin {
            config.admin = admin;
        }
        if let Some(fee_recipient) = fee_recipient {
            config.fee_recipient = fee_recipient;
        }
        if let Some(fee_policy) = fee_policy {
            config.fee_policy = fee_policy;
        }
        if let Some(allowed_assets) = allowed_assets {
            config.allowed_assets = allowed_assets;
        }
        config.validate()?;
        config.pack(&mut config_account.data.borrow_mut())?;

        events::emit_config_updated(&config);
        Ok(())
    }

    // ========================================================================
    // ORDER LIFECYCLE
    // ========================================================================

    fn process_create_order(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        params: CreateParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let mint = next_account_info(account_info_iter)?;
        let config_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        if !creator.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        check_token_program(token_program)?;
        let config = load_config(program_id, config_account)?;

        let mut store = RecordStore {
            program_id,
            order: order_account,
            vault,
            allocation: Some(Allocation {
                payer: creator,
                mint,
                token_program,
                system_program,
            }),
        };

        let engine = TransitionEngine::new(*program_id);
        let request = CreateOrder {
            variant: params.variant,
            order_id: params.order_id,
            creator: *creator.key,
            asset: *mint.key,
            quantity: params.quantity,
            price: params.price,
            counterparty: params.counterparty,
            consideration_asset: params.consideration_asset,
        };
        engine.create(&mut store, &config, &request)?;
        Ok(())
    }

    fn process_fund(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let creator_token = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !creator.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            creator,
            vec![creator_token],
            None,
        )?;

        let engine = TransitionEngine::new(*program_id);
        let transition = engine.fund(&host, order_account.key, creator.key)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    fn process_withdraw(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let creator_token = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !creator.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            creator,
            vec![creator_token],
            Some(creator),
        )?;

        let engine = TransitionEngine::new(*program_id);
        let transition = engine.withdraw(&host, order_account.key, creator.key, amount)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    fn process_cancel(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let creator_token = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !creator.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            creator,
            vec![creator_token],
            Some(creator),
        )?;

        let engine = TransitionEngine::new(*program_id);
        let transition = engine.cancel(&host, order_account.key, creator.key)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    fn process_release(program_id: &Pubkey, accounts: &[AccountInfo], expected: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let counterparty_token = next_account_info(account_info_iter)?;
        let fee_token = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !creator.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            creator,
            vec![counterparty_token, fee_token],
            Some(creator),
        )?;

        let request = SettleRequest {
            caller: *creator.key,
            offered: expected,
            fee_recipient: token_owner(fee_token),
            entropy: None,
        };
        let engine = TransitionEngine::new(*program_id);
        let transition = engine.release(&host, order_account.key, &request)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    fn process_buy(program_id: &Pubkey, accounts: &[AccountInfo], price: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let taker = next_account_info(account_info_iter)?;
        let taker_payment_token = next_account_info(account_info_iter)?;
        let taker_asset_token = next_account_info(account_info_iter)?;
        let creator_payment_token = next_account_info(account_info_iter)?;
        let fee_token = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !taker.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            taker,
            vec![
                taker_payment_token,
                taker_asset_token,
                creator_payment_token,
                fee_token,
            ],
            Some(creator),
        )?;

        let request = SettleRequest {
            caller: *taker.key,
            offered: price,
            fee_recipient: token_owner(fee_token),
            entropy: None,
        };
        let engine = TransitionEngine::new(*program_id);
        let transition = engine.buy(&host, order_account.key, &request)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    fn process_accept(program_id: &Pubkey, accounts: &[AccountInfo], stake: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let order_account = next_account_info(account_info_iter)?;
        let vault = next_account_info(account_info_iter)?;
        let taker = next_account_info(account_info_iter)?;
        let taker_token = next_account_info(account_info_iter)?;
        let creator_token = next_account_info(account_info_iter)?;
        let fee_token = next_account_info(account_info_iter)?;
        let creator = next_account_info(account_info_iter)?;
        let slot_hashes = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        // A calling program could inspect the outcome and abort on a loss
        if get_stack_height() != TRANSACTION_LEVEL_STACK_HEIGHT {
            return Err(CustodyError::CpiNotAllowed.into());
        }
        if !taker.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *slot_hashes.key != sysvar::slot_hashes::id() {
            return Err(ProgramError::InvalidArgument);
        }
        let entropy = Entropy::from_slot_hashes(&slot_hashes.data.borrow())?;

        let mut host = ProgramHost::open(
            program_id,
            order_account,
            vault,
            token_program,
            taker,
            vec![taker_token, creator_token, fee_token],
            Some(creator),
        )?;

        let request = SettleRequest {
            caller: *taker.key,
            offered: stake,
            fee_recipient: token_owner(fee_token),
            entropy: Some(entropy),
        };
        let engine = TransitionEngine::new(*program_id);
        let transition = engine.accept(&host, order_account.key, &request)?;
        engine.commit(&mut host, order_account.key, &transition)
    }

    // ========================================================================
    // DIRECT TRANSFER
    // ========================================================================

    fn process_transfer(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let config_account = next_account_info(account_info_iter)?;
        let sender = next_account_info(account_info_iter)?;
        let source_token = next_account_info(account_info_iter)?;
        let destination_token = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;

        if !sender.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        check_token_program(token_program)?;
        let config = load_config(program_id, config_account)?;

        let source = unpack_token(source_token)?;
        let destination = unpack_token(destination_token)?;
        if source.owner != *sender.key {
            return Err(CustodyError::Unauthorized.into());
        }
        if source.mint != destination.mint {
            return Err(CustodyError::InvalidTokenAccount.into());
        }

        let mut ledger = TokenLedger {
            token_program,
            authority: sender,
            parties: vec![source_token, destination_token],
            custody: None,
        };
        let engine = TransitionEngine::new(*program_id);
        let leg = engine.plan_transfer(
            &ledger,
            &config,
            sender.key,
            &destination.owner,
            &source.mint,
            amount,
        )?;
        engine.commit_transfer(&mut ledger, &leg)
    }
}

struct CreateParams {
    variant: Variant,
    order_id: u64,
    quantity: u64,
    price: Option<u64>,
    counterparty: Option<Pubkey>,
    consideration_asset: Option<Pubkey>,
}

// ============================================================================
// ACCOUNT-BACKED HOST
// ============================================================================

/// Accounts needed to allocate a new order and its vault.
struct Allocation<'a, 'info> {
    payer: &'a AccountInfo<'info>,
    mint: &'a AccountInfo<'info>,
    token_program: &'a AccountInfo<'info>,
    system_program: &'a AccountInfo<'info>,
}

/// Order record storage backed by the order PDA account.
struct RecordStore<'a, 'info> {
    program_id: &'a Pubkey,
    order: &'a AccountInfo<'info>,
    vault: &'a AccountInfo<'info>,
    allocation: Option<Allocation<'a, 'info>>,
}

impl OrderStore for RecordStore<'_, '_> {
    fn load(&self, address: &Pubkey) -> Result<Option<OrderRecord>, ProgramError> {
        if *address != *self.order.key {
            return Err(CustodyError::InvalidPda.into());
        }
        if self.order.data_is_empty() {
            return Ok(None);
        }
        if self.order.owner != self.program_id {
            return Err(CustodyError::InvalidAccountOwner.into());
        }
        OrderRecord::unpack(&self.order.data.borrow()).map(Some)
    }

    fn allocate(&mut self, address: &Pubkey, payer: &Pubkey, record: &OrderRecord) -> ProgramResult {
        let allocation = self
            .allocation
            .as_ref()
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        if *allocation.payer.key != *payer {
            return Err(CustodyError::Unauthorized.into());
        }
        if *allocation.mint.key != record.asset {
            return Err(CustodyError::InvalidTokenAccount.into());
        }

        let order_seeds = OrderSeeds::of(record).signer_seeds(record.bump);
        create_pda_account(
            allocation.payer,
            self.order,
            allocation.system_program,
            OrderRecord::LEN,
            self.program_id,
            &seed_slices(&order_seeds),
        )?;

        verify_vault_address(self.program_id, address, record.vault_bump, self.vault.key)?;
        if !self.vault.data_is_empty() {
            return Err(CustodyError::AlreadyExists.into());
        }
        let vault_seeds = vault_signer_seeds(address, record.vault_bump);
        create_pda_account(
            allocation.payer,
            self.vault,
            allocation.system_program,
            TokenAccount::LEN,
            &spl_token::id(),
            &seed_slices(&vault_seeds),
        )?;

        // Order PDA is the vault authority
        invoke(
            &spl_token::instruction::initialize_account3(
                &spl_token::id(),
                self.vault.key,
                allocation.mint.key,
                address,
            )?,
            &[
                self.vault.clone(),
                allocation.mint.clone(),
                allocation.token_program.clone(),
            ],
        )
    }

    fn save(&mut self, address: &Pubkey, record: &OrderRecord) -> ProgramResult {
        if *address != *self.order.key {
            return Err(CustodyError::InvalidPda.into());
        }
        record.pack(&mut self.order.data.borrow_mut())
    }
}

/// The order and vault a ledger may move custody funds out of.
struct Custody<'a, 'info> {
    order: &'a AccountInfo<'info>,
    vault: &'a AccountInfo<'info>,
    /// Receives the vault's rent when the order is terminal
    rent_receiver: Option<&'a AccountInfo<'info>>,
}

impl Custody<'_, '_> {
    fn signer_seeds(&self) -> Result<Vec<Vec<u8>>, ProgramError> {
        let record = OrderRecord::unpack(&self.order.data.borrow())?;
        Ok(OrderSeeds::of(&record).signer_seeds(record.bump))
    }
}

/// SPL token accounts supplied to one instruction, addressed by holding.
struct TokenLedger<'a, 'info> {
    token_program: &'a AccountInfo<'info>,
    /// Signer authorizing transfers out of its own token accounts
    authority: &'a AccountInfo<'info>,
    parties: Vec<&'a AccountInfo<'info>>,
    custody: Option<Custody<'a, 'info>>,
}

impl<'a, 'info> TokenLedger<'a, 'info> {
    fn resolve(&self, holding: &Holding) -> Result<&'a AccountInfo<'info>, ProgramError> {
        if let Some(custody) = &self.custody {
            if holding.owner == *custody.order.key {
                let vault = unpack_token(custody.vault)?;
                if vault.owner != holding.owner || vault.mint != holding.asset {
                    return Err(CustodyError::InvalidTokenAccount.into());
                }
                return Ok(custody.vault);
            }
        }
        self.parties
            .iter()
            .copied()
            .find(|account| {
                matches!(
                    unpack_token(account),
                    Ok(state) if state.owner == holding.owner && state.mint == holding.asset
                )
            })
            .ok_or_else(|| CustodyError::InvalidTokenAccount.into())
    }
}

impl BalanceView for TokenLedger<'_, '_> {
    fn balance_of(&self, holding: &Holding) -> Result<u64, ProgramError> {
        let account = self.resolve(holding)?;
        Ok(unpack_token(account)?.amount)
    }
}

impl CustodyLedger for TokenLedger<'_, '_> {
    fn transfer(&mut self, leg: &Leg) -> ProgramResult {
        let source = self.resolve(&leg.from)?;
        let destination = self.resolve(&leg.to)?;
        let ix = spl_token::instruction::transfer(
            &spl_token::id(),
            source.key,
            destination.key,
            &leg.from.owner,
            &[],
            leg.amount,
        )?;

        match &self.custody {
            Some(custody) if leg.from.owner == *custody.order.key => {
                let order_seeds = custody.signer_seeds()?;
                invoke_signed(
                    &ix,
                    &[
                        source.clone(),
                        destination.clone(),
                        custody.order.clone(),
                        self.token_program.clone(),
                    ],
                    &[seed_slices(&order_seeds).as_slice()],
                )
            }
            _ => {
                if *self.authority.key != leg.from.owner || !self.authority.is_signer {
                    return Err(CustodyError::Unauthorized.into());
                }
                invoke(
                    &ix,
                    &[
                        source.clone(),
                        destination.clone(),
                        self.authority.clone(),
                        self.token_program.clone(),
                    ],
                )
            }
        }
    }

    fn drain_vault(&mut self, order: &Pubkey, record: &OrderRecord) -> ProgramResult {
        let custody = self
            .custody
            .as_ref()
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        let receiver = custody
            .rent_receiver
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        if *receiver.key != record.creator {
            return Err(CustodyError::Unauthorized.into());
        }

        let order_seeds = OrderSeeds::of(record).signer_seeds(record.bump);
        invoke_signed(
            &spl_token::instruction::close_account(
                &spl_token::id(),
                custody.vault.key,
                receiver.key,
                order,
                &[],
            )?,
            &[
                custody.vault.clone(),
                receiver.clone(),
                custody.order.clone(),
                self.token_program.clone(),
            ],
            &[seed_slices(&order_seeds).as_slice()],
        )
    }
}

/// Record store and token ledger for instructions that act on an existing order.
struct ProgramHost<'a, 'info> {
    store: RecordStore<'a, 'info>,
    ledger: TokenLedger<'a, 'info>,
}

impl<'a, 'info> ProgramHost<'a, 'info> {
    fn open(
        program_id: &'a Pubkey,
        order: &'a AccountInfo<'info>,
        vault: &'a AccountInfo<'info>,
        token_program: &'a AccountInfo<'info>,
        authority: &'a AccountInfo<'info>,
        parties: Vec<&'a AccountInfo<'info>>,
        rent_receiver: Option<&'a AccountInfo<'info>>,
    ) -> Result<Self, ProgramError> {
        check_token_program(token_program)?;
        let store = RecordStore {
            program_id,
            order,
            vault,
            allocation: None,
        };
        if let Some(record) = store.load(order.key)? {
            verify_vault_address(program_id, order.key, record.vault_bump, vault.key)?;
        }
        Ok(Self {
            store,
            ledger: TokenLedger {
                token_program,
                authority,
                parties,
                custody: Some(Custody {
                    order,
                    vault,
                    rent_receiver,
                }),
            },
        })
    }
}

impl BalanceView for ProgramHost<'_, '_> {
    fn balance_of(&self, holding: &Holding) -> Result<u64, ProgramError> {
        self.ledger.balance_of(holding)
    }
}

impl CustodyLedger for ProgramHost<'_, '_> {
    fn transfer(&mut self, leg: &Leg) -> ProgramResult {
        self.ledger.transfer(leg)
    }

    fn drain_vault(&mut self, order: &Pubkey, record: &OrderRecord) -> ProgramResult {
        self.ledger.drain_vault(order, record)
    }
}

impl OrderStore for ProgramHost<'_, '_> {
    fn load(&self, address: &Pubkey) -> Result<Option<OrderRecord>, ProgramError> {
        self.store.load(address)
    }

    fn allocate(&mut self, address: &Pubkey, payer: &Pubkey, record: &OrderRecord) -> ProgramResult {
        self.store.allocate(address, payer, record)
    }

    fn save(&mut self, address: &Pubkey, record: &OrderRecord) -> ProgramResult {
        self.store.save(address, record)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Create a program-owned account at a PDA.
///
/// Anyone can send lamports to an address before it is allocated, so a
/// pre-funded PDA is topped up, allocated and assigned instead of created.
fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    owner: &Pubkey,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let required = rent.minimum_balance(space);

    if target.lamports() == 0 {
        return invoke_signed(
            &system_instruction::create_account(payer.key, target.key, required, space as u64, owner),
            &[payer.clone(), target.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    let top_up = required.saturating_sub(target.lamports());
    if top_up > 0 {
        invoke(
            &system_instruction::transfer(payer.key, target.key, top_up),
            &[payer.clone(), target.clone(), system_program.clone()],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(target.key, space as u64),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(target.key, owner),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

fn load_config(program_id: &Pubkey, account: &AccountInfo) -> Result<ProgramConfig, ProgramError> {
    if account.owner != program_id {
        return Err(CustodyError::InvalidAccountOwner.into());
    }
    let (config_pda, _) = derive_config_address(program_id);
    if config_pda != *account.key {
        return Err(CustodyError::InvalidPda.into());
    }
    ProgramConfig::unpack(&account.data.borrow())
}

fn check_token_program(account: &AccountInfo) -> ProgramResult {
    if *account.key != spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

fn unpack_token(account: &AccountInfo) -> Result<TokenAccount, ProgramError> {
    if *account.owner != spl_token::id() {
        return Err(CustodyError::InvalidTokenAccount.into());
    }
    TokenAccount::unpack(&account.data.borrow()).map_err(|_| CustodyError::InvalidTokenAccount.into())
}

/// Wallet owning a token account, if it is one.
fn token_owner(account: &AccountInfo) -> Option<Pubkey> {
    unpack_token(account).ok().map(|state| state.owner)
}

fn seed_slices(seeds: &[Vec<u8>]) -> Vec<&[u8]> {
    seeds.iter().map(Vec::as_slice).collect()
}
