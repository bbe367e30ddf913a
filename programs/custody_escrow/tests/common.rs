#![allow(dead_code)]
#![allow(deprecated)]

use borsh::BorshSerialize;
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, program::invoke,
    program_error::ProgramError, program_pack::Pack,
};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::system_instruction;
use solana_sdk::{
    instruction::{AccountMeta, Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    sysvar,
    transaction::{Transaction, TransactionError},
};

use custody_escrow::{
    engine::{CreateOrder, SettleRequest, TransitionEngine},
    error::CustodyError,
    fee::FeePolicy,
    host::Holding,
    instruction::CustodyInstruction,
    memory::{MemoryLedger, SharedLedger},
    outcome::Entropy,
    pda::{derive_config_address, derive_vault_address, OrderSeeds},
    state::{OrderRecord, ProgramConfig, Variant},
};

// ============================================================================
// TEST PROGRAM ID
// ============================================================================

/// Fixed program ID for testing. Actual deployed program ID is determined by
/// the deployment keypair, not this value.
pub fn test_program_id() -> Pubkey {
    solana_sdk::pubkey!("Custody1111111111111111111111111111111111111")
}

/// Program that forwards its instruction to custody_escrow through a CPI.
pub fn cpi_forwarder_id() -> Pubkey {
    Pubkey::new_from_array([7u8; 32])
}

/// Starting token balance of every funded party
pub const INITIAL_BALANCE: u64 = 1_000_000;

// ============================================================================
// TEST HARNESS HELPERS
// ============================================================================

/// Helper: Build a ProgramTest instance with custody_escrow + spl_token
pub fn program_test() -> ProgramTest {
    let program_id = test_program_id();
    let mut program_test = ProgramTest::new(
        "custody_escrow",
        program_id,
        processor!(custody_escrow::processor::Processor::process),
    );
    program_test.add_program(
        "spl_token",
        spl_token::id(),
        processor!(spl_token::processor::Processor::process),
    );
    program_test.add_program("cpi_forwarder", cpi_forwarder_id(), processor!(forward_instruction));
    program_test
}

/// Forwarder processor: the first account is the target program, the rest
/// are passed through with their signer and writable flags.
fn forward_instruction(
    _program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let (target, forwarded) = accounts
        .split_first()
        .ok_or(ProgramError::NotEnoughAccountKeys)?;
    let ix = Instruction {
        program_id: *target.key,
        accounts: forwarded
            .iter()
            .map(|account| AccountMeta {
                pubkey: *account.key,
                is_signer: account.is_signer,
                is_writable: account.is_writable,
            })
            .collect(),
        data: instruction_data.to_vec(),
    };
    invoke(&ix, accounts)
}

/// Helper: Wrap a custody instruction so it reaches the program through the forwarder
pub fn forwarded_ix(ix: Instruction) -> Instruction {
    let mut accounts = vec![AccountMeta::new_readonly(ix.program_id, false)];
    accounts.extend(ix.accounts);
    Instruction {
        program_id: cpi_forwarder_id(),
        accounts,
        data: ix.data,
    }
}

/// Helper: Send a transaction, returning the banks client result
pub async fn try_send_tx(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = context.banks_client.get_latest_blockhash().await.unwrap();
    let mut all_signers = Vec::with_capacity(signers.len() + 1);
    all_signers.push(payer);
    for signer in signers {
        if signer.pubkey() != payer.pubkey() {
            all_signers.push(*signer);
        }
    }

    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

/// Helper: Send a transaction with a specific payer and signers
pub async fn send_tx(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) {
    try_send_tx(context, payer, instructions, signers)
        .await
        .unwrap();
}

/// Helper: Assert a single-instruction transaction failed with a program error
pub fn assert_custody_error(result: Result<(), BanksClientError>, expected: CustodyError) {
    let err = result.expect_err("transaction should have failed").unwrap();
    assert_eq!(
        err,
        TransactionError::InstructionError(0, InstructionError::Custom(expected as u32)),
        "expected {:?}",
        expected
    );
}

// ============================================================================
// SPL TOKEN HELPERS
// ============================================================================

/// Helper: Create a new SPL token mint
pub async fn create_mint(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    mint_authority: &Keypair,
    decimals: u8,
) -> Pubkey {
    let mint = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let mint_rent = rent.minimum_balance(spl_token::state::Mint::LEN);

    let create_mint_ix = system_instruction::create_account(
        &payer.pubkey(),
        &mint.pubkey(),
        mint_rent,
        spl_token::state::Mint::LEN as u64,
        &spl_token::id(),
    );
    let init_mint_ix = spl_token::instruction::initialize_mint2(
        &spl_token::id(),
        &mint.pubkey(),
        &mint_authority.pubkey(),
        None,
        decimals,
    )
    .unwrap();

    send_tx(context, payer, &[create_mint_ix, init_mint_ix], &[&mint]).await;
    mint.pubkey()
}

/// Helper: Create an SPL token account for a given mint and owner
pub async fn create_token_account(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    mint: Pubkey,
    owner: Pubkey,
) -> Pubkey {
    let token_account = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let token_rent = rent.minimum_balance(spl_token::state::Account::LEN);

    let create_ix = system_instruction::create_account(
        &payer.pubkey(),
        &token_account.pubkey(),
        token_rent,
        spl_token::state::Account::LEN as u64,
        &spl_token::id(),
    );
    let init_ix = spl_token::instruction::initialize_account3(
        &spl_token::id(),
        &token_account.pubkey(),
        &mint,
        &owner,
    )
    .unwrap();

    send_tx(context, payer, &[create_ix, init_ix], &[&token_account]).await;
    token_account.pubkey()
}

/// Helper: Mint tokens to a token account
pub async fn mint_to(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    mint: Pubkey,
    mint_authority: &Keypair,
    destination: Pubkey,
    amount: u64,
) {
    let ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        &mint,
        &destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )
    .unwrap();

    send_tx(context, payer, &[ix], &[mint_authority]).await;
}

/// Helper: Read SPL token account balance
pub async fn get_token_balance(context: &mut ProgramTestContext, token_account: Pubkey) -> u64 {
    let account = context
        .banks_client
        .get_account(token_account)
        .await
        .unwrap()
        .unwrap();
    let token_state = spl_token::state::Account::unpack(&account.data).unwrap();
    token_state.amount
}

/// Helper: Whether an account currently exists
pub async fn account_exists(context: &mut ProgramTestContext, address: Pubkey) -> bool {
    context
        .banks_client
        .get_account(address)
        .await
        .unwrap()
        .is_some()
}

pub async fn get_lamports(context: &mut ProgramTestContext, address: Pubkey) -> u64 {
    context
        .banks_client
        .get_account(address)
        .await
        .unwrap()
        .map(|account| account.lamports)
        .unwrap_or(0)
}

// ============================================================================
// PROGRAM HELPERS
// ============================================================================

/// Helper: Derive an order address
pub fn order_address(program_id: &Pubkey, variant: Variant, creator: &Pubkey, asset: &Pubkey, order_id: u64) -> Pubkey {
    OrderSeeds::new(variant.namespace(), creator, asset, order_id)
        .derive(program_id)
        .unwrap()
        .0
}

/// Helper: Derive the vault of an order
pub fn vault_address(program_id: &Pubkey, order: &Pubkey) -> Pubkey {
    derive_vault_address(program_id, order).unwrap().0
}

/// Helper: Generate a random order ID
pub fn generate_order_id() -> u64 {
    rand::random()
}

/// Helper: Build an Initialize instruction
pub fn initialize_ix(
    program_id: Pubkey,
    admin: Pubkey,
    fee_recipient: Pubkey,
    fee_policy: FeePolicy,
    allowed_assets: Vec<Pubkey>,
) -> Instruction {
    let (config_pda, _) = derive_config_address(&program_id);
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(config_pda, false),
            AccountMeta::new(admin, true),
            AccountMeta::new_readonly(solana_sdk::system_program::id(), false),
        ],
        data: CustodyInstruction::Initialize {
            fee_recipient,
            fee_policy,
            allowed_assets,
        }
        .try_to_vec()
        .unwrap(),
    }
}

/// Helper: Build an UpdateConfig instruction
pub fn update_config_ix(
    program_id: Pubkey,
    admin: Pubkey,
    new_admin: Option<Pubkey>,
    fee_recipient: Option<Pubkey>,
    fee_policy: Option<FeePolicy>,
    allowed_assets: Option<Vec<Pubkey>>,
) -> Instruction {
    let (config_pda, _) = derive_config_address(&program_id);
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(admin, true),
        ],
        data: CustodyInstruction::UpdateConfig {
            admin: new_admin,
            fee_recipient,
            fee_policy,
            allowed_assets,
        }
        .try_to_vec()
        .unwrap(),
    }
}

/// Helper: Build a CreateOrder instruction
pub fn create_order_ix(program_id: Pubkey, order: &CreateOrder) -> Instruction {
    let order_pda = order_address(&program_id, order.variant, &order.creator, &order.asset, order.order_id);
    let vault_pda = vault_address(&program_id, &order_pda);
    let (config_pda, _) = derive_config_address(&program_id);

    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(order_pda, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new(order.creator, true),
            AccountMeta::new_readonly(order.asset, false),
            AccountMeta::new_readonly(config_pda, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(solana_sdk::system_program::id(), false),
        ],
        data: CustodyInstruction::CreateOrder {
            variant: order.variant,
            order_id: order.order_id,
            quantity: order.quantity,
            price: order.price,
            counterparty: order.counterparty,
            consideration_asset: order.consideration_asset,
        }
        .try_to_vec()
        .unwrap(),
    }
}

fn creator_ix(
    program_id: Pubkey,
    order: Pubkey,
    creator: Pubkey,
    creator_token: Pubkey,
    instruction: CustodyInstruction,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(order, false),
            AccountMeta::new(vault_address(&program_id, &order), false),
            AccountMeta::new(creator, true),
            AccountMeta::new(creator_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: instruction.try_to_vec().unwrap(),
    }
}

/// Helper: Build a Fund instruction
pub fn fund_ix(program_id: Pubkey, order: Pubkey, creator: Pubkey, creator_token: Pubkey) -> Instruction {
    creator_ix(program_id, order, creator, creator_token, CustodyInstruction::Fund)
}

/// Helper: Build a Withdraw instruction
pub fn withdraw_ix(
    program_id: Pubkey,
    order: Pubkey,
    creator: Pubkey,
    creator_token: Pubkey,
    amount: u64,
) -> Instruction {
    creator_ix(
        program_id,
        order,
        creator,
        creator_token,
        CustodyInstruction::Withdraw { amount },
    )
}

/// Helper: Build a Cancel instruction
pub fn cancel_ix(program_id: Pubkey, order: Pubkey, creator: Pubkey, creator_token: Pubkey) -> Instruction {
    creator_ix(program_id, order, creator, creator_token, CustodyInstruction::Cancel)
}

/// Helper: Build a Release instruction
pub fn release_ix(
    program_id: Pubkey,
    order: Pubkey,
    creator: Pubkey,
    counterparty_token: Pubkey,
    fee_token: Pubkey,
    expected: u64,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(order, false),
            AccountMeta::new(vault_address(&program_id, &order), false),
            AccountMeta::new(creator, true),
            AccountMeta::new(counterparty_token, false),
            AccountMeta::new(fee_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: CustodyInstruction::Release { expected }.try_to_vec().unwrap(),
    }
}

/// Token accounts involved in buying a trade order
pub struct BuyAccounts {
    pub taker: Pubkey,
    pub taker_payment_token: Pubkey,
    pub taker_asset_token: Pubkey,
    pub creator_payment_token: Pubkey,
    pub fee_token: Pubkey,
    pub creator: Pubkey,
}

/// Helper: Build a Buy instruction
pub fn buy_ix(program_id: Pubkey, order: Pubkey, accounts: &BuyAccounts, price: u64) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(order, false),
            AccountMeta::new(vault_address(&program_id, &order), false),
            AccountMeta::new_readonly(accounts.taker, true),
            AccountMeta::new(accounts.taker_payment_token, false),
            AccountMeta::new(accounts.taker_asset_token, false),
            AccountMeta::new(accounts.creator_payment_token, false),
            AccountMeta::new(accounts.fee_token, false),
            AccountMeta::new(accounts.creator, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: CustodyInstruction::Buy { price }.try_to_vec().unwrap(),
    }
}

/// Helper: Build an Accept instruction
pub fn accept_ix(
    program_id: Pubkey,
    order: Pubkey,
    taker: Pubkey,
    taker_token: Pubkey,
    creator_token: Pubkey,
    fee_token: Pubkey,
    creator: Pubkey,
    stake: u64,
) -> Instruction {
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(order, false),
            AccountMeta::new(vault_address(&program_id, &order), false),
            AccountMeta::new_readonly(taker, true),
            AccountMeta::new(taker_token, false),
            AccountMeta::new(creator_token, false),
            AccountMeta::new(fee_token, false),
            AccountMeta::new(creator, false),
            AccountMeta::new_readonly(sysvar::slot_hashes::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: CustodyInstruction::Accept { stake }.try_to_vec().unwrap(),
    }
}

/// Helper: Build a Transfer instruction
pub fn transfer_ix(
    program_id: Pubkey,
    sender: Pubkey,
    source_token: Pubkey,
    destination_token: Pubkey,
    amount: u64,
) -> Instruction {
    let (config_pda, _) = derive_config_address(&program_id);
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new_readonly(config_pda, false),
            AccountMeta::new_readonly(sender, true),
            AccountMeta::new(source_token, false),
            AccountMeta::new(destination_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: CustodyInstruction::Transfer { amount }.try_to_vec().unwrap(),
    }
}

/// Helper: Read an order record
pub async fn read_order(context: &mut ProgramTestContext, order: Pubkey) -> OrderRecord {
    let account = context
        .banks_client
        .get_account(order)
        .await
        .unwrap()
        .unwrap();
    OrderRecord::unpack(&account.data).unwrap()
}

/// Helper: Read the program config
pub async fn read_config(context: &mut ProgramTestContext, program_id: Pubkey) -> ProgramConfig {
    let (config_pda, _) = derive_config_address(&program_id);
    let account = context
        .banks_client
        .get_account(config_pda)
        .await
        .unwrap()
        .unwrap();
    ProgramConfig::unpack(&account.data).unwrap()
}

// ============================================================================
// TEST ENVIRONMENT
// ============================================================================

/// Test environment with common accounts and SPL token setup
pub struct TestEnv {
    pub program_id: Pubkey,
    pub admin: Keypair,
    pub creator: Keypair,
    pub taker: Keypair,
    pub fee_recipient: Keypair,
    pub mint_authority: Keypair,
    /// Escrowed asset
    pub mint: Pubkey,
    /// Consideration asset for trades
    pub payment_mint: Pubkey,
    pub creator_token: Pubkey,
    pub creator_payment_token: Pubkey,
    pub taker_token: Pubkey,
    pub taker_payment_token: Pubkey,
    pub fee_token: Pubkey,
    pub fee_payment_token: Pubkey,
    pub config_pda: Pubkey,
}

impl TestEnv {
    pub fn order_request(&self, variant: Variant, quantity: u64) -> CreateOrder {
        CreateOrder {
            variant,
            order_id: generate_order_id(),
            creator: self.creator.pubkey(),
            asset: self.mint,
            quantity,
            price: None,
            counterparty: None,
            consideration_asset: None,
        }
    }

    pub fn order_of(&self, request: &CreateOrder) -> Pubkey {
        order_address(
            &self.program_id,
            request.variant,
            &request.creator,
            &request.asset,
            request.order_id,
        )
    }

    pub fn buy_accounts(&self) -> BuyAccounts {
        BuyAccounts {
            taker: self.taker.pubkey(),
            taker_payment_token: self.taker_payment_token,
            taker_asset_token: self.taker_token,
            creator_payment_token: self.creator_payment_token,
            fee_token: self.fee_payment_token,
            creator: self.creator.pubkey(),
        }
    }
}

/// Helper: Create a baseline environment used by most tests
pub async fn setup_env(context: &mut ProgramTestContext, fee_policy: FeePolicy) -> TestEnv {
    let payer = context.payer.insecure_clone();
    let payer_pubkey = payer.pubkey();
    let program_id = test_program_id();
    let admin = Keypair::new();
    let creator = Keypair::new();
    let taker = Keypair::new();
    let fee_recipient = Keypair::new();
    let mint_authority = Keypair::new();

    // Fund parties
    let fund_ixs: Vec<Instruction> = [&admin, &creator, &taker]
        .iter()
        .map(|party| system_instruction::transfer(&payer_pubkey, &party.pubkey(), 2_000_000_000))
        .collect();
    send_tx(context, &payer, &fund_ixs, &[]).await;

    // Create mints and token accounts
    let mint = create_mint(context, &payer, &mint_authority, 6).await;
    let payment_mint = create_mint(context, &payer, &mint_authority, 6).await;
    let creator_token = create_token_account(context, &payer, mint, creator.pubkey()).await;
    let creator_payment_token =
        create_token_account(context, &payer, payment_mint, creator.pubkey()).await;
    let taker_token = create_token_account(context, &payer, mint, taker.pubkey()).await;
    let taker_payment_token =
        create_token_account(context, &payer, payment_mint, taker.pubkey()).await;
    let fee_token = create_token_account(context, &payer, mint, fee_recipient.pubkey()).await;
    let fee_payment_token =
        create_token_account(context, &payer, payment_mint, fee_recipient.pubkey()).await;

    mint_to(context, &payer, mint, &mint_authority, creator_token, INITIAL_BALANCE).await;
    mint_to(context, &payer, mint, &mint_authority, taker_token, INITIAL_BALANCE).await;
    mint_to(context, &payer, payment_mint, &mint_authority, taker_payment_token, INITIAL_BALANCE).await;

    // Initialize program
    let ix = initialize_ix(program_id, admin.pubkey(), fee_recipient.pubkey(), fee_policy, vec![]);
    send_tx(context, &admin, &[ix], &[]).await;
    let (config_pda, _) = derive_config_address(&program_id);

    TestEnv {
        program_id,
        admin,
        creator,
        taker,
        fee_recipient,
        mint_authority,
        mint,
        payment_mint,
        creator_token,
        creator_payment_token,
        taker_token,
        taker_payment_token,
        fee_token,
        fee_payment_token,
        config_pda,
    }
}

/// Helper: Create and fund an order, returning its address
pub async fn create_funded_order(
    context: &mut ProgramTestContext,
    env: &TestEnv,
    request: &CreateOrder,
) -> Pubkey {
    let order = env.order_of(request);
    send_tx(
        context,
        &env.creator,
        &[
            create_order_ix(env.program_id, request),
            fund_ix(env.program_id, order, env.creator.pubkey(), env.creator_token),
        ],
        &[],
    )
    .await;
    order
}

// ============================================================================
// IN-MEMORY HOST
// ============================================================================

/// Engine plus a shared in-memory ledger holding mock party accounts
pub struct Market {
    pub engine: TransitionEngine,
    pub ledger: SharedLedger,
    pub config: ProgramConfig,
    pub asset: Pubkey,
    pub payment_asset: Pubkey,
    pub native: Pubkey,
    pub fee_recipient: Pubkey,
}

/// Cost charged per order allocation in the in-memory host
pub const ALLOCATION_COST: u64 = 1_000;

pub fn market(fee_policy: FeePolicy) -> Market {
    let native = Pubkey::new_unique();
    let fee_recipient = Pubkey::new_unique();
    let config = ProgramConfig::new(Pubkey::new_unique(), fee_recipient, fee_policy, vec![], 255).unwrap();
    Market {
        engine: TransitionEngine::new(test_program_id()),
        ledger: SharedLedger::new(MemoryLedger::new(native, ALLOCATION_COST)),
        config,
        asset: Pubkey::new_unique(),
        payment_asset: Pubkey::new_unique(),
        native,
        fee_recipient,
    }
}

impl Market {
    /// Mock party with native currency for allocations and `amount` of each asset
    pub fn party(&self, amount: u64) -> Pubkey {
        let party = Pubkey::new_unique();
        self.ledger
            .transact(|ledger| {
                ledger.deposit(Holding::new(party, self.native), 1_000_000)?;
                ledger.deposit(Holding::new(party, self.asset), amount)?;
                ledger.deposit(Holding::new(party, self.payment_asset), amount)?;
                Ok(())
            })
            .unwrap();
        party
    }

    pub fn balance(&self, owner: &Pubkey, asset: &Pubkey) -> u64 {
        self.ledger.snapshot().balance(&Holding::new(*owner, *asset))
    }

    pub fn record(&self, order: &Pubkey) -> Option<OrderRecord> {
        self.ledger.snapshot().record(order).cloned()
    }

    pub fn request(&self, variant: Variant, creator: Pubkey, quantity: u64) -> CreateOrder {
        CreateOrder {
            variant,
            order_id: generate_order_id(),
            creator,
            asset: self.asset,
            quantity,
            price: None,
            counterparty: None,
            consideration_asset: None,
        }
    }

    pub fn create(&self, request: &CreateOrder) -> Result<Pubkey, ProgramError> {
        self.ledger.transact(|ledger| {
            let (address, _) = self.engine.create(ledger, &self.config, request)?;
            Ok(address)
        })
    }

    pub fn fund(&self, order: &Pubkey, caller: &Pubkey) -> Result<(), ProgramError> {
        self.ledger.transact(|ledger| {
            let transition = self.engine.fund(&*ledger, order, caller)?;
            self.engine.commit(ledger, order, &transition)
        })
    }

    pub fn withdraw(&self, order: &Pubkey, caller: &Pubkey, amount: u64) -> Result<(), ProgramError> {
        self.ledger.transact(|ledger| {
            let transition = self.engine.withdraw(&*ledger, order, caller, amount)?;
            self.engine.commit(ledger, order, &transition)
        })
    }

    pub fn cancel(&self, order: &Pubkey, caller: &Pubkey) -> Result<(), ProgramError> {
        self.ledger.transact(|ledger| {
            let transition = self.engine.cancel(&*ledger, order, caller)?;
            self.engine.commit(ledger, order, &transition)
        })
    }

    pub fn settle(&self, order: &Pubkey, request: &SettleRequest) -> Result<(), ProgramError> {
        self.ledger.transact(|ledger| {
            let transition = self.engine.settle(&*ledger, order, request)?;
            self.engine.commit(ledger, order, &transition)
        })
    }

    /// Settlement request carrying the configured fee recipient
    pub fn settle_request(&self, caller: Pubkey, offered: u64) -> SettleRequest {
        SettleRequest {
            caller,
            offered,
            fee_recipient: Some(self.fee_recipient),
            entropy: Some(Entropy {
                slot: 42,
                hash: [7u8; 32],
            }),
        }
    }
}

pub fn custody_error(error: CustodyError) -> ProgramError {
    error.into()
}
