//! Custody Escrow Program (Native Solana)
//!
//! Holds assets in program-derived vaults on behalf of an order's creator and
//! releases them only through the order's lifecycle transitions: escrow
//! deposits released to a counterparty, trades settled against a listed
//! price, and wagers paid to a resolved winner. Every transition either
//! applies completely or leaves balances and records untouched.

pub mod engine;
pub mod error;
pub mod events;
pub mod fee;
pub mod host;
pub mod instruction;
#[cfg(not(target_os = "solana"))]
pub mod memory;
pub mod outcome;
pub mod pda;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

pub use solana_program;

// Re-export for tests
pub use engine::{CreateOrder, SettleRequest, Transition, TransitionEngine};
pub use error::CustodyError;
pub use fee::FeePolicy;
pub use instruction::CustodyInstruction;
pub use state::{OrderRecord, OrderStatus, ProgramConfig, Variant};
