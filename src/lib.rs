//! Off-chain client for the escrow token-swap program.
//!
//! The on-chain program implements peer-to-peer offers: a maker escrows an
//! amount of token A in a program-owned vault and names an amount of token B
//! wanted; any taker may fulfill the offer atomically. This crate contains
//! the protocol plumbing a client needs to talk to that program correctly:
//! deterministic address derivation, the fixed 129-byte offer codec,
//! canonical token-account resolution, account-list assembly for the two
//! instructions, and a sign/submit/confirm pipeline with a one-shot
//! manual-signing fallback.
//!
//! The program's account layout, instruction discriminators and account
//! ordering are an external contract this crate reproduces exactly; a
//! mismatch is a fund-handling error, not a cosmetic one.

pub mod error;
pub mod instructions;
pub mod pda;
pub mod pipeline;
pub mod registry;
pub mod state;

use solana_sdk::pubkey::Pubkey;

/// Id of the deployed escrow program.
pub const PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("BZfoyQyAiyo6EVAEnrxBWPgjruRo8Zi3xXduRcq1HbLo");

pub use error::EscrowClientError;
pub use instructions::{build_make_offer, build_take_offer, InstructionPlan, RequiredTokenAccount};
pub use pipeline::{
    Confirmation, LedgerSubmitter, SubmissionPipeline, SubmissionStatus, TransactionSigner,
    ValidityWindow,
};
pub use registry::{LedgerReader, OfferRegistry, OfferWatch, SubscriptionId};
pub use state::{Offer, OfferAccount, OFFER_ACCOUNT_LEN};
