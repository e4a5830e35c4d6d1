//! Builders for the two escrow instructions. Account ordering and
//! signer/writable flags are the on-chain program's fixed contract and are
//! reproduced here exactly.

pub mod make_offer;
pub mod take_offer;

pub use make_offer::build_make_offer;
pub use take_offer::build_take_offer;

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::state::anchor_discriminator;

/// A composed instruction plus everything the submission pipeline needs to
/// land it: who pays fees and which associated token accounts must exist
/// before the instruction itself can run.
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    pub instruction: Instruction,
    pub fee_payer: Pubkey,
    pub required_token_accounts: Vec<RequiredTokenAccount>,
}

/// An associated token account the plan reads or writes that the program
/// will not create on its own. The pipeline creates missing ones
/// idempotently before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredTokenAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub mint: Pubkey,
}

pub(crate) fn instruction_discriminator(name: &str) -> [u8; 8] {
    anchor_discriminator("global", name)
}
