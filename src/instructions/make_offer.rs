use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{instruction_discriminator, InstructionPlan};
use crate::{error::EscrowClientError, pda};

/// Builds the "make offer" instruction: escrow `token_a_offered` of mint A
/// in a fresh vault and record that `token_b_wanted` of mint B is wanted.
///
/// `id` is chosen by the maker; a collision with an existing (maker, id)
/// pair is only detected when the ledger rejects the submission.
pub fn build_make_offer(
    program_id: &Pubkey,
    maker: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    token_a_offered: u64,
    token_b_wanted: u64,
    id: u64,
) -> Result<InstructionPlan, EscrowClientError> {
    if token_a_offered == 0 {
        return Err(EscrowClientError::InvalidAmount);
    }
    if token_mint_a == token_mint_b {
        return Err(EscrowClientError::SameTokenMints);
    }

    let (offer, _bump) = pda::find_offer_address(program_id, maker, id)?;
    let maker_token_account_a = pda::token_account_address(maker, token_mint_a);
    let vault = pda::vault_address(&offer, token_mint_a);

    let mut data = instruction_discriminator("make_offer").to_vec();
    data.extend_from_slice(&id.to_le_bytes());
    data.extend_from_slice(&token_a_offered.to_le_bytes());
    data.extend_from_slice(&token_b_wanted.to_le_bytes());

    let accounts = vec![
        AccountMeta::new(*maker, true),
        AccountMeta::new_readonly(*token_mint_a, false),
        AccountMeta::new_readonly(*token_mint_b, false),
        AccountMeta::new(maker_token_account_a, false),
        AccountMeta::new(offer, false),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(spl_associated_token_account::ID, false),
    ];

    Ok(InstructionPlan {
        instruction: Instruction {
            program_id: *program_id,
            accounts,
            data,
        },
        fee_payer: *maker,
        // The maker's token-A account must already hold the offered tokens;
        // offer and vault are created by the program itself.
        required_token_accounts: vec![],
    })
}
