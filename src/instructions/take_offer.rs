use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{instruction_discriminator, InstructionPlan, RequiredTokenAccount};
use crate::{error::EscrowClientError, pda, state::OfferAccount};

/// Builds the "take offer" instruction: send the wanted token B to the
/// maker, drain the vault's token A to the taker, and close both the vault
/// and the offer record.
///
/// Before emitting anything, the offer address is re-derived from the
/// record's stored (maker, id, bump). A record that does not reproduce the
/// address it was fetched from is corrupted or forged and is never
/// submitted.
pub fn build_take_offer(
    program_id: &Pubkey,
    taker: &Pubkey,
    offer_account: &OfferAccount,
) -> Result<InstructionPlan, EscrowClientError> {
    let offer = &offer_account.offer;

    let derived = pda::offer_address_with_bump(program_id, &offer.maker, offer.id, offer.bump)
        .filter(|derived| *derived == offer_account.address)
        .ok_or(EscrowClientError::OfferIntegrity {
            address: offer_account.address,
            id: offer.id,
        })?;

    let taker_token_account_a = pda::token_account_address(taker, &offer.token_mint_a);
    let taker_token_account_b = pda::token_account_address(taker, &offer.token_mint_b);
    let maker_token_account_b = pda::token_account_address(&offer.maker, &offer.token_mint_b);
    let vault = pda::vault_address(&derived, &offer.token_mint_a);

    let accounts = vec![
        AccountMeta::new(*taker, true),
        // rent from the closed offer account refunds to the maker
        AccountMeta::new(offer.maker, false),
        AccountMeta::new_readonly(offer.token_mint_a, false),
        AccountMeta::new_readonly(offer.token_mint_b, false),
        AccountMeta::new(taker_token_account_a, false),
        AccountMeta::new(taker_token_account_b, false),
        AccountMeta::new(maker_token_account_b, false),
        AccountMeta::new(derived, false),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(spl_associated_token_account::ID, false),
    ];

    Ok(InstructionPlan {
        instruction: Instruction {
            program_id: *program_id,
            accounts,
            data: instruction_discriminator("take_offer").to_vec(),
        },
        fee_payer: *taker,
        // The program creates the maker's token-B account if needed; the
        // taker's two accounts are the client's responsibility.
        required_token_accounts: vec![
            RequiredTokenAccount {
                address: taker_token_account_a,
                owner: *taker,
                mint: offer.token_mint_a,
            },
            RequiredTokenAccount {
                address: taker_token_account_b,
                owner: *taker,
                mint: offer.token_mint_b,
            },
        ],
    })
}
