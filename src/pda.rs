//! Deterministic address derivation: the offer PDA search and the canonical
//! associated-token-account scheme.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::error::EscrowClientError;

/// Literal prefix of every offer address derivation.
pub const OFFER_SEED: &[u8] = b"offer";

/// Derives the program-owned address for an offer when the bump is not yet
/// known ("find" mode). Tries bump values from 255 down to 0 and returns the
/// first that lands off the ed25519 curve, so the resulting address has no
/// private key and can only be moved by program logic.
///
/// Pure function: identical (program id, maker, id) always yields the
/// identical (address, bump).
pub fn find_offer_address(
    program_id: &Pubkey,
    maker: &Pubkey,
    id: u64,
) -> Result<(Pubkey, u8), EscrowClientError> {
    let id_bytes = id.to_le_bytes();
    for bump in (0..=u8::MAX).rev() {
        if let Ok(address) = Pubkey::create_program_address(
            &[OFFER_SEED, maker.as_ref(), &id_bytes, &[bump]],
            program_id,
        ) {
            return Ok((address, bump));
        }
    }
    Err(EscrowClientError::DerivationExhausted { maker: *maker, id })
}

/// Reconstructs an offer address from a previously stored bump
/// ("create-with-bump" mode). Returns `None` when the bump does not produce
/// a valid off-curve address, which callers must treat as a failed
/// reproduction, not a retryable condition.
///
/// For the bump returned by [`find_offer_address`], this is byte-identical
/// to the "find" result.
pub fn offer_address_with_bump(
    program_id: &Pubkey,
    maker: &Pubkey,
    id: u64,
    bump: u8,
) -> Option<Pubkey> {
    Pubkey::create_program_address(
        &[OFFER_SEED, maker.as_ref(), &id.to_le_bytes(), &[bump]],
        program_id,
    )
    .ok()
}

/// Canonical address holding `mint` tokens for `owner`. Shared program-wide
/// scheme, not specific to the escrow program; purely a derivation, no
/// existence check.
pub fn token_account_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

/// The offer's vault: the token-A account whose owner is the offer PDA
/// itself rather than a person.
pub fn vault_address(offer: &Pubkey, token_mint_a: &Pubkey) -> Pubkey {
    token_account_address(offer, token_mint_a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PROGRAM_ID;

    #[test]
    fn find_is_deterministic() {
        let maker = Pubkey::new_unique();
        let first = find_offer_address(&PROGRAM_ID, &maker, 42).unwrap();
        let second = find_offer_address(&PROGRAM_ID, &maker, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn find_matches_sdk_search() {
        let maker = Pubkey::new_unique();
        let (address, bump) = find_offer_address(&PROGRAM_ID, &maker, 7).unwrap();
        let expected = Pubkey::find_program_address(
            &[OFFER_SEED, maker.as_ref(), &7u64.to_le_bytes()],
            &PROGRAM_ID,
        );
        assert_eq!((address, bump), expected);
    }

    #[test]
    fn stored_bump_reproduces_find_result() {
        let maker = Pubkey::new_unique();
        let (address, bump) = find_offer_address(&PROGRAM_ID, &maker, 99).unwrap();
        assert_eq!(
            offer_address_with_bump(&PROGRAM_ID, &maker, 99, bump),
            Some(address)
        );
    }

    #[test]
    fn different_seeds_derive_different_addresses() {
        let maker = Pubkey::new_unique();
        let (for_id_1, _) = find_offer_address(&PROGRAM_ID, &maker, 1).unwrap();
        let (for_id_2, _) = find_offer_address(&PROGRAM_ID, &maker, 2).unwrap();
        assert_ne!(for_id_1, for_id_2);

        let other_maker = Pubkey::new_unique();
        let (for_other, _) = find_offer_address(&PROGRAM_ID, &other_maker, 1).unwrap();
        assert_ne!(for_id_1, for_other);
    }

    #[test]
    fn wrong_bump_never_reproduces_the_address() {
        let maker = Pubkey::new_unique();
        let (address, bump) = find_offer_address(&PROGRAM_ID, &maker, 5).unwrap();
        // Any lower bump is either on-curve (None) or a different address;
        // it must never silently alias the canonical one.
        let tampered = offer_address_with_bump(&PROGRAM_ID, &maker, 5, bump.wrapping_sub(1));
        assert_ne!(tampered, Some(address));
    }

    #[test]
    fn vault_is_owned_by_the_offer_address() {
        let maker = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (offer, _) = find_offer_address(&PROGRAM_ID, &maker, 3).unwrap();
        assert_eq!(
            vault_address(&offer, &mint),
            get_associated_token_address(&offer, &mint)
        );
        assert_ne!(vault_address(&offer, &mint), token_account_address(&maker, &mint));
    }
}
