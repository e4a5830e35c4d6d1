use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::EscrowClientError;

/// Serialized size of an offer account: 8-byte discriminator followed by the
/// fixed-width record (8 + 32 + 32 + 32 + 8 + 8 + 1).
pub const OFFER_ACCOUNT_LEN: usize = 129;

const DISCRIMINATOR_LEN: usize = 8;

/// First eight bytes of `sha256("{namespace}:{name}")`, the tag the escrow
/// program prefixes to account records and instruction data.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{namespace}:{name}");
    let hash = solana_sdk::hash::hash(preimage.as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash.to_bytes()[..8]);
    discriminator
}

pub fn offer_discriminator() -> [u8; 8] {
    anchor_discriminator("account", "Offer")
}

/// The escrow record describing a maker's deposit and desired exchange.
///
/// Field order matches the on-chain layout exactly; all integers are
/// little-endian and addresses are raw 32-byte strings. Uniqueness of `id`
/// is only guaranteed per (maker, id) pair.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: u64,
    pub maker: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_a_offered: u64,
    pub token_b_wanted: u64,
    pub bump: u8,
}

impl Offer {
    /// Decodes a raw account buffer. Total over any input: a buffer of the
    /// wrong length or with a foreign discriminator is rejected with an
    /// error, never a panic. Semantically odd values such as zero amounts
    /// are valid states and pass through.
    pub fn decode(data: &[u8]) -> Result<Self, EscrowClientError> {
        if data.len() != OFFER_ACCOUNT_LEN {
            return Err(EscrowClientError::InvalidLength { found: data.len() });
        }
        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(&data[..DISCRIMINATOR_LEN]);
        if discriminator != offer_discriminator() {
            return Err(EscrowClientError::UnknownDiscriminator {
                found: discriminator,
            });
        }
        Self::try_from_slice(&data[DISCRIMINATOR_LEN..])
            .map_err(|_| EscrowClientError::InvalidLength { found: data.len() })
    }

    /// Exact inverse of [`Offer::decode`]: `decode(encode(x)) == x` for
    /// every reachable offer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(OFFER_ACCOUNT_LEN);
        out.extend_from_slice(&offer_discriminator());
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(self.maker.as_ref());
        out.extend_from_slice(self.token_mint_a.as_ref());
        out.extend_from_slice(self.token_mint_b.as_ref());
        out.extend_from_slice(&self.token_a_offered.to_le_bytes());
        out.extend_from_slice(&self.token_b_wanted.to_le_bytes());
        out.push(self.bump);
        out
    }
}

/// A decoded offer paired with the address it was fetched from. The take-offer
/// builder needs both to run its integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferAccount {
    pub address: Pubkey,
    pub offer: Offer,
}
