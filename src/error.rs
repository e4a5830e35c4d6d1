use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Every failure mode the client can surface. Each variant carries the
/// offending address or id where one exists, so callers can render an
/// actionable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowClientError {
    #[error("no off-curve address found for offer {id} by maker {maker}")]
    DerivationExhausted { maker: Pubkey, id: u64 },

    #[error("offer account data is {found} bytes, expected 129")]
    InvalidLength { found: usize },

    #[error("account discriminator {found:?} is not an offer record")]
    UnknownDiscriminator { found: [u8; 8] },

    #[error("offer {address} (id {id}) does not re-derive from its stored maker, id and bump")]
    OfferIntegrity { address: Pubkey, id: u64 },

    #[error("offered amount must be greater than zero")]
    InvalidAmount,

    #[error("offered and wanted token mints must be different")]
    SameTokenMints,

    #[error("account {address} not found")]
    AccountNotFound { address: Pubkey },

    #[error("wallet is not connected")]
    NotConnected,

    #[error("signing rejected by the user")]
    UserRejected,

    #[error("transaction submission failed: {reason}")]
    SubmissionFailed { reason: String },

    #[error("validity window elapsed at block height {last_valid_block_height} without confirmation")]
    Expired { last_valid_block_height: u64 },

    #[error("offer {offer} was already taken")]
    OfferAlreadyTaken { offer: Pubkey },

    #[error("ledger request failed: {reason}")]
    Ledger { reason: String },
}
