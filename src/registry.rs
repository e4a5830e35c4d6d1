//! Read path: bulk listing of every live offer and a live-update watch on a
//! single offer account.

use log::warn;
use solana_sdk::pubkey::Pubkey;

use crate::error::EscrowClientError;
use crate::state::{Offer, OfferAccount};

/// Identifier handed back by [`LedgerReader::subscribe_account`].
pub type SubscriptionId = u64;

/// Read-side ledger operations the registry needs. Backed by an RPC node in
/// production and by in-memory fakes in tests.
pub trait LedgerReader {
    fn get_program_accounts(
        &self,
        program_id: &Pubkey,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, EscrowClientError>;

    fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, EscrowClientError>;

    /// Registers `callback` for change notifications on `address`.
    /// Notifications are delivered in ledger order, one at a time.
    fn subscribe_account(
        &self,
        address: &Pubkey,
        callback: Box<dyn FnMut(Vec<u8>) + Send>,
    ) -> Result<SubscriptionId, EscrowClientError>;

    fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), EscrowClientError>;
}

pub struct OfferRegistry<'a, R: LedgerReader> {
    reader: &'a R,
    program_id: Pubkey,
}

impl<'a, R: LedgerReader> OfferRegistry<'a, R> {
    pub fn new(reader: &'a R, program_id: Pubkey) -> Self {
        Self { reader, program_id }
    }

    /// Fetches every account owned by the escrow program and decodes each
    /// one. Accounts that fail decoding are dropped with a warning; a single
    /// corrupt or foreign account never aborts the listing of the others.
    pub fn list_offers(&self) -> Result<Vec<OfferAccount>, EscrowClientError> {
        let raw = self.reader.get_program_accounts(&self.program_id)?;
        let mut offers = Vec::with_capacity(raw.len());
        for (address, data) in raw {
            match Offer::decode(&data) {
                Ok(offer) => offers.push(OfferAccount { address, offer }),
                Err(err) => warn!("skipping undecodable account {address}: {err}"),
            }
        }
        Ok(offers)
    }

    /// Fetches and decodes one offer by address. Unlike [`Self::list_offers`]
    /// a decode failure here is the caller's problem and propagates.
    pub fn fetch_offer(&self, address: &Pubkey) -> Result<OfferAccount, EscrowClientError> {
        let data = self
            .reader
            .get_account(address)?
            .ok_or(EscrowClientError::AccountNotFound { address: *address })?;
        Ok(OfferAccount {
            address: *address,
            offer: Offer::decode(&data)?,
        })
    }

    /// Subscribes to change notifications for one offer account, re-decoding
    /// on each. A notification that fails to decode is dropped with a
    /// warning; it never tears down the subscription. The returned guard
    /// unsubscribes when dropped.
    pub fn watch<F>(
        &self,
        address: &Pubkey,
        mut on_update: F,
    ) -> Result<OfferWatch<'a, R>, EscrowClientError>
    where
        F: FnMut(OfferAccount) + Send + 'static,
    {
        let watched = *address;
        let subscription = self.reader.subscribe_account(
            address,
            Box::new(move |data| match Offer::decode(&data) {
                Ok(offer) => on_update(OfferAccount {
                    address: watched,
                    offer,
                }),
                Err(err) => warn!("ignoring undecodable update for {watched}: {err}"),
            }),
        )?;
        Ok(OfferWatch {
            reader: self.reader,
            subscription,
            address: watched,
        })
    }
}

/// Live-update handle returned by [`OfferRegistry::watch`]. Holding it keeps
/// the subscription alive; dropping it unsubscribes.
pub struct OfferWatch<'a, R: LedgerReader> {
    reader: &'a R,
    subscription: SubscriptionId,
    address: Pubkey,
}

impl<R: LedgerReader> OfferWatch<'_, R> {
    pub fn address(&self) -> &Pubkey {
        &self.address
    }
}

impl<R: LedgerReader> Drop for OfferWatch<'_, R> {
    fn drop(&mut self) {
        if let Err(err) = self.reader.unsubscribe(self.subscription) {
            warn!("failed to unsubscribe from {}: {err}", self.address);
        }
    }
}
