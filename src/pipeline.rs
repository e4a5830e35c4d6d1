//! Signs, submits and confirms a composed plan. One automatic attempt, one
//! manual-signing fallback, and a hard stop once the validity window closes.

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use crate::error::EscrowClientError;
use crate::instructions::InstructionPlan;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(400);

/// The short-lived (blockhash, expiry height) pair every submitted
/// transaction must reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// One confirmation poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Rejected(String),
    Pending,
}

/// Lifecycle of a plan inside the pipeline:
/// `Built -> Signed -> Submitted -> {Confirmed | Rejected | Expired}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Rejected,
    Expired,
}

/// Write-side ledger operations. A deterministic rejection the submitter can
/// already attribute (for example a take against a closed offer) should be
/// returned as [`EscrowClientError::OfferAlreadyTaken`] so the pipeline can
/// surface it verbatim instead of burning fees on a retry.
pub trait LedgerSubmitter {
    fn latest_validity_window(&self) -> Result<ValidityWindow, EscrowClientError>;
    fn block_height(&self) -> Result<u64, EscrowClientError>;
    fn submit(&self, transaction: &Transaction) -> Result<Signature, EscrowClientError>;
    fn confirm(&self, signature: &Signature) -> Result<Confirmation, EscrowClientError>;
    fn account_exists(&self, address: &Pubkey) -> Result<bool, EscrowClientError>;
}

/// The controlling identity (wallet). Disconnection and user refusal map to
/// [`EscrowClientError::NotConnected`] and [`EscrowClientError::UserRejected`].
pub trait TransactionSigner {
    fn pubkey(&self) -> Pubkey;
    fn sign(&self, transaction: Transaction) -> Result<Transaction, EscrowClientError>;
}

impl TransactionSigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    fn sign(&self, mut transaction: Transaction) -> Result<Transaction, EscrowClientError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[self], blockhash)
            .map_err(|err| EscrowClientError::SubmissionFailed {
                reason: err.to_string(),
            })?;
        Ok(transaction)
    }
}

pub struct SubmissionPipeline<'a, L: LedgerSubmitter> {
    ledger: &'a L,
    poll_interval: Duration,
}

impl<'a, L: LedgerSubmitter> SubmissionPipeline<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Runs `plan` to confirmation. On an automatic-submission error or an
    /// on-chain rejection, falls back exactly once to `manual` (or back to
    /// `signer` when no separate manual identity is given), re-signing and
    /// re-submitting with the same validity window if it has not expired.
    /// A second failure is terminal and reported, never silently retried.
    pub fn execute(
        &self,
        plan: &InstructionPlan,
        signer: &dyn TransactionSigner,
        manual: Option<&dyn TransactionSigner>,
    ) -> Result<Signature, EscrowClientError> {
        self.ensure_token_accounts(plan, signer)?;

        let window = self.ledger.latest_validity_window()?;
        let transaction = self.sign_plan(plan, signer, &window)?;
        debug!(
            "offer plan {:?} -> {:?}",
            SubmissionStatus::Built,
            SubmissionStatus::Signed
        );

        match self.submit_and_confirm(&transaction, &window) {
            Ok(signature) => Ok(signature),
            Err(err) if Self::retryable(&err) => {
                self.check_window(&window)?;
                warn!("automatic submission failed ({err}); falling back to manual signing once");
                let fallback = manual.unwrap_or(signer);
                let transaction = self.sign_plan(plan, fallback, &window)?;
                self.submit_and_confirm(&transaction, &window)
            }
            Err(err) => Err(err),
        }
    }

    /// Pre-step outside the plan: idempotently creates any associated token
    /// account the plan needs that does not exist yet, and confirms the
    /// creation before the plan itself is submitted.
    fn ensure_token_accounts(
        &self,
        plan: &InstructionPlan,
        signer: &dyn TransactionSigner,
    ) -> Result<(), EscrowClientError> {
        let mut creates: Vec<Instruction> = Vec::new();
        for required in &plan.required_token_accounts {
            if !self.ledger.account_exists(&required.address)? {
                creates.push(create_associated_token_account_idempotent(
                    &plan.fee_payer,
                    &required.owner,
                    &required.mint,
                    &spl_token::ID,
                ));
            }
        }
        if creates.is_empty() {
            return Ok(());
        }
        debug!("creating {} missing associated token accounts", creates.len());

        let window = self.ledger.latest_validity_window()?;
        let message = Message::new_with_blockhash(&creates, Some(&plan.fee_payer), &window.blockhash);
        let transaction = signer.sign(Transaction::new_unsigned(message))?;
        self.submit_and_confirm(&transaction, &window).map(|_| ())
    }

    fn sign_plan(
        &self,
        plan: &InstructionPlan,
        signer: &dyn TransactionSigner,
        window: &ValidityWindow,
    ) -> Result<Transaction, EscrowClientError> {
        let message = Message::new_with_blockhash(
            &[plan.instruction.clone()],
            Some(&plan.fee_payer),
            &window.blockhash,
        );
        signer.sign(Transaction::new_unsigned(message))
    }

    fn submit_and_confirm(
        &self,
        transaction: &Transaction,
        window: &ValidityWindow,
    ) -> Result<Signature, EscrowClientError> {
        let signature = self.ledger.submit(transaction)?;
        debug!("offer plan {:?}: {signature}", SubmissionStatus::Submitted);
        loop {
            match self.ledger.confirm(&signature)? {
                Confirmation::Confirmed => {
                    debug!("offer plan {:?}: {signature}", SubmissionStatus::Confirmed);
                    return Ok(signature);
                }
                Confirmation::Rejected(reason) => {
                    debug!("offer plan {:?}: {signature}: {reason}", SubmissionStatus::Rejected);
                    return Err(EscrowClientError::SubmissionFailed { reason });
                }
                Confirmation::Pending => {
                    self.check_window(window)?;
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }

    fn check_window(&self, window: &ValidityWindow) -> Result<(), EscrowClientError> {
        if self.ledger.block_height()? > window.last_valid_block_height {
            debug!("offer plan {:?}", SubmissionStatus::Expired);
            return Err(EscrowClientError::Expired {
                last_valid_block_height: window.last_valid_block_height,
            });
        }
        Ok(())
    }

    /// Only submission-stage failures earn the one-shot fallback. Integrity,
    /// signing and expiry errors are terminal, as is a ledger-attributed
    /// already-taken rejection.
    fn retryable(err: &EscrowClientError) -> bool {
        matches!(
            err,
            EscrowClientError::SubmissionFailed { .. } | EscrowClientError::Ledger { .. }
        )
    }
}
