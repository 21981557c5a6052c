use std::collections::HashSet;

use log::debug;

use crate::crypto;
use crate::errors::ValidationError;
use crate::transaction::{OutPoint, Transaction};
use crate::utxo::UtxoPool;

/// Validates candidate transactions against a UTXO pool and applies the
/// mutually consistent subset, one batch at a time.
///
/// The pool is owned exclusively by the handler: queries take `&self`,
/// batch application takes `&mut self`, and nothing here is shareable
/// across threads without external synchronization.
pub struct TxHandler {
    pool: UtxoPool,
}

impl TxHandler {
    /// Build a handler over `pool`. The handler owns the pool from here on;
    /// callers that want to keep their snapshot clone before the call.
    pub fn new(pool: UtxoPool) -> Self {
        Self { pool }
    }

    /// Read-only view of the current pool.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    /// Check one candidate against the current pool without mutating
    /// anything. The checks run in a fixed order and stop at the first
    /// failure:
    ///
    /// 1. every input claims an output present in the pool,
    /// 2. no output is claimed twice within this transaction,
    /// 3. every input carries a valid signature by the claimed output's key,
    /// 4. no output value is negative,
    /// 5. total input value covers total output value.
    ///
    /// Claims across different transactions are not this function's concern;
    /// [`TxHandler::handle_batch`] resolves those by updating the pool
    /// between candidates.
    pub fn check_transaction(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let mut claimed: HashSet<OutPoint> = HashSet::with_capacity(tx.inputs.len());
        let mut sum_input: i128 = 0;

        for (index, input) in tx.inputs.iter().enumerate() {
            let outpoint = input.outpoint();
            let Some(output) = self.pool.get(&outpoint) else {
                return Err(ValidationError::UnknownUtxo(outpoint));
            };
            if !claimed.insert(outpoint.clone()) {
                return Err(ValidationError::DuplicateClaim(outpoint));
            }

            let sig_hex = input
                .signature
                .as_deref()
                .ok_or(ValidationError::MalformedInput { index })?;
            let sig_bytes =
                hex::decode(sig_hex).map_err(|_| ValidationError::MalformedInput { index })?;
            let message = tx
                .signing_payload(index)
                .map_err(|_| ValidationError::MalformedInput { index })?;
            if !crypto::verify_signature(&output.to, &message, &sig_bytes) {
                return Err(ValidationError::InvalidSignature { index });
            }

            sum_input += output.amount as i128;
        }

        let mut sum_output: i128 = 0;
        for (index, output) in tx.outputs.iter().enumerate() {
            if output.amount < 0 {
                return Err(ValidationError::NegativeOutputValue {
                    index,
                    amount: output.amount,
                });
            }
            sum_output += output.amount as i128;
        }

        if sum_input < sum_output {
            return Err(ValidationError::ValueNotConserved {
                inputs: sum_input,
                outputs: sum_output,
            });
        }

        Ok(())
    }

    /// `true` if `tx` could be applied against the current pool. Pure
    /// query; repeated calls against an unmutated pool agree.
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.check_transaction(tx).is_ok()
    }

    /// Process one batch of candidates in their given order, exactly once
    /// each. An accepted transaction updates the pool immediately, so a
    /// later candidate claiming an output consumed earlier in the same
    /// batch fails the pool-membership check. The first claimant wins;
    /// there is no backtracking and no priority beyond input order.
    ///
    /// Rejected candidates are skipped, not errors: they are logged at
    /// debug level and left out of the returned sequence.
    pub fn handle_batch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        let mut accepted = Vec::new();

        for tx in candidates {
            match self.check_transaction(tx) {
                Ok(()) => {
                    self.apply(tx);
                    accepted.push(tx.clone());
                }
                Err(err) => debug!("rejecting tx {}: {}", tx.txid, err),
            }
        }

        debug!(
            "batch done: accepted {} of {} candidates, pool holds {} outputs",
            accepted.len(),
            candidates.len(),
            self.pool.len()
        );
        accepted
    }

    /// Consume the claimed outputs and register the new ones. Only called
    /// for a transaction that just passed `check_transaction`, so every
    /// claimed outpoint is still present.
    fn apply(&mut self, tx: &Transaction) {
        for input in &tx.inputs {
            let _removed = self.pool.remove(&input.outpoint());
            debug_assert!(_removed.is_some(), "accepted input missing from pool");
        }
        self.pool.add_transaction_outputs(tx);
    }
}
