use std::collections::HashMap;

use crate::transaction::{OutPoint, Transaction, TransactionOutput};

/// The set of currently spendable outputs, keyed by the transaction that
/// created them and their index within it. Cloning yields a fully
/// independent pool.
#[derive(Debug, Clone, Default)]
pub struct UtxoPool {
    utxos: HashMap<OutPoint, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    /// Look up a spendable output. `None` means the outpoint is unknown or
    /// already spent.
    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.utxos.get(outpoint)
    }

    /// Insert or overwrite. The handler keys new entries by a fresh txid, so
    /// it never overwrites a live entry; other callers carry that burden
    /// themselves.
    pub fn add(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        self.utxos.insert(outpoint, output);
    }

    /// Delete and return the output, `None` if it was not present.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        self.utxos.remove(outpoint)
    }

    /// Snapshot of the current keys. Iteration order is not meaningful.
    pub fn outpoints(&self) -> Vec<OutPoint> {
        self.utxos.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Register every output of `tx`, keyed `(txid, 0..)`. Used to seed a
    /// pool from a coinbase and by the handler when a transaction is
    /// accepted.
    pub fn add_transaction_outputs(&mut self, tx: &Transaction) {
        for (vout, out) in tx.outputs.iter().enumerate() {
            self.add(OutPoint::new(tx.txid.clone(), vout as u32), out.clone());
        }
    }
}
