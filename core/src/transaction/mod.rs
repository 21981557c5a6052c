use anyhow::Result;
use bincode::error::EncodeError;
use bincode::{Decode, Encode, config};
use ed25519_dalek::SigningKey;
use hex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub static BINCODE_CONFIG: Lazy<config::Configuration> = Lazy::new(|| config::standard());

/// Reference to one output of a prior transaction: txid + index within it.
/// This is the key under which spendable outputs live in the pool.
#[derive(
    Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct OutPoint {
    pub txid: String, // hex
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Input: a claim on a previous output, plus the owner's signature over the
/// per-input signing payload. `signature` stays `None` until signing; an
/// unsigned input never validates.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone)]
pub struct TransactionInput {
    pub txid: String, // hex of the transaction that created the output
    pub vout: u32,
    pub signature: Option<String>, // hex of signature (ed25519)
}

impl TransactionInput {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
            signature: None,
        }
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid.clone(), self.vout)
    }
}

/// Output: recipient public key (hex of ed25519 key) + amount in minor units.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub to: String,
    pub amount: i64,
}

/// Transaction: inputs / outputs / txid derived from their content.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone)]
pub struct Transaction {
    pub txid: String, // hex
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Result<Self> {
        let tx = Transaction {
            txid: String::new(),
            inputs,
            outputs,
        };
        tx.with_txid()
    }

    /// Input-less funding transaction paying `amount` to one key. Used to
    /// seed a pool; it is not a spend and is not meant for batch submission.
    pub fn coinbase(to: &str, amount: i64) -> Result<Self> {
        Self::new(
            vec![],
            vec![TransactionOutput {
                to: to.to_string(),
                amount,
            }],
        )
    }

    /// Bytes hashed into the txid: claimed outpoints and outputs only.
    /// Signatures are excluded so the id is the same before and after
    /// signing, and changes exactly when the content changes.
    pub fn serialize_for_hash(&self) -> Result<Vec<u8>, EncodeError> {
        let outpoints: Vec<OutPoint> = self.inputs.iter().map(TransactionInput::outpoint).collect();
        bincode::encode_to_vec(&(&outpoints, &self.outputs), *BINCODE_CONFIG)
    }

    pub fn compute_txid(&self) -> Result<String> {
        let bytes = self.serialize_for_hash()?;
        let h1 = Sha256::digest(&bytes);
        let h2 = Sha256::digest(&h1);
        Ok(hex::encode(h2))
    }

    pub fn with_txid(mut self) -> Result<Self> {
        self.txid = self.compute_txid()?;
        Ok(self)
    }

    /// The message the owner of input `index`'s claimed output signs: that
    /// input's outpoint plus every output of this transaction. Distinct per
    /// input position, independent of any signature.
    pub fn signing_payload(&self, index: usize) -> Result<Vec<u8>> {
        let input = self
            .inputs
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("no input at index {}", index))?;
        let bytes = bincode::encode_to_vec(&(&input.outpoint(), &self.outputs), *BINCODE_CONFIG)?;
        Ok(bytes)
    }

    /// Sign input `index` with the key owning the output it claims.
    pub fn sign_input(&mut self, index: usize, signing_key: &SigningKey) -> Result<()> {
        let msg = self.signing_payload(index)?;
        let sig = crate::crypto::sign(signing_key, &msg);
        self.inputs[index].signature = Some(hex::encode(sig));
        Ok(())
    }

    /// Sign every input with one key. Convenience for the common case where
    /// a single key owns all claimed outputs.
    pub fn sign(&mut self, signing_key: &SigningKey) -> Result<()> {
        for index in 0..self.inputs.len() {
            self.sign_input(index, signing_key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::WalletKeypair;

    fn output(to: &str, amount: i64) -> TransactionOutput {
        TransactionOutput {
            to: to.to_string(),
            amount,
        }
    }

    #[test]
    fn txid_stable_under_signing() {
        let key = WalletKeypair::new();
        let inputs = vec![TransactionInput::new("aa".repeat(32), 0)];
        let mut tx = Transaction::new(inputs, vec![output("bob", 5)]).unwrap();
        let before = tx.txid.clone();

        tx.sign(&key.signing_key).unwrap();
        assert!(tx.inputs[0].signature.is_some());
        assert_eq!(tx.compute_txid().unwrap(), before);
    }

    #[test]
    fn txid_changes_with_content() {
        let inputs = || vec![TransactionInput::new("aa".repeat(32), 0)];
        let a = Transaction::new(inputs(), vec![output("bob", 5)]).unwrap();
        let b = Transaction::new(inputs(), vec![output("bob", 6)]).unwrap();
        let c = Transaction::new(inputs(), vec![output("carol", 5)]).unwrap();
        assert_ne!(a.txid, b.txid);
        assert_ne!(a.txid, c.txid);
        assert_ne!(b.txid, c.txid);
    }

    #[test]
    fn signing_payload_differs_by_input() {
        let inputs = vec![
            TransactionInput::new("aa".repeat(32), 0),
            TransactionInput::new("aa".repeat(32), 1),
        ];
        let tx = Transaction::new(inputs, vec![output("bob", 5)]).unwrap();
        assert_ne!(
            tx.signing_payload(0).unwrap(),
            tx.signing_payload(1).unwrap()
        );
        assert!(tx.signing_payload(2).is_err());
    }

    #[test]
    fn coinbase_has_no_inputs() {
        let cb = Transaction::coinbase("addr", 50).unwrap();
        assert!(cb.inputs.is_empty());
        assert_eq!(cb.outputs.len(), 1);
        assert_eq!(cb.txid.len(), 64);
    }
}
