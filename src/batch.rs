//! Greedy batch acceptance of candidate transactions

use crate::transaction::{apply_transaction, check_transaction};
use crate::types::*;
use log::debug;

/// HandleTxs: 𝒰𝒮 × 𝒯𝒳* → 𝒰𝒮 × 𝒯𝒳*
///
/// Candidates are examined once, in order, each against the set as mutated
/// by every earlier acceptance. A candidate that conflicts with an earlier
/// one is dropped; there is no retry.
pub fn handle_txs(utxo_set: &mut UtxoSet, candidates: &[Transaction]) -> Vec<Transaction> {
    let mut accepted = Vec::new();

    for (i, tx) in candidates.iter().enumerate() {
        match check_transaction(tx, utxo_set).0 {
            ValidationResult::Valid => {
                apply_transaction(tx, utxo_set);
                accepted.push(tx.clone());
            }
            ValidationResult::Invalid(reason) => {
                debug!("dropping candidate {}: {}", i, reason);
            }
        }
    }

    accepted
}

/// A ledger view owning its own copy of a UTXO set
#[derive(Debug, Clone, Default)]
pub struct TxHandler {
    utxo_pool: UtxoSet,
}

impl TxHandler {
    pub fn new(utxo_pool: &UtxoSet) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
        }
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        check_transaction(tx, &self.utxo_pool).0.is_valid()
    }

    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        handle_txs(&mut self.utxo_pool, candidates)
    }

    pub fn utxo_pool(&self) -> &UtxoSet {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoSet {
        self.utxo_pool
    }
}
