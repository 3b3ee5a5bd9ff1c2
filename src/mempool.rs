//! Pending transaction pool

use crate::transaction::calculate_tx_id;
use crate::types::*;
use std::collections::{BTreeMap, HashMap};

/// Transactions awaiting inclusion in a block, keyed by transaction id.
///
/// No validation happens here; assemblers validate against the UTXO set
/// they build on. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: HashMap<Hash, (u64, Transaction)>,
    order: BTreeMap<u64, Hash>,
    next_sequence: u64,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if a transaction with the same id is already pending
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        let tx_id = calculate_tx_id(&tx);
        if self.transactions.contains_key(&tx_id) {
            return false;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.transactions.insert(tx_id, (sequence, tx));
        self.order.insert(sequence, tx_id);
        true
    }

    pub fn remove_transaction(&mut self, tx_id: &Hash) -> Option<Transaction> {
        let (sequence, tx) = self.transactions.remove(tx_id)?;
        self.order.remove(&sequence);
        Some(tx)
    }

    pub fn get_transaction(&self, tx_id: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_id).map(|(_, tx)| tx)
    }

    pub fn contains(&self, tx_id: &Hash) -> bool {
        self.transactions.contains_key(tx_id)
    }

    /// Pending transactions in insertion order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.order
            .values()
            .filter_map(|id| self.transactions.get(id))
            .map(|(_, tx)| tx.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
