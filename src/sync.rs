//! Thread-safe handle over a [`BlockChain`]

use crate::chain::BlockChain;
use crate::config::ChainConfig;
use crate::error::Result;
use crate::mempool::TransactionPool;
use crate::types::*;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle sharing one chain between threads.
///
/// Each write (`add_block`, `add_transaction`) holds the exclusive lock for
/// its whole duration. Readers receive owned copies.
#[derive(Debug, Clone)]
pub struct SharedBlockChain {
    inner: Arc<RwLock<BlockChain>>,
}

impl SharedBlockChain {
    pub fn new(genesis: Block) -> Self {
        Self::from_chain(BlockChain::new(genesis))
    }

    pub fn with_config(genesis: Block, config: ChainConfig) -> Self {
        Self::from_chain(BlockChain::with_config(genesis, config))
    }

    pub fn from_chain(chain: BlockChain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn add_block(&self, block: Block) -> bool {
        self.inner.write().add_block(block)
    }

    pub fn process_block(&self, block: Block) -> ValidationResult {
        self.inner.write().process_block(block)
    }

    pub fn add_transaction(&self, tx: Transaction) {
        self.inner.write().add_transaction(tx);
    }

    pub fn get_max_height_block(&self) -> Block {
        self.inner.read().get_max_height_block().clone()
    }

    pub fn get_max_height_utxo_pool(&self) -> UtxoSet {
        self.inner.read().get_max_height_utxo_pool()
    }

    pub fn get_transaction_pool(&self) -> TransactionPool {
        self.inner.read().get_transaction_pool().clone()
    }

    pub fn remove_transaction(&self, tx_id: &Hash) -> Option<Transaction> {
        self.inner.write().get_transaction_pool_mut().remove_transaction(tx_id)
    }

    pub fn best_height(&self) -> Natural {
        self.inner.read().best_height()
    }

    pub fn get_utxo_pool(&self, hash: &Hash) -> Result<UtxoSet> {
        self.inner.read().get_utxo_pool(hash)
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    /// Run `f` against a consistent view of the chain under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&BlockChain) -> R) -> R {
        f(&self.inner.read())
    }
}
