//! # UTXO Chain
//!
//! Validation of transactions against an unspent-output ledger, and a
//! bounded-memory tree of competing chain tips built from them.
//!
//! ## Architecture
//!
//! Leaves first:
//! - `transaction`: pure validation of one transaction against a UTXO set
//! - `batch`: greedy, first-seen-wins acceptance of a batch of candidates
//! - `block`: cumulative validation of a block's transactions
//! - `node`: a block with the UTXO snapshot after applying it
//! - `chain`: the block tree, best tip, pending pool and pruning
//! - `sync`: a locked handle for sharing a chain between threads
//!
//! ## Design Principles
//!
//! 1. **Pure Validation**: validators never mutate the set they read
//! 2. **Snapshot per Node**: each branch owns its own UTXO set copy
//! 3. **Rejection is not an Error**: invalid blocks and transactions produce
//!    `false` / [`ValidationResult::Invalid`] and leave state unchanged
//! 4. **Bounded Depth**: blocks may not extend nodes more than the cut-off
//!    age behind the best tip, so older nodes are pruned
//!
//! ## Usage
//!
//! ```rust
//! use utxo_chain::*;
//! use utxo_chain::block::create_block;
//! use utxo_chain::crypto::public_key_from_secret;
//! use utxo_chain::transaction::{calculate_tx_id, create_coinbase, sign_input};
//!
//! let miner_secret = [3u8; 32];
//! let miner = public_key_from_secret(&miner_secret).unwrap();
//!
//! let genesis = create_block(None, create_coinbase(10, miner.clone()), vec![]);
//! let mut chain = BlockChain::new(genesis.clone());
//!
//! let mut tx = Transaction {
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: calculate_tx_id(&genesis.coinbase), index: 0 },
//!         signature: vec![],
//!     }],
//!     outputs: vec![TransactionOutput { value: 10, owner: miner.clone() }],
//! };
//! sign_input(&mut tx, 0, &miner_secret).unwrap();
//!
//! let block = create_block(Some(genesis.hash), create_coinbase(5, miner), vec![tx]);
//! assert!(chain.add_block(block));
//! assert_eq!(chain.best_height(), 2);
//! ```

pub mod types;
pub mod constants;
pub mod crypto;
pub mod transaction;
pub mod batch;
pub mod block;
pub mod node;
pub mod mempool;
pub mod reorganization;
pub mod chain;
pub mod config;
pub mod sync;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use batch::TxHandler;
pub use chain::BlockChain;
pub use config::{ChainConfig, ForkChoice};
pub use mempool::TransactionPool;
pub use node::ChainNode;
pub use sync::SharedBlockChain;
pub use error::{LedgerError, Result};
