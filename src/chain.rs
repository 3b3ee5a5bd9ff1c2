//! Block tree with per-branch ledger snapshots and bounded reorganization depth

use crate::batch::handle_txs;
use crate::block::connect_block;
use crate::config::ChainConfig;
use crate::crypto::short_hex;
use crate::error::{LedgerError, Result};
use crate::mempool::TransactionPool;
use crate::node::ChainNode;
use crate::reorganization::{is_extendable, prune_targets, should_replace_best};
use crate::types::*;
use log::{debug, info, trace};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Tracks every block within the cut-off window of the best tip.
///
/// The node map is the sole owner of all nodes; the best pointer and parent
/// links are lookups into it.
#[derive(Debug, Clone)]
pub struct BlockChain {
    nodes: HashMap<Hash, Arc<ChainNode>>,
    best: Arc<ChainNode>,
    transaction_pool: TransactionPool,
    config: ChainConfig,
}

impl BlockChain {
    /// Create a chain holding only `genesis`, which is assumed valid
    pub fn new(genesis: Block) -> Self {
        Self::with_config(genesis, ChainConfig::default())
    }

    pub fn with_config(genesis: Block, config: ChainConfig) -> Self {
        let mut utxo_set = UtxoSet::new();
        handle_txs(&mut utxo_set, &genesis.transactions);

        let root = Arc::new(ChainNode::new(genesis, None, utxo_set));
        info!("genesis block {} at height {}", short_hex(&root.hash()), root.height());

        let mut nodes = HashMap::new();
        nodes.insert(root.hash(), Arc::clone(&root));

        Self {
            nodes,
            best: root,
            transaction_pool: TransactionPool::new(),
            config,
        }
    }

    /// Add `block` if it is valid; see [`BlockChain::process_block`]
    pub fn add_block(&mut self, block: Block) -> bool {
        self.process_block(block).is_valid()
    }

    /// ProcessBlock: ℬ → {valid, invalid}
    ///
    /// 1. The block must name a parent, and the parent must be tracked
    /// 2. parent.height + 1 + cut_off_age > best_height
    /// 3. Every transaction must be valid against the parent snapshot,
    ///    cumulatively, in block order
    /// 4. A node is created from the parent snapshot with the transactions
    ///    applied and the coinbase minted; it replaces the best tip if higher
    ///
    /// A rejected block leaves the chain unchanged.
    pub fn process_block(&mut self, block: Block) -> ValidationResult {
        let result = self.try_connect(block);
        if let ValidationResult::Invalid(reason) = &result {
            debug!("block rejected: {}", reason);
        }
        result
    }

    fn try_connect(&mut self, block: Block) -> ValidationResult {
        let Some(prev_hash) = block.prev_block_hash else {
            return ValidationResult::Invalid("Block has no parent hash".to_string());
        };

        if self.nodes.contains_key(&block.hash) {
            return ValidationResult::Invalid(format!("Block {} already tracked", short_hex(&block.hash)));
        }

        let Some(parent) = self.nodes.get(&prev_hash) else {
            return ValidationResult::Invalid(format!("Unknown parent {}", short_hex(&prev_hash)));
        };

        // Depth limit precedes transaction revalidation
        if !is_extendable(parent.height(), self.best.height(), self.config.cut_off_age) {
            return ValidationResult::Invalid(format!(
                "Parent height {} too far behind best height {}",
                parent.height(),
                self.best.height()
            ));
        }

        let (result, utxo_set) = connect_block(&block, parent.utxo_set().clone());
        if !result.is_valid() {
            return result;
        }

        let node = Arc::new(ChainNode::new(block, Some(parent.as_ref()), utxo_set));
        let hash = node.hash();
        info!("block {} accepted at height {}", short_hex(&hash), node.height());

        self.nodes.insert(hash, Arc::clone(&node));

        if should_replace_best(&node, &self.best, self.config.fork_choice) {
            let height_increased = node.height() > self.best.height();
            info!("best tip is now {} at height {}", short_hex(&hash), node.height());
            self.best = node;
            if height_increased {
                self.prune();
            }
        }

        ValidationResult::Valid
    }

    /// Drop nodes that can never be extended again
    fn prune(&mut self) {
        for hash in prune_targets(&self.nodes, self.best.height(), self.config.cut_off_age) {
            trace!("pruning block {}", short_hex(&hash));
            self.nodes.remove(&hash);
        }
    }

    /// Add a transaction to the pending pool without validation
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transaction_pool.add_transaction(tx);
    }

    pub fn get_max_height_block(&self) -> &Block {
        self.best.block()
    }

    /// Independent copy of the UTXO set at the best tip
    pub fn get_max_height_utxo_pool(&self) -> UtxoSet {
        self.best.utxo_set().clone()
    }

    pub fn get_transaction_pool(&self) -> &TransactionPool {
        &self.transaction_pool
    }

    pub fn get_transaction_pool_mut(&mut self) -> &mut TransactionPool {
        &mut self.transaction_pool
    }

    pub fn best_height(&self) -> Natural {
        self.best.height()
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.nodes.get(hash).map(|n| n.block())
    }

    pub fn get_height(&self, hash: &Hash) -> Option<Natural> {
        self.nodes.get(hash).map(|n| n.height())
    }

    /// Independent copy of the UTXO set after the tracked block `hash`
    pub fn get_utxo_pool(&self, hash: &Hash) -> Result<UtxoSet> {
        self.nodes
            .get(hash)
            .map(|n| n.utxo_set().clone())
            .ok_or_else(|| LedgerError::UnknownBlock(hex::encode(hash)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Hashes of tracked nodes that no tracked node builds on
    pub fn tips(&self) -> Vec<Hash> {
        let parents: HashSet<&Hash> = self.nodes.values().filter_map(|n| n.parent()).collect();
        self.nodes
            .keys()
            .filter(|hash| !parents.contains(hash))
            .copied()
            .collect()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::create_block;
    use crate::config::ForkChoice;
    use crate::crypto::public_key_from_secret;
    use crate::transaction::{calculate_tx_id, create_coinbase, sign_input};

    const MINER: [u8; 32] = [3u8; 32];
    const ALICE: [u8; 32] = [4u8; 32];

    fn miner() -> ByteString {
        public_key_from_secret(&MINER).unwrap()
    }

    fn genesis() -> Block {
        create_block(None, create_coinbase(10, miner()), vec![])
    }

    /// Empty block on `parent`; `tag` keeps sibling coinbases distinct
    fn empty_block(parent: Hash, tag: Integer) -> Block {
        create_block(Some(parent), create_coinbase(tag, miner()), vec![])
    }

    fn extend(chain: &mut BlockChain, parent: Hash, count: usize, tag: Integer) -> Vec<Hash> {
        let mut tip = parent;
        let mut hashes = Vec::new();
        for i in 0..count {
            let block = empty_block(tip, tag * 1000 + i as Integer);
            tip = block.hash;
            assert!(chain.add_block(block));
            hashes.push(tip);
        }
        hashes
    }

    #[test]
    fn test_genesis_state() {
        let genesis = genesis();
        let chain = BlockChain::new(genesis.clone());

        assert_eq!(chain.get_max_height_block(), &genesis);
        assert_eq!(chain.get_block(&genesis.hash), Some(&genesis));
        assert_eq!(chain.best_height(), 1);
        assert_eq!(chain.node_count(), 1);
        assert_eq!(chain.get_max_height_utxo_pool().len(), 1);
        assert!(chain.get_transaction_pool().is_empty());
        assert_eq!(chain.tips(), vec![genesis.hash]);
    }

    #[test]
    fn test_reject_missing_parent_hash() {
        let mut chain = BlockChain::new(genesis());
        let block = create_block(None, create_coinbase(5, miner()), vec![]);

        assert!(!chain.add_block(block));
        assert_eq!(chain.node_count(), 1);
    }

    #[test]
    fn test_reject_orphan() {
        let mut chain = BlockChain::new(genesis());

        assert!(!chain.add_block(empty_block([9; 32], 1)));
    }

    #[test]
    fn test_reject_duplicate_block() {
        let genesis = genesis();
        let mut chain = BlockChain::new(genesis.clone());
        let block = empty_block(genesis.hash, 1);

        assert!(chain.add_block(block.clone()));
        assert!(!chain.add_block(block));
        assert_eq!(chain.node_count(), 2);
    }

    #[test]
    fn test_block_spending_coinbase() {
        let genesis = genesis();
        let mut chain = BlockChain::new(genesis.clone());
        let outpoint = OutPoint { hash: calculate_tx_id(&genesis.coinbase), index: 0 };

        let mut tx = Transaction {
            inputs: vec![TransactionInput { prevout: outpoint, signature: vec![] }],
            outputs: vec![TransactionOutput {
                value: 10,
                owner: public_key_from_secret(&ALICE).unwrap(),
            }],
        };
        sign_input(&mut tx, 0, &MINER).unwrap();

        let block = create_block(Some(genesis.hash), create_coinbase(7, miner()), vec![tx.clone()]);
        assert_eq!(chain.process_block(block.clone()), ValidationResult::Valid);

        let pool = chain.get_max_height_utxo_pool();
        assert!(!pool.contains_key(&outpoint));
        assert!(pool.contains_key(&OutPoint { hash: calculate_tx_id(&tx), index: 0 }));
        assert!(pool.contains_key(&OutPoint { hash: calculate_tx_id(&block.coinbase), index: 0 }));

        // The genesis snapshot is untouched
        assert!(chain.get_utxo_pool(&genesis.hash).unwrap().contains_key(&outpoint));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let genesis = genesis();
        let mut chain = BlockChain::new(genesis.clone());
        let first = empty_block(genesis.hash, 1);
        let second = empty_block(genesis.hash, 2);

        assert!(chain.add_block(first.clone()));
        assert!(chain.add_block(second));
        assert_eq!(chain.get_max_height_block(), &first);
        assert_eq!(chain.tips().len(), 2);
    }

    #[test]
    fn test_tie_lowest_hash() {
        let genesis = genesis();
        let config = ChainConfig {
            fork_choice: ForkChoice::LowestHash,
            ..ChainConfig::default()
        };
        let a = empty_block(genesis.hash, 1);
        let b = empty_block(genesis.hash, 2);
        let lowest = if a.hash < b.hash { a.clone() } else { b.clone() };

        let mut forward = BlockChain::with_config(genesis.clone(), config.clone());
        assert!(forward.add_block(a.clone()));
        assert!(forward.add_block(b.clone()));

        let mut backward = BlockChain::with_config(genesis, config);
        assert!(backward.add_block(b));
        assert!(backward.add_block(a));

        assert_eq!(forward.get_max_height_block(), &lowest);
        assert_eq!(backward.get_max_height_block(), &lowest);
    }

    #[test]
    fn test_cut_off_boundary() {
        let genesis = genesis();
        let mut chain = BlockChain::new(genesis.clone());
        let main = extend(&mut chain, genesis.hash, 10, 1); // heights 2..=11
        // Side branch off height 9 keeps heights 9 and 10 of the main chain tracked
        let side = extend(&mut chain, main[7], 3, 2); // heights 10..=12
        extend(&mut chain, main[9], 10, 3); // heights 12..=21
        assert_eq!(chain.best_height(), 21);
        assert!(chain.contains_block(&main[8]));

        // main[8] is height 10: 10 + 1 + 10 = 21 <= 21
        match chain.process_block(empty_block(main[8], 4)) {
            ValidationResult::Invalid(reason) => assert!(reason.contains("too far behind")),
            ValidationResult::Valid => panic!("block below cut-off accepted"),
        }
        // side[1] is height 11: 11 + 1 + 10 = 22 > 21
        assert!(chain.add_block(empty_block(side[1], 5)));
        assert_eq!(chain.best_height(), 21);
    }

    #[test]
    fn test_pruning_bounds_node_count() {
        let genesis = genesis();
        let mut chain = BlockChain::new(genesis.clone());
        let main = extend(&mut chain, genesis.hash, 40, 1);

        // Heights 31..=41 remain extendable
        assert_eq!(chain.node_count(), 11);
        assert!(!chain.contains_block(&genesis.hash));
        assert!(!chain.contains_block(&main[28])); // height 30
        assert_eq!(chain.get_height(&main[29]), Some(31));
        assert!(matches!(
            chain.get_utxo_pool(&genesis.hash),
            Err(LedgerError::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_zero_cut_off_age() {
        let genesis = genesis();
        let config = ChainConfig {
            cut_off_age: 0,
            ..ChainConfig::default()
        };
        let mut chain = BlockChain::with_config(genesis.clone(), config);
        let main = extend(&mut chain, genesis.hash, 2, 1);

        // Only the tip can be extended
        assert!(!chain.add_block(empty_block(main[0], 2)));
        assert!(chain.add_block(empty_block(main[1], 3)));
        assert_eq!(chain.node_count(), 1);
    }

    #[test]
    fn test_add_transaction_is_unvalidated() {
        let mut chain = BlockChain::new(genesis());
        let bogus = create_coinbase(1_000_000, miner());

        chain.add_transaction(bogus.clone());

        assert_eq!(chain.get_transaction_pool().transactions(), vec![bogus.clone()]);
        chain.get_transaction_pool_mut().remove_transaction(&calculate_tx_id(&bogus));
        assert!(chain.get_transaction_pool().is_empty());
    }
}
