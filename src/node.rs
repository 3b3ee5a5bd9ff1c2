//! A block's position in the branch tree together with its ledger state

use crate::block::mint_coinbase;
use crate::constants::GENESIS_HEIGHT;
use crate::types::*;

/// Block wrapped with the UTXO set after applying it, its height and the
/// hash of its parent. The parent link is a lookup key into the owning
/// chain's node map, not an ownership edge.
#[derive(Debug, Clone)]
pub struct ChainNode {
    block: Block,
    utxo_set: UtxoSet,
    height: Natural,
    parent: Option<Hash>,
}

impl ChainNode {
    /// Takes ownership of `base_utxo_set` (the parent's snapshot with the
    /// block's transactions already applied) and mints the coinbase into it.
    /// No validation is performed.
    pub fn new(block: Block, parent: Option<&ChainNode>, mut base_utxo_set: UtxoSet) -> Self {
        mint_coinbase(&block.coinbase, &mut base_utxo_set);

        let (height, parent) = match parent {
            Some(p) => (p.height + 1, Some(p.hash())),
            None => (GENESIS_HEIGHT, None),
        };

        Self {
            block,
            utxo_set: base_utxo_set,
            height,
            parent,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn hash(&self) -> Hash {
        self.block.hash
    }

    pub fn height(&self) -> Natural {
        self.height
    }

    pub fn parent(&self) -> Option<&Hash> {
        self.parent.as_ref()
    }

    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::create_block;
    use crate::transaction::{calculate_tx_id, create_coinbase};

    #[test]
    fn test_genesis_node() {
        let coinbase = create_coinbase(10, vec![0x02; 33]);
        let genesis = create_block(None, coinbase.clone(), vec![]);
        let node = ChainNode::new(genesis.clone(), None, UtxoSet::new());

        assert_eq!(node.height(), GENESIS_HEIGHT);
        assert_eq!(node.parent(), None);
        assert_eq!(node.hash(), genesis.hash);
        assert_eq!(node.utxo_set().len(), 1);
        assert_eq!(
            node.utxo_set()[&OutPoint { hash: calculate_tx_id(&coinbase), index: 0 }].value,
            10
        );
    }

    #[test]
    fn test_child_node_height_and_snapshot_isolation() {
        let genesis = create_block(None, create_coinbase(10, vec![0x02; 33]), vec![]);
        let root = ChainNode::new(genesis.clone(), None, UtxoSet::new());

        let child_block = create_block(Some(genesis.hash), create_coinbase(20, vec![0x03; 33]), vec![]);
        let child = ChainNode::new(child_block, Some(&root), root.utxo_set().clone());

        assert_eq!(child.height(), root.height() + 1);
        assert_eq!(child.parent(), Some(&genesis.hash));
        assert_eq!(child.utxo_set().len(), 2);
        assert_eq!(root.utxo_set().len(), 1);
    }
}
