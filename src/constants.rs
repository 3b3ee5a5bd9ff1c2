//! Ledger constants

/// Maximum depth, in block heights, a new block's parent may trail the best tip
pub const CUT_OFF_AGE: u64 = 10;

/// Height of the genesis block
pub const GENESIS_HEIGHT: u64 = 1;
