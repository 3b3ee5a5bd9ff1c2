//! Block validation and UTXO derivation

use crate::crypto::sha256d_hash;
use crate::transaction::{
    add_outputs, apply_transaction, calculate_tx_id, check_transaction, find_unspent_collision, is_coinbase,
};
use crate::types::*;

/// ConnectBlock: ℬ × 𝒰𝒮 → {valid, invalid} × 𝒰𝒮
///
/// For block b = (prev, cb, txs) on top of parent UTXO set us:
/// 1. Check the coinbase cb is well formed
/// 2. For each tx ∈ txs in order: tx must be valid against us, then us = Apply(tx, us)
/// 3. No coinbase output key may already be in us
/// 4. Return (valid, us)
///
/// The coinbase is not minted here; the chain node does that when it is built.
/// Any invalid transaction invalidates the whole block.
pub fn connect_block(block: &Block, mut utxo_set: UtxoSet) -> (ValidationResult, UtxoSet) {
    // 1. Validate coinbase
    if let ValidationResult::Invalid(reason) = check_coinbase(&block.coinbase) {
        return (ValidationResult::Invalid(reason), utxo_set);
    }

    // 2. Validate and apply transactions cumulatively
    for (i, tx) in block.transactions.iter().enumerate() {
        if let (ValidationResult::Invalid(reason), _) = check_transaction(tx, &utxo_set) {
            return (
                ValidationResult::Invalid(format!("Invalid transaction at index {}: {}", i, reason)),
                utxo_set,
            );
        }
        apply_transaction(tx, &mut utxo_set);
    }

    // 3. Minting must not replace an unspent output
    if let Some(outpoint) = find_unspent_collision(&block.coinbase, &utxo_set) {
        return (
            ValidationResult::Invalid(format!(
                "Coinbase output {} would overwrite an unspent output",
                outpoint.index
            )),
            utxo_set,
        );
    }

    (ValidationResult::Valid, utxo_set)
}

/// CheckCoinbase: no inputs, every output value non-negative, total finite
pub fn check_coinbase(coinbase: &Transaction) -> ValidationResult {
    if !is_coinbase(coinbase) {
        return ValidationResult::Invalid("Coinbase must not have inputs".to_string());
    }

    let mut total: Integer = 0;
    for (i, output) in coinbase.outputs.iter().enumerate() {
        if output.value < 0 {
            return ValidationResult::Invalid(format!(
                "Negative coinbase output value {} at index {}",
                output.value, i
            ));
        }
        total = match total.checked_add(output.value) {
            Some(total) => total,
            None => return ValidationResult::Invalid("Coinbase value overflow".to_string()),
        };
    }

    ValidationResult::Valid
}

/// Mint every coinbase output into `utxo_set`
pub fn mint_coinbase(coinbase: &Transaction, utxo_set: &mut UtxoSet) {
    add_outputs(coinbase, utxo_set);
}

/// Assemble a block and compute its hash
pub fn create_block(
    prev_block_hash: Option<Hash>,
    coinbase: Transaction,
    transactions: Vec<Transaction>,
) -> Block {
    let hash = calculate_block_hash(prev_block_hash.as_ref(), &coinbase, &transactions);
    Block {
        prev_block_hash,
        coinbase,
        transactions,
        hash,
    }
}

/// Block hash: double SHA-256 over the parent hash, coinbase id, and each
/// transaction id together with its input signatures
pub fn calculate_block_hash(
    prev_block_hash: Option<&Hash>,
    coinbase: &Transaction,
    transactions: &[Transaction],
) -> Hash {
    let mut data = Vec::new();

    match prev_block_hash {
        Some(prev) => {
            data.push(1);
            data.extend_from_slice(prev);
        }
        None => data.push(0),
    }

    data.extend_from_slice(&calculate_tx_id(coinbase));

    data.extend_from_slice(&(transactions.len() as u64).to_le_bytes());
    for tx in transactions {
        data.extend_from_slice(&calculate_tx_id(tx));
        for input in &tx.inputs {
            data.extend_from_slice(&(input.signature.len() as u64).to_le_bytes());
            data.extend_from_slice(&input.signature);
        }
    }

    sha256d_hash(&data)
}
