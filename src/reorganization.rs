//! Fork choice and bounded-depth pruning of the branch tree

use crate::config::ForkChoice;
use crate::node::ChainNode;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// ShouldReplaceBest: a candidate becomes the best tip if it is strictly
/// higher, or, under `LowestHash`, equally high with a smaller hash.
pub fn should_replace_best(candidate: &ChainNode, best: &ChainNode, fork_choice: ForkChoice) -> bool {
    if candidate.height() > best.height() {
        return true;
    }

    match fork_choice {
        ForkChoice::FirstSeen => false,
        ForkChoice::LowestHash => candidate.height() == best.height() && candidate.hash() < best.hash(),
    }
}

/// A node at height h may still be extended iff h + 1 + cut_off_age > best_height
pub fn is_extendable(height: Natural, best_height: Natural, cut_off_age: u64) -> bool {
    height.saturating_add(1).saturating_add(cut_off_age) > best_height
}

/// PruneTargets: hashes of nodes that can be discarded.
///
/// Retained nodes are the extendable ones plus their ancestors down to the
/// lowest common ancestor of all extendable nodes. Everything else can never
/// be built on again and nothing retained needs it.
pub fn prune_targets(
    nodes: &HashMap<Hash, Arc<ChainNode>>,
    best_height: Natural,
    cut_off_age: u64,
) -> Vec<Hash> {
    let live: Vec<&ChainNode> = nodes
        .values()
        .filter(|n| is_extendable(n.height(), best_height, cut_off_age))
        .map(|n| n.as_ref())
        .collect();

    // Ancestor path of every live node, itself included
    let paths: Vec<Vec<&ChainNode>> = live.iter().map(|n| ancestor_path(nodes, *n)).collect();

    let floor = common_ancestor_height(&paths).unwrap_or(0);

    let retained: HashSet<Hash> = paths
        .iter()
        .flatten()
        .filter(|n| n.height() >= floor)
        .map(|n| n.hash())
        .collect();

    nodes
        .keys()
        .filter(|hash| !retained.contains(*hash))
        .copied()
        .collect()
}

/// Walk parent links while they resolve inside `nodes`
fn ancestor_path<'a>(nodes: &'a HashMap<Hash, Arc<ChainNode>>, start: &'a ChainNode) -> Vec<&'a ChainNode> {
    let mut path = vec![start];
    let mut current = start;
    while let Some(parent) = current.parent().and_then(|hash| nodes.get(hash)).map(|n| n.as_ref()) {
        path.push(parent);
        current = parent;
    }
    path
}

/// Height of the deepest node shared by every path
fn common_ancestor_height(paths: &[Vec<&ChainNode>]) -> Option<Natural> {
    let (first, rest) = paths.split_first()?;

    let mut common: HashSet<Hash> = first.iter().map(|n| n.hash()).collect();
    for path in rest {
        let hashes: HashSet<Hash> = path.iter().map(|n| n.hash()).collect();
        common.retain(|hash| hashes.contains(hash));
    }

    first
        .iter()
        .filter(|n| common.contains(&n.hash()))
        .map(|n| n.height())
        .max()
}
