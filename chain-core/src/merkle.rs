//! Merkle root computation and inclusion-proof path construction.
//!
//! The reduction folds on string concatenation of already-hex-encoded
//! hashes, not on raw bytes: `sha256_hex(left + right)`. When a level has
//! an odd number of nodes, the last one is paired with itself rather than
//! promoted unchanged.

use chain_shared::sha256_hex_concat;
use serde::{Deserialize, Serialize};

/// Which side of a pair a sibling hash occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Left,
    Right,
}

/// One step of a Merkle inclusion path: a sibling hash and which side it
/// sits on relative to the hash being folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleNode {
    pub hash: String,
    pub orientation: Orientation,
}

fn fold_level(level: &[String]) -> Vec<String> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    let mut i = 0;
    while i < level.len() {
        let left = &level[i];
        let right = if i + 1 < level.len() { &level[i + 1] } else { left };
        next.push(sha256_hex_concat(left, right));
        i += 2;
    }
    next
}

/// Reduces a list of leaf hashes to a single Merkle root. Returns the
/// SHA-256 of the empty string for an empty leaf list.
#[must_use]
pub fn merkle_root(leaf_hashes: &[String]) -> String {
    if leaf_hashes.is_empty() {
        return sha256_hex_concat("", "");
    }
    let mut level = leaf_hashes.to_vec();
    while level.len() > 1 {
        level = fold_level(&level);
    }
    level.into_iter().next().unwrap_or_default()
}

/// Reduces `leaf_hashes` to its root while recording the inclusion path
/// for `target`. Returns `(root, path)`; `path` is empty if `target`
/// never matched.
#[must_use]
pub fn merkle_root_with_path(leaf_hashes: &[String], target: &str) -> (String, Vec<MerkleNode>) {
    let mut level = leaf_hashes.to_vec();
    let mut path = Vec::new();
    let mut path_hash = target.to_string();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let left = level[i].clone();
            let right = if i + 1 < level.len() { level[i + 1].clone() } else { left.clone() };
            let parent = sha256_hex_concat(&left, &right);
            if left == path_hash {
                path.push(MerkleNode {
                    hash: right.clone(),
                    orientation: Orientation::Right,
                });
                path_hash.clone_from(&parent);
            } else if right == path_hash {
                path.push(MerkleNode {
                    hash: left.clone(),
                    orientation: Orientation::Left,
                });
                path_hash.clone_from(&parent);
            }
            next.push(parent);
            i += 2;
        }
        level = next;
    }
    (level.into_iter().next().unwrap_or_default(), path)
}

/// Recomputes a root from a leaf hash and its inclusion path. `Left`
/// siblings concatenate before the running hash, `Right` siblings after.
#[must_use]
pub fn fold_path(leaf_hash: &str, path: &[MerkleNode]) -> String {
    let mut h = leaf_hash.to_string();
    for node in path {
        h = match node.orientation {
            Orientation::Left => sha256_hex_concat(&node.hash, &h),
            Orientation::Right => sha256_hex_concat(&h, &node.hash),
        };
    }
    h
}
