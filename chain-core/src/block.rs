use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use chain_shared::{meets_difficulty, sha256_hex};
use serde::{Deserialize, Serialize};

/// Block metadata: chain linkage, the Merkle commitment to the body, and
/// the proof-of-work fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    /// Hex SHA-256 of the previous block's canonical form, empty for genesis.
    pub prev_block_hash: String,
    pub merkle_root_hash: String,
    pub timestamp: i64,
    pub difficulty: u32,
    pub nonce: i64,
}

impl BlockHeader {
    #[must_use]
    pub fn new(prev_block_hash: String, merkle_root_hash: String, timestamp: i64, difficulty: u32, nonce: i64) -> Self {
        Self {
            version: 1,
            prev_block_hash,
            merkle_root_hash,
            timestamp,
            difficulty,
            nonce,
        }
    }

    /// The canonical textual form this header's hash is computed over.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "BlockHeader{{version={}, preBlockHash={}, merkleRootHash={}, timeStamp={}, difficulty={}, nonce={}}}",
            self.version, self.prev_block_hash, self.merkle_root_hash, self.timestamp, self.difficulty, self.nonce
        )
    }
}

/// The block body: its transactions and the Merkle root committing to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBody {
    pub merkle_root_hash: String,
    pub transactions: Vec<Transaction>,
}

impl BlockBody {
    #[must_use]
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let leaf_hashes: Vec<String> = transactions.iter().map(Transaction::hash_hex).collect();
        let merkle_root_hash = merkle_root(&leaf_hashes);
        Self {
            merkle_root_hash,
            transactions,
        }
    }

    /// The body's own canonical form. Transactions are joined with a single space.
    #[must_use]
    pub fn canonical(&self) -> String {
        let txs = self
            .transactions
            .iter()
            .map(Transaction::canonical)
            .collect::<Vec<_>>()
            .join(" ");
        format!("BlockBody{{merkleRootHash={}, transactions={}}}", self.merkle_root_hash, txs)
    }
}

/// A mined (or genesis) block: header plus body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub body: BlockBody,
}

impl Block {
    #[must_use]
    pub fn new(header: BlockHeader, body: BlockBody) -> Self {
        Self { header, body }
    }

    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "Block{{blockHeader={}, blockBody={}}}",
            self.header.canonical(),
            self.body.canonical()
        )
    }

    /// The block's identity: `sha256_hex(canonical(block))`.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        sha256_hex(&self.canonical())
    }

    /// Whether this block's hash satisfies its own declared difficulty.
    #[must_use]
    pub fn satisfies_pow(&self) -> bool {
        meets_difficulty(&self.hash_hex(), self.header.difficulty)
    }

    /// Recomputes the Merkle root from the body's transactions and compares
    /// it against both the body's and the header's stored roots.
    #[must_use]
    pub fn merkle_root_is_sound(&self) -> bool {
        let leaf_hashes: Vec<String> = self.body.transactions.iter().map(Transaction::hash_hex).collect();
        let recomputed = merkle_root(&leaf_hashes);
        recomputed == self.body.merkle_root_hash && recomputed == self.header.merkle_root_hash
    }
}
