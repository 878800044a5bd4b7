//! The miner: drains the pool when full, assembles a block, searches
//! for a nonce satisfying the difficulty target, commits it to the
//! ledger, and answers Merkle-proof requests for any transaction it has
//! ever committed.

use crate::block::{Block, BlockBody, BlockHeader};
use crate::ledger::Ledger;
use crate::merkle::merkle_root_with_path;
use crate::pool::TransactionPool;
use crate::spv::Proof;
use crate::transaction::Transaction;
use chain_shared::current_timestamp;
use rand::Rng;
use tracing::{error, info};

/// Mines blocks against a shared ledger and pool.
pub struct Miner {
    ledger: Ledger,
    pool: TransactionPool,
    difficulty: u32,
}

impl Miner {
    #[must_use]
    pub fn new(ledger: Ledger, pool: TransactionPool, difficulty: u32) -> Self {
        Self { ledger, pool, difficulty }
    }

    /// Runs the WAIT_FULL → VALIDATE → ASSEMBLE → SEARCH → COMMIT cycle
    /// `rounds` times, calling `on_block` with each newly committed block.
    ///
    /// # Panics
    ///
    /// Panics if any drained transaction fails signature verification.
    pub fn run<F: FnMut(&Block)>(&self, rounds: usize, mut on_block: F) {
        let mut mined = 0;
        loop {
            if mined >= rounds {
                break;
            }
            if !self.pool.is_full() {
                std::thread::yield_now();
                continue;
            }
            let transactions = self.pool.get_all();
            self.validate(&transactions);
            let body = self.assemble(transactions);
            let block = self.search(body);
            self.ledger.add_block(block.clone());
            on_block(&block);
            mined += 1;
        }
    }

    fn validate(&self, transactions: &[Transaction]) {
        for tx in transactions {
            match tx.verify_signature() {
                Ok(true) => {}
                Ok(false) => {
                    error!(tx_hash = tx.hash_hex(), "transaction signature does not verify");
                    panic!("transaction signature does not verify: {}", tx.hash_hex());
                }
                Err(e) => {
                    error!(tx_hash = tx.hash_hex(), error = %e, "transaction signature check errored");
                    panic!("transaction signature check errored: {e}");
                }
            }
        }
    }

    fn assemble(&self, transactions: Vec<Transaction>) -> BlockBody {
        BlockBody::new(transactions)
    }

    fn search(&self, body: BlockBody) -> Block {
        let newest = self.ledger.newest_block();
        let prev_block_hash = newest.hash_hex();
        let mut rng = rand::thread_rng();
        let mut nonce: i64 = rng.gen();
        let mut attempts: u64 = 0;

        let timestamp = current_timestamp();
        loop {
            let header = BlockHeader::new(prev_block_hash.clone(), body.merkle_root_hash.clone(), timestamp, self.difficulty, nonce);
            let block = Block::new(header, body.clone());
            attempts += 1;
            if block.satisfies_pow() {
                info!(
                    height = self.ledger.height() + 1,
                    nonce,
                    attempts,
                    hash = block.hash_hex(),
                    "mined a new block"
                );
                return block;
            }
            nonce = rng.gen();
        }
    }

    /// Locates the block containing `tx_hash` by linear scan, then rebuilds
    /// the Merkle reduction to recover the inclusion path. Returns the
    /// not-found sentinel if no block contains it.
    #[must_use]
    pub fn get_proof(&self, tx_hash: &str) -> Proof {
        for (height, block) in self.ledger.chain_snapshot().into_iter().enumerate() {
            let leaf_hashes: Vec<String> = block.body.transactions.iter().map(Transaction::hash_hex).collect();
            if !leaf_hashes.iter().any(|h| h == tx_hash) {
                continue;
            }
            let (merkle_root_hash, path) = merkle_root_with_path(&leaf_hashes, tx_hash);
            return Proof {
                tx_hash: tx_hash.to_string(),
                merkle_root_hash,
                height,
                path,
            };
        }
        Proof::not_found()
    }
}
