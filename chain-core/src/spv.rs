//! The light client: stores headers only, and asks the miner for a
//! Merkle inclusion proof whenever it needs to confirm a transaction
//! touching its own address.

use crate::account::Account;
use crate::block::BlockHeader;
use crate::merkle::{fold_path, MerkleNode};
use crate::transaction::Transaction;
use std::sync::Mutex;
use tracing::info;

/// The Merkle inclusion proof a miner hands back for a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub tx_hash: String,
    pub merkle_root_hash: String,
    pub height: usize,
    pub path: Vec<MerkleNode>,
}

impl Proof {
    /// The sentinel returned when the requested transaction hash is not
    /// found in any block.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            tx_hash: String::new(),
            merkle_root_hash: String::new(),
            height: 0,
            path: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.tx_hash.is_empty()
    }
}

/// A simplified-payment-verification peer: trusts headers without
/// downloading full blocks.
pub struct SpvPeer {
    account: Account,
    headers: Mutex<Vec<BlockHeader>>,
}

impl SpvPeer {
    #[must_use]
    pub fn new(account: Account) -> Self {
        Self {
            account,
            headers: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.account.address()
    }

    #[must_use]
    pub fn header_count(&self) -> usize {
        self.headers.lock().expect("spv header mutex poisoned").len()
    }

    fn header_at(&self, height: usize) -> Option<BlockHeader> {
        self.headers.lock().expect("spv header mutex poisoned").get(height).cloned()
    }

    /// Records a newly broadcast header.
    pub fn accept(&self, header: BlockHeader) {
        self.headers.lock().expect("spv header mutex poisoned").push(header);
    }

    /// Checks every transaction in `latest_block_transactions` that
    /// touches this peer's address (as an input or an output owner)
    /// against a proof obtained from `get_proof`.
    #[must_use]
    pub fn verify_header<F>(&self, latest_block_transactions: &[Transaction], get_proof: F) -> bool
    where
        F: Fn(&str) -> Proof,
    {
        let address = self.account.address();
        let relevant: Vec<&Transaction> = latest_block_transactions
            .iter()
            .filter(|tx| {
                tx.in_utxo.iter().any(|u| u.wallet_address == address)
                    || tx.out_utxo.iter().any(|u| u.wallet_address == address)
            })
            .collect();

        if relevant.is_empty() {
            return true;
        }

        info!(address, count = relevant.len(), "verifying transactions touching this account");
        relevant.iter().all(|tx| self.verify(tx, &get_proof))
    }

    /// Folds the proof's path against the transaction hash and checks the
    /// result against both the proof's claimed root and this peer's
    /// locally stored header for that height.
    #[must_use]
    pub fn verify<F>(&self, transaction: &Transaction, get_proof: F) -> bool
    where
        F: Fn(&str) -> Proof,
    {
        let proof = get_proof(&transaction.hash_hex());
        if !proof.is_found() {
            return false;
        }
        let folded = fold_path(&proof.tx_hash, &proof.path);
        let Some(local_header) = self.header_at(proof.height) else {
            return false;
        };
        folded == proof.merkle_root_hash && local_header.merkle_root_hash == proof.merkle_root_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockBody};
    use crate::ledger::Ledger;
    use crate::utxo::Utxo;

    #[test]
    fn test_genesis_header_is_accepted_without_verification() {
        let account = Account::new();
        let peer = SpvPeer::new(account);
        let header = BlockHeader::new(String::new(), "root".into(), 0, 1, 0);
        peer.accept(header);
        assert_eq!(peer.header_count(), 1);
    }

    #[test]
    fn test_proof_roundtrips_against_a_real_block() {
        let accounts: Vec<Account> = (0..2).map(|_| Account::new()).collect();
        let ledger = Ledger::genesis(&accounts, 100, 1);
        let genesis = ledger.newest_block();

        let peer = SpvPeer::new(accounts[0].clone());
        peer.accept(genesis.header.clone());

        let tx = genesis.body.transactions[0].clone();
        let leaf_hashes: Vec<String> = genesis.body.transactions.iter().map(Transaction::hash_hex).collect();
        let (root, path) = crate::merkle::merkle_root_with_path(&leaf_hashes, &tx.hash_hex());

        let proof = Proof {
            tx_hash: tx.hash_hex(),
            merkle_root_hash: root,
            height: 0,
            path,
        };

        assert!(peer.verify(&tx, |_| proof.clone()));
    }

    #[test]
    fn test_verify_rejects_a_not_found_proof() {
        let account = Account::new();
        let peer = SpvPeer::new(account);
        let body = BlockBody::new(vec![]);
        let header = BlockHeader::new(String::new(), body.merkle_root_hash.clone(), 0, 1, 0);
        let _block = Block::new(header.clone(), body);
        peer.accept(header);

        let bogus = Utxo::new("nobody".into(), 1, [0u8; 20]);
        let tx = Transaction::new(vec![], vec![bogus], vec![], vec![], 0);
        assert!(!peer.verify(&tx, |_| Proof::not_found()));
    }
}
