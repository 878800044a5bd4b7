//! The append-only block list and the authoritative UTXO list, guarded by
//! a single coarse-grained mutex shared between the pool producer and the
//! miner.

use crate::account::Account;
use crate::block::{Block, BlockBody, BlockHeader};
use crate::transaction::Transaction;
use crate::utxo::Utxo;
use chain_shared::KeyPair;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Fixed string the genesis transaction is signed over with an ephemeral,
/// discarded key.
const GENESIS_MESSAGE: &[u8] = b"I am the creator of this blockchain";

struct LedgerState {
    chain: Vec<Block>,
    utxos: Vec<Utxo>,
    account_count: usize,
    init_amount: u64,
}

impl LedgerState {
    fn total_amount_unlocked(&self) -> u64 {
        self.utxos.iter().filter(|u| !u.is_used()).map(|u| u.amount).sum()
    }
}

/// A cloneable handle onto the ledger, shared between the miner and the
/// transaction pool producer.
#[derive(Clone)]
pub struct Ledger(Arc<Mutex<LedgerState>>);

impl Ledger {
    /// Bootstraps the ledger with the genesis block: one synthetic
    /// transaction with empty inputs and one output of `init_amount` per
    /// account, locked to that account's public-key hash.
    #[must_use]
    pub fn genesis(accounts: &[Account], init_amount: u64, difficulty: u32) -> Self {
        let out_utxo: Vec<Utxo> = accounts
            .iter()
            .map(|account| Utxo::new(account.address().to_string(), init_amount, account.public_key_hash()))
            .collect();

        let decorative_key = KeyPair::generate();
        let signature = decorative_key.sign(GENESIS_MESSAGE).0;
        let genesis_tx = Transaction::new(
            vec![],
            out_utxo.clone(),
            decorative_key.public_key().as_bytes().to_vec(),
            signature,
            0,
        );

        let body = BlockBody::new(vec![genesis_tx]);
        let header = BlockHeader::new(String::new(), body.merkle_root_hash.clone(), 0, difficulty, 0);
        let genesis_block = Block::new(header, body);

        info!(accounts = accounts.len(), init_amount, "genesis block bootstrapped");

        Self(Arc::new(Mutex::new(LedgerState {
            chain: vec![genesis_block],
            utxos: out_utxo,
            account_count: accounts.len(),
            init_amount,
        })))
    }

    /// Appends a mined block. Append-only: there is no removal path.
    pub fn add_block(&self, block: Block) {
        let height = {
            let mut state = self.0.lock().expect("ledger mutex poisoned");
            state.chain.push(block);
            state.chain.len() - 1
        };
        info!(height, "block appended to ledger");
    }

    #[must_use]
    pub fn newest_block(&self) -> Block {
        let state = self.0.lock().expect("ledger mutex poisoned");
        state.chain.last().cloned().expect("ledger always holds at least genesis")
    }

    #[must_use]
    pub fn height(&self) -> usize {
        let state = self.0.lock().expect("ledger mutex poisoned");
        state.chain.len() - 1
    }

    #[must_use]
    pub fn block_at(&self, height: usize) -> Option<Block> {
        let state = self.0.lock().expect("ledger mutex poisoned");
        state.chain.get(height).cloned()
    }

    /// A clone of the full chain.
    #[must_use]
    pub fn chain_snapshot(&self) -> Vec<Block> {
        let state = self.0.lock().expect("ledger mutex poisoned");
        state.chain.clone()
    }

    /// The active (unspent) UTXOs for `address`, paired with their stable
    /// index in the ledger's UTXO list.
    #[must_use]
    pub fn active_utxos(&self, address: &str) -> Vec<(usize, Utxo)> {
        let state = self.0.lock().expect("ledger mutex poisoned");
        state
            .utxos
            .iter()
            .enumerate()
            .filter(|(_, utxo)| utxo.wallet_address == address && !utxo.is_used())
            .map(|(index, utxo)| (index, utxo.clone()))
            .collect()
    }

    /// Flips every input UTXO to used and appends every output UTXO, atomically.
    ///
    /// # Panics
    ///
    /// Panics if any input index is already spent (a double-spend) or if
    /// the supply invariant fails to hold after the update.
    pub fn process_transaction_utxos(&self, in_indices: &[usize], out_utxo: Vec<Utxo>) {
        let mut state = self.0.lock().expect("ledger mutex poisoned");
        for &index in in_indices {
            state.utxos[index]
                .set_used()
                .unwrap_or_else(|e| panic!("double-spend detected: {e}"));
        }
        state.utxos.extend(out_utxo);

        let expected = state.account_count as u64 * state.init_amount;
        let actual = state.total_amount_unlocked();
        debug!(expected, actual, "supply invariant checked after transaction commit");
        assert_eq!(
            actual, expected,
            "supply invariant violated: expected {expected}, got {actual}"
        );
    }

    /// Audits the global-supply invariant, panicking on violation.
    #[must_use]
    pub fn total_amount(&self) -> u64 {
        let state = self.0.lock().expect("ledger mutex poisoned");
        let expected = state.account_count as u64 * state.init_amount;
        let actual = state.total_amount_unlocked();
        assert_eq!(
            actual, expected,
            "supply invariant violated: expected {expected}, got {actual}"
        );
        actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_mints_init_amount_per_account() {
        let accounts: Vec<Account> = (0..4).map(|_| Account::new()).collect();
        let ledger = Ledger::genesis(&accounts, 1000, 2);
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.total_amount(), 4000);
    }

    #[test]
    fn test_process_transaction_utxos_moves_value_between_accounts() {
        let accounts: Vec<Account> = (0..2).map(|_| Account::new()).collect();
        let ledger = Ledger::genesis(&accounts, 100, 1);

        let active = ledger.active_utxos(accounts[0].address());
        assert_eq!(active.len(), 1);
        let (index, spent) = &active[0];

        let out = vec![
            Utxo::new(accounts[1].address().to_string(), 30, accounts[1].public_key_hash()),
            Utxo::new(accounts[0].address().to_string(), spent.amount - 30, accounts[0].public_key_hash()),
        ];
        ledger.process_transaction_utxos(&[*index], out);

        assert_eq!(ledger.total_amount(), 200);
        assert!(ledger.active_utxos(accounts[0].address())[0].1.amount == 70);
        assert_eq!(ledger.active_utxos(accounts[1].address())[0].1.amount, 30);
    }

    #[test]
    #[should_panic(expected = "double-spend")]
    fn test_spending_the_same_utxo_twice_panics() {
        let accounts: Vec<Account> = (0..2).map(|_| Account::new()).collect();
        let ledger = Ledger::genesis(&accounts, 100, 1);
        let (index, _) = ledger.active_utxos(accounts[0].address())[0].clone();
        ledger.process_transaction_utxos(&[index], vec![]);
        ledger.process_transaction_utxos(&[index], vec![]);
    }
}
