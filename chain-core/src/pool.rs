//! The transaction pool: a bounded buffer fed by a background producer
//! thread that picks two accounts at random and moves a random amount of
//! value between them, and drained in one shot by the miner once full.

use crate::account::Account;
use crate::ledger::Ledger;
use crate::script::unlock;
use crate::transaction::{signing_payload, Transaction};
use crate::utxo::Utxo;
use chain_shared::current_timestamp;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{info, trace};

struct PoolState {
    transactions: Mutex<Vec<Transaction>>,
    capacity: usize,
    ledger: Ledger,
    accounts: Vec<Account>,
}

/// A cloneable handle onto the shared pool, passed to both the producer
/// thread and the miner.
#[derive(Clone)]
pub struct TransactionPool(Arc<PoolState>);

impl TransactionPool {
    #[must_use]
    pub fn new(capacity: usize, ledger: Ledger, accounts: Vec<Account>) -> Self {
        Self(Arc::new(PoolState {
            transactions: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            ledger,
            accounts,
        }))
    }

    pub fn put(&self, transaction: Transaction) {
        self.0.transactions.lock().expect("pool mutex poisoned").push(transaction);
    }

    /// Drains and returns every buffered transaction, leaving the pool empty.
    pub fn get_all(&self) -> Vec<Transaction> {
        std::mem::take(&mut self.0.transactions.lock().expect("pool mutex poisoned"))
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.transactions.lock().expect("pool mutex poisoned").len() >= self.0.capacity
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.transactions.lock().expect("pool mutex poisoned").is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.0.capacity
    }

    /// Picks two distinct accounts, moves a random amount of `a`'s spare
    /// balance to `b`, signs the transfer, and atomically commits the UTXO
    /// update to the ledger. Retries with a fresh pair whenever the chosen
    /// sender holds no spendable balance.
    pub(crate) fn generate_one(&self) -> Transaction {
        let mut rng = rand::thread_rng();
        loop {
            let a = &self.0.accounts[rng.gen_range(0..self.0.accounts.len())];
            let b = &self.0.accounts[rng.gen_range(0..self.0.accounts.len())];
            if a.address() == b.address() {
                continue;
            }

            let active = self.0.ledger.active_utxos(a.address());
            let available: u64 = active.iter().map(|(_, u)| u.amount).sum();
            if available == 0 {
                continue;
            }

            let tx_amount = rng.gen_range(1..=available);
            let unlock_signature = a.sign(&a.public_key_bytes());

            let mut in_indices = Vec::new();
            let mut in_utxo = Vec::new();
            let mut in_amount = 0u64;
            for (index, utxo) in &active {
                match unlock(&unlock_signature, &a.public_key_bytes(), &utxo.public_key_hash) {
                    Ok(true) => {
                        in_amount += utxo.amount;
                        in_indices.push(*index);
                        in_utxo.push(utxo.clone());
                        if in_amount >= tx_amount {
                            break;
                        }
                    }
                    Ok(false) | Err(_) => continue,
                }
            }
            if in_amount < tx_amount {
                trace!(address = a.address(), "insufficient unlockable balance this round, retrying");
                continue;
            }

            let mut out_utxo = vec![Utxo::new(b.address().to_string(), tx_amount, b.public_key_hash())];
            if in_amount > tx_amount {
                out_utxo.push(Utxo::new(a.address().to_string(), in_amount - tx_amount, a.public_key_hash()));
            }

            let payload = signing_payload(&in_utxo, &out_utxo);
            let signature = a.sign(payload.as_bytes());
            let transaction = Transaction::new(in_utxo, out_utxo.clone(), a.public_key_bytes(), signature, current_timestamp());

            self.0.ledger.process_transaction_utxos(&in_indices, out_utxo);
            trace!(from = a.address(), to = b.address(), amount = tx_amount, "transaction produced");
            return transaction;
        }
    }

    /// Spawns the background producer: while the pool has room, generate
    /// and enqueue a transaction; yield otherwise.
    pub fn start(&self) {
        let pool = self.clone();
        info!(capacity = pool.capacity(), "transaction pool producer starting");
        thread::spawn(move || loop {
            if pool.is_full() {
                thread::yield_now();
                continue;
            }
            let transaction = pool.generate_one();
            pool.put(transaction);
        });
    }
}
