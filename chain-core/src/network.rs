//! The composition root: builds the accounts, SPV peers, pool, ledger
//! and miner, wires them together, and drives the system to completion.

use crate::account::Account;
use crate::ledger::Ledger;
use crate::mining::Miner;
use crate::pool::TransactionPool;
use crate::spv::SpvPeer;
use chain_shared::NetworkConfig;
use tracing::info;

/// The number of blocks a single run mines before returning.
pub const BLOCKS_PER_RUN: usize = 3;

pub struct Network {
    accounts: Vec<Account>,
    ledger: Ledger,
    pool: TransactionPool,
    miner: Miner,
    spv_peers: Vec<SpvPeer>,
}

impl Network {
    /// Builds every component from `config` and performs the genesis
    /// bootstrap; does not yet start the producer thread or the miner loop.
    #[must_use]
    pub fn new(config: &NetworkConfig) -> Self {
        info!(
            accounts = config.account_number,
            init_amount = config.init_amount,
            capacity = config.max_transaction_count,
            difficulty = config.difficulty,
            "constructing network"
        );

        let accounts: Vec<Account> = (0..config.account_number).map(|_| Account::new()).collect();
        let spv_peers: Vec<SpvPeer> = accounts.iter().map(|a| SpvPeer::new(a.clone())).collect();

        let ledger = Ledger::genesis(&accounts, config.init_amount, config.difficulty);
        let pool = TransactionPool::new(config.max_transaction_count, ledger.clone(), accounts.clone());
        let miner = Miner::new(ledger.clone(), pool.clone(), config.difficulty);

        Self {
            accounts,
            ledger,
            pool,
            miner,
            spv_peers,
        }
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Broadcasts genesis, starts the transaction pool producer, then runs
    /// the miner for `BLOCKS_PER_RUN` rounds, broadcasting each newly mined
    /// header to every SPV peer and having that peer verify every
    /// transaction in the new block that touches its own address.
    pub fn start(&self) {
        let genesis = self.ledger.block_at(0).expect("ledger always holds at least genesis");
        for peer in &self.spv_peers {
            peer.accept(genesis.header.clone());
        }
        info!("genesis header broadcast to all SPV peers");

        self.pool.start();

        let miner = &self.miner;
        let spv_peers = &self.spv_peers;
        miner.run(BLOCKS_PER_RUN, |block| {
            for peer in spv_peers {
                peer.accept(block.header.clone());
                let ok = peer.verify_header(&block.body.transactions, |tx_hash| miner.get_proof(tx_hash));
                if !ok {
                    panic!("SPV verification failed for account {}", peer.address());
                }
            }
            info!("all SPV peers accepted and verified the newest block header");
        });

        info!(total_supply = self.ledger.total_amount(), height = self.ledger.height(), "mining run complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_short_run_mines_the_configured_number_of_blocks() {
        let config = NetworkConfig::new(3, 500, 2, 1).unwrap();
        let network = Network::new(&config);
        network.start();
        assert_eq!(network.ledger().height(), BLOCKS_PER_RUN);
        assert_eq!(network.ledger().total_amount(), 1500);
    }
}
