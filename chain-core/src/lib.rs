pub mod account;
pub mod block;
pub mod ledger;
pub mod merkle;
pub mod mining;
pub mod network;
pub mod pool;
pub mod script;
pub mod spv;
pub mod transaction;
pub mod utxo;

pub use account::Account;
pub use block::{Block, BlockBody, BlockHeader};
pub use ledger::Ledger;
pub use merkle::{merkle_root, merkle_root_with_path, MerkleNode, Orientation};
pub use mining::Miner;
pub use network::Network;
pub use pool::TransactionPool;
pub use script::{unlock, unlocking_script, OpCode, ScriptVm};
pub use spv::{Proof, SpvPeer};
pub use transaction::{signing_payload, Transaction};
pub use utxo::Utxo;

pub use chain_shared::{ChainError, NetworkConfig, Result};
