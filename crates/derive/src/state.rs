//! Chain state read by the pipeline.
//!
//! [State] is written by a single owner (the component following L1 and the engine) and read by
//! the pipeline through [SharedState] snapshots. A snapshot never changes once taken: updates are
//! applied to a copy which then replaces the current value.

use alloy_primitives::{Bytes, B256};
use hashbrown::HashMap;
use rollup_primitives::prelude::{
    BlockInfo, Epoch, L1BlockInfo, RollupConfig, SystemConfig, UserDeposited,
};
use spin::RwLock;
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// Everything the pipeline needs to know about one L1 block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct L1Info {
    /// The L1 block header fields consumed by derivation.
    pub block_info: L1BlockInfo,
    /// The system config in effect at this block.
    pub system_config: SystemConfig,
    /// Deposits made in this block, ordered by log index.
    pub user_deposits: Vec<UserDeposited>,
    /// Payloads of the batcher transactions included in this block.
    pub batcher_transactions: Vec<Bytes>,
    /// Whether the block is finalized.
    pub finalized: bool,
}

impl L1Info {
    /// Returns the [Epoch] anchored at this block.
    pub fn epoch(&self) -> Epoch {
        Epoch::from(&self.block_info)
    }
}

/// The L1 and L2 view the pipeline validates batches against.
#[derive(Debug, Clone)]
pub struct State {
    l1_info: HashMap<B256, Arc<L1Info>>,
    l1_hashes: BTreeMap<u64, B256>,
    l2_refs: BTreeMap<u64, (BlockInfo, Epoch)>,
    safe_head: BlockInfo,
    safe_epoch: Epoch,
    current_epoch_num: u64,
    config: Arc<RollupConfig>,
}

impl State {
    /// Creates a new [State] positioned at the given safe head.
    pub fn new(config: Arc<RollupConfig>, safe_head: BlockInfo, safe_epoch: Epoch) -> Self {
        let mut state = Self {
            l1_info: HashMap::new(),
            l1_hashes: BTreeMap::new(),
            l2_refs: BTreeMap::new(),
            safe_head,
            safe_epoch,
            current_epoch_num: 0,
            config,
        };
        state.l2_refs.insert(safe_head.number, (safe_head, safe_epoch));
        state
    }

    /// Returns the rollup config.
    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// Returns the L2 safe head.
    pub const fn safe_head(&self) -> BlockInfo {
        self.safe_head
    }

    /// Returns the L1 origin of the L2 safe head.
    pub const fn safe_epoch(&self) -> Epoch {
        self.safe_epoch
    }

    /// Returns the number of the most recent L1 block seen.
    pub const fn current_epoch_num(&self) -> u64 {
        self.current_epoch_num
    }

    /// Returns the timestamp of the most recent L1 block seen, or of the safe epoch if that block
    /// is not known.
    pub fn current_l1_timestamp(&self) -> u64 {
        self.epoch(self.current_epoch_num).map_or(self.safe_epoch.timestamp, |e| e.timestamp)
    }

    /// Looks up L1 info by block hash.
    pub fn l1_info_by_hash(&self, hash: B256) -> Option<&L1Info> {
        self.l1_info.get(&hash).map(Arc::as_ref)
    }

    /// Looks up L1 info by block number.
    pub fn l1_info_by_number(&self, number: u64) -> Option<&L1Info> {
        self.l1_hashes.get(&number).and_then(|hash| self.l1_info_by_hash(*hash))
    }

    /// Returns the epoch anchored at the given L1 block number.
    pub fn epoch(&self, number: u64) -> Option<Epoch> {
        self.l1_info_by_number(number).map(L1Info::epoch)
    }

    /// Returns the epoch anchored at the given L1 block hash.
    pub fn epoch_by_hash(&self, hash: B256) -> Option<Epoch> {
        self.l1_info_by_hash(hash).map(L1Info::epoch)
    }

    /// Returns the L2 block at the given timestamp and its L1 origin, if known.
    pub fn l2_info(&self, timestamp: u64) -> Option<(BlockInfo, Epoch)> {
        let genesis = &self.config.genesis;
        let since_genesis = timestamp.checked_sub(genesis.l2_time)?;
        let number = since_genesis.checked_div(self.config.block_time)? + genesis.l2.number;
        self.l2_refs.get(&number).copied()
    }

    /// Records a new L1 block, making it the current epoch.
    pub fn update_l1_info(&mut self, info: L1Info) {
        let (number, hash) = (info.block_info.number, info.block_info.hash);
        self.current_epoch_num = number;
        self.l1_hashes.insert(number, hash);
        self.l1_info.insert(hash, Arc::new(info));
        self.prune();
    }

    /// Advances the safe head and records it as a known L2 block.
    pub fn update_safe_head(&mut self, safe_head: BlockInfo, safe_epoch: Epoch) {
        self.safe_head = safe_head;
        self.safe_epoch = safe_epoch;
        self.l2_refs.insert(safe_head.number, (safe_head, safe_epoch));
    }

    /// Forgets all L1 data and resets the safe head, used after an L1 reorg.
    pub fn purge(&mut self, safe_head: BlockInfo, safe_epoch: Epoch) {
        debug!(target: "state", "Purging state to safe head {}", safe_head.number);
        self.l1_info.clear();
        self.l1_hashes.clear();
        self.current_epoch_num = 0;
        self.update_safe_head(safe_head, safe_epoch);
    }

    /// Drops L1 blocks older than the sequencing window of the safe epoch and L2 blocks older than
    /// the sequencer drift allows a batch to reference.
    pub fn prune(&mut self) {
        let l1_floor = self.safe_epoch.number.saturating_sub(self.config.seq_window_size);
        let kept = self.l1_hashes.split_off(&l1_floor);
        for hash in std::mem::replace(&mut self.l1_hashes, kept).into_values() {
            self.l1_info.remove(&hash);
        }

        let drift = self.config.max_sequencer_drift(self.safe_epoch.timestamp);
        let drift_blocks = drift.checked_div(self.config.block_time).unwrap_or_default();
        let l2_floor = self.safe_head.number.saturating_sub(drift_blocks);
        self.l2_refs = self.l2_refs.split_off(&l2_floor);
    }
}

/// A cell holding the current [State], shared between its writer and the pipeline.
#[derive(Debug, Clone)]
pub struct SharedState(Arc<RwLock<Arc<State>>>);

impl SharedState {
    /// Creates a new [SharedState] holding `state`.
    pub fn new(state: State) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(state))))
    }

    /// Returns the current state. The snapshot is unaffected by later updates.
    pub fn snapshot(&self) -> Arc<State> {
        Arc::clone(&self.0.read())
    }

    /// Applies `f` to a copy of the current state and publishes the result.
    pub fn update<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut current = self.0.write();
        let mut next = State::clone(&current);
        let out = f(&mut next);
        *current = Arc::new(next);
        out
    }
}
