//! This module contains the [AttributesBuilder] stage, the last stage of the pipeline.

use super::DerivedBatch;
use crate::{
    errors::{PipelineError, PipelineResult},
    state::{L1Info, SharedState, State},
    traits::PurgeableStage,
};
use alloy_primitives::B256;
use rollup_primitives::{
    prelude::{L1BlockInfoTx, PayloadAttributes, RollupConfig, SystemAccounts, TxDeposit},
    upgrades::upgrade_transactions,
};
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, info};

/// Provides validated singular batches for the [AttributesBuilder] stage.
pub trait BatchProvider {
    /// Returns the next batch to build a block from, or `None` if none is ready yet.
    fn next_batch(&mut self) -> PipelineResult<Option<DerivedBatch>>;
}

/// The [AttributesBuilder] stage turns each [DerivedBatch] into the [PayloadAttributes] of an L2
/// block, tracking the position of the block within its epoch.
#[derive(Debug)]
pub struct AttributesBuilder<P>
where
    P: BatchProvider + PurgeableStage + Debug,
{
    /// The rollup configuration.
    cfg: Arc<RollupConfig>,
    /// The previous stage of the derivation pipeline.
    prev: P,
    /// The chain state.
    state: SharedState,
    /// The sequence number of the last block built.
    sequence_number: u64,
    /// The epoch hash of the last block built.
    epoch_hash: B256,
    /// A batch whose L1 origin was not known yet, retried on the next call.
    batch: Option<DerivedBatch>,
}

impl<P> AttributesBuilder<P>
where
    P: BatchProvider + PurgeableStage + Debug,
{
    /// Creates a new [AttributesBuilder] continuing from the safe epoch of `state`.
    pub fn new(cfg: Arc<RollupConfig>, prev: P, state: SharedState) -> Self {
        let safe_epoch = state.snapshot().safe_epoch();
        Self {
            cfg,
            prev,
            state,
            sequence_number: safe_epoch.sequence_number,
            epoch_hash: safe_epoch.hash,
            batch: None,
        }
    }

    /// Returns the attributes of the next L2 block, or `None` if no batch is ready.
    ///
    /// If the L1 origin of the batch is not in the state yet, the batch is kept and a temporary
    /// error is returned.
    pub fn next_attributes(&mut self) -> PipelineResult<Option<PayloadAttributes>> {
        let batch = match self.batch.take() {
            Some(batch) => batch,
            None => match self.prev.next_batch()? {
                Some(batch) => batch,
                None => return Ok(None),
            },
        };

        let state = self.state.snapshot();
        match self.derive_attributes(&batch, &state) {
            Ok(attributes) => Ok(Some(attributes)),
            Err(e) => {
                debug!(target: "attributes-builder", "Deferring batch: {e}");
                self.batch = Some(batch);
                Err(e)
            }
        }
    }

    fn derive_attributes(
        &mut self,
        derived: &DerivedBatch,
        state: &State,
    ) -> PipelineResult<PayloadAttributes> {
        let batch = &derived.batch;
        let l1_info = state
            .l1_info_by_hash(batch.epoch_hash)
            .ok_or(PipelineError::MissingL1Info(batch.epoch_hash).temp())?;

        let sequence_number =
            if batch.epoch_hash == self.epoch_hash { self.sequence_number + 1 } else { 0 };
        let timestamp = batch.timestamp;

        let mut transactions = self.deposits(l1_info, sequence_number, timestamp)?;
        transactions.extend(upgrade_transactions(&self.cfg, timestamp));
        transactions.extend(batch.transactions.iter().cloned());

        let withdrawals = self.cfg.is_canyon_active(timestamp).then(Vec::new);
        let parent_beacon_block_root = self
            .cfg
            .is_ecotone_active(timestamp)
            .then(|| l1_info.block_info.parent_beacon_root.unwrap_or(B256::ZERO));

        self.sequence_number = sequence_number;
        self.epoch_hash = batch.epoch_hash;

        info!(
            target: "attributes-builder",
            "Built attributes at timestamp {timestamp}, epoch {}, sequence {sequence_number}",
            l1_info.block_info.number
        );

        Ok(PayloadAttributes {
            timestamp,
            prev_randao: l1_info.block_info.mix_hash,
            suggested_fee_recipient: SystemAccounts::default().fee_vault,
            transactions,
            withdrawals,
            no_tx_pool: true,
            gas_limit: l1_info.system_config.gas_limit,
            epoch: l1_info.epoch().with_sequence_number(sequence_number),
            l1_inclusion_block: derived.inclusion_block,
            seq_number: sequence_number,
            parent_beacon_block_root,
        })
    }

    /// Returns the L1 info deposit followed, in the first block of an epoch, by the user deposits
    /// of the epoch.
    fn deposits(
        &self,
        l1_info: &L1Info,
        sequence_number: u64,
        timestamp: u64,
    ) -> PipelineResult<Vec<alloy_primitives::Bytes>> {
        let info_tx = L1BlockInfoTx::try_new(
            &self.cfg,
            &l1_info.system_config,
            sequence_number,
            &l1_info.block_info,
            timestamp,
        )
        .map_err(|e| PipelineError::from(e).crit())?;

        let mut deposits = vec![info_tx.to_deposit_tx(&self.cfg, timestamp).encoded_2718()];
        if sequence_number == 0 {
            deposits
                .extend(l1_info.user_deposits.iter().map(|d| TxDeposit::from(d).encoded_2718()));
        }
        Ok(deposits)
    }
}

impl<P> PurgeableStage for AttributesBuilder<P>
where
    P: BatchProvider + PurgeableStage + Debug,
{
    fn purge(&mut self) {
        let safe_epoch = self.state.snapshot().safe_epoch();
        self.sequence_number = safe_epoch.sequence_number;
        self.epoch_hash = safe_epoch.hash;
        self.batch = None;
        self.prev.purge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        batch::SingleBatch,
        errors::PipelineErrorKind,
        test_utils::{
            l1_hash, l1_info, l2_hash, test_config, test_state, test_state_with_config,
            TestBatchProvider,
        },
    };
    use alloy_primitives::{address, Bytes, U256};
    use rollup_primitives::prelude::UserDeposited;

    fn derived(k: u64, transactions: Vec<Bytes>) -> DerivedBatch {
        DerivedBatch {
            batch: SingleBatch {
                parent_hash: l2_hash(k - 1),
                epoch_num: k / 3,
                epoch_hash: l1_hash(k / 3),
                timestamp: k * 2,
                transactions,
            },
            inclusion_block: 4,
        }
    }

    fn builder(state: State, batches: Vec<DerivedBatch>) -> AttributesBuilder<TestBatchProvider> {
        let cfg = Arc::new(*state.config());
        let provider = TestBatchProvider::new(batches.into_iter().map(Ok).collect());
        AttributesBuilder::new(cfg, provider, SharedState::new(state))
    }

    fn deposit(log_index: u64) -> UserDeposited {
        UserDeposited {
            from: address!("1111111111111111111111111111111111111111"),
            to: address!("2222222222222222222222222222222222222222"),
            mint: 1,
            value: U256::from(2),
            gas: 21_000,
            l1_block_num: 2,
            l1_block_hash: l1_hash(2),
            log_index,
            ..Default::default()
        }
    }

    #[test]
    fn test_sequence_numbers() {
        let batches = (6..10).map(|k| derived(k, vec![])).collect();
        let mut stage = builder(test_state(5, 10), batches);
        let seqs: Vec<u64> =
            (0..4).map(|_| stage.next_attributes().unwrap().unwrap().seq_number).collect();
        assert_eq!(seqs, vec![0, 1, 2, 0]);
        assert_eq!(stage.next_attributes().unwrap(), None);
    }

    #[test]
    fn test_continues_safe_epoch() {
        // Safe head 4 is the second block of epoch 1, so block 5 is its third.
        let mut stage = builder(test_state(4, 10), vec![derived(5, vec![])]);
        let attributes = stage.next_attributes().unwrap().unwrap();
        assert_eq!(attributes.seq_number, 2);
        assert_eq!(attributes.epoch.sequence_number, 2);
    }

    #[test]
    fn test_attributes_fields() {
        let tx = Bytes::from_static(&[0x02, 0xc0]);
        let mut stage = builder(test_state(5, 10), vec![derived(6, vec![tx.clone()])]);
        let attributes = stage.next_attributes().unwrap().unwrap();

        let origin = l1_info(2);
        assert_eq!(attributes.timestamp, 12);
        assert_eq!(attributes.prev_randao, origin.block_info.mix_hash);
        assert_eq!(attributes.suggested_fee_recipient, SystemAccounts::default().fee_vault);
        assert_eq!(attributes.gas_limit, origin.system_config.gas_limit);
        assert_eq!(attributes.epoch, origin.epoch());
        assert_eq!(attributes.l1_inclusion_block, 4);
        assert!(attributes.no_tx_pool);
        // Canyon is active from genesis on the test chain, Ecotone is not.
        assert_eq!(attributes.withdrawals, Some(vec![]));
        assert_eq!(attributes.parent_beacon_block_root, None);

        assert_eq!(attributes.transactions.len(), 2);
        assert_eq!(attributes.transactions[0][0], 0x7E);
        assert_eq!(attributes.transactions[1], tx);
    }

    #[test]
    fn test_user_deposits_in_first_block_only() {
        let mut state = test_state(5, 1);
        state.update_l1_info(L1Info {
            user_deposits: vec![deposit(0), deposit(1)],
            ..l1_info(2)
        });
        for n in 3..=10 {
            state.update_l1_info(l1_info(n));
        }

        let mut stage = builder(state, vec![derived(6, vec![]), derived(7, vec![])]);
        let first = stage.next_attributes().unwrap().unwrap();
        assert_eq!(first.transactions.len(), 3);
        assert_eq!(first.transactions[1], TxDeposit::from(&deposit(0)).encoded_2718());
        assert_eq!(first.transactions[2], TxDeposit::from(&deposit(1)).encoded_2718());

        let second = stage.next_attributes().unwrap().unwrap();
        assert_eq!(second.transactions.len(), 1);
    }

    #[test]
    fn test_missing_l1_info_keeps_batch() {
        let mut stage = builder(test_state(5, 1), vec![derived(6, vec![])]);
        let err = stage.next_attributes().unwrap_err();
        assert_eq!(err, PipelineErrorKind::Temporary(PipelineError::MissingL1Info(l1_hash(2))));

        stage.state.update(|state| state.update_l1_info(l1_info(2)));
        let attributes = stage.next_attributes().unwrap().unwrap();
        assert_eq!(attributes.timestamp, 12);
        assert_eq!(attributes.seq_number, 0);
    }

    #[test]
    fn test_ecotone_fields() {
        let cfg = RollupConfig { ecotone_time: Some(0), ..test_config() };
        let mut stage = builder(test_state_with_config(cfg, 5, 10), vec![derived(6, vec![])]);
        let attributes = stage.next_attributes().unwrap().unwrap();
        assert_eq!(attributes.parent_beacon_block_root, Some(B256::ZERO));
        assert_eq!(attributes.transactions.len(), 1);
    }

    #[test]
    fn test_upgrade_transactions_at_activation() {
        let cfg = RollupConfig { ecotone_time: Some(12), ..test_config() };
        let batches = vec![derived(6, vec![]), derived(7, vec![])];
        let mut stage = builder(test_state_with_config(cfg, 5, 10), batches);
        let activation = stage.next_attributes().unwrap().unwrap();
        let upgrades = upgrade_transactions(&cfg, 12);
        assert!(!upgrades.is_empty());
        assert_eq!(activation.transactions.len(), 1 + upgrades.len());
        assert_eq!(activation.transactions[1..], upgrades[..]);

        let next = stage.next_attributes().unwrap().unwrap();
        assert_eq!(next.transactions.len(), 1);
    }

    #[test]
    fn test_purge_resets_sequence() {
        let mut stage = builder(test_state(5, 10), vec![derived(6, vec![]), derived(7, vec![])]);
        assert_eq!(stage.next_attributes().unwrap().unwrap().seq_number, 0);
        stage.purge();
        assert!(stage.prev.purged);
        assert_eq!(stage.epoch_hash, l1_hash(1));
        assert_eq!(stage.sequence_number, 2);
    }
}
