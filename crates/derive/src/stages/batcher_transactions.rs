//! This module contains the [BatcherTransactions] stage, the entry point of the pipeline.

use super::FrameProvider;
use crate::{
    errors::PipelineResult,
    frame::{Frame, FrameDecoder},
    traits::PurgeableStage,
};
use alloy_primitives::Bytes;
use std::{
    collections::VecDeque,
    sync::mpsc::{self, Receiver, SendError, Sender},
};
use tracing::{trace, warn};

/// The payload of a batcher transaction and the L1 block that included it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatcherTransaction {
    /// The transaction calldata: a version byte followed by frames.
    pub data: Bytes,
    /// The number of the L1 block that included the transaction.
    pub l1_origin: u64,
}

impl BatcherTransaction {
    /// Creates a new [BatcherTransaction].
    pub const fn new(data: Bytes, l1_origin: u64) -> Self {
        Self { data, l1_origin }
    }

    /// Decodes the frames of the transaction.
    ///
    /// Frames preceding a malformed one are kept. The malformed frame and everything after it is
    /// logged and discarded.
    pub fn frames(&self) -> Vec<Frame> {
        let decoder = match FrameDecoder::new(&self.data, self.l1_origin) {
            Ok(decoder) => decoder,
            Err(e) => {
                warn!(target: "frame-decoder", "Dropping batcher transaction: {e}");
                return Vec::new();
            }
        };

        let mut frames = Vec::new();
        for frame in decoder {
            match frame {
                Ok(frame) => frames.push(frame),
                Err(e) => warn!(
                    target: "frame-decoder",
                    "Dropping malformed frame from L1 block {}: {e}",
                    self.l1_origin
                ),
            }
        }
        frames
    }
}

/// A cloneable handle feeding batcher transactions into a pipeline.
#[derive(Debug, Clone)]
pub struct BatcherTransactionSender(Sender<BatcherTransaction>);

impl BatcherTransactionSender {
    /// Queues a batcher transaction. Fails only if the pipeline was dropped.
    pub fn send(&self, tx: BatcherTransaction) -> Result<(), SendError<BatcherTransaction>> {
        self.0.send(tx)
    }
}

/// The [BatcherTransactions] stage drains batcher transactions sent by any number of producers and
/// splits each into its frames.
#[derive(Debug)]
pub struct BatcherTransactions {
    /// The consumer side of the ingestion queue.
    receiver: Receiver<BatcherTransaction>,
    /// Transactions received but not yet decoded.
    txs: VecDeque<BatcherTransaction>,
}

impl BatcherTransactions {
    /// Creates the stage and the sender feeding it.
    pub fn channel() -> (BatcherTransactionSender, Self) {
        let (sender, receiver) = mpsc::channel();
        (BatcherTransactionSender(sender), Self::new(receiver))
    }

    /// Creates the stage on an existing receiver.
    pub fn new(receiver: Receiver<BatcherTransaction>) -> Self {
        Self { receiver, txs: VecDeque::new() }
    }
}

impl FrameProvider for BatcherTransactions {
    fn next_frames(&mut self) -> PipelineResult<Option<Vec<Frame>>> {
        self.txs.extend(self.receiver.try_iter());
        let Some(tx) = self.txs.pop_front() else {
            return Ok(None);
        };
        let frames = tx.frames();
        trace!(
            target: "batcher-transactions",
            "Decoded {} frames from L1 block {}",
            frames.len(),
            tx.l1_origin
        );
        Ok(Some(frames))
    }
}

impl PurgeableStage for BatcherTransactions {
    fn purge(&mut self) {
        self.receiver.try_iter().for_each(drop);
        self.txs.clear();
    }
}
