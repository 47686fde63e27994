//! This module contains each stage of the derivation pipeline. Every stage pulls from the stage
//! before it, so a request for attributes flows from the last stage back to the first.
//!
//! **Stages:**
//! 1. Batcher Transactions
//! 2. Channel Assembler (Frame Grouping & Decompression)
//! 3. Batch Validator (Batch Decoding & Validation)
//! 4. Attributes Builder

mod batcher_transactions;
pub use batcher_transactions::{BatcherTransaction, BatcherTransactionSender, BatcherTransactions};

mod channel_assembler;
pub use channel_assembler::{ChannelAssembler, FrameProvider};

mod batch_validator;
pub use batch_validator::{BatchValidator, ChannelProvider, DerivedBatch};

mod attributes_builder;
pub use attributes_builder::{AttributesBuilder, BatchProvider};

pub mod compression;
