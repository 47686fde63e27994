#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod attributes;
pub mod block;
pub mod block_info;
pub mod deposits;
pub mod genesis;
pub mod rollup_config;
pub mod system_config;
pub mod upgrades;

/// The prelude exports common types and traits.
pub mod prelude {
    pub use crate::{
        attributes::PayloadAttributes,
        block::{BlockId, BlockInfo, Epoch, L1BlockInfo},
        block_info::{L1BlockInfoBedrock, L1BlockInfoEcotone, L1BlockInfoError, L1BlockInfoTx},
        deposits::{
            DepositError, DepositSourceDomain, L1InfoDepositSource, TxDeposit,
            UpgradeDepositSource, UserDepositSource, UserDeposited, DEPOSIT_EVENT_ABI_HASH,
        },
        genesis::Genesis,
        rollup_config::RollupConfig,
        system_config::{SystemAccounts, SystemConfig},
    };
}
