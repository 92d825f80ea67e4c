use thiserror::Error;

use crate::Weight;

/// Everything that can go wrong while building or boosting a lottery.
///
/// All of these mean the configuration is mathematically invalid; none are
/// transient, so callers fix the input rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotteryError {
    #[error("invalid ratio: {0}")]
    InvalidRatio(String),

    #[error("category {category} has no items")]
    EmptyCategory { category: &'static str },

    #[error("boost factor {factor} is infeasible for category {category}")]
    RateOverflow {
        category: &'static str,
        factor: Weight,
    },

    #[error("cannot boost base category {category}: it absorbs the compensation")]
    BaseCategoryBoost { category: &'static str },

    #[error("integer overflow in exact ratio arithmetic")]
    Overflow,

    #[error("cannot sample from an empty box")]
    EmptyBox,

    #[error("box would hold {len} entries, limit is {limit}")]
    BoxTooLarge { len: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, LotteryError>;

impl LotteryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        LotteryError::InvalidRatio(msg.into())
    }
}
