use saath_common::order::OrderId;
use thiserror::Error;

/// Transient failure talking to the backing document store.
///
/// The formation pipeline never propagates these: a failed lookup degrades to
/// an empty result set and the order proceeds individually.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Failure to claim a set of orders for a forming group.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Another group already claimed this order (lost the optimistic lock).
    #[error("order {0:?} is no longer pending")]
    AlreadyClaimed(OrderId),
    #[error("order {0:?} not found")]
    UnknownOrder(OrderId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
