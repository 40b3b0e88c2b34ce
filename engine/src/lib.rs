//! Group-formation engine for the Saath-Saath collective-buying platform.
//!
//! An incoming vendor order triggers one synchronous pipeline: find nearby
//! vendors, find compatible pending orders, project the bulk savings, and
//! either commit a [`saath_common::group::BuyingGroup`] or fall back to
//! individual processing. All durability lives behind the [`store::MarketStore`]
//! seam; the engine itself is pure computation over fetched data.

pub mod cache;
pub mod error;
pub mod formation;
pub mod matching;
pub mod route;
pub mod savings;
pub mod store;

pub use error::{ClaimError, StoreError};
pub use formation::{FormationConfig, FormationOutcome, GroupFormationEngine, IndividualReason};
pub use store::{MarketStore, MemoryStore};
