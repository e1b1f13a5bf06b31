pub mod db;
pub mod marketdb;
pub mod userdb;

#[cfg(test)]
pub mod memorydb;

use std::fmt::Debug;

use self::{marketdb::MarketExt, userdb::UserExt};

/// Everything the workflow services need from persistence.
pub trait MarketStore: UserExt + MarketExt + Debug + Send + Sync {}

impl<T> MarketStore for T where T: UserExt + MarketExt + Debug + Send + Sync {}
