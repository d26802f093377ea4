#![deny(clippy::all)]

pub mod clock;
pub mod domain;
pub mod ports;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{ExpiryPolicy, ResultRecord, StoreConfig, StoredResult};
pub use ports::{ResultStore, StorageFactory};
