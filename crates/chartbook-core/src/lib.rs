//! Chart of accounts: account forest, balances and the display adapter

pub mod balance;
pub mod chart;
pub mod error;
pub mod forest;
pub mod models;
pub mod seed;
pub mod store;
pub mod types;
pub mod view;

pub use balance::{BalanceResolver, SignedBalance};
pub use chart::{AddState, ChartView, DisplayRow};
pub use error::CoreError;
pub use error::CoreResult;
pub use error::ErrorSeverity;
pub use forest::{AccountId, Forest};
pub use models::{Account, AccountBalance, AccountRecord, BalanceMap};
pub use store::{AccountStore, ChartSnapshot, FileStore, KeyValueStore, MemoryStore};
pub use types::{AccountKind, RootType};
pub use view::{flatten, FlatAccount, ViewState};
