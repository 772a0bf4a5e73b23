// Finance Dashboard - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod buckets;
pub mod coerce;
pub mod config;
pub mod edits;
pub mod entities;
pub mod error;
pub mod health;
pub mod logging;
pub mod reconciliation;
pub mod session;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use buckets::{AssetBucket, Bucket, LiabilityBucket};
pub use config::AppConfig;
pub use entities::{
    default_financial_data, group_accounts, Account, AccountCategory, AccountGroup, AccountType,
    AssetItem, Assets, FinancialData, Liabilities, LiabilityItem, MonthlyFinances, Transaction,
    TransactionCategory,
};
pub use error::{FinanceError, Result, StoreError};
pub use health::{compute_indicators, compute_net_worth, HealthIndicators, HealthStatus, HealthStatuses};
pub use reconciliation::{apply_item_list_edit, merge, ItemListEdit};
pub use session::FinanceSession;
pub use store::{DocumentStore, SqliteDocumentStore};
pub use sync::{DocumentSnapshot, SnapshotEvent, Subscription};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
