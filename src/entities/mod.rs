// Entity Models
//
// FinancialData is the single root. Accounts and transactions are owned lists
// inside it; detail items are owned by their parent Assets/Liabilities.

pub mod account;
pub mod financial_data;
pub mod items;
pub mod transaction;

pub use account::{group_accounts, Account, AccountCategory, AccountGroup, AccountType};
pub use financial_data::{
    default_financial_data, ensure_finite, AssetDetails, Assets, FinancialData, Liabilities, LiabilityDetails,
    MonthlyFinances,
};
pub use items::{AssetItem, DetailItem, LiabilityItem};
pub use transaction::{Transaction, TransactionCategory};
