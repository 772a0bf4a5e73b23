// 📊 FinancialData - Root snapshot of one user's financial state
//
// Every field is always present and finite. Stored documents may be partial;
// the reconciler fills the gaps from `FinancialData::empty`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};

use super::account::Account;
use super::items::{AssetItem, LiabilityItem};
use super::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFinances {
    pub income: f64,
    pub expenses: f64,
}

// ============================================================================
// ASSETS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub cash_items: Vec<AssetItem>,
    pub investment_items: Vec<AssetItem>,
    pub property_items: Vec<AssetItem>,
    pub other_items: Vec<AssetItem>,
}

/// Summary numbers plus itemized details.
///
/// Summary fields are NOT re-derived from `details` except through
/// `reconciliation::apply_item_list_edit`; the two can diverge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub cash: f64,
    pub investments: f64,
    pub property: f64,
    pub other: f64,
    pub details: AssetDetails,
}

// ============================================================================
// LIABILITIES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityDetails {
    pub mortgage_items: Vec<LiabilityItem>,
    pub debt_items: Vec<LiabilityItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liabilities {
    pub mortgage: f64,
    pub other_debts: f64,
    pub details: LiabilityDetails,
}

// ============================================================================
// ROOT AGGREGATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    pub monthly_finances: MonthlyFinances,
    pub assets: Assets,
    pub liabilities: Liabilities,
    pub emergency_fund: f64,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub last_modified: DateTime<Utc>,
}

impl FinancialData {
    /// Canonical default value: all zeros, empty lists, stamped `now`.
    ///
    /// Each call returns a fresh, fully owned value; there is no shared default.
    pub fn empty(now: DateTime<Utc>) -> Self {
        FinancialData {
            monthly_finances: MonthlyFinances::default(),
            assets: Assets::default(),
            liabilities: Liabilities::default(),
            emergency_fund: 0.0,
            accounts: Vec::new(),
            transactions: Vec::new(),
            last_modified: now,
        }
    }

    pub fn find_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn find_transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Reject a snapshot holding any NaN or infinite number.
    ///
    /// JSON has no encoding for them, so they would be stored as null and
    /// come back as 0 on the next read.
    pub fn check_amounts(&self) -> Result<()> {
        let mf = &self.monthly_finances;
        let a = &self.assets;
        let l = &self.liabilities;

        let scalars = [
            ("monthlyFinances.income", mf.income),
            ("monthlyFinances.expenses", mf.expenses),
            ("assets.cash", a.cash),
            ("assets.investments", a.investments),
            ("assets.property", a.property),
            ("assets.other", a.other),
            ("liabilities.mortgage", l.mortgage),
            ("liabilities.otherDebts", l.other_debts),
            ("emergencyFund", self.emergency_fund),
        ];
        for (field, value) in scalars {
            ensure_finite(field, value)?;
        }

        let asset_items = a
            .details
            .cash_items
            .iter()
            .chain(&a.details.investment_items)
            .chain(&a.details.property_items)
            .chain(&a.details.other_items);
        for item in asset_items {
            ensure_finite(&format!("asset item {}", item.id), item.amount)?;
        }

        for item in l.details.mortgage_items.iter().chain(&l.details.debt_items) {
            ensure_finite(&format!("liability item {}", item.id), item.amount)?;
            if let Some(rate) = item.interest_rate {
                ensure_finite(&format!("liability item {} rate", item.id), rate)?;
            }
        }

        for account in &self.accounts {
            ensure_finite(&format!("account {}", account.id), account.balance)?;
            if let Some(rate) = account.interest_rate {
                ensure_finite(&format!("account {} rate", account.id), rate)?;
            }
        }

        for tx in &self.transactions {
            ensure_finite(&format!("transaction {}", tx.id), tx.amount)?;
        }

        Ok(())
    }
}

/// `Validation` error unless `value` is a finite number
pub fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FinanceError::Validation(format!("{field} must be a finite number, got {value}")))
    }
}

/// Fresh default snapshot stamped with the current time
pub fn default_financial_data() -> FinancialData {
    FinancialData::empty(Utc::now())
}
