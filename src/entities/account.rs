// 💳 Account Entity - Asset or liability account with a typed balance
//
// "Account type must agree with its category"
//
// - Asset types: Chequing, Savings, TFSA, RRSP, Investment, Real Estate, Vehicle, Cash
// - Liability types: Credit Card, Line of Credit, Mortgage, Car Loan, ...
// - `Other` is valid under both categories

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};

// ============================================================================
// ACCOUNT CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountCategory {
    Asset,
    Liability,
}

impl AccountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Asset => "Asset",
            AccountCategory::Liability => "Liability",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Asset" => Some(AccountCategory::Asset),
            "Liability" => Some(AccountCategory::Liability),
            _ => None,
        }
    }

    /// Account types selectable under this category, in display order.
    pub fn types(&self) -> &'static [AccountType] {
        match self {
            AccountCategory::Asset => ASSET_TYPES,
            AccountCategory::Liability => LIABILITY_TYPES,
        }
    }

    /// Type picked when a new account is created under this category.
    pub fn default_type(&self) -> AccountType {
        self.types()[0]
    }
}

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    // Asset types
    Chequing,
    Savings,
    #[serde(rename = "TFSA")]
    Tfsa,
    #[serde(rename = "RRSP")]
    Rrsp,
    Investment,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Vehicle,
    Cash,

    // Liability types
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Line of Credit")]
    LineOfCredit,
    Mortgage,
    #[serde(rename = "Car Loan")]
    CarLoan,
    #[serde(rename = "Student Loan")]
    StudentLoan,
    #[serde(rename = "Personal Loan")]
    PersonalLoan,
    #[serde(rename = "HELOC")]
    Heloc,

    /// Valid under both categories
    Other,
}

const ASSET_TYPES: &[AccountType] = &[
    AccountType::Chequing,
    AccountType::Savings,
    AccountType::Tfsa,
    AccountType::Rrsp,
    AccountType::Investment,
    AccountType::RealEstate,
    AccountType::Vehicle,
    AccountType::Cash,
    AccountType::Other,
];

const LIABILITY_TYPES: &[AccountType] = &[
    AccountType::CreditCard,
    AccountType::LineOfCredit,
    AccountType::Mortgage,
    AccountType::CarLoan,
    AccountType::StudentLoan,
    AccountType::PersonalLoan,
    AccountType::Heloc,
    AccountType::Other,
];

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Chequing => "Chequing",
            AccountType::Savings => "Savings",
            AccountType::Tfsa => "TFSA",
            AccountType::Rrsp => "RRSP",
            AccountType::Investment => "Investment",
            AccountType::RealEstate => "Real Estate",
            AccountType::Vehicle => "Vehicle",
            AccountType::Cash => "Cash",
            AccountType::CreditCard => "Credit Card",
            AccountType::LineOfCredit => "Line of Credit",
            AccountType::Mortgage => "Mortgage",
            AccountType::CarLoan => "Car Loan",
            AccountType::StudentLoan => "Student Loan",
            AccountType::PersonalLoan => "Personal Loan",
            AccountType::Heloc => "HELOC",
            AccountType::Other => "Other",
        }
    }

    /// Parse the wire name (e.g. "Real Estate", "HELOC")
    pub fn parse(s: &str) -> Option<Self> {
        ASSET_TYPES
            .iter()
            .chain(LIABILITY_TYPES.iter())
            .copied()
            .find(|t| t.as_str() == s)
    }

    pub fn is_valid_for(&self, category: AccountCategory) -> bool {
        category.types().contains(self)
    }

    /// Category a type implies when the stored record has none.
    /// Only liability-exclusive types imply Liability.
    pub fn implied_category(&self) -> AccountCategory {
        if *self != AccountType::Other && LIABILITY_TYPES.contains(self) {
            AccountCategory::Liability
        } else {
            AccountCategory::Asset
        }
    }
}

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// A named account holding a balance.
///
/// Identity: `id` (UUID string, unique within a user's data)
/// Values: everything else, replaced wholesale on edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub category: AccountCategory,
    pub balance: f64,
    pub last_modified: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Interest rate for liabilities, expected return for investments (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

impl Account {
    /// Create a fresh account with the category's default type and a new UUID
    pub fn new(name: impl Into<String>, category: AccountCategory, now: DateTime<Utc>) -> Self {
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            account_type: category.default_type(),
            category,
            balance: 0.0,
            last_modified: now,
            description: None,
            interest_rate: None,
            institution: None,
            account_number: None,
        }
    }

    /// Reject a type that does not belong to the account's category
    pub fn validate(&self) -> Result<()> {
        if self.account_type.is_valid_for(self.category) {
            Ok(())
        } else {
            Err(FinanceError::InvalidAccount(format!(
                "type '{}' is not valid for category '{}'",
                self.account_type.as_str(),
                self.category.as_str()
            )))
        }
    }
}

// ============================================================================
// ACCOUNT GROUPS (display grouping)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountGroup {
    BankAccounts,
    RegisteredAccounts,
    InvestmentAccounts,
    RealEstate,
    CreditCards,
    LinesOfCredit,
    Mortgages,
    VehicleLoans,
    StudentAndPersonalLoans,
}

impl AccountGroup {
    pub const ALL: [AccountGroup; 9] = [
        AccountGroup::BankAccounts,
        AccountGroup::RegisteredAccounts,
        AccountGroup::InvestmentAccounts,
        AccountGroup::RealEstate,
        AccountGroup::CreditCards,
        AccountGroup::LinesOfCredit,
        AccountGroup::Mortgages,
        AccountGroup::VehicleLoans,
        AccountGroup::StudentAndPersonalLoans,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AccountGroup::BankAccounts => "Bank Accounts",
            AccountGroup::RegisteredAccounts => "Registered Accounts",
            AccountGroup::InvestmentAccounts => "Investment Accounts",
            AccountGroup::RealEstate => "Real Estate",
            AccountGroup::CreditCards => "Credit Cards",
            AccountGroup::LinesOfCredit => "Lines of Credit & HELOCs",
            AccountGroup::Mortgages => "Mortgages",
            AccountGroup::VehicleLoans => "Vehicle Loans",
            AccountGroup::StudentAndPersonalLoans => "Student & Personal Loans",
        }
    }

    pub fn types(&self) -> &'static [AccountType] {
        match self {
            AccountGroup::BankAccounts => &[AccountType::Chequing, AccountType::Savings],
            AccountGroup::RegisteredAccounts => &[AccountType::Tfsa, AccountType::Rrsp],
            AccountGroup::InvestmentAccounts => &[AccountType::Investment],
            AccountGroup::RealEstate => &[AccountType::RealEstate],
            AccountGroup::CreditCards => &[AccountType::CreditCard],
            AccountGroup::LinesOfCredit => &[AccountType::LineOfCredit, AccountType::Heloc],
            AccountGroup::Mortgages => &[AccountType::Mortgage],
            AccountGroup::VehicleLoans => &[AccountType::CarLoan, AccountType::Vehicle],
            AccountGroup::StudentAndPersonalLoans => {
                &[AccountType::StudentLoan, AccountType::PersonalLoan]
            }
        }
    }

    /// `Cash` and `Other` accounts belong to no group
    pub fn for_type(account_type: AccountType) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|group| group.types().contains(&account_type))
    }
}

/// Group accounts for display. Empty groups are omitted; order follows `AccountGroup::ALL`.
pub fn group_accounts(accounts: &[Account]) -> Vec<(AccountGroup, Vec<&Account>)> {
    AccountGroup::ALL
        .iter()
        .filter_map(|group| {
            let members: Vec<&Account> = accounts
                .iter()
                .filter(|a| AccountGroup::for_type(a.account_type) == Some(*group))
                .collect();
            if members.is_empty() {
                None
            } else {
                Some((*group, members))
            }
        })
        .collect()
}
