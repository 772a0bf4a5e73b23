// 🩺 Health Indicators - Derived ratios, computed fresh, never stored
//
//   savings rate        = (income - expenses) / income * 100
//   debt-to-income      = (mortgage + otherDebts) / income * 100
//   emergency fund      = emergencyFund / expenses   (months of runway)
//
// A zero or negative denominator yields exactly 0 for that indicator.

use serde::{Deserialize, Serialize};

use crate::buckets::{AssetBucket, LiabilityBucket};
use crate::entities::FinancialData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicators {
    pub savings_rate: f64,
    pub debt_to_income_ratio: f64,
    pub emergency_fund_health: f64,
}

pub fn compute_indicators(data: &FinancialData) -> HealthIndicators {
    let income = data.monthly_finances.income;
    let expenses = data.monthly_finances.expenses;
    let debt = data.liabilities.mortgage + data.liabilities.other_debts;

    HealthIndicators {
        savings_rate: guarded_ratio(income - expenses, income, 100.0),
        debt_to_income_ratio: guarded_ratio(debt, income, 100.0),
        emergency_fund_health: guarded_ratio(data.emergency_fund, expenses, 1.0),
    }
}

/// `numerator / denominator * scale`, or 0 when the denominator is not
/// positive or the scaled result is not finite
fn guarded_ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator > 0.0 {
        let ratio = numerator / denominator * scale;
        if ratio.is_finite() {
            ratio
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Sum of asset summary fields minus sum of liability summary fields.
///
/// Detail item lists are ignored; a summary that was not kept in sync with
/// its items is taken as-is.
pub fn compute_net_worth(data: &FinancialData) -> f64 {
    let total_assets: f64 = AssetBucket::ALL
        .iter()
        .map(|bucket| bucket.summary(&data.assets))
        .sum();
    let total_liabilities: f64 = LiabilityBucket::ALL
        .iter()
        .map(|bucket| bucket.summary(&data.liabilities))
        .sum();

    total_assets - total_liabilities
}

// ============================================================================
// HEALTH STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Danger,
}

/// Warning/danger cut-offs for one indicator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub danger: f64,
    pub higher_is_better: bool,
}

impl Thresholds {
    pub const SAVINGS_RATE: Thresholds = Thresholds { warning: 20.0, danger: 10.0, higher_is_better: true };
    pub const DEBT_TO_INCOME: Thresholds = Thresholds { warning: 30.0, danger: 40.0, higher_is_better: false };
    pub const EMERGENCY_FUND: Thresholds = Thresholds { warning: 6.0, danger: 3.0, higher_is_better: true };

    pub fn classify(&self, value: f64) -> HealthStatus {
        if self.higher_is_better {
            if value >= self.warning {
                HealthStatus::Healthy
            } else if value >= self.danger {
                HealthStatus::Warning
            } else {
                HealthStatus::Danger
            }
        } else if value <= self.warning {
            HealthStatus::Healthy
        } else if value <= self.danger {
            HealthStatus::Warning
        } else {
            HealthStatus::Danger
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatuses {
    pub savings_rate: HealthStatus,
    pub debt_to_income_ratio: HealthStatus,
    pub emergency_fund_health: HealthStatus,
}

impl HealthIndicators {
    pub fn statuses(&self) -> HealthStatuses {
        HealthStatuses {
            savings_rate: Thresholds::SAVINGS_RATE.classify(self.savings_rate),
            debt_to_income_ratio: Thresholds::DEBT_TO_INCOME.classify(self.debt_to_income_ratio),
            emergency_fund_health: Thresholds::EMERGENCY_FUND.classify(self.emergency_fund_health),
        }
    }
}
