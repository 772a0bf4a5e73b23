// ✏️ Edit Helpers - Pure transformations behind the dashboard's editing flows
//
// Each takes the current snapshot and returns a new one; the input is never
// mutated. Edits stamp `last_modified` on the touched record and on the root.
// Non-finite amounts are rejected with `FinanceError::Validation`.

use chrono::{DateTime, Utc};

use crate::buckets::Bucket;
use crate::entities::{ensure_finite, Account, FinancialData, Transaction};
use crate::error::{FinanceError, Result};

/// Add an account, or replace the one with the same id
pub fn upsert_account(data: &FinancialData, mut account: Account, now: DateTime<Utc>) -> Result<FinancialData> {
    account.validate()?;
    ensure_finite("balance", account.balance)?;
    if let Some(rate) = account.interest_rate {
        ensure_finite("interestRate", rate)?;
    }
    account.last_modified = now;

    let mut next = data.clone();
    match next.accounts.iter_mut().find(|a| a.id == account.id) {
        Some(existing) => *existing = account,
        None => next.accounts.push(account),
    }
    next.last_modified = now;
    Ok(next)
}

pub fn remove_account(data: &FinancialData, id: &str, now: DateTime<Utc>) -> Result<FinancialData> {
    if data.find_account(id).is_none() {
        return Err(FinanceError::NotFound(format!("account {id}")));
    }

    let mut next = data.clone();
    next.accounts.retain(|a| a.id != id);
    next.last_modified = now;
    Ok(next)
}

/// Add a transaction, or replace the one with the same id
pub fn upsert_transaction(data: &FinancialData, mut tx: Transaction, now: DateTime<Utc>) -> Result<FinancialData> {
    ensure_finite("amount", tx.amount)?;
    tx.last_modified = now;

    let mut next = data.clone();
    match next.transactions.iter_mut().find(|t| t.id == tx.id) {
        Some(existing) => *existing = tx,
        None => next.transactions.push(tx),
    }
    next.last_modified = now;
    Ok(next)
}

pub fn remove_transaction(data: &FinancialData, id: &str, now: DateTime<Utc>) -> Result<FinancialData> {
    if data.find_transaction(id).is_none() {
        return Err(FinanceError::NotFound(format!("transaction {id}")));
    }

    let mut next = data.clone();
    next.transactions.retain(|t| t.id != id);
    next.last_modified = now;
    Ok(next)
}

pub fn set_monthly_finances(data: &FinancialData, income: f64, expenses: f64, now: DateTime<Utc>) -> Result<FinancialData> {
    ensure_finite("income", income)?;
    ensure_finite("expenses", expenses)?;

    let mut next = data.clone();
    next.monthly_finances.income = income;
    next.monthly_finances.expenses = expenses;
    next.last_modified = now;
    Ok(next)
}

pub fn set_emergency_fund(data: &FinancialData, amount: f64, now: DateTime<Utc>) -> Result<FinancialData> {
    ensure_finite("emergencyFund", amount)?;

    let mut next = data.clone();
    next.emergency_fund = amount;
    next.last_modified = now;
    Ok(next)
}

/// Overwrite a bucket's summary number directly.
///
/// The bucket's detail list is left as it was, so the two may disagree
/// until the next item-list edit.
pub fn set_bucket_total(data: &FinancialData, bucket: Bucket, amount: f64, now: DateTime<Utc>) -> Result<FinancialData> {
    ensure_finite(bucket.keys().summary, amount)?;

    let mut next = data.clone();
    match bucket {
        Bucket::Asset(b) => *b.summary_mut(&mut next.assets) = amount,
        Bucket::Liability(b) => *b.summary_mut(&mut next.liabilities) = amount,
    }
    next.last_modified = now;
    Ok(next)
}
