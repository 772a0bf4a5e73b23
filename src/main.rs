use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use finance_dashboard::{
    edits, group_accounts, logging, Account, AccountCategory, AccountType, AppConfig, Bucket,
    FinanceSession, HealthStatus, SqliteDocumentStore, Transaction, TransactionCategory,
};

const USAGE: &str = "usage: finance-dashboard <command> <user> [args]

commands:
  summary             <user>
  set-monthly         <user> <income> <expenses>
  set-emergency       <user> <amount>
  set-total           <user> <asset|liability> <bucket> <amount>
  add-account         <user> <Asset|Liability> <name> <balance> [type]
  remove-account      <user> <account-id>
  add-transaction     <user> <account-id> <holder> <amount> <category>
  remove-transaction  <user> <transaction-id>
  watch               <user>";

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging.filter);

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!(USAGE);
    }

    let store = SqliteDocumentStore::open(&config.database.path)
        .with_context(|| format!("Failed to open store at {}", config.database.path.display()))?;
    let mut session = FinanceSession::open(Arc::new(store), args[2].as_str());
    if let Some(err) = session.last_error() {
        bail!("Failed to load data for {}: {err}", session.user_id());
    }

    match args[1].as_str() {
        "summary" => print_summary(&session),
        "set-monthly" => {
            let income = parse_amount(args.get(3), "income")?;
            let expenses = parse_amount(args.get(4), "expenses")?;
            let next = edits::set_monthly_finances(session.current_data(), income, expenses, Utc::now())?;
            session.save(next).context("Failed to save monthly finances")?;
            print_summary(&session);
        }
        "set-emergency" => {
            let amount = parse_amount(args.get(3), "amount")?;
            let next = edits::set_emergency_fund(session.current_data(), amount, Utc::now())?;
            session.save(next).context("Failed to save emergency fund")?;
            print_summary(&session);
        }
        "set-total" => {
            let bucket = Bucket::parse(arg(&args, 3, "category")?, arg(&args, 4, "bucket")?)?;
            let amount = parse_amount(args.get(5), "amount")?;
            let next = edits::set_bucket_total(session.current_data(), bucket, amount, Utc::now())?;
            session.save(next).context("Failed to save bucket total")?;
            print_summary(&session);
        }
        "add-account" => {
            let raw_category = arg(&args, 3, "category")?;
            let category = AccountCategory::parse(raw_category)
                .with_context(|| format!("unknown account category '{raw_category}'"))?;
            let mut account = Account::new(arg(&args, 4, "name")?, category, Utc::now());
            account.balance = parse_amount(args.get(5), "balance")?;
            if let Some(raw_type) = args.get(6) {
                account.account_type = AccountType::parse(raw_type)
                    .with_context(|| format!("unknown account type '{raw_type}'"))?;
            }

            println!("➕ Account {} ({})", account.id, account.account_type.as_str());
            let next = edits::upsert_account(session.current_data(), account, Utc::now())?;
            session.save(next).context("Failed to save account")?;
            print_summary(&session);
        }
        "remove-account" => {
            let next = edits::remove_account(session.current_data(), arg(&args, 3, "account-id")?, Utc::now())?;
            session.save(next).context("Failed to remove account")?;
            print_summary(&session);
        }
        "add-transaction" => {
            let account_id = arg(&args, 3, "account-id")?;
            if session.current_data().find_account(account_id).is_none() {
                bail!("no account with id '{account_id}'");
            }
            let holder = arg(&args, 4, "holder")?;
            let amount = parse_amount(args.get(5), "amount")?;
            let raw_category = arg(&args, 6, "category")?;
            let category = TransactionCategory::parse(raw_category)
                .with_context(|| format!("unknown transaction category '{raw_category}'"))?;

            let now = Utc::now();
            let tx = Transaction::new(account_id, holder, amount, category, now, now);
            println!("➕ Transaction {}", tx.id);
            let next = edits::upsert_transaction(session.current_data(), tx, now)?;
            session.save(next).context("Failed to save transaction")?;
        }
        "remove-transaction" => {
            let next = edits::remove_transaction(session.current_data(), arg(&args, 3, "transaction-id")?, Utc::now())?;
            session.save(next).context("Failed to remove transaction")?;
            println!("🗑️  Transaction removed");
        }
        "watch" => {
            print_summary(&session);
            println!("\nWatching for changes... (Ctrl+C to stop)");
            loop {
                if session.wait_for_update(Duration::from_secs(1)) {
                    println!();
                    print_summary(&session);
                }
            }
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }

    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing {name}\n{USAGE}"))
}

fn parse_amount(raw: Option<&String>, name: &str) -> Result<f64> {
    let raw = raw.with_context(|| format!("missing {name}\n{USAGE}"))?;
    let value: f64 = raw
        .parse()
        .with_context(|| format!("{name} must be a number, got '{raw}'"))?;
    if !value.is_finite() {
        bail!("{name} must be finite");
    }
    Ok(value)
}

fn status_marker(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "✅",
        HealthStatus::Warning => "⚠️ ",
        HealthStatus::Danger => "❌",
    }
}

fn print_summary(session: &FinanceSession) {
    let data = session.current_data();
    let indicators = session.compute_indicators();
    let statuses = indicators.statuses();

    println!("📊 Financial summary for {}", session.user_id());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Net worth:        ${:.2}", session.compute_net_worth());
    println!("Monthly income:   ${:.2}", data.monthly_finances.income);
    println!("Monthly expenses: ${:.2}", data.monthly_finances.expenses);
    println!(
        "{} Savings rate:        {:.1}%",
        status_marker(statuses.savings_rate),
        indicators.savings_rate
    );
    println!(
        "{} Debt-to-income:      {:.1}%",
        status_marker(statuses.debt_to_income_ratio),
        indicators.debt_to_income_ratio
    );
    println!(
        "{} Emergency fund:      {:.1}mo",
        status_marker(statuses.emergency_fund_health),
        indicators.emergency_fund_health
    );

    for (group, accounts) in group_accounts(&data.accounts) {
        println!("\n{}", group.title());
        for account in accounts {
            println!("  {:<30} ${:>12.2}", account.name, account.balance);
        }
    }

    println!("\nLast modified: {}", data.last_modified.to_rfc3339());
}
