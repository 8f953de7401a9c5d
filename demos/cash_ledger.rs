use community_treasury::{read_sheet_csv, transactions_from_rows, LedgerColumns, LedgerSummary};
use std::fs::File;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/data/kas.csv".to_string());
    let opening_balance: f64 = std::env::args()
        .nth(2)
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(0.0);

    let rows = read_sheet_csv(File::open(&path)?)?;
    let transactions = transactions_from_rows(&rows, &LedgerColumns::default());
    let ledger = LedgerSummary::build(&transactions, opening_balance);

    println!("Opening balance: {:>14.2}", ledger.opening_balance);
    println!("Total income:    {:>14.2}", ledger.total_income);
    println!("Total expense:   {:>14.2}", ledger.total_expense);
    println!("Closing balance: {:>14.2}", ledger.closing_balance);

    println!("\nMonthly cash flow:");
    for (month_end, flow) in &ledger.monthly {
        println!(
            "  {}  in {:>12.2}  out {:>12.2}  balance {:>12.2}",
            month_end.format("%Y-%m"),
            flow.income,
            flow.expense,
            flow.closing_balance
        );
    }

    println!("\nBy category:");
    for (category, total) in &ledger.by_category {
        println!(
            "  {:<14} in {:>12.2}  out {:>12.2}  ({} rows)",
            category, total.income, total.expense, total.count
        );
    }

    println!("\nLatest transactions:");
    for tx in ledger.recent(3) {
        println!("  {}  {:<28} {:>12.2}", tx.date, tx.description, tx.signed_amount());
    }

    Ok(())
}
