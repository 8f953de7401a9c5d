use community_treasury::{
    read_sheet_csv, DashboardConfig, PaymentStatus, PaymentTimeline, TreasuryProcessor,
    YearMonth,
};
use std::fs::File;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/data/iuran.csv".to_string());
    // The bundled sample is reconciled as of April 2024 unless a month is given.
    let today = match std::env::args().nth(2) {
        Some(as_of) => as_of.parse::<YearMonth>().map_err(anyhow::Error::msg)?,
        None => YearMonth::new(2024, 4).unwrap_or_else(YearMonth::current),
    };
    let config = match std::env::var("TREASURY_CONFIG") {
        Ok(config_path) => DashboardConfig::from_json_file(config_path)?,
        Err(_) => DashboardConfig::default(),
    };

    let rows = read_sheet_csv(File::open(&path)?)?;
    let report = TreasuryProcessor::new(config).monitor(&rows, today);

    println!(
        "{} - dues as of {} ({} residents)",
        report.organization_name,
        report.as_of,
        report.residents.len()
    );
    println!("{:<8} {:<20} {:>5} {:>7} {:>5}", "Unit", "Name", "Paid", "Unpaid", "%");
    for status in &report.residents {
        println!(
            "{:<8} {:<20} {:>5} {:>7} {:>4}%",
            status.resident.address(),
            status.resident.name,
            status.summary.paid,
            status.summary.unpaid,
            status.summary.percentage
        );
    }
    println!(
        "Overall: {}/{} periods paid ({}%), {} residents fully paid",
        report.overall.paid, report.overall.total, report.overall.percentage, report.fully_paid
    );

    if let Some(status) = report.in_arrears().first() {
        let timeline = PaymentTimeline::from_status(status);
        println!("\nTimeline for {}:", timeline.resident.name);
        for year in &timeline.years {
            let marks: Vec<String> = year
                .months
                .iter()
                .map(|e| {
                    let mark = match e.status {
                        PaymentStatus::Paid => "paid",
                        PaymentStatus::Unpaid => "UNPAID",
                        PaymentStatus::NotTracked => "-",
                        PaymentStatus::Upcoming => "upcoming",
                    };
                    format!("{}: {}", e.label, mark)
                })
                .collect();
            println!("  {} ({}%) {}", year.year, year.summary.percentage, marks.join(", "));
            for special in &year.specials {
                println!(
                    "  {} {}",
                    special.label,
                    if special.is_paid { "paid" } else { "not paid" }
                );
            }
        }
    }

    Ok(())
}
