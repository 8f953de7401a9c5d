use community_treasury::sheets::SheetsClient;
use community_treasury::{DashboardConfig, YearMonth};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let spreadsheet_id = std::env::var("TREASURY_SHEET_ID")
        .map_err(|_| anyhow::anyhow!("TREASURY_SHEET_ID must be set (in env or .env)"))?;
    let config = match std::env::var("TREASURY_CONFIG") {
        Ok(path) => DashboardConfig::from_json_file(path)?,
        Err(_) => DashboardConfig::default(),
    };

    let client = SheetsClient::new(spreadsheet_id);
    let dashboard = client.fetch_dashboard(&config, YearMonth::current()).await?;

    println!("{}", dashboard.to_json()?);
    Ok(())
}
