// Terminal console for the affiliate dashboard API

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use affiliate_api::{
    ApiClient, ClientConfig, LoginFlow, LoginStep, Notice, NoticeKind, OtpOutcome, PhoneOutcome,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "affiliate", about = "Console for the affiliate dashboard API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with a phone number and OTP
    Login,
    /// Clear the stored session
    Logout,
    /// List invoices for a mobile number
    Invoices { mobile: String },
    /// Download an invoice document
    Download {
        invoice_id: String,
        /// Output file (defaults to <invoice_id>.pdf)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Review affiliate KYC submissions (admin)
    #[command(subcommand)]
    Kyc(KycCommand),
}

#[derive(Subcommand)]
enum KycCommand {
    /// Show an affiliate's KYC record
    Show { affiliate_id: String },
    /// Approve a pending submission
    Approve { affiliate_id: String },
    /// Reject a pending submission
    Reject { affiliate_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,affiliate_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let sessions = SessionStore::open(&config.session_file);
    let client =
        ApiClient::new(&config, sessions.clone()).context("Failed to create API client")?;

    match cli.command {
        Command::Login => login(client).await,
        Command::Logout => {
            sessions.clear().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Invoices { mobile } => invoices(client, &mobile).await,
        Command::Download { invoice_id, out } => download(client, &invoice_id, out).await,
        Command::Kyc(cmd) => kyc(client, cmd).await,
    }
}

/// Interactive two-step login driving the flow until authenticated.
async fn login(client: ApiClient) -> Result<()> {
    let mut flow = LoginFlow::new(client);

    loop {
        match flow.step() {
            LoginStep::Phone => {
                let mobile = prompt("Phone number: ")?;
                match flow.submit_phone(&mobile).await {
                    PhoneOutcome::CodeSent(notice) => println!("{}", notice.title),
                    PhoneOutcome::Denied(notice) => print_notice(&notice),
                }
            }
            LoginStep::Otp => {
                let otp = prompt("6-digit OTP (blank to go back): ")?;
                if otp.is_empty() {
                    flow.go_back();
                    continue;
                }
                match flow.submit_otp(&otp).await {
                    OtpOutcome::Authenticated { notice, .. } => {
                        println!("{}", notice.title);
                        return Ok(());
                    }
                    OtpOutcome::Denied(notice) => print_notice(&notice),
                }
            }
        }
    }
}

async fn invoices(client: ApiClient, mobile: &str) -> Result<()> {
    let invoices = client
        .invoices(mobile)
        .await
        .context("Failed to fetch invoices")?;

    if invoices.is_empty() {
        println!("No invoices.");
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:>12}  {:<10} {}",
        "ID", "DATE", "AMOUNT", "STATUS", "REFERENCE"
    );
    for inv in invoices {
        println!(
            "{:<12} {:<12} {:>12}  {:<10} {}",
            inv.id,
            inv.date,
            inv.amount,
            inv.status,
            inv.reference_number.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn download(client: ApiClient, invoice_id: &str, out: Option<PathBuf>) -> Result<()> {
    let bytes = client
        .download_invoice(invoice_id)
        .await
        .context("Failed to download invoice")?;

    let path = out.unwrap_or_else(|| PathBuf::from(format!("{invoice_id}.pdf")));
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

async fn kyc(client: ApiClient, cmd: KycCommand) -> Result<()> {
    match cmd {
        KycCommand::Show { affiliate_id } => {
            let kyc = client
                .affiliate_kyc(&affiliate_id)
                .await
                .context("Failed to fetch KYC record")?;
            let d = &kyc.details;
            println!("Status:         {:?}", kyc.kyc_status);
            println!("ID:             {} ({})", d.id_value, d.id_type);
            println!("Account:        {} ({})", d.account_number, d.account_type);
            println!("IFSC:           {}", d.ifsc);
            println!("Account holder: {}", d.account_name);
            println!("Bank:           {}", d.bank_name);
            Ok(())
        }
        KycCommand::Approve { affiliate_id } => review(client, &affiliate_id, true).await,
        KycCommand::Reject { affiliate_id } => review(client, &affiliate_id, false).await,
    }
}

async fn review(client: ApiClient, affiliate_id: &str, approve: bool) -> Result<()> {
    let kyc = client
        .affiliate_kyc(affiliate_id)
        .await
        .context("Failed to fetch KYC record")?;
    if !kyc.is_reviewable() {
        bail!(
            "KYC for {} is not pending review (status: {:?})",
            affiliate_id,
            kyc.kyc_status
        );
    }

    let envelope = client
        .review_kyc(affiliate_id, approve)
        .await
        .context("Failed to submit KYC review")?;

    if envelope.msg.is_empty() {
        println!("{}", if approve { "KYC approved" } else { "KYC rejected" });
    } else {
        println!("{}", envelope.msg);
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn print_notice(notice: &Notice) {
    match (notice.kind, &notice.detail) {
        (NoticeKind::Info, _) => println!("{}", notice.title),
        (_, Some(detail)) => eprintln!("{}: {}", notice.title, detail),
        (_, None) => eprintln!("{}", notice.title),
    }
}
