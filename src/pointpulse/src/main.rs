//! PointPulse CLI: decode scanned codes and links, generate payload tokens,
//! and preview the points a purchase will earn.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use pointpulse_core::config::AppConfig;
use pointpulse_core::payload::ActionPayload;
use pointpulse_core::promotion::Amount;
use pointpulse_loyalty::catalog::{active_promotions, automatic_only, one_time_only, parse_catalog};
use pointpulse_loyalty::{DraftEvent, PromotionEngine, PurchaseDraft};
use pointpulse_payload::PayloadCodec;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pointpulse")]
#[command(about = "PointPulse payload codec and points calculator")]
#[command(version)]
struct Cli {
    /// TOML config file (optional)
    #[arg(long, env = "POINTPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Purchase cents per base point (overrides config)
    #[arg(long)]
    cents_per_point: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode scanned text, a link or a token ("-" reads stdin)
    Decode { input: String },

    /// Encode a payload as a token, or as a link with --base-url
    Encode {
        #[arg(value_enum)]
        context: ContextArg,

        /// utorid for user/transfer, numeric id for redemption
        identifier: String,

        /// Page the link should open, e.g. https://pointpulse.example/transfer
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Preview the points for a purchase
    Points {
        /// Purchase amount in dollars
        #[arg(long)]
        amount: String,

        /// JSON file with the promotion listing
        #[arg(long)]
        promotions: PathBuf,

        /// Comma-separated one-time promotion ids to apply
        #[arg(long, value_delimiter = ',')]
        select: Vec<u64>,

        /// Customer utorid; when set, the purchase request body is printed too
        #[arg(long)]
        utorid: Option<String>,

        #[arg(long)]
        remark: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ContextArg {
    User,
    Transfer,
    Redemption,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pointpulse=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(cents) = cli.cents_per_point {
        config.points.cents_per_point = cents;
    }

    match cli.command {
        Commands::Decode { input } => decode(&config, input),
        Commands::Encode {
            context,
            identifier,
            base_url,
        } => encode(&config, context, &identifier, base_url.as_deref()),
        Commands::Points {
            amount,
            promotions,
            select,
            utorid,
            remark,
        } => points(
            &config,
            &amount,
            promotions,
            &select,
            utorid.as_deref(),
            remark.as_deref(),
        ),
    }
}

fn decode(config: &AppConfig, input: String) -> anyhow::Result<ExitCode> {
    let input = if input == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading stdin")?
    } else {
        input
    };

    let codec = PayloadCodec::new(&config.payload);
    let payload = codec.decode(&input);
    println!("{}", serde_json::to_string_pretty(&payload)?);

    if payload.is_actionable() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Input holds no recognizable payload");
        Ok(ExitCode::FAILURE)
    }
}

fn encode(
    config: &AppConfig,
    context: ContextArg,
    identifier: &str,
    base_url: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let payload = match context {
        ContextArg::User => ActionPayload::user_lookup(identifier),
        ContextArg::Transfer => ActionPayload::transfer(identifier),
        ContextArg::Redemption => {
            let id = identifier
                .trim()
                .parse::<u64>()
                .with_context(|| format!("redemption id must be a number, got {:?}", identifier))?;
            Some(ActionPayload::redemption(id))
        }
    }
    .ok_or_else(|| anyhow!("identifier must not be empty"))?;

    let codec = PayloadCodec::new(&config.payload);
    match base_url {
        Some(base) => println!("{}", codec.link(base, &payload)?),
        None => println!("{}", codec.encode(&payload)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn points(
    config: &AppConfig,
    amount: &str,
    promotions: PathBuf,
    select: &[u64],
    utorid: Option<&str>,
    remark: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let listing = std::fs::read_to_string(&promotions)
        .with_context(|| format!("reading {}", promotions.display()))?;
    let active = active_promotions(&parse_catalog(&listing)?, chrono::Utc::now());
    let one_time = one_time_only(&active);

    let engine = PromotionEngine::new(&config.points);
    let amount = Amount::parse_lossy(amount);
    if !amount.is_valid_purchase() {
        warn!(%amount, "Purchase amount is not positive");
    }

    let mut notices = Vec::new();
    let mut draft = PurchaseDraft::new(&engine, automatic_only(&active))
        .reduce(&engine, DraftEvent::AmountChanged(amount))
        .draft;
    for id in select {
        let Some(promotion) = one_time.iter().find(|p| p.id == *id) else {
            warn!(promotion_id = id, "Selected promotion is not an active one-time promotion");
            notices.push(format!("Promotion #{} is not available", id));
            continue;
        };
        let step = draft.reduce(&engine, DraftEvent::Toggled(promotion.clone()));
        if let Some(notice) = step.notice {
            notices.push(notice.to_string());
        }
        draft = step.draft;
    }

    let result = draft.points(&engine);
    info!(
        amount = %amount,
        promotions = draft.selection().len(),
        total = result.total,
        "Points preview computed"
    );

    let mut output = json!({
        "amount": amount.value().to_string(),
        "promotionIds": draft.selection().promotion_ids(),
        "points": result,
        "notices": notices,
    });
    if let Some(utorid) = utorid {
        output["request"] = serde_json::to_value(draft.to_request(utorid, remark))?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}
