use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use filing_rag::{
    teardown_stack, DataConfig, EdgarClient, FilingQuery, ManagedEndpointClient, RagConfig,
    SageMakerControl, SageMakerTransport,
};

#[derive(Parser)]
#[command(name = "filing-rag", about = "SEC filing downloads and hosted endpoint plumbing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download filings from EDGAR for every configured ticker.
    Download {
        #[arg(long, default_value = "configs/data.yaml")]
        config: PathBuf,
        /// Directory the filings are saved under
        #[arg(long, default_value = "data/raw")]
        out: PathBuf,
        /// Filing form to fetch
        #[arg(long, default_value = "10-K")]
        form: String,
    },
    /// Resolve tickers to their SEC registrant records.
    Lookup {
        #[arg(long, default_value = "configs/data.yaml")]
        config: PathBuf,
        /// Tickers to resolve; defaults to the configured list
        tickers: Vec<String>,
    },
    /// Send a batch of strings to the embedding endpoint and print the reply.
    Embed {
        #[arg(long, default_value = "configs/rag.yaml")]
        config: PathBuf,
        /// Overall budget for the invocation, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Strings to embed
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Delete the hosted endpoints, models, and endpoint configs.
    Teardown {
        #[arg(long, default_value = "configs/rag.yaml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Download { config, out, form } => download(config, out, form).await,
        Command::Lookup { config, tickers } => lookup(config, tickers).await,
        Command::Embed {
            config,
            timeout_secs,
            inputs,
        } => embed(config, timeout_secs, inputs).await,
        Command::Teardown { config } => teardown(config).await,
    }
}

async fn download(config: PathBuf, out: PathBuf, form: String) -> anyhow::Result<()> {
    let cfg = DataConfig::from_file(&config)?;
    let client = EdgarClient::new(&cfg.company, &cfg.email)?;
    let query = FilingQuery {
        limit: Some(cfg.amount),
        after: cfg.after,
        before: cfg.before,
        ..FilingQuery::default()
    };
    for ticker in &cfg.tickers {
        let saved = client.download_filings(ticker, &form, &query, &out).await?;
        info!(ticker = %ticker, count = saved.len(), "ticker done");
    }
    info!("finished downloading");
    Ok(())
}

async fn lookup(config: PathBuf, tickers: Vec<String>) -> anyhow::Result<()> {
    let cfg = DataConfig::from_file(&config)?;
    let client = EdgarClient::new(&cfg.company, &cfg.email)?;
    let tickers = if tickers.is_empty() {
        cfg.tickers
    } else {
        tickers
    };
    for ticker in &tickers {
        let company = client.company_for_ticker(ticker).await?;
        println!("{}\tCIK{:010}\t{}", company.ticker, company.cik, company.title);
    }
    Ok(())
}

async fn embed(
    config: PathBuf,
    timeout_secs: Option<u64>,
    inputs: Vec<String>,
) -> anyhow::Result<()> {
    let cfg = RagConfig::from_file(&config)?;
    let transport = SageMakerTransport::from_env().await;
    let mut client =
        ManagedEndpointClient::new(transport, &cfg.emb_endpoint_name, &cfg.llm_endpoint_name)?;
    if let Some(secs) = timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    let result = client.invoke_embedding(&inputs).await?;
    if let Some(count) = result.entry_count() {
        info!(entries = count, "embedding response decoded");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn teardown(config: PathBuf) -> anyhow::Result<()> {
    let cfg = RagConfig::from_file(&config)?;
    let control = SageMakerControl::from_env().await;
    teardown_stack(&control, &cfg).await?;
    Ok(())
}
