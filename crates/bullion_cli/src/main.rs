//! Command-line front end for the reconcile core.
//!
//! # Responsibility
//! - Run the notification feed and request summary pipelines over listing
//!   payloads captured from the backend.
//! - Print results as JSON for quick local checks.

use anyhow::{bail, Context, Result};
use bullion_core::{
    core_version, BuyRequestService, CoreConfig, InMemoryBuyRequestRepository,
    InMemoryNotificationRepository, NotificationService, RequestFilter, RequestStatus,
    RequestType, Viewer, ViewerRole,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Reconcile marketplace listings for one viewer
#[derive(Parser)]
#[command(name = "bullion", version, about, long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the notification feed a viewer would see
    Feed {
        /// Notification listing payload (JSON array)
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Print request tallies and the filtered request list
    Requests {
        /// Request listing payload (JSON array)
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        viewer: ViewerArgs,

        /// pending | accepted | declined
        #[arg(long)]
        status: Option<String>,

        /// buy | sell
        #[arg(long)]
        request_type: Option<String>,
    },

    /// Print the core version
    Version,
}

#[derive(Args)]
struct ViewerArgs {
    /// Viewer account id
    #[arg(long)]
    viewer_id: String,

    /// Secondary `_id` of the viewer
    #[arg(long)]
    viewer_doc_id: Option<String>,

    /// admin | seller | customer
    #[arg(long, default_value = "customer")]
    role: String,
}

impl ViewerArgs {
    fn to_viewer(&self) -> Viewer {
        let viewer = Viewer::new(self.viewer_id.clone(), ViewerRole::from(self.role.as_str()));
        match &self.viewer_doc_id {
            Some(doc_id) => viewer.with_doc_id(doc_id.clone()),
            None => viewer,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    config.init_logging()?;

    match cli.command {
        Commands::Feed { input, viewer } => run_feed(&config, &input, &viewer.to_viewer()),
        Commands::Requests {
            input,
            viewer,
            status,
            request_type,
        } => {
            let filter = RequestFilter {
                status: status.as_deref().map(parse_status).transpose()?,
                request_type: request_type.as_deref().map(parse_request_type).transpose()?,
            };
            run_requests(&input, &viewer.to_viewer(), &filter)
        }
        Commands::Version => {
            println!("bullion_core version={}", core_version());
            Ok(())
        }
    }
}

fn run_feed(config: &CoreConfig, input: &Path, viewer: &Viewer) -> Result<()> {
    let payload = read_payload(input)?;
    let mut service =
        NotificationService::with_config(InMemoryNotificationRepository::new(), config);
    let count = service.ingest_json(&payload)?;
    info!(
        "event=cli_feed module=cli status=ok ingested={} role={}",
        count,
        viewer.role.as_str()
    );

    let feed = service.feed_for(viewer);
    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}

fn run_requests(input: &Path, viewer: &Viewer, filter: &RequestFilter) -> Result<()> {
    let payload = read_payload(input)?;
    let mut service = BuyRequestService::new(InMemoryBuyRequestRepository::new());
    let report = service.ingest_json(&payload)?;
    for rejection in &report.rejected {
        eprintln!("skipped {rejection}");
    }

    let output = json!({
        "summary": service.summary_for(viewer),
        "requests": service.list_for(viewer, filter),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_payload(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_status(value: &str) -> Result<RequestStatus> {
    match RequestStatus::parse(value) {
        Some(status) => Ok(status),
        None => bail!("unknown status `{value}`; expected pending|accepted|declined"),
    }
}

fn parse_request_type(value: &str) -> Result<RequestType> {
    match RequestType::parse(value) {
        Some(request_type) => Ok(request_type),
        None => bail!("unknown request type `{value}`; expected buy|sell"),
    }
}
