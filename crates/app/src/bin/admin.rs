// Bouquet admin dashboard: review the approval queue from a terminal

use std::io::Write;

use bouquet_app::{confirmed, Services};
use bouquet_auth::Actor;
use bouquet_common::config::Config;
use bouquet_invitations::{ActionOutcome, DashboardAction};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "bouquet-admin", version, about = "Review invitation approval requests")]
struct Cli {
    /// Administrator acting in this session
    #[arg(long, env = "BOUQUET_ADMIN_ID")]
    admin_id: Uuid,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List pending approval requests, oldest first
    Queue,
    /// Approve an invitation
    Approve { slug: String },
    /// Send an invitation back to its owner
    Reject { slug: String },
    /// Delete an invitation
    Delete { slug: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.rust_log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let services = Services::from_config(&config).await.map_err(|e| {
        error!("Failed to start services: {}", e);
        e
    })?;
    let actor = Actor::admin(cli.admin_id);
    info!(admin_id = %actor.id, "Admin session started");

    let (action, slug) = match cli.command {
        Command::Queue => return print_queue(&services, &actor).await,
        Command::Approve { slug } => (DashboardAction::Approve, slug),
        Command::Reject { slug } => (DashboardAction::Reject, slug),
        Command::Delete { slug } => (DashboardAction::Delete, slug),
    };

    let invitation = services
        .workflow
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No invitation with slug {slug}"))?;

    let coordinator = services.coordinator(actor);
    let proposal = coordinator.invoke(action, invitation);

    if proposal.is_info_only() {
        println!("{}", proposal.prompt);
        coordinator.confirm().await?;
        return Ok(());
    }

    if !cli.yes && !ask(&proposal.prompt).await? {
        coordinator.dismiss();
        println!("Nothing changed.");
        return Ok(());
    }

    match coordinator.confirm().await? {
        ActionOutcome::Completed(Some(record)) => println!(
            "{}: approved={} requesting_approval={}",
            record.slug, record.is_approved, record.is_requesting_approval
        ),
        ActionOutcome::Completed(None) => println!("{slug} deleted."),
        ActionOutcome::Blocked(reason) => println!("{}", reason.explanation()),
        ActionOutcome::Dismissed | ActionOutcome::ProfileRequired => println!("Nothing changed."),
    }
    Ok(())
}

async fn print_queue(services: &Services, actor: &Actor) -> anyhow::Result<()> {
    let queue = services.workflow.queue(actor).await?;
    if queue.is_empty() {
        println!("No pending approval requests.");
        return Ok(());
    }

    for entry in queue {
        println!(
            "{}  {:<32}  {:<20}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.invitation_slug,
            entry.requester_name,
            entry.requester_phone
        );
    }
    Ok(())
}

async fn ask(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(confirmed(&answer))
}
