use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    controller::votes::parse_vote, describe_failure, Dashboard, ElectorForm, FailureContext,
    FileStore, GatewayError, Gateways, KeyValueStore, PanelStatus, Session, Shell, Tab, View,
};
use shared::domain::{CandidateId, ElectorId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

const SIGNED_OUT: &str = "not signed in; run `evoting-admin login` first";

#[derive(Parser, Debug)]
#[command(name = "evoting-admin", version, about = "Administration console for the e-voting backends")]
struct Cli {
    #[arg(long, global = true)]
    registry_url: Option<String>,
    #[arg(long, global = true)]
    ledger_url: Option<String>,
    #[arg(long, global = true)]
    tally_url: Option<String>,
    #[arg(long, global = true)]
    session_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Status,
    /// Stats header and one panel.
    Dashboard {
        #[arg(long, default_value_t = Tab::Electors)]
        tab: Tab,
    },
    Electors {
        #[command(subcommand)]
        action: ElectorsCommand,
    },
    Votes {
        #[command(subcommand)]
        action: VotesCommand,
    },
    Results {
        #[command(subcommand)]
        action: ResultsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ElectorsCommand {
    List,
    Show {
        id: i64,
    },
    Find {
        identifier: String,
    },
    Create {
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        first_name: String,
        /// YYYY-MM-DD or an ISO-8601 timestamp.
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        identifier: String,
    },
}

#[derive(Subcommand, Debug)]
enum VotesCommand {
    List,
    /// Electors who had not voted when the panel loaded.
    Eligible,
    ByCandidate {
        candidate_id: i64,
    },
    Submit {
        #[arg(long)]
        elector: String,
        #[arg(long)]
        candidate: String,
    },
}

#[derive(Subcommand, Debug)]
enum ResultsCommand {
    Show,
    Publish,
    Calculate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = config::load_settings()?;
    if let Some(v) = cli.registry_url {
        settings.registry_url = v;
    }
    if let Some(v) = cli.ledger_url {
        settings.ledger_url = v;
    }
    if let Some(v) = cli.tally_url {
        settings.tally_url = v;
    }
    if let Some(v) = cli.session_path {
        settings.session_path = v;
    }
    let settings = settings.validated()?;
    debug!(
        registry = %settings.registry_url,
        ledger = %settings.ledger_url,
        tally = %settings.tally_url,
        session = %settings.session_path.display(),
        "settings resolved"
    );

    let session = Session::init(FileStore::open(&settings.session_path));
    let gateways =
        Gateways::http(&settings.endpoints()).context("failed to build backend clients")?;
    let mut shell = Shell::new(session, gateways);

    run(&mut shell, cli.command).await
}

async fn run<S: KeyValueStore>(shell: &mut Shell<S>, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            if !shell.login(&username, &password)? {
                bail!("incorrect credentials");
            }
            println!("Signed in as super admin.");
        }
        Command::Logout => {
            shell.logout()?;
            println!("Signed out.");
        }
        Command::Status => match shell.view() {
            View::Login => println!("Signed out."),
            View::Dashboard(_) => println!("Signed in as super admin."),
        },
        Command::Dashboard { tab } => {
            let dashboard = open_dashboard(shell, tab).await?;
            println!("{}\n", render::stats_header(dashboard.stats()));
            print!("{}", render::panel(dashboard.panel()));
            ensure_ready(dashboard.panel().status())?;
        }
        Command::Electors { action } => electors(shell, action).await?,
        Command::Votes { action } => votes(shell, action).await?,
        Command::Results { action } => results(shell, action).await?,
    }
    Ok(())
}

async fn electors<S: KeyValueStore>(shell: &mut Shell<S>, action: ElectorsCommand) -> Result<()> {
    match action {
        ElectorsCommand::List => {
            let dashboard = open_dashboard(shell, Tab::Electors).await?;
            print!("{}", render::panel(dashboard.panel()));
            ensure_ready(dashboard.panel().status())
        }
        ElectorsCommand::Show { id } => {
            let gateways = gateways(shell)?;
            let elector = gateways
                .registry
                .get_elector(ElectorId(id))
                .await
                .map_err(|err| anyhow!(describe_failure(FailureContext::LoadElectors, &err)))?;
            println!("{}", render::elector_line(&elector));
            Ok(())
        }
        ElectorsCommand::Find { identifier } => {
            let gateways = gateways(shell)?;
            let elector = gateways
                .registry
                .find_by_identifier(&identifier)
                .await
                .map_err(|err| anyhow!(describe_failure(FailureContext::LoadElectors, &err)))?;
            println!("{}", render::elector_line(&elector));
            Ok(())
        }
        ElectorsCommand::Create {
            last_name,
            first_name,
            birth_date,
            identifier,
        } => {
            let form = ElectorForm {
                last_name,
                first_name,
                date_of_birth: birth_date,
                secure_identifier: identifier,
            };
            ensure_signed_in(shell)?;
            form.validate().map_err(|err| rejected(FailureContext::CreateElector, err.into()))?;
            let dashboard = open_dashboard(shell, Tab::Electors).await?;
            let panel = dashboard
                .electors_mut()
                .ok_or_else(|| anyhow!("electors panel is not active"))?;
            let Some(created) = panel.create_elector(&form).await else {
                return ensure_ready(panel.status());
            };
            println!("Registered elector #{} ({}).", created.id, created.display_name());
            dashboard.refresh_stats_if_notified().await;
            println!("{}", render::stats_header(dashboard.stats()));
            Ok(())
        }
    }
}

async fn votes<S: KeyValueStore>(shell: &mut Shell<S>, action: VotesCommand) -> Result<()> {
    match action {
        VotesCommand::List => {
            let dashboard = open_dashboard(shell, Tab::Votes).await?;
            print!("{}", render::panel(dashboard.panel()));
            ensure_ready(dashboard.panel().status())
        }
        VotesCommand::Eligible => {
            let dashboard = open_dashboard(shell, Tab::Votes).await?;
            let panel = dashboard
                .votes_mut()
                .ok_or_else(|| anyhow!("votes panel is not active"))?;
            ensure_ready(panel.status())?;
            print!("{}", render::eligible_electors(panel));
            Ok(())
        }
        VotesCommand::ByCandidate { candidate_id } => {
            let gateways = gateways(shell)?;
            let votes = gateways
                .ledger
                .votes_for_candidate(CandidateId(candidate_id))
                .await
                .map_err(|err| anyhow!(describe_failure(FailureContext::LoadVotes, &err)))?;
            if votes.is_empty() {
                println!("No votes for candidate {candidate_id}.");
            }
            for vote in &votes {
                let name = vote
                    .elector_name
                    .clone()
                    .unwrap_or_else(|| format!("ID: {}", vote.elector_id));
                println!("{}", render::vote_line(vote, &name));
            }
            Ok(())
        }
        VotesCommand::Submit { elector, candidate } => {
            ensure_signed_in(shell)?;
            parse_vote(&elector, &candidate)
                .map_err(|err| rejected(FailureContext::SubmitVote, err.into()))?;
            let dashboard = open_dashboard(shell, Tab::Votes).await?;
            let panel = dashboard
                .votes_mut()
                .ok_or_else(|| anyhow!("votes panel is not active"))?;
            let Some(vote) = panel.submit_vote(&elector, &candidate).await else {
                return ensure_ready(panel.status());
            };
            println!(
                "Recorded vote #{} for candidate {}.",
                vote.id, vote.candidate_id
            );
            dashboard.refresh_stats_if_notified().await;
            println!("{}", render::stats_header(dashboard.stats()));
            Ok(())
        }
    }
}

async fn results<S: KeyValueStore>(shell: &mut Shell<S>, action: ResultsCommand) -> Result<()> {
    match action {
        ResultsCommand::Show => {
            let dashboard = open_dashboard(shell, Tab::Results).await?;
            print!("{}", render::panel(dashboard.panel()));
            ensure_ready(dashboard.panel().status())
        }
        ResultsCommand::Publish => {
            let dashboard = open_dashboard(shell, Tab::Results).await?;
            let panel = dashboard
                .results_mut()
                .ok_or_else(|| anyhow!("results panel is not active"))?;
            if !panel.publish().await {
                return ensure_ready(panel.status());
            }
            println!("Results published.");
            print!("{}", render::results_panel(panel));
            dashboard.refresh_stats_if_notified().await;
            println!("{}", render::stats_header(dashboard.stats()));
            Ok(())
        }
        ResultsCommand::Calculate => {
            let gateways = gateways(shell)?;
            gateways
                .tally
                .calculate()
                .await
                .map_err(|err| anyhow!(describe_failure(FailureContext::LoadResults, &err)))?;
            println!("Results recalculated.");
            Ok(())
        }
    }
}

async fn open_dashboard<S: KeyValueStore>(
    shell: &mut Shell<S>,
    tab: Tab,
) -> Result<&mut Dashboard> {
    shell.open_dashboard(tab).await.ok_or_else(|| anyhow!(SIGNED_OUT))
}

fn ensure_signed_in<S: KeyValueStore>(shell: &Shell<S>) -> Result<()> {
    if !shell.session().is_authenticated() {
        bail!(SIGNED_OUT);
    }
    Ok(())
}

/// Input that fails local checks never reaches a backend.
fn rejected(context: FailureContext, err: GatewayError) -> anyhow::Error {
    anyhow!(describe_failure(context, &err))
}

fn gateways<S: KeyValueStore>(shell: &Shell<S>) -> Result<Gateways> {
    shell.gateways().cloned().ok_or_else(|| anyhow!(SIGNED_OUT))
}

/// Turns an error banner into a non-zero exit.
fn ensure_ready(status: &PanelStatus) -> Result<()> {
    match status.error() {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
