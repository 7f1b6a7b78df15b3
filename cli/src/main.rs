//! evote: command-line front end for an election ledger.

mod render;

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use evote_client::{ClaimOutcome, ClientConfig, ConnectOutcome, RoleDecision, Session, TxOutcome};
use evote_contract::{LedgerCall, RpcConnector, StaticWallet};
use evote_types::{Identity, Ordinal, Role};
use evote_utils::LogFormat;

#[derive(Parser)]
#[command(name = "evote", about = "Run and inspect an on-chain election")]
struct Cli {
    /// Ledger gateway URL.
    #[arg(long, env = "EVOTE_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Wallet account the gateway signs for.
    #[arg(long, env = "EVOTE_IDENTITY")]
    identity: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "EVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "EVOTE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Upper bound on indexed candidate reads.
    #[arg(long, env = "EVOTE_MAX_CANDIDATE_PROBE")]
    max_candidate_probe: Option<u32>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "EVOTE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show the connected account and election state.
    Status,
    /// Check whether the account may enter as admin or voter.
    Enter {
        /// "admin" or "voter".
        role: Role,
    },
    /// Claim the administrator role while nobody holds it.
    Claim,
    /// Register a voter (admin).
    RegisterVoter { address: Identity },
    /// Add a candidate before voting starts (admin).
    AddCandidate { address: Identity },
    /// Start voting (admin).
    Start,
    /// End voting (admin).
    End,
    /// Toggle whether votes are hidden until the end (admin).
    ToggleHide,
    /// Cast a vote for the candidate at `ordinal` (voter).
    Vote { ordinal: Ordinal },
    /// Show the vote log, newest first.
    History,
    /// Show the tally and the winner.
    Results,
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let base = match cli.config {
        Some(ref path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok(ClientConfig {
        gateway_url: cli.gateway_url.clone().unwrap_or(base.gateway_url),
        identity: cli.identity.clone().or(base.identity),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.unwrap_or(base.log_format),
        max_candidate_probe: cli.max_candidate_probe.unwrap_or(base.max_candidate_probe),
        ..base
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    evote_utils::init_logging(config.log_format, &config.log_level);
    tracing::debug!(gateway = %config.gateway_url, "configuration loaded");

    let identity = config
        .identity
        .as_deref()
        .map(Identity::new)
        .transpose()
        .context("invalid identity")?;
    let wallet = Arc::new(StaticWallet::new(identity));
    let connector = Arc::new(
        RpcConnector::new(config.gateway_url.clone())
            .with_timeouts(config.request_timeout(), config.connect_timeout()),
    );
    let mut session = Session::new(wallet, connector, &config);

    match session.connect_wallet().await {
        ConnectOutcome::Connected { identity, access } => {
            tracing::info!(%identity, ?access, "connected");
        }
        ConnectOutcome::Cancelled => bail!("wallet connection cancelled"),
        ConnectOutcome::Failed(message) => {
            bail!("{message} (is --identity set and the gateway at {} reachable?)", config.gateway_url)
        }
    }

    match cli.command {
        Command::Status => render::status(&session),
        Command::Enter { role } => {
            let decision = session.enter(role).await;
            println!("{}", decision.message());
            if !decision.is_granted() && decision != RoleDecision::OfferClaim {
                bail!("entry as {role} refused");
            }
        }
        Command::Claim => {
            let outcome = session.claim_administrator().await?;
            let notice = outcome.notice().unwrap_or_default().to_owned();
            match outcome {
                ClaimOutcome::Submitted(TxOutcome::Confirmed { receipt, .. }) => {
                    println!("{notice}");
                    println!("  tx {}", receipt.tx_hash);
                }
                ClaimOutcome::Submitted(TxOutcome::Failed(message)) => {
                    tracing::warn!(reason = %message.text, "claim failed");
                    bail!("{notice}");
                }
                ClaimOutcome::Submitted(TxOutcome::Busy) => {
                    bail!("another transaction is in progress")
                }
                ClaimOutcome::NotOffered(_) => bail!("{notice}"),
            }
        }
        Command::RegisterVoter { address } => {
            admin_call(&mut session, LedgerCall::RegisterVoter(address)).await?
        }
        Command::AddCandidate { address } => {
            admin_call(&mut session, LedgerCall::AddCandidate(address)).await?
        }
        Command::Start => admin_call(&mut session, LedgerCall::StartSession).await?,
        Command::End => admin_call(&mut session, LedgerCall::EndSession).await?,
        Command::ToggleHide => admin_call(&mut session, LedgerCall::ToggleHideVotes).await?,
        Command::Vote { ordinal } => {
            enter_as(&mut session, Role::Voter).await?;
            let outcome = session.submit(LedgerCall::CastVote(ordinal)).await?;
            report(outcome)?;
        }
        Command::History => render::history(session.snapshot()),
        Command::Results => render::results(session.snapshot()),
    }

    Ok(())
}

async fn enter_as(session: &mut Session, role: Role) -> anyhow::Result<()> {
    let decision = session.enter(role).await;
    if !decision.is_granted() {
        bail!("{}", decision.message());
    }
    Ok(())
}

async fn admin_call(session: &mut Session, call: LedgerCall) -> anyhow::Result<()> {
    enter_as(session, Role::Administrator).await?;
    let outcome = session.submit(call).await?;
    report(outcome)
}

fn report(outcome: TxOutcome) -> anyhow::Result<()> {
    match outcome {
        TxOutcome::Confirmed { receipt, report } => {
            println!("{}", evote_client::SUCCESS_NOTICE);
            println!("  tx {}", receipt.tx_hash);
            if !report.is_complete() {
                tracing::warn!(degraded = ?report.degraded, "state refreshed with stale values");
            }
            Ok(())
        }
        TxOutcome::Failed(message) => bail!("{message}"),
        TxOutcome::Busy => bail!("another transaction is in progress"),
    }
}
