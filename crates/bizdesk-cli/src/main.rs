#![forbid(unsafe_code)]

mod account;
mod cmd;
mod output;

use bizdesk_core::ErrorCode;
use bizdesk_core::config::{self, UserConfig};
use clap::{CommandFactory, Parser, Subcommand};
use cmd::{AccountFlags, Workspace};
use output::{CliError, OutputMode, render_error};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bz: owner-scoped business dashboard records",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for bizdesk crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Account the records belong to (skips env and config resolution).
    #[arg(long, global = true)]
    account: Option<String>,

    /// Email of the acting user.
    #[arg(long, global = true)]
    email: Option<String>,

    /// Suppress log output below errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn account_flags(&self) -> AccountFlags<'_> {
        AccountFlags {
            account: self.account.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Workspace",
        about = "Initialize a bizdesk workspace",
        long_about = "Create .bizdesk/ with a default config and an empty record store.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    bz init\n\n    # Rewrite the config, keeping records\n    bz init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Support",
        about = "Manage support tickets",
        long_about = "Open, list, answer, and close customer support tickets.",
        after_help = "EXAMPLES:\n    # Open a ticket\n    bz ticket create --title \"Cannot log in\" --customer Casey\n\n    # Open tickets only\n    bz ticket list --status open\n\n    # Reply, then resolve\n    bz ticket reply tkt-abc \"Reset link sent\"\n    bz ticket status tkt-abc resolved\n\n    # Emit machine-readable output\n    bz ticket show tkt-abc --json"
    )]
    Ticket {
        #[command(subcommand)]
        command: cmd::ticket::TicketCommand,
    },

    #[command(
        next_help_heading = "HR",
        about = "Manage the employee roster",
        long_about = "Add, list, and remove employees.",
        after_help = "EXAMPLES:\n    # Add an employee\n    bz employee add --name \"Dana Reyes\" --email dana@acme.test --salary 85000\n\n    # Search by department\n    bz employee list --search engineering"
    )]
    Employee {
        #[command(subcommand)]
        command: cmd::employee::EmployeeCommand,
    },

    #[command(
        next_help_heading = "Marketing",
        about = "Manage marketing campaigns",
        long_about = "Draft campaigns and move them through their lifecycle.",
        after_help = "EXAMPLES:\n    # Draft an email campaign\n    bz campaign create --name \"Spring launch\" --type email --subject \"It's here\"\n\n    # Activate it\n    bz campaign status cmp-abc active"
    )]
    Campaign {
        #[command(subcommand)]
        command: cmd::campaign::CampaignCommand,
    },

    #[command(
        next_help_heading = "Chat",
        about = "Team chat channels",
        long_about = "Create channels, post messages, and read channel history.",
        after_help = "EXAMPLES:\n    # Create a channel\n    bz channel create general\n\n    # Post and read\n    bz channel post chn-abc \"Standup in 5\"\n    bz channel show chn-abc"
    )]
    Channel {
        #[command(subcommand)]
        command: cmd::channel::ChannelCommand,
    },

    #[command(
        next_help_heading = "Read",
        about = "Dashboard summary",
        long_about = "Headline counts for support, HR, projects, and marketing.",
        after_help = "EXAMPLES:\n    # Today's dashboard\n    bz stats\n\n    # As of a given day\n    bz stats --date 2024-03-01 --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Workspace",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    bz completions bash > ~/.local/share/bash-completion/completions/bz"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("BIZDESK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "bz=debug,bizdesk_core=debug,info"
        } else {
            "bz=info,bizdesk_core=info,warn"
        })
    });

    let format = env::var("BIZDESK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load the user config; a malformed file is reported as E1002.
fn user_config(json: bool) -> anyhow::Result<UserConfig> {
    match config::load_user_config() {
        Ok(user) => Ok(user),
        Err(err) => {
            let mode = if json { OutputMode::Json } else { OutputMode::Text };
            render_error(mode, &CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")))?;
            Err(err)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let user = user_config(cli.json)?;
    let output = OutputMode::resolve(cli.json, user.output.as_deref());
    debug!(?output, root = %project_root.display(), "starting");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &project_root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
        Commands::Ticket { command } => {
            let workspace = Workspace::open(&project_root, cli.account_flags(), &user, output)?;
            cmd::ticket::run_ticket(command, &workspace, output).await
        }
        Commands::Employee { command } => {
            let workspace = Workspace::open(&project_root, cli.account_flags(), &user, output)?;
            cmd::employee::run_employee(command, &workspace, output).await
        }
        Commands::Campaign { command } => {
            let workspace = Workspace::open(&project_root, cli.account_flags(), &user, output)?;
            cmd::campaign::run_campaign(command, &workspace, output).await
        }
        Commands::Channel { command } => {
            let workspace = Workspace::open(&project_root, cli.account_flags(), &user, output)?;
            cmd::channel::run_channel(command, &workspace, output).await
        }
        Commands::Stats(args) => {
            let workspace = Workspace::open(&project_root, cli.account_flags(), &user, output)?;
            cmd::stats::run_stats(args, &workspace, output).await
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["bz", "ticket", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Ticket {
                command: cmd::ticket::TicketCommand::List(_)
            }
        ));
    }

    #[test]
    fn account_flag_is_global() {
        let cli = Cli::parse_from(["bz", "--account", "acme", "stats", "--email", "ops@acme.test"]);
        let flags = cli.account_flags();
        assert_eq!(flags.account, Some("acme"));
        assert_eq!(flags.email, Some("ops@acme.test"));
    }

    #[test]
    fn ticket_create_requires_title() {
        let result = Cli::try_parse_from(["bz", "ticket", "create"]);
        assert!(result.is_err());
    }

    #[test]
    fn ticket_status_takes_id_and_status() {
        let cli = Cli::parse_from(["bz", "ticket", "status", "tkt-1", "in_progress"]);
        match cli.command {
            Commands::Ticket {
                command: cmd::ticket::TicketCommand::Status(args),
            } => {
                assert_eq!(args.id, "tkt-1");
                assert_eq!(args.status, "in_progress");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn stats_date_parses() {
        let cli = Cli::parse_from(["bz", "stats", "--date", "2024-03-01"]);
        match cli.command {
            Commands::Stats(args) => {
                assert_eq!(args.date.map(|d| d.to_string()).as_deref(), Some("2024-03-01"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn channel_list_takes_no_arguments() {
        let cli = Cli::parse_from(["bz", "channel", "list"]);
        assert!(matches!(
            cli.command,
            Commands::Channel {
                command: cmd::channel::ChannelCommand::List
            }
        ));
    }
}
