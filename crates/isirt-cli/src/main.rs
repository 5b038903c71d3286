use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod context;
mod output;

use commands::audit::{handle_audit_command, AuditCommands};
use commands::classification::{handle_classification_command, ClassificationCommands};
use commands::groups::{handle_group_command, GroupCommands};
use commands::incidents::{handle_incident_command, IncidentCommands};
use commands::session::GoogleCommands;
use commands::settings::{handle_settings_command, SettingsCommands};
use commands::users::{handle_user_command, UserCommands};
use context::AppContext;

#[derive(Parser)]
#[command(name = "isirt", version, about = "ISIRT incident response client")]
struct Cli {
    #[arg(
        long,
        default_value = "~/.isirt",
        help = "Config root directory (contains config/, logs/ and session.json)"
    )]
    config_root: PathBuf,

    #[arg(long, help = "Backend origin, overrides config and ISIRT_API_URL")]
    api_url: Option<String>,

    #[arg(long, global = true, help = "Print raw JSON instead of tables")]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in with e-mail and password")]
    Login {
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long, help = "Read the password from stdin instead of prompting")]
        password_stdin: bool,
    },
    #[command(about = "Sign out and forget the stored session")]
    Logout,
    #[command(about = "Show the signed-in user")]
    Whoami,
    #[command(subcommand, about = "Google sign-in")]
    Google(GoogleCommands),
    #[command(subcommand, about = "User administration")]
    Users(UserCommands),
    #[command(subcommand, about = "Group administration")]
    Groups(GroupCommands),
    #[command(subcommand, about = "Incident workflows")]
    Incidents(IncidentCommands),
    #[command(about = "Ask the AI for classification suggestions for a description")]
    Suggest { description: String },
    #[command(about = "Ask the reporting assistant a question")]
    Ask {
        prompt: String,
        #[arg(long, help = "Continue an earlier conversation")]
        conversation_id: Option<String>,
    },
    #[command(about = "Summarize an intake conversation stored as JSON turns")]
    Summarize { transcript: PathBuf },
    #[command(subcommand, about = "Classification lookup lists")]
    Classification(ClassificationCommands),
    #[command(subcommand, about = "AI and retrieval settings")]
    Settings(SettingsCommands),
    #[command(subcommand, about = "Audit trail")]
    Audit(AuditCommands),
}

impl Commands {
    /// Route this command stands for; 401 redirects are skipped on the login route.
    fn route(&self) -> &'static str {
        match self {
            Self::Login { .. } | Self::Google(_) => "/login",
            Self::Logout | Self::Whoami => "/",
            Self::Users(_) => "/users",
            Self::Groups(_) => "/groups",
            Self::Incidents(_) => "/incidents",
            Self::Suggest { .. } | Self::Summarize { .. } => "/report",
            Self::Ask { .. } => "/reporting",
            Self::Classification(_) => "/classification",
            Self::Settings(_) => "/settings",
            Self::Audit(_) => "/audit",
        }
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(path.strip_prefix("~").unwrap_or(&path)),
        None => path,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_root = expand_home(cli.config_root);

    let log_dir = config_root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "isirt.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let ctx = AppContext::build(&config_root, cli.api_url.as_deref(), command.route(), cli.json)?;
    let result = run(&ctx, command).await;
    ctx.finish()?;
    result
}

async fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            username,
            password_stdin,
        } => return commands::session::login(ctx, username, password_stdin).await,
        Commands::Logout => return commands::session::logout(ctx).await,
        Commands::Google(cmd) => return commands::session::google(ctx, cmd).await,
        _ => {}
    }

    let user = ctx.require_user().await?;
    match command {
        Commands::Whoami => commands::session::whoami(ctx, &user)?,
        Commands::Users(cmd) => handle_user_command(ctx, cmd).await?,
        Commands::Groups(cmd) => handle_group_command(ctx, cmd).await?,
        Commands::Incidents(cmd) => handle_incident_command(ctx, cmd).await?,
        Commands::Suggest { description } => commands::intake::suggest(ctx, &description).await?,
        Commands::Ask {
            prompt,
            conversation_id,
        } => commands::intake::ask(ctx, &prompt, conversation_id).await?,
        Commands::Summarize { transcript } => {
            commands::intake::summarize(ctx, &transcript).await?
        }
        Commands::Classification(cmd) => handle_classification_command(ctx, cmd).await?,
        Commands::Settings(cmd) => handle_settings_command(ctx, cmd).await?,
        Commands::Audit(cmd) => handle_audit_command(ctx, cmd).await?,
        Commands::Login { .. } | Commands::Logout | Commands::Google(_) => {}
    }
    Ok(())
}
