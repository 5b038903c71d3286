use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Subcommand, ValueEnum};
use dialoguer::Password;
use isirt_schema::{AccountStatus, UserCreate, UserExportFilters, UserProfile, UserRole, UserUpdate};

use crate::context::AppContext;
use crate::output::{render, write_blob};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl From<StatusFilter> for AccountStatus {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::Active => AccountStatus::Active,
            StatusFilter::Inactive => AccountStatus::Inactive,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List all users")]
    List,
    #[command(about = "Create a user")]
    Create {
        #[arg(help = "E-mail address, also the login name")]
        email: String,
        #[arg(long, help = "Full name")]
        full_name: String,
        #[arg(long, help = "Role, e.g. \"Miembro IRT\"")]
        role: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        group_id: Option<i64>,
        #[arg(long, help = "Prompt for an initial password")]
        with_password: bool,
    },
    #[command(about = "Change a user's role, name or group")]
    Update {
        user_id: i64,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        group_id: Option<i64>,
    },
    #[command(about = "Re-enable a deactivated account")]
    Activate { user_id: i64 },
    #[command(about = "Disable an account")]
    Deactivate {
        user_id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    #[command(about = "Delete a user")]
    Delete { user_id: i64 },
    #[command(about = "Download the user export file")]
    Export {
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, short, default_value = "users_export.csv")]
        output: PathBuf,
    },
    #[command(about = "Show a user's incidents and activity")]
    CrossReference { user_id: i64 },
}

fn parse_role(raw: Option<String>) -> Result<Option<UserRole>> {
    raw.map(|raw| UserRole::parse(&raw).ok_or_else(|| anyhow!("unknown role: {raw}")))
        .transpose()
}

pub async fn handle_user_command(ctx: &AppContext, cmd: UserCommands) -> Result<()> {
    let client = ctx.client();
    match cmd {
        UserCommands::List => {
            let users = client.list_users().await?;
            render(ctx.json, &users, |users| print_users(users))?;
        }
        UserCommands::Create {
            email,
            full_name,
            role,
            position,
            city,
            group_id,
            with_password,
        } => {
            let password = if with_password {
                Some(
                    Password::new()
                        .with_prompt("Initial password")
                        .with_confirmation("Repeat password", "Passwords do not match")
                        .interact()?,
                )
            } else {
                None
            };
            let user = UserCreate {
                email,
                full_name,
                role: parse_role(role)?,
                position,
                city,
                group_id,
                password,
            };
            let created = client.create_user(&user).await?;
            render(ctx.json, &created, |u| {
                println!("Created user {} ({}).", u.email, u.user_id)
            })?;
        }
        UserCommands::Update {
            user_id,
            role,
            full_name,
            group_id,
        } => {
            let update = UserUpdate {
                role: parse_role(role)?,
                full_name,
                group_id,
                ..Default::default()
            };
            let updated = client.update_user(user_id, &update).await?;
            render(ctx.json, &updated, |u| {
                println!("Updated {}: role {}, group {}.", u.email, u.role, group_label(u))
            })?;
        }
        UserCommands::Activate { user_id } => {
            let user = client.activate_user(user_id).await?;
            println!("Activated {}.", user.email);
        }
        UserCommands::Deactivate { user_id, reason } => {
            let user = client.deactivate_user(user_id, reason.as_deref()).await?;
            println!("Deactivated {}.", user.email);
        }
        UserCommands::Delete { user_id } => {
            client.delete_user(user_id).await?;
            println!("Deleted user {user_id}.");
        }
        UserCommands::Export {
            status,
            role,
            output,
        } => {
            let filters = UserExportFilters {
                status: status.map(AccountStatus::from),
                role,
            };
            let bytes = client.export_users(&filters).await?;
            write_blob(&output, &bytes)?;
        }
        UserCommands::CrossReference { user_id } => {
            let report = client.user_cross_reference(user_id).await?;
            render(ctx.json, &report, |report| {
                let m = &report.metrics;
                println!("{} <{}>", m.full_name, m.email);
                println!(
                    "created {} / assigned {} / resolved {} / comments {}",
                    m.total_incidents_created,
                    m.total_incidents_assigned,
                    m.total_incidents_resolved,
                    m.total_comments_made
                );
                for incident in &report.incidents {
                    println!(
                        "  #{:<6} {:<10} {:<12} {}",
                        incident.id, incident.relationship_type, incident.status, incident.title
                    );
                }
            })?;
        }
    }
    Ok(())
}

fn group_label(user: &UserProfile) -> &str {
    user.group.as_ref().map(|g| g.name.as_str()).unwrap_or("-")
}

fn print_users(users: &[UserProfile]) {
    println!(
        "{:<6} {:<32} {:<14} {:<8} {}",
        "ID", "EMAIL", "ROLE", "ACTIVE", "GROUP"
    );
    for user in users {
        println!(
            "{:<6} {:<32} {:<14} {:<8} {}",
            user.user_id,
            user.email,
            user.role,
            user.is_active,
            group_label(user)
        );
    }
    if users.is_empty() {
        println!("(no users)");
    }
}
