use anyhow::Result;
use clap::Subcommand;
use isirt_schema::AuditLogFilters;

use crate::context::AppContext;
use crate::output::render;

#[derive(Subcommand)]
pub enum AuditCommands {
    #[command(about = "Search the audit trail")]
    Logs {
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long, default_value = "50")]
        limit: u32,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long, help = "Action name, e.g. LOGIN or UPDATE_INCIDENT")]
        action: Option<String>,
        #[arg(long, help = "Resource type, e.g. INCIDENT or USER")]
        resource_type: Option<String>,
        #[arg(long, help = "ISO date (inclusive)")]
        start_date: Option<String>,
        #[arg(long, help = "ISO date (inclusive)")]
        end_date: Option<String>,
    },
}

pub async fn handle_audit_command(ctx: &AppContext, cmd: AuditCommands) -> Result<()> {
    match cmd {
        AuditCommands::Logs {
            skip,
            limit,
            user_id,
            action,
            resource_type,
            start_date,
            end_date,
        } => {
            let filters = AuditLogFilters {
                skip,
                limit: Some(limit),
                user_id,
                action,
                resource_type,
                start_date,
                end_date,
            };
            let page = ctx.client().audit_logs(&filters).await?;
            render(ctx.json, &page, |page| {
                println!("{} matching entries", page.total);
                for log in &page.logs {
                    let resource = log
                        .resource_id
                        .map(|id| format!("{}#{id}", log.resource_type))
                        .unwrap_or_else(|| log.resource_type.clone());
                    println!(
                        "{}  user {:<5} {:<24} {:<16} {}",
                        log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        log.user_id,
                        log.action,
                        resource,
                        if log.success { "ok" } else { "FAILED" }
                    );
                }
            })?;
        }
    }
    Ok(())
}
