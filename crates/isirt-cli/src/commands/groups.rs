use anyhow::Result;
use clap::Subcommand;
use isirt_schema::{GroupCreate, GroupUpdate};

use crate::context::AppContext;
use crate::output::{or_dash, render};

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List groups")]
    List,
    #[command(about = "Create a group")]
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(about = "Rename or describe a group")]
    Update {
        group_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(about = "Delete a group")]
    Delete { group_id: i64 },
}

pub async fn handle_group_command(ctx: &AppContext, cmd: GroupCommands) -> Result<()> {
    let client = ctx.client();
    match cmd {
        GroupCommands::List => {
            let groups = client.list_groups().await?;
            render(ctx.json, &groups, |groups| {
                for group in groups {
                    println!(
                        "{:<6} {:<24} {}",
                        group.id,
                        group.name,
                        or_dash(group.description.as_deref())
                    );
                }
            })?;
        }
        GroupCommands::Create { name, description } => {
            let group = client
                .create_group(&GroupCreate { name, description })
                .await?;
            println!("Created group {} ({}).", group.name, group.id);
        }
        GroupCommands::Update {
            group_id,
            name,
            description,
        } => {
            let group = client
                .update_group(group_id, &GroupUpdate { name, description })
                .await?;
            println!("Updated group {} ({}).", group.name, group.id);
        }
        GroupCommands::Delete { group_id } => {
            client.delete_group(group_id).await?;
            println!("Deleted group {group_id}.");
        }
    }
    Ok(())
}
