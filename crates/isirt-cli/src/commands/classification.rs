use anyhow::Result;
use clap::Subcommand;
use isirt_schema::ClassificationCatalog;

use crate::context::AppContext;
use crate::output::render;

#[derive(Subcommand)]
pub enum ClassificationCommands {
    #[command(about = "List asset types")]
    AssetTypes,
    #[command(about = "List assets")]
    Assets {
        #[arg(long)]
        asset_type_id: Option<i64>,
    },
    #[command(about = "List incident categories")]
    Categories,
    #[command(about = "List incident types (category 1 unless given)")]
    Types {
        #[arg(long)]
        category_id: Option<i64>,
    },
    #[command(about = "List attack vectors")]
    AttackVectors,
    #[command(about = "Load every lookup list at once")]
    All,
}

pub async fn handle_classification_command(ctx: &AppContext, cmd: ClassificationCommands) -> Result<()> {
    let client = ctx.client();
    match cmd {
        ClassificationCommands::AssetTypes => {
            let items = client.asset_types().await?;
            render(ctx.json, &items, |items| {
                for t in items {
                    println!("{:<6} {}", t.asset_type_id, t.name);
                }
            })?;
        }
        ClassificationCommands::Assets { asset_type_id } => {
            let items = client.assets(asset_type_id).await?;
            render(ctx.json, &items, |items| {
                for a in items {
                    println!("{:<6} {:<28} type {}", a.asset_id, a.name, a.asset_type_id);
                }
            })?;
        }
        ClassificationCommands::Categories => {
            let items = client.incident_categories().await?;
            render(ctx.json, &items, |items| {
                for c in items {
                    println!("{:<6} {}", c.incident_category_id, c.name);
                }
            })?;
        }
        ClassificationCommands::Types { category_id } => {
            let items = client.incident_types(category_id).await?;
            render(ctx.json, &items, |items| {
                for t in items {
                    println!("{:<6} {}", t.incident_type_id, t.name);
                }
            })?;
        }
        ClassificationCommands::AttackVectors => {
            let items = client.attack_vectors().await?;
            render(ctx.json, &items, |items| {
                for v in items {
                    println!("{:<6} {}", v.attack_vector_id, v.name);
                }
            })?;
        }
        ClassificationCommands::All => {
            let catalog = client.classification_catalog().await?;
            render(ctx.json, &catalog, print_summary)?;
        }
    }
    Ok(())
}

fn print_summary(catalog: &ClassificationCatalog) {
    println!("asset types:    {}", catalog.asset_types.len());
    println!("assets:         {}", catalog.assets.len());
    println!("categories:     {}", catalog.categories.len());
    println!("attack vectors: {}", catalog.attack_vectors.len());
}
