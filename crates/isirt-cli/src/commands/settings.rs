use anyhow::Result;
use clap::Subcommand;
use isirt_schema::{AiSettingsUpdate, KnowledgeFlag, RagSettingsUpdate};

use crate::context::AppContext;
use crate::output::{print_json, render};

#[derive(Subcommand)]
pub enum SettingsCommands {
    #[command(about = "Show AI model settings")]
    Ai,
    #[command(about = "Switch the AI provider and model")]
    SetModel { provider: String, model: String },
    #[command(about = "Show retrieval (RAG) settings")]
    Rag,
    #[command(about = "Change retrieval chunking")]
    SetRag {
        #[arg(long)]
        chunk_size: Option<u32>,
        #[arg(long)]
        chunk_overlap: Option<u32>,
    },
    #[command(about = "List models the backend can use")]
    Models {
        #[arg(long)]
        provider: Option<String>,
    },
    #[command(about = "Rebuild the knowledge index")]
    ReloadRag,
    #[command(about = "Flag a knowledge chunk for review")]
    FlagChunk {
        source_name: String,
        chunk_id: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

pub async fn handle_settings_command(ctx: &AppContext, cmd: SettingsCommands) -> Result<()> {
    let client = ctx.client();
    match cmd {
        SettingsCommands::Ai => {
            let settings = client.ai_settings().await?;
            render(ctx.json, &settings, |s| {
                println!("provider: {}", s.model_provider);
                println!("model:    {}", s.model_name);
                for (key, value) in &s.parameters {
                    println!("{key}: {value}");
                }
            })?;
        }
        SettingsCommands::SetModel { provider, model } => {
            let update = AiSettingsUpdate {
                model_provider: Some(provider),
                model_name: Some(model),
                ..Default::default()
            };
            let saved = client.save_ai_settings(&update).await?;
            println!("Now using {} / {}.", saved.model_provider, saved.model_name);
        }
        SettingsCommands::Rag => {
            let settings = client.rag_settings().await?;
            render(ctx.json, &settings, |s| {
                println!("chunk size:    {}", s.chunk_size);
                println!("chunk overlap: {}", s.chunk_overlap);
            })?;
        }
        SettingsCommands::SetRag {
            chunk_size,
            chunk_overlap,
        } => {
            let update = RagSettingsUpdate {
                chunk_size,
                chunk_overlap,
            };
            let saved = client.save_rag_settings(&update).await?;
            println!(
                "Chunk size {} with overlap {}.",
                saved.chunk_size, saved.chunk_overlap
            );
        }
        SettingsCommands::Models { provider } => {
            let models = client.available_ai_models(provider.as_deref()).await?;
            render(ctx.json, &models, |models| {
                for m in models {
                    println!("{:<12} {}", m.provider, m.model_name);
                }
            })?;
        }
        SettingsCommands::ReloadRag => {
            eprintln!("Rebuilding the knowledge index, this can take a while...");
            print_json(&client.reload_rag().await?)?;
        }
        SettingsCommands::FlagChunk {
            source_name,
            chunk_id,
            notes,
        } => {
            let flag = KnowledgeFlag {
                source_name,
                chunk_id,
                notes,
            };
            print_json(&client.flag_knowledge_chunk(&flag).await?)?;
        }
    }
    Ok(())
}
