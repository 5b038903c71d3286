use std::path::Path;

use anyhow::{Context, Result};
use isirt_client::PollError;
use isirt_schema::{DialogueTurn, IncidentSuggestion};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::output::{or_dash, print_json, render};

/// Submits the description and waits for AI suggestions. Ctrl-C stops the
/// wait without failing the command.
pub async fn suggest(ctx: &AppContext, description: &str) -> Result<()> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    eprintln!("Analyzing description (Ctrl-C to stop waiting)...");
    let outcome = ctx
        .client()
        .suggest_incident(description, ctx.config.poll_config(), &cancel)
        .await;
    ctrl_c.abort();

    let result = match outcome {
        Ok(result) => result,
        Err(PollError::Cancelled { task_id }) => {
            println!("Stopped waiting for task {task_id}.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if ctx.json {
        return print_json(&result);
    }
    match serde_json::from_value::<IncidentSuggestion>(result.clone()) {
        Ok(suggestion) => print_suggestion(&suggestion),
        Err(_) => print_json(&result)?,
    }
    Ok(())
}

fn print_suggestion(s: &IncidentSuggestion) {
    println!("title:        {}", or_dash(s.suggested_title.as_deref()));
    println!(
        "severity:     {}",
        s.suggested_severity.map(|v| v.as_str()).unwrap_or("-")
    );
    println!("category:     {}", id_or_dash(s.suggested_category_id));
    println!("type:         {}", id_or_dash(s.suggested_incident_type_id));
    println!("assign to:    {}", id_or_dash(s.suggested_user_id));
}

fn id_or_dash(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

pub async fn ask(ctx: &AppContext, prompt: &str, conversation_id: Option<String>) -> Result<()> {
    let conversation_id = conversation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let reply = ctx.client().ask_chatbot(prompt, &conversation_id).await?;
    render(ctx.json, &reply, |reply| {
        println!("{}", reply.response);
        eprintln!(
            "(conversation {})",
            reply.conversation_id.as_deref().unwrap_or(&conversation_id)
        );
    })
}

pub async fn summarize(ctx: &AppContext, transcript: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(transcript)
        .with_context(|| format!("failed to read {}", transcript.display()))?;
    let turns: Vec<DialogueTurn> = serde_json::from_str(&raw)
        .with_context(|| format!("{} must hold [{{role, content}}] turns", transcript.display()))?;

    let summary = ctx.client().summarize_dialogue(turns).await?;
    render(ctx.json, &summary, |summary| {
        println!("{}", summary.summary);
        println!();
        println!("{}", summary.detailed_description);
    })
}
