use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use isirt_client::FilePart;
use isirt_schema::{
    Incident, IncidentCreate, IncidentStatus, IncidentUpdate, IsirtAnalysisRequest,
};

use crate::context::AppContext;
use crate::output::{or_dash, print_json, render, write_blob};

#[derive(Subcommand)]
pub enum IncidentCommands {
    #[command(about = "List incidents")]
    List {
        #[arg(long, help = "Only show incidents in this status, e.g. Investigando")]
        status: Option<String>,
    },
    #[command(about = "Show one incident with its log")]
    Show { incident_id: i64 },
    #[command(about = "Report a new incident")]
    Create {
        #[arg(long)]
        summary: String,
        #[arg(long)]
        description: String,
        #[arg(long, help = "When it was discovered (RFC 3339); defaults to now")]
        discovered: Option<String>,
        #[arg(long)]
        asset_id: Option<i64>,
        #[arg(long)]
        incident_type_id: Option<i64>,
        #[arg(long)]
        attack_vector_id: Option<i64>,
        #[arg(long = "evidence", help = "File to attach; repeatable")]
        evidence: Vec<PathBuf>,
    },
    #[command(about = "Move an incident to another status")]
    UpdateStatus { incident_id: i64, status: String },
    #[command(about = "Add a manual log entry")]
    Log { incident_id: i64, comments: String },
    #[command(about = "Run automatic triage")]
    Triage { incident_id: i64 },
    #[command(about = "Request an ISIRT analysis report")]
    Analysis {
        incident_id: i64,
        #[arg(long, default_value = "")]
        context: String,
    },
    #[command(about = "Show entities linked to an incident")]
    Related { incident_id: i64 },
    #[command(about = "List evidence files")]
    Evidence { incident_id: i64 },
    #[command(about = "Download one evidence file")]
    Download {
        incident_id: i64,
        file_id: i64,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_status(raw: &str) -> Result<IncidentStatus> {
    IncidentStatus::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = IncidentStatus::ALL.iter().map(|s| s.as_str()).collect();
        anyhow!("unknown status {raw}; expected one of {}", known.join(", "))
    })
}

fn parse_discovery_time(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .with_context(|| format!("invalid discovery time: {raw}")),
        None => Ok(Utc::now()),
    }
}

pub async fn handle_incident_command(ctx: &AppContext, cmd: IncidentCommands) -> Result<()> {
    let client = ctx.client();
    match cmd {
        IncidentCommands::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let incidents: Vec<Incident> = client
                .list_incidents()
                .await?
                .into_iter()
                .filter(|i| status.map_or(true, |s| i.status == s))
                .collect();
            render(ctx.json, &incidents, |incidents| print_incidents(incidents))?;
        }
        IncidentCommands::Show { incident_id } => {
            let incident = client.get_incident(incident_id).await?;
            render(ctx.json, &incident, print_incident)?;
        }
        IncidentCommands::Create {
            summary,
            description,
            discovered,
            asset_id,
            incident_type_id,
            attack_vector_id,
            evidence,
        } => {
            let incident = IncidentCreate {
                summary,
                description,
                discovery_time: parse_discovery_time(discovered.as_deref())?,
                ai_conversation: None,
                asset_id,
                incident_type_id,
                attack_vector_id,
                other_asset_location: None,
            };
            let mut files = Vec::with_capacity(evidence.len());
            for path in &evidence {
                files.push(FilePart::from_path("evidence_files", path).await?);
            }
            let created = client.create_incident(&incident, files).await?;
            render(ctx.json, &created, |i| {
                println!("Reported {} (id {}).", i.ticket_id, i.incident_id)
            })?;
        }
        IncidentCommands::UpdateStatus {
            incident_id,
            status,
        } => {
            let update = IncidentUpdate {
                status: Some(parse_status(&status)?),
                ..Default::default()
            };
            let incident = client.update_incident(incident_id, &update).await?;
            println!("{} is now {}.", incident.ticket_id, incident.status);
        }
        IncidentCommands::Log {
            incident_id,
            comments,
        } => {
            let entry = client.add_incident_log(incident_id, &comments).await?;
            println!("Logged entry {} on incident {}.", entry.log_id, entry.incident_id);
        }
        IncidentCommands::Triage { incident_id } => {
            print_json(&client.triage_incident(incident_id).await?)?;
        }
        IncidentCommands::Analysis {
            incident_id,
            context,
        } => {
            let request = IsirtAnalysisRequest {
                additional_context: context,
            };
            print_json(&client.isirt_analysis(incident_id, &request).await?)?;
        }
        IncidentCommands::Related { incident_id } => {
            print_json(&client.related_entities(incident_id).await?)?;
        }
        IncidentCommands::Evidence { incident_id } => {
            let files = client.list_evidence(incident_id).await?;
            render(ctx.json, &files, |files| {
                for f in files {
                    println!(
                        "{:<6} {:<36} {:<24} {} bytes",
                        f.file_id, f.file_name, f.file_type, f.file_size_bytes
                    );
                }
            })?;
        }
        IncidentCommands::Download {
            incident_id,
            file_id,
            output,
        } => {
            let output = match output {
                Some(output) => output,
                None => {
                    let files = client.list_evidence(incident_id).await?;
                    files
                        .iter()
                        .find(|f| f.file_id == file_id)
                        .map(|f| PathBuf::from(&f.file_name))
                        .unwrap_or_else(|| PathBuf::from(format!("evidence_{file_id}")))
                }
            };
            let bytes = client.download_evidence(incident_id, file_id).await?;
            write_blob(&output, &bytes)?;
        }
    }
    Ok(())
}

fn print_incidents(incidents: &[Incident]) {
    println!(
        "{:<6} {:<12} {:<14} {:<16} {}",
        "ID", "TICKET", "STATUS", "SEVERITY", "SUMMARY"
    );
    for incident in incidents {
        println!(
            "{:<6} {:<12} {:<14} {:<16} {}",
            incident.incident_id,
            incident.ticket_id,
            incident.status,
            incident
                .severity
                .map(|s| s.as_str())
                .unwrap_or("-"),
            incident.summary
        );
    }
}

fn print_incident(incident: &Incident) {
    println!("{} {}", incident.ticket_id, incident.summary);
    println!("status:   {}", incident.status);
    println!(
        "severity: {}",
        incident.severity.map(|s| s.as_str()).unwrap_or("-")
    );
    println!(
        "assignee: {}",
        or_dash(incident.assignee.as_ref().map(|u| u.email.as_str()))
    );
    println!();
    println!("{}", incident.description);
    if !incident.logs.is_empty() {
        println!();
        for log in &incident.logs {
            println!(
                "{}  {:<20} {}",
                log.timestamp.format("%Y-%m-%d %H:%M"),
                log.action,
                or_dash(log.comments.as_deref())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_follow_backend() {
        assert_eq!(parse_status("investigando").unwrap(), IncidentStatus::Investigating);
        assert!(parse_status("Done").is_err());
    }

    #[test]
    fn discovery_time_defaults_to_now() {
        let before = Utc::now();
        assert!(parse_discovery_time(None).unwrap() >= before);

        let parsed = parse_discovery_time(Some("2025-03-01T10:00:00-05:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T15:00:00+00:00");
        assert!(parse_discovery_time(Some("yesterday")).is_err());
    }
}
