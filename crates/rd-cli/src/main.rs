use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use rd_calls::{CallDraft, CallOutcome, CallsView, OutcomeFilter};
use rd_core::settings::{normalize_backend_url, DashboardSettings};

mod backend;
mod edit;
mod output;

use backend::BackendClient;
use edit::EditArgs;

#[derive(Parser)]
#[command(name = "rd", version, about = "AI receptionist call dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gated dashboard relay.
    Serve,
    /// Work with call records directly against the backend.
    Calls {
        /// Defaults to BACKEND_URL, then NEXT_PUBLIC_BACKEND_URL.
        #[arg(long, global = true)]
        backend_url: Option<String>,
        #[command(subcommand)]
        command: CallsCommand,
    },
}

#[derive(Subcommand)]
enum CallsCommand {
    List {
        /// Matches caller name, phone or intent.
        #[arg(long, default_value = "")]
        search: String,
        /// all, booked, info_only, follow_up or unknown.
        #[arg(long, default_value = "all")]
        filter: OutcomeFilter,
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    SetOutcome {
        id: String,
        outcome: CallOutcome,
    },
    SetBooked {
        id: String,
        #[arg(action = ArgAction::Set)]
        booked: bool,
    },
    /// Change any editable fields and save the whole record.
    Edit {
        id: String,
        #[command(flatten)]
        edits: EditArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = rd_dashboard_api::load_config()?;
            rd_dashboard_api::run(config).await?;
        }
        Commands::Calls {
            backend_url,
            command,
        } => {
            rd_core::logging::init("rd-cli");
            let base_url = match backend_url {
                Some(url) => normalize_backend_url(Some(&url)),
                None => DashboardSettings::from_env().backend_url,
            };
            let client = BackendClient::new(base_url);
            tracing::debug!(backend_url = client.base_url(), "using backend");

            match command {
                CallsCommand::List {
                    search,
                    filter,
                    json,
                } => {
                    let records = client.list_calls().await?;
                    let view = CallsView::build(records, &search, filter);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    } else {
                        print!("{}", output::render_list(&view));
                    }
                }
                CallsCommand::Show { id, json } => {
                    let record = client.get_call(&id).await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    } else {
                        let draft = CallDraft::from_record(&record);
                        print!("{}", output::render_detail(&record, &draft));
                    }
                }
                CallsCommand::SetOutcome { id, outcome } => {
                    let record = client.get_call(&id).await?;
                    let mut draft = CallDraft::from_record(&record);
                    draft.set_outcome(outcome);
                    save(&client, &id, &draft).await?;
                }
                CallsCommand::SetBooked { id, booked } => {
                    let record = client.get_call(&id).await?;
                    let mut draft = CallDraft::from_record(&record);
                    draft.set_appointment_booked(booked);
                    save(&client, &id, &draft).await?;
                }
                CallsCommand::Edit { id, edits } => {
                    if edits.is_empty() {
                        bail!("nothing to edit: pass at least one field flag");
                    }
                    let record = client.get_call(&id).await?;
                    let mut draft = CallDraft::from_record(&record);
                    edits.apply(&mut draft);
                    save(&client, &id, &draft).await?;
                }
            }
        }
    }

    Ok(())
}

async fn save(client: &BackendClient, id: &str, draft: &CallDraft) -> Result<()> {
    let updated = client.update_call(id, &draft.to_patch()).await?;
    tracing::info!(call_id = %updated.id, outcome = %draft.outcome(), "call updated");
    let saved = CallDraft::from_record(&updated);
    print!("{}", output::render_detail(&updated, &saved));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "rd",
            "calls",
            "--backend-url",
            "http://backend:3001/",
            "list",
            "--search",
            "dana",
            "--filter",
            "follow up",
        ])
        .expect("parse");
        match cli.command {
            Commands::Calls {
                backend_url,
                command: CallsCommand::List { search, filter, json },
            } => {
                assert_eq!(backend_url.as_deref(), Some("http://backend:3001/"));
                assert_eq!(search, "dana");
                assert_eq!(filter, OutcomeFilter::Only(CallOutcome::FollowUp));
                assert!(!json);
            }
            _ => panic!("expected calls list"),
        }
    }

    #[test]
    fn set_booked_takes_an_explicit_value() {
        let cli = Cli::try_parse_from(["rd", "calls", "set-booked", "c_1", "false"])
            .expect("parse");
        match cli.command {
            Commands::Calls {
                command: CallsCommand::SetBooked { id, booked },
                ..
            } => {
                assert_eq!(id, "c_1");
                assert!(!booked);
            }
            _ => panic!("expected set-booked"),
        }
    }

    #[test]
    fn parses_edit_flags() {
        let cli = Cli::try_parse_from([
            "rd",
            "calls",
            "edit",
            "c_1",
            "--notes",
            "",
            "--call-successful",
            "true",
            "--outcome-text",
            "follow up",
        ])
        .expect("parse");
        match cli.command {
            Commands::Calls {
                command: CallsCommand::Edit { id, edits },
                ..
            } => {
                assert_eq!(id, "c_1");
                assert_eq!(edits.notes.as_deref(), Some(""));
                assert_eq!(edits.call_successful, Some(true));
                assert_eq!(edits.outcome_text.as_deref(), Some("follow up"));
                assert!(edits.caller_name.is_none());
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn rejects_unrecognized_outcome() {
        assert!(Cli::try_parse_from(["rd", "calls", "set-outcome", "c_1", "maybe"]).is_err());
    }
}
