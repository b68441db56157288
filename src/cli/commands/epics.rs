use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliConfig;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{EpicForm, EpicWithBacklog};
use crate::filter::{EpicField, Filter, SortSpec};

#[derive(Subcommand)]
pub enum EpicCommands {
    #[command(about = "List epics")]
    List {
        #[arg(long, help = "Only epics of this backlog ID")]
        backlog: Option<String>,
        #[arg(long, help = "Sort order, e.g. \"backlogTitle asc, title asc\"")]
        sort: Option<String>,
    },

    #[command(about = "Show an epic")]
    Show {
        #[arg(help = "Epic ID")]
        id: String,
    },

    #[command(about = "Create an epic in a backlog")]
    Create {
        #[arg(long, help = "Parent backlog ID")]
        backlog: String,
        #[arg(long, help = "Title")]
        title: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Update an epic; omitted flags keep their current value")]
    Update {
        #[arg(help = "Epic ID")]
        id: String,
        #[arg(long, help = "Title")]
        title: Option<String>,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Delete an epic; its PBIs are kept without an epic")]
    Delete {
        #[arg(help = "Epic ID")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: EpicCommands, session: &CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = super::authed_client(session)?;

    match cmd {
        EpicCommands::List { backlog, sort } => {
            let backlog_id = backlog.as_deref().map(|id| super::parse_id("backlog", id)).transpose()?;
            let mut view = Filter::<EpicField>::default();
            if let Some(sort) = &sort {
                view = view.with_order_str(sort)?;
            }
            let epics = view.apply(&client.list_epics(backlog_id).await?);

            if epics.is_empty() {
                return output_empty_collection(&output_format, "epics", "No epics found");
            }
            output_value(&output_format, &epics, |epics| print_epic_table(epics, view.order.first()))
        }
        EpicCommands::Show { id } => {
            let id = super::parse_id("epic", &id)?;
            let epic = client.get_epic(id).await?;
            output_value(&output_format, &epic, |row| {
                println!("{}", row.epic.title);
                println!("Backlog:     {} ({})", row.backlog_title, row.epic.backlog_id);
                println!("Description: {}", row.epic.description.as_deref().unwrap_or("N/A"));
                println!("Created:     {}", format_date_time(row.epic.created_at));
                println!("Updated:     {}", format_date_time(row.epic.updated_at));
            })
        }
        EpicCommands::Create { backlog, title, description } => {
            let form = EpicForm {
                title: Some(title),
                description,
                backlog_id: Some(backlog),
            };
            form.validate_create()?;
            let epic = client.create_epic(&form).await?;
            output_success(
                &output_format,
                &format!("Created epic '{}' ({})", epic.title, epic.id),
                Some(serde_json::to_value(&epic)?),
            )
        }
        EpicCommands::Update { id, title, description } => {
            let id = super::parse_id("epic", &id)?;
            let current = client.get_epic(id).await?.epic;
            let form = EpicForm {
                title: title.or(Some(current.title)),
                description: description.or(current.description),
                backlog_id: None,
            };
            form.validate_update()?;
            let epic = client.update_epic(id, &form).await?;
            output_success(
                &output_format,
                &format!("Updated epic '{}'", epic.title),
                Some(serde_json::to_value(&epic)?),
            )
        }
        EpicCommands::Delete { id, yes } => {
            let id = super::parse_id("epic", &id)?;
            let epic = client.get_epic(id).await?;
            let prompt = format!(
                "Delete epic '{}'? Its PBIs stay in '{}' without an epic.",
                epic.epic.title, epic.backlog_title
            );
            if !confirm(&prompt, yes)? {
                return output_success(&output_format, "Cancelled", None);
            }
            let deleted = client.delete_epic(id).await?;
            output_success(&output_format, &deleted.message, Some(json!({ "id": id })))
        }
    }
}

fn print_epic_table(epics: &[EpicWithBacklog], sort: Option<&SortSpec<EpicField>>) {
    let headers = vec![
        "ID".to_string(),
        header("Title", EpicField::Title, sort),
        header("Backlog", EpicField::BacklogTitle, sort),
        header("Description", EpicField::Description, sort),
        header("Updated", EpicField::UpdatedAt, sort),
    ];
    let rows: Vec<Vec<String>> = epics
        .iter()
        .map(|row| {
            vec![
                row.epic.id.to_string(),
                row.epic.title.clone(),
                row.backlog_title.clone(),
                truncate_text(row.epic.description.as_deref()),
                format_date(row.epic.updated_at),
            ]
        })
        .collect();
    println!("{}", render_table(&headers, &rows));
}
