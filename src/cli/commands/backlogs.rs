use clap::Subcommand;
use serde_json::json;

use super::pbis::{pbi_filter, print_pbi_table};
use crate::cli::config::CliConfig;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{Backlog, BacklogForm};
use crate::filter::{BacklogField, Filter, SortSpec};

#[derive(Subcommand)]
pub enum BacklogCommands {
    #[command(about = "List your backlogs")]
    List {
        #[arg(long, help = "Sort order, e.g. \"title asc\" (default: server order, oldest update first)")]
        sort: Option<String>,
    },

    #[command(about = "Show a backlog with its PBIs and epics")]
    Show {
        #[arg(help = "Backlog ID")]
        id: String,
        #[arg(long, help = "Only PBIs of this epic ID, or \"none\" for PBIs without an epic")]
        epic: Option<String>,
        #[arg(long, help = "PBI sort order, e.g. \"priority asc\" (default: \"createdAt desc\")")]
        sort: Option<String>,
    },

    #[command(about = "Create a backlog")]
    Create {
        #[arg(long, help = "Title")]
        title: String,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Update a backlog; omitted flags keep their current value")]
    Update {
        #[arg(help = "Backlog ID")]
        id: String,
        #[arg(long, help = "Title")]
        title: Option<String>,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Delete a backlog with all its epics and PBIs")]
    Delete {
        #[arg(help = "Backlog ID")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: BacklogCommands, session: &CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = super::authed_client(session)?;

    match cmd {
        BacklogCommands::List { sort } => {
            let mut view = Filter::<BacklogField>::default();
            if let Some(sort) = &sort {
                view = view.with_order_str(sort)?;
            }
            let backlogs = view.apply(&client.list_backlogs().await?);

            if backlogs.is_empty() {
                return output_empty_collection(&output_format, "backlogs", "No backlogs yet");
            }
            output_value(&output_format, &backlogs, |backlogs| {
                print_backlog_table(backlogs, view.order.first())
            })
        }
        BacklogCommands::Show { id, epic, sort } => {
            let id = super::parse_id("backlog", &id)?;
            let detail = client.backlog_view(id).await?;
            let view = pbi_filter(Some(id), epic.as_deref(), sort.as_deref())?;
            let pbis = view.apply(&detail.pbis);

            let value = json!({
                "backlog": detail.backlog,
                "pbis": pbis,
                "epics": detail.epics,
            });
            output_value(&output_format, &value, |_| {
                println!("{}", detail.backlog.title);
                if let Some(description) = &detail.backlog.description {
                    println!("{}", description);
                }
                println!();
                let epics: Vec<&str> = detail.epics.iter().map(|e| e.epic.title.as_str()).collect();
                if epics.is_empty() {
                    println!("Epics: none");
                } else {
                    println!("Epics: {}", epics.join(", "));
                }
                println!("PBIs: {} of {}", pbis.len(), detail.pbis.len());
                if !pbis.is_empty() {
                    println!();
                    print_pbi_table(&pbis, view.order.first());
                }
            })
        }
        BacklogCommands::Create { title, description } => {
            let form = BacklogForm {
                title: Some(title),
                description,
            };
            form.validate()?;
            let backlog = client.create_backlog(&form).await?;
            output_success(
                &output_format,
                &format!("Created backlog '{}' ({})", backlog.title, backlog.id),
                Some(serde_json::to_value(&backlog)?),
            )
        }
        BacklogCommands::Update { id, title, description } => {
            let id = super::parse_id("backlog", &id)?;
            let mut form = BacklogForm::from(&client.get_backlog(id).await?);
            if title.is_some() {
                form.title = title;
            }
            if description.is_some() {
                form.description = description;
            }
            form.validate()?;
            let backlog = client.update_backlog(id, &form).await?;
            output_success(
                &output_format,
                &format!("Updated backlog '{}'", backlog.title),
                Some(serde_json::to_value(&backlog)?),
            )
        }
        BacklogCommands::Delete { id, yes } => {
            let id = super::parse_id("backlog", &id)?;
            let backlog = client.get_backlog(id).await?;
            let prompt = format!(
                "Delete backlog '{}'? All of its epics and PBIs are deleted too.",
                backlog.title
            );
            if !confirm(&prompt, yes)? {
                return output_success(&output_format, "Cancelled", None);
            }
            let deleted = client.delete_backlog(id).await?;
            output_success(&output_format, &deleted.message, Some(json!({ "id": id })))
        }
    }
}

fn print_backlog_table(backlogs: &[Backlog], sort: Option<&SortSpec<BacklogField>>) {
    let headers = vec![
        "ID".to_string(),
        header("Title", BacklogField::Title, sort),
        header("Description", BacklogField::Description, sort),
        header("Created", BacklogField::CreatedAt, sort),
        header("Updated", BacklogField::UpdatedAt, sort),
    ];
    let rows: Vec<Vec<String>> = backlogs
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.title.clone(),
                truncate_text(b.description.as_deref()),
                format_date(b.created_at),
                format_date(b.updated_at),
            ]
        })
        .collect();
    println!("{}", render_table(&headers, &rows));
}

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use clap::CommandFactory;

    #[test]
    fn list_sort_help_matches_server_order() {
        let mut cli = Cli::command();
        let list = cli
            .find_subcommand_mut("backlogs")
            .and_then(|backlogs| backlogs.find_subcommand_mut("list"))
            .expect("backlogs list");
        let help = list
            .get_arguments()
            .find(|arg| arg.get_id() == "sort")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .expect("sort help");
        assert!(help.contains("oldest update first"), "{help}");
    }
}
