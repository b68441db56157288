use clap::{Args, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::config::CliConfig;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{PbiForm, PbiWithDetails};
use crate::export::{export_date, export_to_dir, NO_EPIC};
use crate::filter::{Filter, FilterOrder, ListFilter, PbiField, SortSpec};

/// Fields shared by `create` and `update`. On update an omitted flag keeps
/// the current value.
#[derive(Args, Debug, Default)]
pub struct PbiFields {
    #[arg(long, help = "Title")]
    pub title: Option<String>,
    #[arg(long, help = "Person in charge")]
    pub pic: Option<String>,
    #[arg(long, help = "Low, Medium or High")]
    pub priority: Option<String>,
    #[arg(long = "story-point", help = "Estimate in story points")]
    pub story_point: Option<String>,
    #[arg(long = "business-value", help = "Business value")]
    pub business_value: Option<String>,
    #[arg(long = "user-story", help = "User story")]
    pub user_story: Option<String>,
    #[arg(long = "acceptance-criteria", help = "Acceptance criteria")]
    pub acceptance_criteria: Option<String>,
    #[arg(long, help = "Notes")]
    pub notes: Option<String>,
    #[arg(long, help = "Epic ID, or \"none\" to detach")]
    pub epic: Option<String>,
}

impl PbiFields {
    /// Applies the given flags on top of `form`.
    pub fn overlay(self, mut form: PbiForm) -> PbiForm {
        if self.title.is_some() {
            form.title = self.title;
        }
        if self.pic.is_some() {
            form.pic = self.pic;
        }
        if self.priority.is_some() {
            form.priority = self.priority;
        }
        if let Some(points) = self.story_point {
            form.story_point = Some(Value::from(points));
        }
        if self.business_value.is_some() {
            form.business_value = self.business_value;
        }
        if self.user_story.is_some() {
            form.user_story = self.user_story;
        }
        if self.acceptance_criteria.is_some() {
            form.acceptance_criteria = self.acceptance_criteria;
        }
        if self.notes.is_some() {
            form.notes = self.notes;
        }
        match self.epic.as_deref().map(str::trim) {
            None => {}
            Some(epic) if epic.eq_ignore_ascii_case("none") => form.epic_id = None,
            Some(epic) => form.epic_id = Some(epic.to_string()),
        }
        form
    }
}

#[derive(Subcommand)]
pub enum PbiCommands {
    #[command(about = "List PBIs")]
    List {
        #[arg(long, help = "Only PBIs of this backlog ID")]
        backlog: Option<String>,
        #[arg(long, help = "Only PBIs of this epic ID, or \"none\" for PBIs without an epic")]
        epic: Option<String>,
        #[arg(long, help = "Sort order, e.g. \"priority asc, storyPoint desc\" (default: \"createdAt desc\")")]
        sort: Option<String>,
    },

    #[command(about = "Show a PBI")]
    Show {
        #[arg(help = "PBI ID")]
        id: String,
    },

    #[command(about = "Create a PBI in a backlog")]
    Create {
        #[arg(long, help = "Parent backlog ID")]
        backlog: String,
        #[command(flatten)]
        fields: PbiFields,
    },

    #[command(about = "Update a PBI; omitted flags keep their current value")]
    Update {
        #[arg(help = "PBI ID")]
        id: String,
        #[command(flatten)]
        fields: PbiFields,
    },

    #[command(about = "Delete a PBI")]
    Delete {
        #[arg(help = "PBI ID")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export a backlog's PBIs to an .xlsx spreadsheet")]
    Export {
        #[arg(long, help = "Backlog ID")]
        backlog: String,
        #[arg(long, help = "Only PBIs of this epic ID, or \"none\" for PBIs without an epic")]
        epic: Option<String>,
        #[arg(long, help = "Row order (default: \"createdAt desc\")")]
        sort: Option<String>,
        #[arg(long, short, default_value = ".", help = "Directory to write the file into")]
        output: PathBuf,
    },
}

/// PBI view for the given flags. Without `--sort` the newest PBIs come first.
pub fn pbi_filter(backlog_id: Option<Uuid>, epic: Option<&str>, sort: Option<&str>) -> anyhow::Result<Filter<PbiField>> {
    let mut where_clause = ListFilter::from_query(None, epic)?;
    where_clause.backlog_id = backlog_id;
    let order = match sort {
        Some(sort) => FilterOrder::validate_and_parse(sort)?,
        None => vec![SortSpec::desc(PbiField::CreatedAt)],
    };
    Ok(Filter::new(where_clause, order))
}

pub async fn handle(cmd: PbiCommands, session: &CliConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = super::authed_client(session)?;

    match cmd {
        PbiCommands::List { backlog, epic, sort } => {
            let backlog_id = backlog.as_deref().map(|id| super::parse_id("backlog", id)).transpose()?;
            let view = pbi_filter(backlog_id, epic.as_deref(), sort.as_deref())?;
            let pbis = view.apply(&client.list_pbis(&view.where_clause, None).await?);

            if pbis.is_empty() {
                return output_empty_collection(&output_format, "pbis", "No PBIs found");
            }
            output_value(&output_format, &pbis, |pbis| print_pbi_table(pbis, view.order.first()))
        }
        PbiCommands::Show { id } => {
            let id = super::parse_id("PBI", &id)?;
            let pbi = client.get_pbi(id).await?;
            output_value(&output_format, &pbi, print_pbi)
        }
        PbiCommands::Create { backlog, fields } => {
            let form = fields.overlay(PbiForm {
                backlog_id: Some(backlog),
                ..PbiForm::default()
            });
            form.validate_create()?;
            let pbi = client.create_pbi(&form).await?;
            output_success(
                &output_format,
                &format!("Created PBI '{}' ({})", pbi.title, pbi.id),
                Some(serde_json::to_value(&pbi)?),
            )
        }
        PbiCommands::Update { id, fields } => {
            let id = super::parse_id("PBI", &id)?;
            let current = client.get_pbi(id).await?;
            let form = fields.overlay(PbiForm::from(&current.pbi));
            form.validate_update()?;
            let pbi = client.update_pbi(id, &form).await?;
            output_success(
                &output_format,
                &format!("Updated PBI '{}'", pbi.title),
                Some(serde_json::to_value(&pbi)?),
            )
        }
        PbiCommands::Delete { id, yes } => {
            let id = super::parse_id("PBI", &id)?;
            let pbi = client.get_pbi(id).await?;
            if !confirm(&format!("Delete PBI '{}'?", pbi.pbi.title), yes)? {
                return output_success(&output_format, "Cancelled", None);
            }
            let deleted = client.delete_pbi(id).await?;
            output_success(&output_format, &deleted.message, Some(json!({ "id": id })))
        }
        PbiCommands::Export { backlog, epic, sort, output } => {
            let backlog_id = super::parse_id("backlog", &backlog)?;
            let detail = client.backlog_view(backlog_id).await?;
            let view = pbi_filter(Some(backlog_id), epic.as_deref(), sort.as_deref())?;
            let pbis = view.apply(&detail.pbis);

            let path = export_to_dir(&output, &detail.backlog.title, &pbis, export_date())?;
            output_success(
                &output_format,
                &format!("Exported {} PBIs to {}", pbis.len(), path.display()),
                Some(json!({ "path": path, "count": pbis.len() })),
            )
        }
    }
}

pub(crate) fn print_pbi_table(pbis: &[PbiWithDetails], sort: Option<&SortSpec<PbiField>>) {
    let headers = vec![
        "No.".to_string(),
        "ID".to_string(),
        header("Title", PbiField::Title, sort),
        header("Priority", PbiField::Priority, sort),
        header("Points", PbiField::StoryPoint, sort),
        header("PIC", PbiField::Pic, sort),
        header("Epic", PbiField::EpicTitle, sort),
        header("Created", PbiField::CreatedAt, sort),
    ];
    let rows: Vec<Vec<String>> = pbis
        .iter()
        .enumerate()
        .map(|(index, row)| {
            vec![
                (index + 1).to_string(),
                row.pbi.id.to_string(),
                truncate_text(Some(&row.pbi.title)),
                row.pbi.priority.to_string(),
                row.pbi.story_point.to_string(),
                row.pbi.pic.clone(),
                row.epic_title.clone().unwrap_or_else(|| NO_EPIC.to_string()),
                format_date(row.pbi.created_at),
            ]
        })
        .collect();
    println!("{}", render_table(&headers, &rows));
}

fn print_pbi(row: &PbiWithDetails) {
    let pbi = &row.pbi;
    println!("{}", pbi.title);
    println!("Backlog:             {}", row.backlog_title);
    println!("Epic:                {}", row.epic_title.as_deref().unwrap_or(NO_EPIC));
    println!("Priority:            {}", pbi.priority);
    println!("Story points:        {}", pbi.story_point);
    println!("PIC:                 {}", pbi.pic);
    println!("Business value:      {}", pbi.business_value);
    println!("User story:          {}", pbi.user_story);
    println!("Acceptance criteria: {}", pbi.acceptance_criteria);
    println!("Notes:               {}", pbi.notes.as_deref().unwrap_or("N/A"));
    println!("Created:             {}", format_date_time(pbi.created_at));
    println!("Updated:             {}", format_date_time(pbi.updated_at));
}
