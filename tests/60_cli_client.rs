mod common;

use anyhow::Result;
use backlog_api::cli::client::error_status;
use backlog_api::cli::commands::pbis::{pbi_filter, PbiFields};
use backlog_api::database::models::PbiForm;
use backlog_api::export::{export_filename, export_rows, export_to_dir, ExportError, NO_EPIC};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::json;

use common::{pbi_form, TestServer};

#[tokio::test]
async fn backlog_view_fetches_everything_for_one_backlog() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let other = common::backlog(&client, "Sprint 2").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    common::epic(&client, other.id, "Billing").await?;
    common::pbi(&client, backlog.id, "Login", Some(epic.id)).await?;
    common::pbi(&client, backlog.id, "Logout", None).await?;
    common::pbi(&client, other.id, "Invoice", None).await?;

    let view = client.backlog_view(backlog.id).await?;
    assert_eq!(view.backlog.title, "Sprint 1");
    assert_eq!(view.pbis.len(), 2);
    assert_eq!(view.epics.len(), 1);
    assert_eq!(view.epics[0].epic.title, "Auth");

    let err = client.backlog_view(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));
    Ok(())
}

#[tokio::test]
async fn local_view_sorts_and_filters_fetched_rows() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    client
        .create_pbi(&pbi_form(backlog.id, "Small", "Low", json!(1), None))
        .await?;
    client
        .create_pbi(&pbi_form(backlog.id, "Large", "High", json!(13), Some(epic.id)))
        .await?;
    client
        .create_pbi(&pbi_form(backlog.id, "Medium", "Medium", json!(5), None))
        .await?;

    let view = client.backlog_view(backlog.id).await?;

    let newest_first = pbi_filter(Some(backlog.id), None, None)?.apply(&view.pbis);
    let titles: Vec<_> = newest_first.iter().map(|p| p.pbi.title.as_str()).collect();
    assert_eq!(titles, vec!["Medium", "Large", "Small"]);

    let unassigned = pbi_filter(Some(backlog.id), Some("none"), Some("storyPoint asc"))?.apply(&view.pbis);
    let titles: Vec<_> = unassigned.iter().map(|p| p.pbi.title.as_str()).collect();
    assert_eq!(titles, vec!["Small", "Medium"]);

    // fetched rows are untouched by the view
    assert_eq!(view.pbis.len(), 3);
    Ok(())
}

#[tokio::test]
async fn client_side_form_edit_round_trips() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let pbi = common::pbi(&client, backlog.id, "Login", None).await?;

    let fields = PbiFields {
        priority: Some("High".to_string()),
        story_point: Some("8".to_string()),
        ..PbiFields::default()
    };
    let form = fields.overlay(PbiForm::from(&pbi));
    form.validate_update()?;

    let updated = client.update_pbi(pbi.id, &form).await?;
    assert_eq!(updated.story_point, 8);
    assert_eq!(updated.priority.as_str(), "High");
    assert_eq!(updated.title, "Login");
    Ok(())
}

#[tokio::test]
async fn export_writes_sorted_rows() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1: Q2").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    client
        .create_pbi(&pbi_form(backlog.id, "Logout", "Low", json!(2), None))
        .await?;
    client
        .create_pbi(&pbi_form(backlog.id, "Login", "High", json!(5), Some(epic.id)))
        .await?;

    let view = client.backlog_view(backlog.id).await?;
    let pbis = pbi_filter(Some(backlog.id), None, Some("priority asc"))?.apply(&view.pbis);

    let rows = export_rows(&pbis);
    assert_eq!(rows[0].title, "Login");
    assert_eq!(rows[0].epic, "Auth");
    assert_eq!(rows[1].number, 2);
    assert_eq!(rows[1].epic, NO_EPIC);

    let dir = tempfile::tempdir()?;
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
    let path = export_to_dir(dir.path(), &view.backlog.title, &pbis, date)?;
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(export_filename("Sprint 1: Q2", date).as_str())
    );
    assert_eq!(export_filename("Sprint 1: Q2", date), "Sprint_1__Q2_PBIs_2024-06-01.xlsx");
    assert!(std::fs::metadata(&path)?.len() > 0);

    let by_epic = pbi_filter(Some(backlog.id), Some(&epic.id.to_string()), None)?;
    let only_epic = by_epic.apply(&view.pbis);
    assert_eq!(only_epic.len(), 1);

    let empty = pbi_filter(Some(uuid::Uuid::new_v4()), None, None)?.apply(&view.pbis);
    assert!(matches!(
        export_to_dir(dir.path(), "Empty", &empty, date),
        Err(ExportError::Empty)
    ));
    Ok(())
}
