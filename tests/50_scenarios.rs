mod common;

use anyhow::Result;
use backlog_api::cli::client::{error_status, ClientError};
use backlog_api::filter::ListFilter;
use reqwest::StatusCode;
use serde_json::json;

use common::{pbi_form, TestServer};

#[tokio::test]
async fn sprint_with_epic_and_pbi() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    let pbi = client
        .create_pbi(&pbi_form(backlog.id, "Login", "High", json!("5"), Some(epic.id)))
        .await?;

    let pbis = client.list_pbis(&ListFilter::backlog(backlog.id), None).await?;
    assert_eq!(pbis.len(), 1);
    assert_eq!(pbis[0].pbi.id, pbi.id);
    assert_eq!(pbis[0].pbi.title, "Login");
    assert_eq!(pbis[0].epic_title.as_deref(), Some("Auth"));
    assert_eq!(pbis[0].backlog_title, "Sprint 1");

    let value = serde_json::to_value(&pbis[0])?;
    assert_eq!(value["epicTitle"], "Auth");
    assert_eq!(value["backlogTitle"], "Sprint 1");
    assert_eq!(value["productBacklogListId"], backlog.id.to_string());
    Ok(())
}

#[tokio::test]
async fn epic_from_another_backlog_is_refused() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let sprint1 = common::backlog(&client, "Sprint 1").await?;
    let sprint2 = common::backlog(&client, "Sprint 2").await?;
    let epic = common::epic(&client, sprint2.id, "Billing").await?;

    let err = common::pbi(&client, sprint1.id, "Invoice", Some(epic.id)).await.unwrap_err();
    let client_err = err.downcast_ref::<ClientError>().expect("server error");
    assert_eq!(client_err.status, StatusCode::NOT_FOUND);
    assert_eq!(client_err.message, "Epic not found in the specified backlog");

    assert!(client.list_pbis(&ListFilter::default(), None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_backlog_removes_children() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let doomed = common::backlog(&client, "Doomed").await?;
    let kept = common::backlog(&client, "Kept").await?;
    let epic = common::epic(&client, doomed.id, "Auth").await?;
    let pbi = common::pbi(&client, doomed.id, "Login", Some(epic.id)).await?;
    common::pbi(&client, kept.id, "Survivor", None).await?;

    client.delete_backlog(doomed.id).await?;

    let err = client.get_epic(epic.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));
    let err = client.get_pbi(pbi.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));

    let remaining = client.list_pbis(&ListFilter::default(), None).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].pbi.title, "Survivor");
    assert!(client.list_epics(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_epic_keeps_its_pbis() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    let pbi = common::pbi(&client, backlog.id, "Login", Some(epic.id)).await?;
    assert_eq!(pbi.epic_id, Some(epic.id));

    client.delete_epic(epic.id).await?;

    let detail = client.get_pbi(pbi.id).await?;
    assert_eq!(detail.pbi.epic_id, None);
    assert_eq!(detail.epic_title, None);
    assert_eq!(detail.backlog_title, "Sprint 1");
    Ok(())
}
