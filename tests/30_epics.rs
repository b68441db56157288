mod common;

use anyhow::Result;
use backlog_api::cli::client::{error_status, ClientError};
use backlog_api::database::models::EpicForm;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{call, TestServer};

#[tokio::test]
async fn epic_crud_within_own_backlog() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;
    let backlog = common::backlog(&client, "Sprint 1").await?;

    let epic = common::epic(&client, backlog.id, "Auth").await?;
    assert_eq!(epic.backlog_id, backlog.id);

    let row = client.get_epic(epic.id).await?;
    assert_eq!(row.backlog_title, "Sprint 1");

    let updated = client
        .update_epic(
            epic.id,
            &EpicForm {
                title: Some("Authentication".to_string()),
                description: Some("Sign in and out".to_string()),
                backlog_id: None,
            },
        )
        .await?;
    assert_eq!(updated.title, "Authentication");
    assert_eq!(updated.backlog_id, backlog.id);

    let listed = client.list_epics(Some(backlog.id)).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].epic.title, "Authentication");

    assert_eq!(client.delete_epic(epic.id).await?.message, "Epic deleted successfully");
    assert!(client.list_epics(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_requires_title_and_backlog() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token("dana").await?;

    let (status, body) = call(Method::POST, &server.url("/api/epics"), Some(&token), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title and backlog list are required");
    assert!(body["field_errors"].get("productBacklogListId").is_some());
    Ok(())
}

#[tokio::test]
async fn create_in_foreign_backlog_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let (owner, _) = server.user("owner").await?;
    let (intruder, _) = server.user("intruder").await?;
    let backlog = common::backlog(&owner, "Private").await?;

    let err = common::epic(&intruder, backlog.id, "Sneaky").await.unwrap_err();
    let client_err = err.downcast_ref::<ClientError>().expect("server error");
    assert_eq!(client_err.status, StatusCode::NOT_FOUND);
    assert_eq!(client_err.message, "Backlog not found");

    assert!(owner.list_epics(Some(backlog.id)).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn foreign_epics_cannot_be_changed() -> Result<()> {
    let server = TestServer::start().await?;
    let (owner, _) = server.user("owner").await?;
    let (intruder, _) = server.user("intruder").await?;
    let backlog = common::backlog(&owner, "Private").await?;
    let epic = common::epic(&owner, backlog.id, "Auth").await?;

    let form = EpicForm {
        title: Some("Hijacked".to_string()),
        description: None,
        backlog_id: None,
    };
    let err = intruder.update_epic(epic.id, &form).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::FORBIDDEN));

    let err = intruder.delete_epic(epic.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::FORBIDDEN));

    let err = intruder.get_epic(epic.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));

    assert!(intruder.list_epics(Some(backlog.id)).await?.is_empty());
    assert_eq!(owner.get_epic(epic.id).await?.epic.title, "Auth");
    Ok(())
}

#[tokio::test]
async fn missing_epic_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;

    let err = client.delete_epic(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));
    Ok(())
}
