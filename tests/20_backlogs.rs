mod common;

use anyhow::Result;
use backlog_api::cli::client::error_status;
use backlog_api::database::models::BacklogForm;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{call, TestServer};

#[tokio::test]
async fn backlog_crud() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, user) = server.user("dana").await?;

    let created = client
        .create_backlog(&BacklogForm {
            title: Some("  Sprint 1 ".to_string()),
            description: Some("First sprint".to_string()),
        })
        .await?;
    assert_eq!(created.title, "Sprint 1");
    assert_eq!(created.user_id, user.id);

    let fetched = client.get_backlog(created.id).await?;
    assert_eq!(fetched, created);

    let updated = client
        .update_backlog(
            created.id,
            &BacklogForm {
                title: Some("Sprint 1 (extended)".to_string()),
                description: None,
            },
        )
        .await?;
    assert_eq!(updated.title, "Sprint 1 (extended)");
    assert_eq!(updated.description, None);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    assert_eq!(client.list_backlogs().await?.len(), 1);

    let deleted = client.delete_backlog(created.id).await?;
    assert_eq!(deleted.message, "Backlog deleted successfully");
    assert!(client.list_backlogs().await?.is_empty());

    let err = client.get_backlog(created.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));
    Ok(())
}

#[tokio::test]
async fn create_returns_201() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token("dana").await?;

    let (status, body) = call(
        Method::POST,
        &server.url("/api/backlogs"),
        Some(&token),
        Some(json!({ "title": "Sprint 1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Sprint 1");
    assert!(body["data"]["createdAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn other_users_backlogs_are_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let (owner, _) = server.user("owner").await?;
    let (intruder, _) = server.user("intruder").await?;

    let backlog = common::backlog(&owner, "Private").await?;

    let err = intruder.get_backlog(backlog.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));

    let err = intruder
        .update_backlog(backlog.id, &BacklogForm::from(&backlog))
        .await
        .unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));

    let err = intruder.delete_backlog(backlog.id).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));

    assert!(intruder.list_backlogs().await?.is_empty());
    assert_eq!(owner.get_backlog(backlog.id).await?.title, "Private");
    Ok(())
}

#[tokio::test]
async fn missing_title_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token("dana").await?;

    let (status, body) = call(
        Method::POST,
        &server.url("/api/backlogs"),
        Some(&token),
        Some(json!({ "title": "   ", "description": "no title" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");
    assert!(body["field_errors"].get("title").is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_bad_request() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.token("dana").await?;

    let (status, body) = call(Method::GET, &server.url("/api/backlogs/not-a-uuid"), Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_own_records() -> Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.user("dana").await?;
    let (other, _) = server.user("sam").await?;

    let backlog = common::backlog(&client, "Sprint 1").await?;
    let epic = common::epic(&client, backlog.id, "Auth").await?;
    common::pbi(&client, backlog.id, "Login", Some(epic.id)).await?;
    common::pbi(&client, backlog.id, "Logout", None).await?;
    common::backlog(&other, "Elsewhere").await?;

    let stats = client.dashboard().await?;
    assert_eq!((stats.backlogs, stats.epics, stats.pbis), (1, 1, 2));
    Ok(())
}
