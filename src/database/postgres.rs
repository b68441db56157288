use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Backlog, BacklogDraft, DashboardStats, Epic, EpicDraft, EpicWithBacklog, Pbi, PbiDraft,
    PbiWithDetails, User,
};
use crate::database::store::Store;
use crate::filter::{EpicFilter, ListFilter};

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";
const BACKLOG_COLUMNS: &str = "id, title, description, user_id, created_at, updated_at";
const EPIC_COLUMNS: &str = "id, title, description, backlog_id, created_at, updated_at";
const PBI_COLUMNS: &str = "id, pic, title, priority, story_point, business_value, user_story, \
     acceptance_criteria, notes, epic_id, backlog_id, created_at, updated_at";

/// Joined PBI projection; `p`, `b` and `e` are pbis, backlogs and epics.
const PBI_DETAIL_SELECT: &str = "SELECT p.id, p.pic, p.title, p.priority, p.story_point, \
     p.business_value, p.user_story, p.acceptance_criteria, p.notes, p.epic_id, p.backlog_id, \
     p.created_at, p.updated_at, b.title AS backlog_title, e.title AS epic_title \
     FROM pbis p \
     INNER JOIN backlogs b ON p.backlog_id = b.id \
     LEFT JOIN epics e ON p.epic_id = e.id";

const PBI_EPIC_FK: &str = "pbis_epic_id_fkey";

/// Foreign key violations mean a parent row was deleted after the service
/// checked it; report them like a missing row.
fn missing_parent(err: sqlx::Error, describe: impl FnOnce(Option<&str>) -> String) -> DatabaseError {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            DatabaseError::NotFound(describe(db.constraint()))
        }
        other => DatabaseError::Sqlx(other),
    }
}

/// PostgreSQL-backed store. Cascades come from the schema's foreign keys.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("Username '{}' is already taken", username))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_backlogs(&self, user_id: Uuid) -> Result<Vec<Backlog>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM backlogs WHERE user_id = $1 ORDER BY updated_at ASC",
            BACKLOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, Backlog>(&sql).bind(user_id).fetch_all(&self.pool).await?)
    }

    async fn find_backlog(&self, id: Uuid) -> Result<Option<Backlog>, DatabaseError> {
        let sql = format!("SELECT {} FROM backlogs WHERE id = $1", BACKLOG_COLUMNS);
        Ok(sqlx::query_as::<_, Backlog>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_backlog(&self, user_id: Uuid, draft: &BacklogDraft) -> Result<Backlog, DatabaseError> {
        let sql = format!(
            "INSERT INTO backlogs (title, description, user_id) VALUES ($1, $2, $3) RETURNING {}",
            BACKLOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, Backlog>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_backlog(
        &self,
        id: Uuid,
        user_id: Uuid,
        draft: &BacklogDraft,
    ) -> Result<Option<Backlog>, DatabaseError> {
        let sql = format!(
            "UPDATE backlogs SET title = $1, description = $2, updated_at = now() \
             WHERE id = $3 AND user_id = $4 RETURNING {}",
            BACKLOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, Backlog>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_backlog(&self, id: Uuid, user_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM backlogs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_epics(
        &self,
        user_id: Uuid,
        backlog_id: Option<Uuid>,
    ) -> Result<Vec<EpicWithBacklog>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT e.id, e.title, e.description, e.backlog_id, e.created_at, e.updated_at, \
             b.title AS backlog_title \
             FROM epics e INNER JOIN backlogs b ON e.backlog_id = b.id \
             WHERE b.user_id = ",
        );
        qb.push_bind(user_id);
        if let Some(backlog_id) = backlog_id {
            qb.push(" AND e.backlog_id = ").push_bind(backlog_id);
        }
        qb.push(" ORDER BY e.updated_at ASC");

        Ok(qb.build_query_as::<EpicWithBacklog>().fetch_all(&self.pool).await?)
    }

    async fn find_epic(&self, id: Uuid) -> Result<Option<Epic>, DatabaseError> {
        let sql = format!("SELECT {} FROM epics WHERE id = $1", EPIC_COLUMNS);
        Ok(sqlx::query_as::<_, Epic>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_epic(&self, backlog_id: Uuid, draft: &EpicDraft) -> Result<Epic, DatabaseError> {
        let sql = format!(
            "INSERT INTO epics (title, description, backlog_id) VALUES ($1, $2, $3) RETURNING {}",
            EPIC_COLUMNS
        );
        Ok(sqlx::query_as::<_, Epic>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(backlog_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| missing_parent(e, |_| format!("backlog {}", backlog_id)))?)
    }

    async fn update_epic(&self, id: Uuid, draft: &EpicDraft) -> Result<Option<Epic>, DatabaseError> {
        let sql = format!(
            "UPDATE epics SET title = $1, description = $2, updated_at = now() WHERE id = $3 RETURNING {}",
            EPIC_COLUMNS
        );
        Ok(sqlx::query_as::<_, Epic>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_epic(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM epics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pbis(&self, user_id: Uuid, filter: &ListFilter) -> Result<Vec<PbiWithDetails>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(PBI_DETAIL_SELECT);
        qb.push(" WHERE b.user_id = ").push_bind(user_id);

        if let Some(backlog_id) = filter.backlog_id {
            qb.push(" AND p.backlog_id = ").push_bind(backlog_id);
        }
        match filter.epic {
            EpicFilter::Any => {}
            EpicFilter::Without => {
                qb.push(" AND p.epic_id IS NULL");
            }
            EpicFilter::Epic(epic_id) => {
                qb.push(" AND p.epic_id = ").push_bind(epic_id);
            }
        }
        qb.push(" ORDER BY p.updated_at ASC");

        Ok(qb.build_query_as::<PbiWithDetails>().fetch_all(&self.pool).await?)
    }

    async fn find_pbi(&self, id: Uuid) -> Result<Option<PbiWithDetails>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $1", PBI_DETAIL_SELECT);
        Ok(sqlx::query_as::<_, PbiWithDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_pbi(&self, backlog_id: Uuid, draft: &PbiDraft) -> Result<Pbi, DatabaseError> {
        let sql = format!(
            "INSERT INTO pbis (pic, title, priority, story_point, business_value, user_story, \
             acceptance_criteria, notes, epic_id, backlog_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            PBI_COLUMNS
        );
        Ok(sqlx::query_as::<_, Pbi>(&sql)
            .bind(&draft.pic)
            .bind(&draft.title)
            .bind(draft.priority)
            .bind(draft.story_point)
            .bind(&draft.business_value)
            .bind(&draft.user_story)
            .bind(&draft.acceptance_criteria)
            .bind(&draft.notes)
            .bind(draft.epic_id)
            .bind(backlog_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                missing_parent(e, |constraint| match draft.epic_id {
                    Some(epic_id) if constraint == Some(PBI_EPIC_FK) => format!("epic {}", epic_id),
                    _ => format!("backlog {}", backlog_id),
                })
            })?)
    }

    async fn update_pbi(&self, id: Uuid, draft: &PbiDraft) -> Result<Option<Pbi>, DatabaseError> {
        let sql = format!(
            "UPDATE pbis SET pic = $1, title = $2, priority = $3, story_point = $4, \
             business_value = $5, user_story = $6, acceptance_criteria = $7, notes = $8, \
             epic_id = $9, updated_at = now() WHERE id = $10 RETURNING {}",
            PBI_COLUMNS
        );
        Ok(sqlx::query_as::<_, Pbi>(&sql)
            .bind(&draft.pic)
            .bind(&draft.title)
            .bind(draft.priority)
            .bind(draft.story_point)
            .bind(&draft.business_value)
            .bind(&draft.user_story)
            .bind(&draft.acceptance_criteria)
            .bind(&draft.notes)
            .bind(draft.epic_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                missing_parent(e, |_| match draft.epic_id {
                    Some(epic_id) => format!("epic {}", epic_id),
                    None => format!("pbi {}", id),
                })
            })?)
    }

    async fn delete_pbi(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM pbis WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn dashboard_stats(&self, user_id: Uuid) -> Result<DashboardStats, DatabaseError> {
        let (backlogs, epics, pbis): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM backlogs b WHERE b.user_id = $1), \
               (SELECT COUNT(*) FROM epics e INNER JOIN backlogs b ON e.backlog_id = b.id WHERE b.user_id = $1), \
               (SELECT COUNT(*) FROM pbis p INNER JOIN backlogs b ON p.backlog_id = b.id WHERE b.user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats { backlogs, epics, pbis })
    }
}
