use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::ids::{CampaignId, SessionId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// One stored transcript. Rows are always campaign-scoped, so the owning
/// campaign ID is not repeated here; the struct mirrors the API payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: SessionId,
    pub content: String,
    pub created_at: String,
}

pub struct SessionRepo {
    db: Database,
}

impl SessionRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a session and return its new ID. The referenced campaign must
    /// exist; a dangling `campaign_id` fails the foreign-key check.
    #[instrument(skip(self, content), fields(campaign_id = %campaign_id))]
    pub fn create(
        &self,
        campaign_id: CampaignId,
        content: &str,
    ) -> Result<SessionId, StoreError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (campaign_id, content, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![campaign_id.as_i64(), content, now],
            )?;
            Ok(SessionId::from_raw(conn.last_insert_rowid()))
        })
    }

    /// Get one session scoped to a campaign, or `None`.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, session_id = %id))]
    pub fn get(
        &self,
        campaign_id: CampaignId,
        id: SessionId,
    ) -> Result<Option<SessionRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at FROM sessions
                 WHERE campaign_id = ?1 AND id = ?2",
            )?;
            let mut rows = stmt.query(rusqlite::params![campaign_id.as_i64(), id.as_i64()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_session(row)?)),
                None => Ok(None),
            }
        })
    }

    /// List a campaign's sessions, most recently inserted first.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub fn list(&self, campaign_id: CampaignId) -> Result<Vec<SessionRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at FROM sessions
                 WHERE campaign_id = ?1
                 ORDER BY id DESC",
            )?;
            let mut rows = stmt.query([campaign_id.as_i64()])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_session(row)?);
            }
            Ok(results)
        })
    }

    /// Overwrite a session's content. Returns whether a row was matched.
    #[instrument(skip(self, content), fields(campaign_id = %campaign_id, session_id = %id))]
    pub fn update(
        &self,
        campaign_id: CampaignId,
        id: SessionId,
        content: &str,
    ) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE sessions SET content = ?1 WHERE campaign_id = ?2 AND id = ?3",
                rusqlite::params![content, campaign_id.as_i64(), id.as_i64()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete one session. Returns whether a row was matched.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, session_id = %id))]
    pub fn delete(&self, campaign_id: CampaignId, id: SessionId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM sessions WHERE campaign_id = ?1 AND id = ?2",
                rusqlite::params![campaign_id.as_i64(), id.as_i64()],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<SessionRow, StoreError> {
    Ok(SessionRow {
        id: SessionId::from_raw(row_helpers::get::<i64>(row, 0, "sessions", "id")?),
        content: row_helpers::get(row, 1, "sessions", "content")?,
        created_at: row_helpers::get(row, 2, "sessions", "created_at")?,
    })
}
