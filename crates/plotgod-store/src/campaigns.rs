use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::ids::CampaignId;

use crate::database::Database;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub id: CampaignId,
    pub name: String,
}

/// A campaign joined with the content of its most-recently-inserted session.
/// "Most recent" is resolved by highest session ID, not `created_at`, so
/// manual timestamp edits never change which transcript is considered latest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignLastSession {
    pub id: CampaignId,
    pub name: String,
    pub last_session_text: Option<String>,
    pub created_at: Option<String>,
}

pub struct CampaignRepo {
    db: Database,
}

impl CampaignRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a campaign and return its new ID.
    #[instrument(skip(self), fields(name))]
    pub fn create(&self, name: &str) -> Result<CampaignId, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute("INSERT INTO campaigns (name) VALUES (?1)", [name])?;
            Ok(CampaignId::from_raw(conn.last_insert_rowid()))
        })
    }

    /// Get a campaign by ID, or `None` when no row matches.
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub fn get(&self, id: CampaignId) -> Result<Option<CampaignRow>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name FROM campaigns WHERE id = ?1",
                [id.as_i64()],
                row_to_campaign,
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    /// List all campaigns ordered by name.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<CampaignRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM campaigns ORDER BY name ASC")?;
            let rows = stmt
                .query_map([], row_to_campaign)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite a campaign's name. Returns whether a row was matched.
    #[instrument(skip(self), fields(campaign_id = %id, name))]
    pub fn update(&self, id: CampaignId, name: &str) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE campaigns SET name = ?1 WHERE id = ?2",
                rusqlite::params![name, id.as_i64()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a campaign together with its sessions, party members, and NPCs.
    ///
    /// The child tables declare foreign keys without ON DELETE CASCADE, so the
    /// children go first; the whole sequence runs in one transaction and rolls
    /// back if any statement fails. Returns whether the campaign row existed.
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub fn delete(&self, id: CampaignId) -> Result<bool, StoreError> {
        self.db.with_tx(|tx| {
            tx.execute("DELETE FROM sessions WHERE campaign_id = ?1", [id.as_i64()])?;
            tx.execute(
                "DELETE FROM party_member WHERE campaign_id = ?1",
                [id.as_i64()],
            )?;
            tx.execute("DELETE FROM npcs WHERE campaign_id = ?1", [id.as_i64()])?;

            let deleted = tx.execute("DELETE FROM campaigns WHERE id = ?1", [id.as_i64()])?;
            Ok(deleted > 0)
        })
    }

    /// Get a campaign plus its newest session content. `None` when the
    /// campaign does not exist; a record with `last_session_text: None` when
    /// it exists but has no sessions yet.
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub fn last_session(&self, id: CampaignId) -> Result<Option<CampaignLastSession>, StoreError> {
        self.db.with_conn(|conn| {
            let campaign = conn
                .query_row(
                    "SELECT id, name FROM campaigns WHERE id = ?1",
                    [id.as_i64()],
                    row_to_campaign,
                )
                .optional()?;

            let Some(campaign) = campaign else {
                return Ok(None);
            };

            let session: Option<(String, String)> = conn
                .query_row(
                    "SELECT content, created_at FROM sessions
                     WHERE campaign_id = ?1
                     ORDER BY id DESC LIMIT 1",
                    [id.as_i64()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (last_session_text, created_at) = match session {
                Some((content, created_at)) => (Some(content), Some(created_at)),
                None => (None, None),
            };

            Ok(Some(CampaignLastSession {
                id: campaign.id,
                name: campaign.name,
                last_session_text,
                created_at,
            }))
        })
    }
}

fn row_to_campaign(row: &rusqlite::Row<'_>) -> Result<CampaignRow, rusqlite::Error> {
    Ok(CampaignRow {
        id: CampaignId::from_raw(row.get(0)?),
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npcs::{NpcFields, NpcRepo};
    use crate::party::{PartyMemberFields, PartyMemberRepo};
    use crate::sessions::SessionRepo;

    fn test_db() -> Database {
        Database::in_memory().unwrap()
    }

    #[test]
    fn create_and_get_roundtrip() {
        let repo = CampaignRepo::new(test_db());
        let id = repo.create("Tales of Aanur").unwrap();
        let fetched = repo.get(id).unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Tales of Aanur");
    }

    #[test]
    fn get_nonexistent_is_none() {
        let repo = CampaignRepo::new(test_db());
        assert!(repo.get(CampaignId::from_raw(999)).unwrap().is_none());
    }

    #[test]
    fn ids_increase_monotonically() {
        let repo = CampaignRepo::new(test_db());
        let a = repo.create("First").unwrap();
        let b = repo.create("Second").unwrap();
        assert!(b > a);
    }

    #[test]
    fn list_ordered_by_name() {
        let repo = CampaignRepo::new(test_db());
        repo.create("Zephyr Isles").unwrap();
        repo.create("Aanur").unwrap();
        repo.create("Mournwood").unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Aanur", "Mournwood", "Zephyr Isles"]);
    }

    #[test]
    fn update_existing() {
        let repo = CampaignRepo::new(test_db());
        let id = repo.create("Old Name").unwrap();
        assert!(repo.update(id, "New Name").unwrap());
        assert_eq!(repo.get(id).unwrap().unwrap().name, "New Name");
    }

    #[test]
    fn update_missing_returns_false() {
        let repo = CampaignRepo::new(test_db());
        assert!(!repo.update(CampaignId::from_raw(42), "Nope").unwrap());
    }

    #[test]
    fn delete_missing_returns_false() {
        let repo = CampaignRepo::new(test_db());
        assert!(!repo.delete(CampaignId::from_raw(42)).unwrap());
    }

    #[test]
    fn delete_cascades_to_children() {
        let db = test_db();
        let campaigns = CampaignRepo::new(db.clone());
        let sessions = SessionRepo::new(db.clone());
        let party = PartyMemberRepo::new(db.clone());
        let npcs = NpcRepo::new(db.clone());

        let id = campaigns.create("Doomed Realm").unwrap();
        let s1 = sessions.create(id, "first night").unwrap();
        let s2 = sessions.create(id, "second night").unwrap();
        let m1 = party
            .create(
                id,
                &PartyMemberFields {
                    name: "Vex".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let n1 = npcs
            .create(
                id,
                &NpcFields {
                    name: "The Warden".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(campaigns.delete(id).unwrap());

        assert!(campaigns.get(id).unwrap().is_none());
        assert!(sessions.get(id, s1).unwrap().is_none());
        assert!(sessions.get(id, s2).unwrap().is_none());
        assert!(party.get(id, m1).unwrap().is_none());
        assert!(npcs.get(id, n1).unwrap().is_none());
    }

    #[test]
    fn delete_leaves_other_campaigns_alone() {
        let db = test_db();
        let campaigns = CampaignRepo::new(db.clone());
        let sessions = SessionRepo::new(db.clone());

        let doomed = campaigns.create("Doomed").unwrap();
        let spared = campaigns.create("Spared").unwrap();
        sessions.create(doomed, "gone").unwrap();
        let kept = sessions.create(spared, "kept").unwrap();

        campaigns.delete(doomed).unwrap();

        assert!(campaigns.get(spared).unwrap().is_some());
        assert!(sessions.get(spared, kept).unwrap().is_some());
    }

    #[test]
    fn last_session_for_missing_campaign_is_none() {
        let repo = CampaignRepo::new(test_db());
        assert!(repo.last_session(CampaignId::from_raw(7)).unwrap().is_none());
    }

    #[test]
    fn last_session_without_sessions_has_null_text() {
        let repo = CampaignRepo::new(test_db());
        let id = repo.create("Fresh Start").unwrap();
        let last = repo.last_session(id).unwrap().unwrap();
        assert_eq!(last.name, "Fresh Start");
        assert_eq!(last.last_session_text, None);
        assert_eq!(last.created_at, None);
    }

    #[test]
    fn last_session_is_highest_id() {
        let db = test_db();
        let campaigns = CampaignRepo::new(db.clone());
        let sessions = SessionRepo::new(db.clone());

        let id = campaigns.create("Ongoing").unwrap();
        sessions.create(id, "opening session").unwrap();
        sessions.create(id, "middle session").unwrap();
        sessions.create(id, "newest session").unwrap();

        let last = campaigns.last_session(id).unwrap().unwrap();
        assert_eq!(last.last_session_text.as_deref(), Some("newest session"));
        assert!(last.created_at.is_some());
    }
}
