use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::ids::{CampaignId, NpcId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// The mutable columns of an NPC. Updates overwrite all of them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcFields {
    pub name: String,
    pub species: Option<String>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcRow {
    pub id: NpcId,
    #[serde(flatten)]
    pub fields: NpcFields,
}

pub struct NpcRepo {
    db: Database,
}

impl NpcRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert an NPC and return its new ID.
    #[instrument(skip(self, fields), fields(campaign_id = %campaign_id, name = %fields.name))]
    pub fn create(&self, campaign_id: CampaignId, fields: &NpcFields) -> Result<NpcId, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO npcs (campaign_id, name, species, gender, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    campaign_id.as_i64(),
                    fields.name,
                    fields.species,
                    fields.gender,
                    fields.notes,
                ],
            )?;
            Ok(NpcId::from_raw(conn.last_insert_rowid()))
        })
    }

    /// Get one NPC scoped to a campaign, or `None`.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, npc_id = %id))]
    pub fn get(&self, campaign_id: CampaignId, id: NpcId) -> Result<Option<NpcRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, species, gender, notes FROM npcs
                 WHERE campaign_id = ?1 AND id = ?2",
            )?;
            let mut rows = stmt.query(rusqlite::params![campaign_id.as_i64(), id.as_i64()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_npc(row)?)),
                None => Ok(None),
            }
        })
    }

    /// List a campaign's NPCs ordered by name.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub fn list(&self, campaign_id: CampaignId) -> Result<Vec<NpcRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, species, gender, notes FROM npcs
                 WHERE campaign_id = ?1
                 ORDER BY name ASC",
            )?;
            let mut rows = stmt.query([campaign_id.as_i64()])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_npc(row)?);
            }
            Ok(results)
        })
    }

    /// Overwrite all mutable columns. Returns whether a row was matched.
    #[instrument(skip(self, fields), fields(campaign_id = %campaign_id, npc_id = %id))]
    pub fn update(
        &self,
        campaign_id: CampaignId,
        id: NpcId,
        fields: &NpcFields,
    ) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE npcs SET name = ?1, species = ?2, gender = ?3, notes = ?4
                 WHERE campaign_id = ?5 AND id = ?6",
                rusqlite::params![
                    fields.name,
                    fields.species,
                    fields.gender,
                    fields.notes,
                    campaign_id.as_i64(),
                    id.as_i64(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete one NPC. Returns whether a row was matched.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, npc_id = %id))]
    pub fn delete(&self, campaign_id: CampaignId, id: NpcId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM npcs WHERE campaign_id = ?1 AND id = ?2",
                rusqlite::params![campaign_id.as_i64(), id.as_i64()],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn row_to_npc(row: &rusqlite::Row<'_>) -> Result<NpcRow, StoreError> {
    Ok(NpcRow {
        id: NpcId::from_raw(row_helpers::get::<i64>(row, 0, "npcs", "id")?),
        fields: NpcFields {
            name: row_helpers::get(row, 1, "npcs", "name")?,
            species: row_helpers::get_opt(row, 2, "npcs", "species")?,
            gender: row_helpers::get_opt(row, 3, "npcs", "gender")?,
            notes: row_helpers::get_opt(row, 4, "npcs", "notes")?,
        },
    })
}
