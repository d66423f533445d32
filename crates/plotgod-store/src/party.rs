use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::ids::{CampaignId, PartyMemberId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// The mutable columns of a party member. Updates overwrite all of them;
/// there is no partial patch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMemberFields {
    pub name: String,
    pub player_name: Option<String>,
    pub character_species: Option<String>,
    pub character_class: Option<String>,
    pub level: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartyMemberRow {
    pub id: PartyMemberId,
    #[serde(flatten)]
    pub fields: PartyMemberFields,
}

pub struct PartyMemberRepo {
    db: Database,
}

impl PartyMemberRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a party member and return its new ID.
    #[instrument(skip(self, fields), fields(campaign_id = %campaign_id, name = %fields.name))]
    pub fn create(
        &self,
        campaign_id: CampaignId,
        fields: &PartyMemberFields,
    ) -> Result<PartyMemberId, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO party_member
                     (campaign_id, name, player_name, character_species, character_class, level, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    campaign_id.as_i64(),
                    fields.name,
                    fields.player_name,
                    fields.character_species,
                    fields.character_class,
                    fields.level,
                    fields.notes,
                ],
            )?;
            Ok(PartyMemberId::from_raw(conn.last_insert_rowid()))
        })
    }

    /// Get one party member scoped to a campaign, or `None`.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, member_id = %id))]
    pub fn get(
        &self,
        campaign_id: CampaignId,
        id: PartyMemberId,
    ) -> Result<Option<PartyMemberRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, player_name, character_species, character_class, level, notes
                 FROM party_member
                 WHERE campaign_id = ?1 AND id = ?2",
            )?;
            let mut rows = stmt.query(rusqlite::params![campaign_id.as_i64(), id.as_i64()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_member(row)?)),
                None => Ok(None),
            }
        })
    }

    /// List a campaign's party members ordered by name.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub fn list(&self, campaign_id: CampaignId) -> Result<Vec<PartyMemberRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, player_name, character_species, character_class, level, notes
                 FROM party_member
                 WHERE campaign_id = ?1
                 ORDER BY name ASC",
            )?;
            let mut rows = stmt.query([campaign_id.as_i64()])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_member(row)?);
            }
            Ok(results)
        })
    }

    /// Overwrite all mutable columns. Returns whether a row was matched.
    #[instrument(skip(self, fields), fields(campaign_id = %campaign_id, member_id = %id))]
    pub fn update(
        &self,
        campaign_id: CampaignId,
        id: PartyMemberId,
        fields: &PartyMemberFields,
    ) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE party_member SET
                     name = ?1,
                     player_name = ?2,
                     character_species = ?3,
                     character_class = ?4,
                     level = ?5,
                     notes = ?6
                 WHERE campaign_id = ?7 AND id = ?8",
                rusqlite::params![
                    fields.name,
                    fields.player_name,
                    fields.character_species,
                    fields.character_class,
                    fields.level,
                    fields.notes,
                    campaign_id.as_i64(),
                    id.as_i64(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete one party member. Returns whether a row was matched.
    #[instrument(skip(self), fields(campaign_id = %campaign_id, member_id = %id))]
    pub fn delete(&self, campaign_id: CampaignId, id: PartyMemberId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM party_member WHERE campaign_id = ?1 AND id = ?2",
                rusqlite::params![campaign_id.as_i64(), id.as_i64()],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn row_to_member(row: &rusqlite::Row<'_>) -> Result<PartyMemberRow, StoreError> {
    Ok(PartyMemberRow {
        id: PartyMemberId::from_raw(row_helpers::get::<i64>(row, 0, "party_member", "id")?),
        fields: PartyMemberFields {
            name: row_helpers::get(row, 1, "party_member", "name")?,
            player_name: row_helpers::get_opt(row, 2, "party_member", "player_name")?,
            character_species: row_helpers::get_opt(row, 3, "party_member", "character_species")?,
            character_class: row_helpers::get_opt(row, 4, "party_member", "character_class")?,
            level: row_helpers::get_opt(row, 5, "party_member", "level")?,
            notes: row_helpers::get_opt(row, 6, "party_member", "notes")?,
        },
    })
}
