use serde::{Deserialize, Serialize};
use tracing::instrument;

use plotgod_core::ids::LocationId;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// The mutable columns of a location. Locations are world data shared across
/// campaigns, so there is no owning campaign scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFields {
    pub name: String,
    pub location_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationRow {
    pub id: LocationId,
    #[serde(flatten)]
    pub fields: LocationFields,
}

pub struct LocationRepo {
    db: Database,
}

impl LocationRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a location and return its new ID.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub fn create(&self, fields: &LocationFields) -> Result<LocationId, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO locations (name, location_type, notes) VALUES (?1, ?2, ?3)",
                rusqlite::params![fields.name, fields.location_type, fields.notes],
            )?;
            Ok(LocationId::from_raw(conn.last_insert_rowid()))
        })
    }

    /// Get one location by ID, or `None`.
    #[instrument(skip(self), fields(location_id = %id))]
    pub fn get(&self, id: LocationId) -> Result<Option<LocationRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, location_type, notes FROM locations WHERE id = ?1")?;
            let mut rows = stmt.query([id.as_i64()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_location(row)?)),
                None => Ok(None),
            }
        })
    }

    /// List all locations ordered by name.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<LocationRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, location_type, notes FROM locations ORDER BY name ASC")?;
            let mut rows = stmt.query([])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_location(row)?);
            }
            Ok(results)
        })
    }

    /// Overwrite all mutable columns. Returns whether a row was matched.
    #[instrument(skip(self, fields), fields(location_id = %id))]
    pub fn update(&self, id: LocationId, fields: &LocationFields) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE locations SET name = ?1, location_type = ?2, notes = ?3 WHERE id = ?4",
                rusqlite::params![fields.name, fields.location_type, fields.notes, id.as_i64()],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete one location. Returns whether a row was matched.
    #[instrument(skip(self), fields(location_id = %id))]
    pub fn delete(&self, id: LocationId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM locations WHERE id = ?1", [id.as_i64()])?;
            Ok(deleted > 0)
        })
    }
}

fn row_to_location(row: &rusqlite::Row<'_>) -> Result<LocationRow, StoreError> {
    Ok(LocationRow {
        id: LocationId::from_raw(row_helpers::get::<i64>(row, 0, "locations", "id")?),
        fields: LocationFields {
            name: row_helpers::get(row, 1, "locations", "name")?,
            location_type: row_helpers::get_opt(row, 2, "locations", "location_type")?,
            notes: row_helpers::get_opt(row, 3, "locations", "notes")?,
        },
    })
}
