//! Service layer: the database handle plus the entity schema registry.
//!
//! All repository methods are implemented as `impl StrideService` blocks in
//! `repos/*`.

use std::path::Path;

use stride_schema::SchemaRegistry;

use crate::StrideDb;
use crate::error::DatabaseError;

pub struct StrideService {
    db: StrideDb,
    schema: SchemaRegistry,
}

impl StrideService {
    /// Open (creating if needed) a local database file, or `":memory:"`.
    ///
    /// Missing parent directories of a file path are created.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DatabaseError::Other(anyhow::anyhow!(
                            "cannot create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }
        let db = StrideDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    #[must_use]
    pub fn from_db(db: StrideDb) -> Self {
        Self {
            db,
            schema: SchemaRegistry::new(),
        }
    }

    #[must_use]
    pub const fn db(&self) -> &StrideDb {
        &self.db
    }

    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }
}
