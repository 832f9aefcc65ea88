//! Entry repository: idempotent append-only ingestion and read paths.

use chrono::{DateTime, NaiveDate, Utc};

use stride_core::entities::Entry;
use stride_core::ids::PREFIX_ENTRY;
use stride_core::responses::{EntryDetail, EntryWithLatest};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, parse_datetime, parse_json, to_json};
use crate::repos::interpretations::{INTERPRETATION_COLUMNS, row_to_interpretation};
use crate::service::StrideService;

const ENTRY_COLUMNS: &str = "e.id, e.text, e.linked_goal_ids, e.created_at";
const ENTRY_COLUMN_COUNT: i32 = 4;

pub(crate) fn row_to_entry(row: &libsql::Row) -> Result<Entry, DatabaseError> {
    Ok(Entry {
        id: row.get::<String>(0)?,
        text: row.get::<String>(1)?,
        linked_goal_ids: parse_json(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

/// Filter for [`StrideService::list_entries`]. Dates are inclusive UTC days.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Entries linked to this goal, or whose interpretations detected
    /// activity for it.
    pub goal_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// Attempts at finding an unused generated entry id.
const MAX_ID_ATTEMPTS: u32 = 5;

impl StrideService {
    /// Insert an entry, deduplicating on `idempotency_key`.
    ///
    /// With `idempotency_key` the key is the row id and a repeated key
    /// returns the existing row unchanged. Otherwise an `ent-xxxxxxxx` id is
    /// generated, and regenerated if it collides with a stored entry.
    /// Returns the stored entry and whether this call created it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for blank text or an unusable key.
    pub async fn insert_entry(
        &self,
        text: &str,
        linked_goal_ids: &[String],
        idempotency_key: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<(Entry, bool), DatabaseError> {
        Entry::validate_text(text)?;
        if let Some(key) = idempotency_key {
            Entry::validate_idempotency_key(key)?;
        }

        let mut goals: Vec<String> = linked_goal_ids.to_vec();
        goals.sort();
        goals.dedup();
        let goals_json = to_json(&goals)?;

        let id = match idempotency_key {
            Some(key) => {
                if self.insert_entry_row(key, text, &goals_json, created_at).await? == 0 {
                    tracing::debug!(entry_id = %key, "duplicate idempotency key, returning stored entry");
                    return Ok((self.get_entry(key).await?, false));
                }
                key.to_string()
            }
            None => {
                let db = self.db();
                self.insert_with_generated_id(text, &goals_json, created_at, move || {
                    db.generate_id(PREFIX_ENTRY)
                })
                .await?
            }
        };

        Ok((
            Entry {
                id,
                text: text.to_string(),
                linked_goal_ids: goals,
                created_at,
            },
            true,
        ))
    }

    /// Returns the number of rows written: 0 when `id` is already taken.
    async fn insert_entry_row(
        &self,
        id: &str,
        text: &str,
        goals_json: &str,
        created_at: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        self.db()
            .execute_with(
                "INSERT INTO entries (id, text, linked_goal_ids, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING",
                || libsql::params![id, text, goals_json, format_datetime(created_at)],
            )
            .await
    }

    async fn insert_with_generated_id<F, Fut>(
        &self,
        text: &str,
        goals_json: &str,
        created_at: DateTime<Utc>,
        mut next_id: F,
    ) -> Result<String, DatabaseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, DatabaseError>>,
    {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = next_id().await?;
            if self.insert_entry_row(&id, text, goals_json, created_at).await? > 0 {
                return Ok(id);
            }
            tracing::warn!(entry_id = %id, attempt, "generated entry id already taken, regenerating");
        }
        Err(DatabaseError::Query(format!(
            "no unused entry id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    pub async fn get_entry(&self, id: &str) -> Result<Entry, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries e WHERE e.id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "entry",
            id: id.to_string(),
        })?;
        row_to_entry(&row)
    }

    /// An entry with every interpretation, newest first.
    pub async fn get_entry_detail(&self, id: &str) -> Result<EntryDetail, DatabaseError> {
        let entry = self.get_entry(id).await?;
        let interpretations = self.list_interpretations(id).await?;
        Ok(EntryDetail {
            entry,
            interpretations,
        })
    }

    /// Entries newest first, each joined with its latest interpretation.
    pub async fn list_entries(
        &self,
        filter: &EntryFilter,
    ) -> Result<Vec<EntryWithLatest>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref goal_id) = filter.goal_id {
            params.push(libsql::Value::Text(goal_id.clone()));
            let n = params.len();
            conditions.push(format!(
                "(EXISTS (SELECT 1 FROM json_each(e.linked_goal_ids) WHERE value = ?{n})
                  OR EXISTS (SELECT 1 FROM interpretations gi, json_each(gi.goal_activity) ga
                             WHERE gi.entry_id = e.id AND ga.key = ?{n} AND ga.value != 'none'))"
            ));
        }
        if let Some(from) = filter.from {
            params.push(libsql::Value::Text(from.to_string()));
            conditions.push(format!("substr(e.created_at, 1, 10) >= ?{}", params.len()));
        }
        if let Some(to) = filter.to {
            params.push(libsql::Value::Text(to.to_string()));
            conditions.push(format!("substr(e.created_at, 1, 10) <= ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(20);
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}, {INTERPRETATION_COLUMNS}
             FROM entries e
             LEFT JOIN interpretations i ON i.id = (
                 SELECT li.id FROM interpretations li WHERE li.entry_id = e.id
                 ORDER BY li.created_at DESC, li.rowid DESC LIMIT 1)
             {where_clause}
             ORDER BY e.created_at DESC, e.rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            let entry = row_to_entry(&row)?;
            let latest = if row.get::<Option<String>>(ENTRY_COLUMN_COUNT)?.is_some() {
                Some(row_to_interpretation(&row, ENTRY_COLUMN_COUNT)?)
            } else {
                None
            };
            entries.push(EntryWithLatest { entry, latest });
        }
        Ok(entries)
    }

    /// Entries with zero interpretations, oldest first.
    ///
    /// This is the recovery path for jobs lost on restart or dropped after
    /// exhausting their attempts.
    pub async fn list_pending(&self, limit: u32) -> Result<Vec<Entry>, DatabaseError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries e
             WHERE NOT EXISTS (SELECT 1 FROM interpretations i WHERE i.entry_id = e.id)
             ORDER BY e.created_at ASC, e.rowid ASC LIMIT {limit}"
        );
        let mut rows = self.db().query_with(&sql, || ()).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{at, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn generated_id_when_no_key() {
        let svc = test_service().await;
        let (entry, created) = svc
            .insert_entry("Ran 5k", &[], None, at(2026, 3, 14, 8))
            .await
            .unwrap();
        assert!(created);
        assert!(entry.id.starts_with("ent-"));
        assert_eq!(svc.get_entry(&entry.id).await.unwrap(), entry);
    }

    fn scripted_ids(ids: &[&str]) -> impl FnMut() -> std::future::Ready<Result<String, DatabaseError>> {
        let mut ids: std::collections::VecDeque<String> =
            ids.iter().map(|id| (*id).to_string()).collect();
        move || std::future::ready(ids.pop_front().ok_or(DatabaseError::NoResult))
    }

    #[tokio::test]
    async fn generated_id_collision_picks_a_fresh_id() {
        let svc = test_service().await;
        let (existing, _) = svc
            .insert_entry("first entry", &[], None, at(2026, 3, 14, 8))
            .await
            .unwrap();

        let (entry, created) = svc
            .insert_entry("second entry", &[], None, at(2026, 3, 14, 9))
            .await
            .unwrap();
        assert!(created);
        assert_ne!(entry.id, existing.id);

        let id = svc
            .insert_with_generated_id(
                "third entry",
                "[]",
                at(2026, 3, 14, 10),
                scripted_ids(&[existing.id.as_str(), "ent-0000beef"]),
            )
            .await
            .unwrap();
        assert_eq!(id, "ent-0000beef");
        assert_eq!(svc.get_entry(&existing.id).await.unwrap().text, "first entry");
        assert_eq!(svc.get_entry("ent-0000beef").await.unwrap().text, "third entry");
        assert_eq!(svc.list_entries(&EntryFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generated_id_gives_up_when_every_candidate_is_taken() {
        let svc = test_service().await;
        let (existing, _) = svc
            .insert_entry("only entry", &[], None, at(2026, 3, 14, 8))
            .await
            .unwrap();
        let taken = [existing.id.as_str(); 5];

        let err = svc
            .insert_with_generated_id("lost", "[]", at(2026, 3, 14, 9), scripted_ids(&taken))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Query(_)));
        assert_eq!(svc.list_entries(&EntryFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_key_returns_original_row() {
        let svc = test_service().await;
        let (first, created) = svc
            .insert_entry("Did 30 min French today", &[], Some("k1"), at(2026, 3, 14, 8))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(first.id, "k1");

        let (second, created) = svc
            .insert_entry("different text", &[], Some("k1"), at(2026, 3, 14, 9))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second, first);
        assert_eq!(svc.list_entries(&EntryFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_text_never_reaches_sql() {
        let svc = test_service().await;
        let err = svc
            .insert_entry("   ", &[], Some("k2"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let svc = test_service().await;
        let err = svc.get_entry("nope").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "entry", .. }));
    }

    #[tokio::test]
    async fn list_filters_by_day_range_and_linked_goal() {
        let svc = test_service().await;
        let goals = vec!["gol-french".to_string()];
        svc.insert_entry("a", &goals, None, at(2026, 3, 12, 10)).await.unwrap();
        svc.insert_entry("b", &[], None, at(2026, 3, 13, 10)).await.unwrap();
        svc.insert_entry("c", &goals, None, at(2026, 3, 14, 23)).await.unwrap();

        let all = svc.list_entries(&EntryFilter::default()).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|e| e.entry.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "b", "a"]);
        assert!(all.iter().all(|e| e.latest.is_none()));

        let ranged = svc
            .list_entries(&EntryFilter {
                from: NaiveDate::from_ymd_opt(2026, 3, 13),
                to: NaiveDate::from_ymd_opt(2026, 3, 14),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let linked = svc
            .list_entries(&EntryFilter {
                goal_id: Some("gol-french".into()),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].entry.text, "c");
    }

    #[tokio::test]
    async fn pending_lists_oldest_first() {
        let svc = test_service().await;
        svc.insert_entry("newer", &[], Some("n"), at(2026, 3, 14, 9)).await.unwrap();
        svc.insert_entry("older", &[], Some("o"), at(2026, 3, 13, 9)).await.unwrap();

        let pending = svc.list_pending(10).await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["o", "n"]);
        assert_eq!(svc.list_pending(1).await.unwrap().len(), 1);
    }
}
