//! Daily activity aggregation.
//!
//! One row per (UTC day, goal) holding the highest level seen. The upsert is
//! guarded in SQL (`WHERE excluded.rank > daily_activity.rank`) so the level
//! can only rise no matter how many writers race or in what order
//! interpretations land.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use stride_core::entities::{DailyActivityRecord, utc_day};
use stride_core::enums::ActivityLevel;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_date, parse_datetime, parse_enum};
use crate::service::StrideService;

/// Per-goal outcome of one [`StrideService::merge_day`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Goals with no record for the day before this merge.
    pub inserted: Vec<String>,
    /// Goals whose level rose.
    pub raised: Vec<String>,
    /// Goals already at an equal or higher level.
    pub unchanged: Vec<String>,
    /// Goals whose write failed; other goals are unaffected.
    pub failed: Vec<String>,
}

impl MergeReport {
    #[must_use]
    pub fn changed(&self) -> usize {
        self.inserted.len() + self.raised.len()
    }
}

enum MergeOutcome {
    Inserted,
    Raised,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct DailyActivityFilter {
    pub goal_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

fn row_to_record(row: &libsql::Row) -> Result<DailyActivityRecord, DatabaseError> {
    Ok(DailyActivityRecord {
        day: parse_date(&row.get::<String>(0)?)?,
        goal_id: row.get::<String>(1)?,
        level: parse_enum(&row.get::<String>(2)?)?,
        interpretation_id: get_opt_string(row, 3)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl StrideService {
    /// Merge detected levels into the records for the UTC day containing `at`.
    ///
    /// `none` levels are skipped. Each goal is written independently: a
    /// failure for one goal is logged and reported without aborting the rest.
    pub async fn merge_day(
        &self,
        at: DateTime<Utc>,
        levels: &BTreeMap<String, ActivityLevel>,
        interpretation_id: Option<&str>,
    ) -> MergeReport {
        let day = utc_day(at).to_string();
        let mut report = MergeReport::default();

        for (goal_id, level) in levels.iter().filter(|(_, l)| l.is_detected()) {
            match self.merge_goal(&day, goal_id, *level, interpretation_id).await {
                Ok(MergeOutcome::Inserted) => report.inserted.push(goal_id.clone()),
                Ok(MergeOutcome::Raised) => report.raised.push(goal_id.clone()),
                Ok(MergeOutcome::Unchanged) => report.unchanged.push(goal_id.clone()),
                Err(e) => {
                    tracing::warn!(%day, goal_id = %goal_id, error = %e, "daily activity merge failed");
                    report.failed.push(goal_id.clone());
                }
            }
        }
        report
    }

    async fn merge_goal(
        &self,
        day: &str,
        goal_id: &str,
        level: ActivityLevel,
        interpretation_id: Option<&str>,
    ) -> Result<MergeOutcome, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT rank FROM daily_activity WHERE day = ?1 AND goal_id = ?2",
                || [day, goal_id],
            )
            .await?;
        let prior = match rows.next().await? {
            Some(row) => Some(row.get::<i64>(0)?),
            None => None,
        };

        let now = format_datetime(Utc::now());
        let written = self
            .db()
            .execute_with(
                "INSERT INTO daily_activity (day, goal_id, level, rank, interpretation_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(day, goal_id) DO UPDATE SET
                     level = excluded.level,
                     rank = excluded.rank,
                     interpretation_id = excluded.interpretation_id,
                     updated_at = excluded.updated_at
                 WHERE excluded.rank > daily_activity.rank",
                || {
                    libsql::params![
                        day,
                        goal_id,
                        level.as_str(),
                        level.rank(),
                        interpretation_id,
                        now.as_str()
                    ]
                },
            )
            .await?;

        Ok(match (written, prior) {
            (0, _) => MergeOutcome::Unchanged,
            (_, None) => MergeOutcome::Inserted,
            (_, Some(_)) => MergeOutcome::Raised,
        })
    }

    /// Daily records, newest day first.
    pub async fn list_daily_activity(
        &self,
        filter: &DailyActivityFilter,
    ) -> Result<Vec<DailyActivityRecord>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref goal_id) = filter.goal_id {
            params.push(libsql::Value::Text(goal_id.clone()));
            conditions.push(format!("goal_id = ?{}", params.len()));
        }
        if let Some(from) = filter.from {
            params.push(libsql::Value::Text(from.to_string()));
            conditions.push(format!("day >= ?{}", params.len()));
        }
        if let Some(to) = filter.to {
            params.push(libsql::Value::Text(to.to_string()));
            conditions.push(format!("day <= ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT day, goal_id, level, interpretation_id, updated_at
             FROM daily_activity {where_clause}
             ORDER BY day DESC, goal_id LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// The record for one goal on one day, if any activity was detected.
    pub async fn daily_activity_for(
        &self,
        day: NaiveDate,
        goal_id: &str,
    ) -> Result<Option<DailyActivityRecord>, DatabaseError> {
        let day = day.to_string();
        let mut rows = self
            .db()
            .query_with(
                "SELECT day, goal_id, level, interpretation_id, updated_at
                 FROM daily_activity WHERE day = ?1 AND goal_id = ?2",
                || [day.as_str(), goal_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{at, seed_goal, test_service};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use ActivityLevel::{Full, None as Nothing, Partial};

    fn levels(pairs: &[(&str, ActivityLevel)]) -> BTreeMap<String, ActivityLevel> {
        pairs.iter().map(|(g, l)| ((*g).to_string(), *l)).collect()
    }

    #[tokio::test]
    async fn lower_level_never_overwrites_higher() {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "French").await;
        let d = at(2026, 3, 14, 8);

        let first = svc.merge_day(d, &levels(&[(g1.as_str(), Full)]), None).await;
        assert_eq!(first.inserted, vec![g1.clone()]);

        let second = svc.merge_day(d, &levels(&[(g1.as_str(), Partial)]), None).await;
        assert_eq!(second.unchanged, vec![g1.clone()]);

        let record = svc
            .daily_activity_for(utc_day(d), &g1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.level, Full);
    }

    #[rstest]
    #[case(&[Partial, Full])]
    #[case(&[Full, Partial])]
    #[case(&[Partial, Partial, Full, Partial])]
    #[case(&[Full, Full])]
    #[tokio::test]
    async fn final_level_is_maximum_in_any_order(#[case] sequence: &[ActivityLevel]) {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "Running").await;
        for (hour, level) in (8..).zip(sequence) {
            svc.merge_day(at(2026, 3, 14, hour), &levels(&[(g1.as_str(), *level)]), None)
                .await;
        }
        let expected = sequence.iter().copied().max().unwrap();
        let record = svc
            .daily_activity_for(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), &g1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.level, expected);
    }

    #[tokio::test]
    async fn none_levels_write_nothing() {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "Piano").await;
        let report = svc
            .merge_day(at(2026, 3, 14, 8), &levels(&[(g1.as_str(), Nothing)]), None)
            .await;
        assert_eq!(report, MergeReport::default());
        assert!(
            svc.list_daily_activity(&DailyActivityFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn raise_records_setting_interpretation() {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "French").await;
        svc.insert_entry("x", &[], Some("k1"), at(2026, 3, 14, 8)).await.unwrap();
        let int = svc
            .insert_interpretation(crate::repos::interpretations::InterpretationDraft::neutral("k1"))
            .await
            .unwrap();

        svc.merge_day(at(2026, 3, 14, 8), &levels(&[(g1.as_str(), Partial)]), None).await;
        let report = svc
            .merge_day(at(2026, 3, 14, 20), &levels(&[(g1.as_str(), Full)]), Some(int.id.as_str()))
            .await;
        assert_eq!(report.raised, vec![g1.clone()]);

        let record = svc
            .daily_activity_for(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), &g1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.interpretation_id.as_deref(), Some(int.id.as_str()));
    }

    #[tokio::test]
    async fn one_failing_goal_does_not_block_others() {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "French").await;
        let report = svc
            .merge_day(
                at(2026, 3, 14, 8),
                &levels(&[(g1.as_str(), Full), ("gol-deleted", Partial)]),
                None,
            )
            .await;
        assert_eq!(report.inserted, vec![g1]);
        assert_eq!(report.failed, vec!["gol-deleted".to_string()]);
        assert_eq!(report.changed(), 1);
    }

    #[tokio::test]
    async fn days_are_utc_and_filterable() {
        let svc = test_service().await;
        let g1 = seed_goal(&svc, "French").await;
        let g2 = seed_goal(&svc, "Running").await;
        svc.merge_day(at(2026, 3, 13, 23), &levels(&[(g1.as_str(), Partial)]), None).await;
        svc.merge_day(at(2026, 3, 14, 0), &levels(&[(g1.as_str(), Full), (g2.as_str(), Full)]), None).await;

        let all = svc
            .list_daily_activity(&DailyActivityFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].day, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());

        let only_g1 = svc
            .list_daily_activity(&DailyActivityFilter {
                goal_id: Some(g1.clone()),
                to: NaiveDate::from_ymd_opt(2026, 3, 13),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(only_g1.len(), 1);
        assert_eq!(only_g1[0].level, Partial);
    }
}
