//! Goal and phase repository.
//!
//! Goals are never deleted: deactivating one removes it from analysis while
//! keeping its daily activity history intact.

use chrono::{NaiveDate, Utc};

use stride_core::entities::{ActiveGoal, Goal, Phase};
use stride_core::enums::PhaseIntensity;
use stride_core::errors::CoreError;
use stride_core::ids::{PREFIX_GOAL, PREFIX_PHASE};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_date};
use crate::service::StrideService;

const GOAL_COLUMNS: &str = "id, name, description, active, created_at";
const PHASE_COLUMNS: &str =
    "id, goal_id, name, intensity, frequency, starts_on, ends_on, created_at";

fn row_to_goal(row: &libsql::Row) -> Result<Goal, DatabaseError> {
    Ok(Goal {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        description: get_opt_string(row, 2)?,
        active: row.get::<i64>(3)? != 0,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_phase(row: &libsql::Row) -> Result<Phase, DatabaseError> {
    Ok(Phase {
        id: row.get::<String>(0)?,
        goal_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        intensity: parse_enum(&row.get::<String>(3)?)?,
        frequency: get_opt_string(row, 4)?,
        starts_on: parse_date(&row.get::<String>(5)?)?,
        ends_on: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Arguments for [`StrideService::start_phase`].
#[derive(Debug, Clone)]
pub struct NewPhase<'a> {
    pub goal_id: &'a str,
    pub name: &'a str,
    pub intensity: PhaseIntensity,
    pub frequency: Option<&'a str>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
}

impl StrideService {
    /// Create an active goal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name.
    pub async fn create_goal(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Goal, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("goal name must not be empty".into()).into());
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_GOAL).await?;

        self.db()
            .execute_with(
                "INSERT INTO goals (id, name, description, active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                || libsql::params![id.as_str(), name, description, format_datetime(now)],
            )
            .await?;

        Ok(Goal {
            id,
            name: name.to_string(),
            description: description.map(String::from),
            active: true,
            created_at: now,
        })
    }

    pub async fn get_goal(&self, id: &str) -> Result<Goal, DatabaseError> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "goal",
            id: id.to_string(),
        })?;
        row_to_goal(&row)
    }

    pub async fn list_goals(&self, include_inactive: bool) -> Result<Vec<Goal>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals {filter} ORDER BY created_at, id");
        let mut rows = self.db().query_with(&sql, || ()).await?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next().await? {
            goals.push(row_to_goal(&row)?);
        }
        Ok(goals)
    }

    /// Activate or deactivate a goal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the goal does not exist.
    pub async fn set_goal_active(&self, id: &str, active: bool) -> Result<Goal, DatabaseError> {
        let changed = self
            .db()
            .execute_with("UPDATE goals SET active = ?1 WHERE id = ?2", || {
                libsql::params![i64::from(active), id]
            })
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "goal",
                id: id.to_string(),
            });
        }
        tracing::debug!(goal_id = id, active, "goal activation changed");
        self.get_goal(id).await
    }

    /// Start a phase for an existing goal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown goal and
    /// `DatabaseError::Validation` for a blank name or an inverted range.
    pub async fn start_phase(&self, phase: NewPhase<'_>) -> Result<Phase, DatabaseError> {
        let name = phase.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("phase name must not be empty".into()).into());
        }
        if phase.ends_on.is_some_and(|end| end < phase.starts_on) {
            return Err(CoreError::Validation("phase ends before it starts".into()).into());
        }
        self.get_goal(phase.goal_id).await?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PHASE).await?;
        let starts_on = phase.starts_on.to_string();
        let ends_on = phase.ends_on.map(|d| d.to_string());

        self.db()
            .execute_with(
                "INSERT INTO phases (id, goal_id, name, intensity, frequency, starts_on, ends_on, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                || {
                    libsql::params![
                        id.as_str(),
                        phase.goal_id,
                        name,
                        phase.intensity.as_str(),
                        phase.frequency,
                        starts_on.as_str(),
                        ends_on.as_deref(),
                        format_datetime(now)
                    ]
                },
            )
            .await?;

        Ok(Phase {
            id,
            goal_id: phase.goal_id.to_string(),
            name: name.to_string(),
            intensity: phase.intensity,
            frequency: phase.frequency.map(String::from),
            starts_on: phase.starts_on,
            ends_on: phase.ends_on,
            created_at: now,
        })
    }

    /// Phases of a goal, most recently started first.
    pub async fn list_phases(&self, goal_id: &str) -> Result<Vec<Phase>, DatabaseError> {
        let sql = format!(
            "SELECT {PHASE_COLUMNS} FROM phases WHERE goal_id = ?1
             ORDER BY starts_on DESC, created_at DESC"
        );
        let mut rows = self.db().query_with(&sql, || [goal_id]).await?;
        let mut phases = Vec::new();
        while let Some(row) = rows.next().await? {
            phases.push(row_to_phase(&row)?);
        }
        Ok(phases)
    }

    /// Active goals, each with the most recent phase covering `today`.
    pub async fn active_goals(&self, today: NaiveDate) -> Result<Vec<ActiveGoal>, DatabaseError> {
        let goals = self.list_goals(false).await?;
        let day = today.to_string();
        let sql = format!(
            "SELECT {PHASE_COLUMNS} FROM phases
             WHERE goal_id = ?1 AND starts_on <= ?2 AND (ends_on IS NULL OR ends_on >= ?2)
             ORDER BY starts_on DESC, created_at DESC LIMIT 1"
        );

        let mut active = Vec::with_capacity(goals.len());
        for goal in goals {
            let mut rows = self
                .db()
                .query_with(&sql, || libsql::params![goal.id.as_str(), day.as_str()])
                .await?;
            let phase = match rows.next().await? {
                Some(row) => Some(row_to_phase(&row)?),
                None => None,
            };
            active.push(ActiveGoal { goal, phase });
        }
        Ok(active)
    }
}
