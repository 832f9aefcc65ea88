//! Interpretation repository. Append-only; the newest row per entry wins.

use std::collections::BTreeMap;

use chrono::Utc;

use stride_core::entities::{Interpretation, Reframe};
use stride_core::enums::{ActivityLevel, MomentumSignal, ProviderKind};
use stride_core::ids::PREFIX_INTERPRETATION;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, parse_datetime, parse_enum, parse_json, parse_optional_json,
    to_json,
};
use crate::service::StrideService;

pub(crate) const INTERPRETATION_COLUMNS: &str = "i.id, i.entry_id, i.provider, i.model, \
     i.goal_activity, i.momentum, i.risk_flags, i.suggestion, i.reframe, i.created_at";

/// Map interpretation columns starting at `offset`.
pub(crate) fn row_to_interpretation(
    row: &libsql::Row,
    offset: i32,
) -> Result<Interpretation, DatabaseError> {
    let provider = get_opt_string(row, offset + 2)?
        .map(|p| parse_enum::<ProviderKind>(&p))
        .transpose()?;
    Ok(Interpretation {
        id: row.get::<String>(offset)?,
        entry_id: row.get::<String>(offset + 1)?,
        provider,
        model: get_opt_string(row, offset + 3)?,
        goal_activity: parse_json(&row.get::<String>(offset + 4)?)?,
        momentum: parse_enum(&row.get::<String>(offset + 5)?)?,
        risk_flags: parse_json(&row.get::<String>(offset + 6)?)?,
        suggestion: get_opt_string(row, offset + 7)?,
        reframe: parse_optional_json(get_opt_string(row, offset + 8)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(offset + 9)?)?,
    })
}

/// Everything an interpretation carries except its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretationDraft {
    pub entry_id: String,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub goal_activity: BTreeMap<String, ActivityLevel>,
    pub momentum: MomentumSignal,
    pub risk_flags: Vec<String>,
    pub suggestion: Option<String>,
    pub reframe: Option<Reframe>,
}

impl InterpretationDraft {
    /// The neutral result recorded when no goal is active.
    #[must_use]
    pub fn neutral(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            provider: None,
            model: None,
            goal_activity: BTreeMap::new(),
            momentum: MomentumSignal::None,
            risk_flags: Vec::new(),
            suggestion: None,
            reframe: None,
        }
    }
}

impl StrideService {
    /// Persist a new interpretation for an existing entry.
    ///
    /// The row is checked against the registered `interpretation` schema
    /// before insert.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the entry does not exist and
    /// `DatabaseError::Validation` if the row fails the schema check.
    pub async fn insert_interpretation(
        &self,
        draft: InterpretationDraft,
    ) -> Result<Interpretation, DatabaseError> {
        self.get_entry(&draft.entry_id).await?;

        let interpretation = Interpretation {
            id: self.db().generate_id(PREFIX_INTERPRETATION).await?,
            entry_id: draft.entry_id,
            provider: draft.provider,
            model: draft.model,
            goal_activity: draft.goal_activity,
            momentum: draft.momentum,
            risk_flags: draft.risk_flags,
            suggestion: draft.suggestion,
            reframe: draft.reframe,
            created_at: Utc::now(),
        };

        let as_json =
            serde_json::to_value(&interpretation).map_err(|e| DatabaseError::Other(e.into()))?;
        self.schema().validate("interpretation", &as_json)?;

        let goal_activity = to_json(&interpretation.goal_activity)?;
        let risk_flags = to_json(&interpretation.risk_flags)?;
        let reframe = interpretation.reframe.as_ref().map(to_json).transpose()?;
        let created_at = format_datetime(interpretation.created_at);

        self.db()
            .execute_with(
                "INSERT INTO interpretations
                 (id, entry_id, provider, model, goal_activity, momentum, risk_flags, suggestion, reframe, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                || {
                    libsql::params![
                        interpretation.id.as_str(),
                        interpretation.entry_id.as_str(),
                        interpretation.provider.map(ProviderKind::as_str),
                        interpretation.model.as_deref(),
                        goal_activity.as_str(),
                        interpretation.momentum.as_str(),
                        risk_flags.as_str(),
                        interpretation.suggestion.as_deref(),
                        reframe.as_deref(),
                        created_at.as_str()
                    ]
                },
            )
            .await?;

        tracing::debug!(
            entry_id = %interpretation.entry_id,
            interpretation_id = %interpretation.id,
            "interpretation stored"
        );
        Ok(interpretation)
    }

    /// All interpretations of an entry, newest first.
    pub async fn list_interpretations(
        &self,
        entry_id: &str,
    ) -> Result<Vec<Interpretation>, DatabaseError> {
        let sql = format!(
            "SELECT {INTERPRETATION_COLUMNS} FROM interpretations i
             WHERE i.entry_id = ?1 ORDER BY i.created_at DESC, i.rowid DESC"
        );
        let mut rows = self.db().query_with(&sql, || [entry_id]).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_interpretation(&row, 0)?);
        }
        Ok(out)
    }

    /// The authoritative interpretation of an entry, if any.
    pub async fn latest_interpretation(
        &self,
        entry_id: &str,
    ) -> Result<Option<Interpretation>, DatabaseError> {
        let sql = format!(
            "SELECT {INTERPRETATION_COLUMNS} FROM interpretations i
             WHERE i.entry_id = ?1 ORDER BY i.created_at DESC, i.rowid DESC LIMIT 1"
        );
        let mut rows = self.db().query_with(&sql, || [entry_id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_interpretation(&row, 0)?)),
            None => Ok(None),
        }
    }
}
