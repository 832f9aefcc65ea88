//! User settings: default provider and per-provider stored API keys.

use chrono::Utc;

use stride_core::enums::ProviderKind;

use crate::error::DatabaseError;
use crate::helpers::format_datetime;
use crate::service::StrideService;

const KEY_DEFAULT_PROVIDER: &str = "default_provider";

fn credential_key(provider: ProviderKind) -> String {
    format!("api_key.{}", provider.as_str())
}

impl StrideService {
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT value FROM settings WHERE key = ?1", || [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = format_datetime(Utc::now());
        self.db()
            .execute_with(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                || libsql::params![key, value, now.as_str()],
            )
            .await?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete_setting(&self, key: &str) -> Result<bool, DatabaseError> {
        let removed = self
            .db()
            .execute_with("DELETE FROM settings WHERE key = ?1", || [key])
            .await?;
        Ok(removed > 0)
    }

    /// The user's preferred provider. An unparseable stored value is logged
    /// and treated as unset.
    pub async fn default_provider(&self) -> Result<Option<ProviderKind>, DatabaseError> {
        let Some(raw) = self.get_setting(KEY_DEFAULT_PROVIDER).await? else {
            return Ok(None);
        };
        match raw.parse::<ProviderKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "ignoring invalid default provider setting");
                Ok(None)
            }
        }
    }

    pub async fn set_default_provider(
        &self,
        provider: Option<ProviderKind>,
    ) -> Result<(), DatabaseError> {
        match provider {
            Some(kind) => self.set_setting(KEY_DEFAULT_PROVIDER, kind.as_str()).await,
            None => self.delete_setting(KEY_DEFAULT_PROVIDER).await.map(|_| ()),
        }
    }

    pub async fn stored_credential(
        &self,
        provider: ProviderKind,
    ) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .get_setting(&credential_key(provider))
            .await?
            .filter(|key| !key.trim().is_empty()))
    }

    /// Store (or with `None`, forget) the API key for `provider`.
    pub async fn set_stored_credential(
        &self,
        provider: ProviderKind,
        api_key: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let key = credential_key(provider);
        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(api_key) => self.set_setting(&key, api_key).await,
            None => self.delete_setting(&key).await.map(|_| ()),
        }
    }
}
