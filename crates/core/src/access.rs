//! Identity resolution and update authorization
//!
//! The gateway runs as a single configured operator. That identity is
//! resolved against the remote store's User object exactly once per process
//! and cached; resolution failure fails closed (privileged paths abort with
//! an identity error, never escalate to administrator).
//!
//! Update authorization is ownership-gated: administrators (and the
//! optional configured manager) may update any record; standard callers may
//! update only records whose assigned-CDE field matches their resolved user
//! id, which costs one extra read before every standard-role update.
//!
//! Create, query, get, and log-hours are intentionally unrestricted by this
//! component; the asymmetry is part of the system design, not an oversight.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use trackgate_domain::constants::{ADMIN_PROFILE_NAME, FIELD_CDE, SOBJECT_IMPLEMENTATION};
use trackgate_domain::{GatewayError, ResolvedUser, Result, Role, SalesforceConfig};

use crate::ports::RecordStore;
use crate::queries::escape_soql_literal;

/// Resolves the caller's role and enforces record-level update access
pub struct AccessControl {
    store: Arc<dyn RecordStore>,
    user_email: String,
    is_manager: bool,
    resolved: RwLock<Option<ResolvedUser>>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn RecordStore>, config: &SalesforceConfig) -> Self {
        let user_email = config.user_email.trim().to_lowercase();
        let is_manager = config.is_manager(&user_email);
        Self { store, user_email, is_manager, resolved: RwLock::new(None) }
    }

    /// The normalized email this gateway acts as
    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    /// Resolve the configured email to a user id and role, cached for the
    /// process lifetime.
    ///
    /// # Errors
    /// Returns [`GatewayError::Identity`] when no active user matches the
    /// email or the lookup itself fails; callers must treat that as
    /// unauthorized for privileged paths.
    pub async fn resolve(&self) -> Result<ResolvedUser> {
        if let Some(user) = self.resolved.read().await.as_ref() {
            return Ok(user.clone());
        }

        let mut slot = self.resolved.write().await;
        // Another caller may have resolved while we waited for the lock
        if let Some(user) = slot.as_ref() {
            return Ok(user.clone());
        }

        let soql = format!(
            "SELECT Id, Profile.Name FROM User WHERE Email = '{}' AND IsActive = true LIMIT 1",
            escape_soql_literal(&self.user_email)
        );
        let result = self.store.query(&soql).await.map_err(|e| {
            GatewayError::Identity(format!("failed to look up user {}: {e}", self.user_email))
        })?;

        let Some(record) = result.records.first() else {
            return Err(GatewayError::Identity(format!(
                "no active user found for email: {}",
                self.user_email
            )));
        };

        let user_id = record
            .get("Id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::Identity("user record missing Id".into()))?
            .to_string();
        let profile_name = record
            .get("Profile")
            .and_then(|v| v.get("Name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let role = if profile_name == ADMIN_PROFILE_NAME {
            Role::Administrator
        } else {
            Role::Standard
        };

        let user = ResolvedUser { user_id, profile_name, role };
        info!(
            email = %self.user_email,
            user_id = %user.user_id,
            role = ?user.role,
            manager = self.is_manager,
            "resolved caller identity"
        );
        *slot = Some(user.clone());
        Ok(user)
    }

    /// The caller's cached role, resolving on first use
    pub async fn role(&self) -> Result<Role> {
        Ok(self.resolve().await?.role)
    }

    /// Decide whether the caller may update the given implementation.
    ///
    /// Administrators and the configured manager are authorized
    /// unconditionally. Standard callers require the record's ownership
    /// field to equal their resolved user id; an empty ownership field is a
    /// denial. The denial message never includes field values.
    ///
    /// # Errors
    /// [`GatewayError::Authorization`] on denial,
    /// [`GatewayError::NotFound`] when the record does not exist (a distinct
    /// outcome), [`GatewayError::Identity`] when the caller is unresolved.
    pub async fn authorize_update(&self, record_id: &str) -> Result<()> {
        let user = self.resolve().await?;
        if user.role.is_admin() || self.is_manager {
            return Ok(());
        }

        let record = self
            .store
            .get_record(SOBJECT_IMPLEMENTATION, record_id, Some(&[FIELD_CDE]))
            .await?;
        let owner = record.get(FIELD_CDE).and_then(|v| v.as_str()).unwrap_or_default();

        if !owner.is_empty() && owner == user.user_id {
            Ok(())
        } else {
            Err(GatewayError::Authorization(
                "you are not the assigned CDE on this record; only the assigned CDE, \
                 an administrator, or the manager can update it"
                    .into(),
            ))
        }
    }
}
