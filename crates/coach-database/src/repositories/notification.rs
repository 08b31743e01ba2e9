//! PostgreSQL notification ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coach_core::error::{AppError, ErrorKind};
use coach_core::result::AppResult;
use coach_core::types::{DayWindow, NotificationId};
use coach_entity::notification::{NotificationRecord, NotificationStatus, SourceService};

use crate::ledger::{DayScope, NotificationLedger, STALE_PENDING_REASON, StatusUpdate};

/// Predicate shared by every day-scoped query. Binds `$1..$4`.
const SCOPE: &str = "user_identity = $1 AND created_at >= $2 AND created_at < $3 \
                     AND ($4::uuid IS NULL OR id <> $4)";

/// Repository for the `notification_ledger` table.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_scoped(&self, what: &str, sql: &str, scope: &DayScope, arg: Option<&str>) -> AppResult<u32> {
        let query = sqlx::query_scalar::<_, i64>(sql)
            .bind(&scope.user_identity)
            .bind(scope.window.start)
            .bind(scope.window.end)
            .bind(scope.exclude);
        let query = match arg {
            Some(value) => query.bind(value.to_string()),
            None => query,
        };
        let count = query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Failed to count {what}"), e)
        })?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl NotificationLedger for NotificationRepository {
    async fn record_pending(&self, record: &NotificationRecord) -> AppResult<NotificationId> {
        if record.status != NotificationStatus::Pending {
            return Err(AppError::validation(format!(
                "New ledger records must be pending, got {}",
                record.status
            )));
        }

        sqlx::query_scalar::<_, NotificationId>(
            "INSERT INTO notification_ledger \
             (id, user_identity, source_service, notification_type, category, theme, severity, \
              title, body, data, channel, related_entity_type, related_entity_id, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending', $14) \
             RETURNING id",
        )
        .bind(record.id)
        .bind(&record.user_identity)
        .bind(record.source_service)
        .bind(&record.notification_type)
        .bind(&record.category)
        .bind(&record.theme)
        .bind(record.severity)
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.data)
        .bind(record.channel)
        .bind(&record.related_entity_type)
        .bind(&record.related_entity_id)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record pending notification", e)
        })
    }

    async fn update_status(&self, id: NotificationId, update: StatusUpdate) -> AppResult<()> {
        NotificationStatus::Pending.ensure_transition(update.status)?;

        let result = sqlx::query(
            "UPDATE notification_ledger \
             SET status = $2, suppression_reason = $3, failure_reason = $4, \
                 delivered_count = COALESCE($5, delivered_count), \
                 sent_at = COALESCE($6, sent_at) \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(update.status)
        .bind(update.suppression_reason())
        .bind(update.failure_reason())
        .bind(update.delivered_count)
        .bind(update.sent_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update notification status", e)
        })?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(current) => Err(AppError::conflict(format!(
                    "Invalid notification status transition: {} -> {}",
                    current.status, update.status
                ))),
                None => Err(AppError::not_found(format!("Notification {id} not found"))),
            };
        }
        Ok(())
    }

    async fn count_today(&self, scope: &DayScope, source: Option<SourceService>) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notification_ledger WHERE {SCOPE} \
             AND status <> 'suppressed' \
             AND ($5::source_service IS NULL OR source_service = $5)"
        ))
        .bind(&scope.user_identity)
        .bind(scope.window.start)
        .bind(scope.window.end)
        .bind(scope.exclude)
        .bind(source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications today", e)
        })?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn was_theme_sent_today(&self, scope: &DayScope, theme: &str) -> AppResult<bool> {
        let count = self
            .count_scoped(
                "theme notifications",
                &format!(
                    "SELECT COUNT(*) FROM notification_ledger WHERE {SCOPE} \
                     AND status <> 'suppressed' AND theme = $5"
                ),
                scope,
                Some(theme),
            )
            .await?;
        Ok(count > 0)
    }

    async fn count_category_today(&self, scope: &DayScope, category: &str) -> AppResult<u32> {
        self.count_scoped(
            "category notifications",
            &format!(
                "SELECT COUNT(*) FROM notification_ledger WHERE {SCOPE} \
                 AND status <> 'suppressed' AND category = $5"
            ),
            scope,
            Some(category),
        )
        .await
    }

    async fn was_entity_notified_today(
        &self,
        scope: &DayScope,
        entity_type: &str,
        entity_id: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM notification_ledger WHERE {SCOPE} \
             AND status <> 'suppressed' \
             AND related_entity_type = $5 AND related_entity_id = $6)"
        ))
        .bind(&scope.user_identity)
        .bind(scope.window.start)
        .bind(scope.window.end)
        .bind(scope.exclude)
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check entity notifications", e)
        })
    }

    async fn get_today(&self, scope: &DayScope) -> AppResult<Vec<NotificationRecord>> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT * FROM notification_ledger WHERE {SCOPE} ORDER BY created_at ASC, id ASC"
        ))
        .bind(&scope.user_identity)
        .bind(scope.window.start)
        .bind(scope.window.end)
        .bind(scope.exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list today's notifications", e)
        })
    }

    async fn get_history(
        &self,
        user_identity: &str,
        window: &DayWindow,
        theme: Option<&str>,
    ) -> AppResult<Vec<NotificationRecord>> {
        sqlx::query_as::<_, NotificationRecord>(
            "SELECT * FROM notification_ledger \
             WHERE user_identity = $1 AND created_at >= $2 AND created_at < $3 \
             AND ($4::text IS NULL OR theme = $4) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_identity)
        .bind(window.start)
        .bind(window.end)
        .bind(theme)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load notification history", e)
        })
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        sqlx::query_as::<_, NotificationRecord>("SELECT * FROM notification_ledger WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find notification", e)
            })
    }

    async fn fail_stale_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_ledger SET status = 'failed', failure_reason = $2 \
             WHERE status = 'pending' AND created_at < $1",
        )
        .bind(older_than)
        .bind(STALE_PENDING_REASON)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fail stale notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn count_by_status_today(
        &self,
        scope: &DayScope,
    ) -> AppResult<HashMap<NotificationStatus, u32>> {
        let rows = sqlx::query_as::<_, (NotificationStatus, i64)>(&format!(
            "SELECT status, COUNT(*) FROM notification_ledger WHERE {SCOPE} GROUP BY status"
        ))
        .bind(&scope.user_identity)
        .bind(scope.window.start)
        .bind(scope.window.end)
        .bind(scope.exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications by status", e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (status, u32::try_from(count).unwrap_or(u32::MAX)))
            .collect())
    }
}
