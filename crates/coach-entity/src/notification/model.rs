//! Notification ledger record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coach_core::types::NotificationId;

use super::{DeliveryChannel, NotificationRequest, NotificationStatus, Severity, SourceService};

/// One attempted notification and its outcome. Append-only audit row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRecord {
    /// Unique record identifier.
    pub id: NotificationId,
    /// The recipient.
    pub user_identity: String,
    /// Producing subsystem.
    pub source_service: SourceService,
    /// Producer-specific sub-kind.
    pub notification_type: String,
    /// Saturation grouping.
    pub category: Option<String>,
    /// Dedup topic.
    pub theme: Option<String>,
    /// Urgency.
    pub severity: Severity,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Payload forwarded to the device (JSON object).
    pub data: serde_json::Value,
    /// Delivery transport.
    pub channel: DeliveryChannel,
    /// Kind of domain object this notification is about.
    pub related_entity_type: Option<String>,
    /// Identifier of that domain object.
    pub related_entity_id: Option<String>,
    /// Lifecycle state.
    pub status: NotificationStatus,
    /// Policy reason; set only when suppressed.
    pub suppression_reason: Option<String>,
    /// Dispatch error; set only when failed.
    pub failure_reason: Option<String>,
    /// Devices reached, as reported by the dispatcher.
    pub delivered_count: Option<i32>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record moved to `sent`.
    pub sent_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// A fresh `pending` record for `request`, stamped at `now`.
    pub fn pending(request: &NotificationRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            user_identity: request.user_identity.clone(),
            source_service: request.source_service,
            notification_type: request.notification_type.clone(),
            category: request.category().map(str::to_string),
            theme: request.theme_key(),
            severity: request.severity,
            title: request.title.clone(),
            body: request.body.clone(),
            data: serde_json::Value::Object(request.data.clone()),
            channel: request.channel,
            related_entity_type: request.entity_key().map(|(kind, _)| kind),
            related_entity_id: request.entity_key().map(|(_, id)| id),
            status: NotificationStatus::Pending,
            suppression_reason: None,
            failure_reason: None,
            delivered_count: None,
            created_at: now,
            sent_at: None,
        }
    }

    /// Whether this record counts toward quotas and dedup.
    pub fn counts_toward_quota(&self) -> bool {
        self.status.counts_toward_quota()
    }

    /// The `(type, id)` pair when both entity fields are present.
    pub fn related_entity(&self) -> Option<(&str, &str)> {
        match (&self.related_entity_type, &self.related_entity_id) {
            (Some(kind), Some(id)) => Some((kind.as_str(), id.as_str())),
            _ => None,
        }
    }

    /// Suppression or failure reason, whichever applies.
    pub fn reason(&self) -> Option<&str> {
        self.suppression_reason
            .as_deref()
            .or(self.failure_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_copies_request() {
        let mut request = NotificationRequest::new(
            "ana@example.com",
            SourceService::StreakAlerts,
            "streak_risk",
            "Keep it going",
            "Your 12-day streak ends tonight",
        )
        .with_theme("streak")
        .with_category("   ")
        .with_entity("streak", "s-12");
        request
            .data
            .insert("days".to_string(), serde_json::json!(12));

        let now = Utc::now();
        let record = NotificationRecord::pending(&request, now);

        assert_eq!(record.status, NotificationStatus::Pending);
        assert_eq!(record.theme.as_deref(), Some("streak"));
        assert_eq!(record.category, None);
        assert_eq!(record.related_entity(), Some(("streak", "s-12")));
        assert_eq!(record.data["days"], 12);
        assert_eq!(record.created_at, now);
        assert!(record.counts_toward_quota());
        assert_eq!(record.reason(), None);
    }
}
