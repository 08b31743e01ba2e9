//! Inbound send request.

use serde::{Deserialize, Serialize};

use coach_core::AppError;

use super::{DeliveryChannel, Severity, SourceService};

/// What a producer hands to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Stable user key (email or equivalent).
    pub user_identity: String,
    /// Producing subsystem.
    pub source_service: SourceService,
    /// Producer-specific sub-kind, e.g. `morning_motivation`.
    pub notification_type: String,
    /// Coarse grouping used for saturation limits, e.g. `ACTIVITY`.
    #[serde(default)]
    pub category: Option<String>,
    /// Topic label used for cross-producer dedup.
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Opaque payload forwarded to the device.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub channel: DeliveryChannel,
    #[serde(default)]
    pub related_entity_type: Option<String>,
    #[serde(default)]
    pub related_entity_id: Option<String>,
    /// Skip quota and dedup checks. Honoured for `critical` severity only.
    #[serde(default)]
    pub bypass_limits: bool,
    /// Apply quiet hours regardless of severity.
    #[serde(default)]
    pub honor_quiet_hours: bool,
}

impl NotificationRequest {
    /// Minimal request; everything optional is left unset.
    pub fn new(
        user_identity: impl Into<String>,
        source_service: SourceService,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            user_identity: user_identity.into(),
            source_service,
            notification_type: notification_type.into(),
            category: None,
            theme: None,
            severity: Severity::default(),
            title: title.into(),
            body: body.into(),
            data: serde_json::Map::new(),
            channel: DeliveryChannel::default(),
            related_entity_type: None,
            related_entity_id: None,
            bypass_limits: false,
            honor_quiet_hours: false,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.related_entity_type = Some(entity_type.into());
        self.related_entity_id = Some(entity_id.into());
        self
    }

    pub fn with_channel(mut self, channel: DeliveryChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_bypass(mut self) -> Self {
        self.bypass_limits = true;
        self
    }

    pub fn with_quiet_hours(mut self) -> Self {
        self.honor_quiet_hours = true;
        self
    }

    /// The `(type, id)` pair when both entity fields are present and non-empty.
    pub fn related_entity(&self) -> Option<(&str, &str)> {
        match (&self.related_entity_type, &self.related_entity_id) {
            (Some(kind), Some(id)) if !kind.is_empty() && !id.is_empty() => {
                Some((kind.as_str(), id.as_str()))
            }
            _ => None,
        }
    }

    /// Theme if present and non-blank.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Theme in the form it is stored and compared in.
    pub fn theme_key(&self) -> Option<String> {
        self.theme().map(normalize_label)
    }

    /// Entity pair in the form it is stored and compared in.
    pub fn entity_key(&self) -> Option<(String, String)> {
        self.related_entity()
            .map(|(kind, id)| (normalize_label(kind), normalize_label(id)))
    }

    /// Category if present and non-blank.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Whether the critical limit bypass applies.
    pub fn is_critical_bypass(&self) -> bool {
        self.bypass_limits && self.severity == Severity::Critical
    }

    /// Reject requests that cannot be recorded meaningfully.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_identity.trim().is_empty() {
            return Err(AppError::validation("user_identity must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
        Ok(())
    }
}

/// Canonical form of a dedup label: trimmed and lower-cased, so `" Sleep"`
/// and `"sleep"` name the same theme.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}
