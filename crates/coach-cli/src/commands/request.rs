//! Request arguments shared by `send` and `explain`.

use clap::Args;

use coach_core::error::AppError;
use coach_entity::{DeliveryChannel, NotificationRequest, Severity, SourceService};

/// Fields of a notification request.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Recipient identity (email or equivalent)
    #[arg(short, long)]
    pub user: String,
    /// Producing subsystem, e.g. `insights`
    #[arg(short, long)]
    pub source: SourceService,
    /// Producer-specific sub-kind
    #[arg(long = "type", default_value = "manual")]
    pub notification_type: String,
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub body: String,
    #[arg(long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, default_value = "medium")]
    pub severity: Severity,
    #[arg(long, default_value = "push")]
    pub channel: DeliveryChannel,
    /// Related entity as `type:id`
    #[arg(long)]
    pub entity: Option<String>,
    /// Skip quota and dedup (critical severity only)
    #[arg(long)]
    pub bypass_limits: bool,
    /// Respect quiet hours regardless of severity
    #[arg(long)]
    pub honor_quiet_hours: bool,
    /// Extra JSON object forwarded to the device
    #[arg(long)]
    pub data: Option<String>,
}

impl RequestArgs {
    pub fn to_request(&self) -> Result<NotificationRequest, AppError> {
        let mut request = NotificationRequest::new(
            &self.user,
            self.source,
            &self.notification_type,
            &self.title,
            &self.body,
        )
        .with_severity(self.severity)
        .with_channel(self.channel);

        if let Some(theme) = &self.theme {
            request = request.with_theme(theme);
        }
        if let Some(category) = &self.category {
            request = request.with_category(category);
        }
        if let Some(entity) = &self.entity {
            let (kind, id) = entity.split_once(':').ok_or_else(|| {
                AppError::validation(format!("--entity must be 'type:id', got '{entity}'"))
            })?;
            request = request.with_entity(kind, id);
        }
        if self.bypass_limits {
            request = request.with_bypass();
        }
        if self.honor_quiet_hours {
            request = request.with_quiet_hours();
        }
        if let Some(raw) = &self.data {
            request.data = serde_json::from_str(raw)
                .map_err(|e| AppError::validation(format!("--data must be a JSON object: {e}")))?;
        }

        Ok(request)
    }
}
