//! Notification domain entities.

pub mod channel;
pub mod model;
pub mod request;
pub mod severity;
pub mod source;
pub mod status;
pub mod theme;

pub use channel::DeliveryChannel;
pub use model::NotificationRecord;
pub use request::{NotificationRequest, normalize_label};
pub use severity::Severity;
pub use source::SourceService;
pub use status::NotificationStatus;
pub use theme::Theme;
