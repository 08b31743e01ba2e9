//! # coach-entity
//!
//! Domain entity models for the coaching notification backend. Every struct
//! in this crate represents a ledger row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and the
//! ledger record additionally derives `sqlx::FromRow`.

pub mod notification;

pub use notification::{
    DeliveryChannel, NotificationRecord, NotificationRequest, NotificationStatus, Severity,
    SourceService, Theme, normalize_label,
};
