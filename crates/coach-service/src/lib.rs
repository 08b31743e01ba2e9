//! # coach-service
//!
//! The notification coordinator and its collaborators. Producers build a
//! [`NotificationRequest`](coach_entity::NotificationRequest) and hand it to
//! [`NotificationCoordinator::send`]; the coordinator records the attempt,
//! asks the [`PolicyEngine`] whether it may go out, dispatches it, and
//! finalizes the ledger record.
//!
//! Services follow constructor injection: the ledger, dispatcher, and clock
//! are provided at construction time via `Arc` references.

pub mod bootstrap;
pub mod coordinator;
pub mod dispatch;
pub mod policy;
pub mod theme;

pub use bootstrap::{build_coordinator, dispatcher_from_config};
pub use coordinator::{DailySummary, NotificationCoordinator, SendResult, UserLocks};
pub use dispatch::{DispatchError, DispatchPayload, Dispatcher, HttpPushDispatcher, NullDispatcher};
pub use policy::{Decision, PolicyEngine, PolicyReason};
pub use theme::extract_theme;
