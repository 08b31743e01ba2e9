//! Concrete PostgreSQL repositories.

pub mod notification;

pub use notification::NotificationRepository;
