//! Business services for the admin backend.
//!
//! Services are constructed once at startup and shared through
//! [`crate::state::AppState`] rather than living as process-wide singletons.

pub mod backup;
pub mod email;
pub mod notification;
pub mod report;
pub mod sms;
pub mod storage;

pub use backup::{BackupError, BackupInfo, BackupService};
pub use email::{EmailError, EmailService};
pub use notification::{
    DeliveryReport, HubStats, Notification, NotificationHub, SendNotification, SubscriptionId,
    SubscriptionKey,
};
pub use report::{ReportDescriptor, ReportError, ReportFormat, ReportPayload, ReportService};
pub use sms::{SmsError, SmsService};
pub use storage::{FileStorage, StorageError, StoredFile};
