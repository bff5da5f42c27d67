//! In-process notification hub.
//!
//! Pub/sub fan-out for admin events: `send` stamps an id and timestamp,
//! records the notification in a global history ring buffer and a per-channel
//! ring buffer, then synchronously invokes every callback subscribed to the
//! channel or to one of the listed user ids. Optionally fans out to email and
//! SMS when those services are configured.
//!
//! Deliberately modest guarantees: in-memory only, no retry, no persistence,
//! callback ordering is registration order within a key and unspecified
//! across keys. Unlike its predecessor the buffers and the subscriber
//! registry are lock-guarded, so concurrent sends cannot lose entries.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use craftline_core::{Email, UserId};

use super::email::EmailService;
use super::sms::SmsService;

/// Global history ring buffer capacity.
pub const GLOBAL_HISTORY_CAP: usize = 1000;

/// Per-channel history ring buffer capacity.
pub const CHANNEL_HISTORY_CAP: usize = 100;

/// A notification as recorded and fanned out by the hub.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique notification id, stamped by `send`.
    pub id: Uuid,
    /// Channel the notification was published on (e.g. "orders").
    pub channel: String,
    /// Short headline.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Target user ids, if the notification is user-addressed.
    pub user_ids: Vec<UserId>,
    /// Creation timestamp, stamped by `send`.
    pub created_at: DateTime<Utc>,
}

/// Input to [`NotificationHub::send`].
#[derive(Debug, Clone)]
pub struct SendNotification {
    /// Channel to publish on.
    pub channel: String,
    /// Short headline.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Target user ids.
    pub user_ids: Vec<UserId>,
    /// Email addresses to deliver a copy to (requires SMTP configuration).
    pub email_to: Vec<Email>,
    /// Phone numbers to deliver a copy to (requires SMS configuration).
    pub sms_to: Vec<String>,
}

/// Outcome of a send: in-process fan-out counts plus side-effect results.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    /// The stamped notification.
    pub notification: Notification,
    /// Number of callbacks invoked.
    pub subscribers_notified: usize,
    /// Emails successfully handed to the SMTP transport.
    pub emails_sent: usize,
    /// SMS messages successfully accepted by the gateway.
    pub sms_sent: usize,
    /// Human-readable side-effect failures (delivery is best effort).
    pub delivery_errors: Vec<String>,
}

/// Snapshot of hub counters.
#[derive(Debug, Clone, Serialize)]
pub struct HubStats {
    /// Notifications sent since startup.
    pub total_sent: u64,
    /// Entries currently in the global history buffer.
    pub history_len: usize,
    /// Channels with at least one recorded notification.
    pub channels: usize,
    /// Active subscriptions.
    pub subscriptions: usize,
}

/// Key a callback subscribes under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// All notifications published on a channel.
    Channel(String),
    /// All notifications addressed to a user.
    User(UserId),
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

/// Subscriber callback type. Invoked synchronously during `send`.
pub type NotificationCallback = dyn Fn(&Notification) + Send + Sync;

struct Subscriber {
    id: SubscriptionId,
    callback: Arc<NotificationCallback>,
}

/// In-process notification hub.
///
/// Cheap to share: wrap in an `Arc` and clone the handle.
pub struct NotificationHub {
    history: RwLock<VecDeque<Notification>>,
    channel_history: RwLock<HashMap<String, VecDeque<Notification>>>,
    subscribers: RwLock<HashMap<SubscriptionKey, Vec<Subscriber>>>,
    total_sent: AtomicU64,
    email: Option<EmailService>,
    sms: Option<SmsService>,
}

impl NotificationHub {
    /// Create a hub with optional email/SMS side-effect services.
    #[must_use]
    pub fn new(email: Option<EmailService>, sms: Option<SmsService>) -> Self {
        Self {
            history: RwLock::new(VecDeque::with_capacity(GLOBAL_HISTORY_CAP)),
            channel_history: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(HashMap::new()),
            total_sent: AtomicU64::new(0),
            email,
            sms,
        }
    }

    /// Register a callback for a channel or user key.
    ///
    /// Returns the id to pass to [`Self::unsubscribe`].
    pub fn subscribe(
        &self,
        key: SubscriptionKey,
        callback: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        let subscriber = Subscriber {
            id,
            callback: Arc::new(callback),
        };
        self.subscribers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(key)
            .or_default()
            .push(subscriber);
        id
    }

    /// Remove a subscription. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut removed = false;
        subscribers.retain(|_, list| {
            let before = list.len();
            list.retain(|s| s.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Stamp, record, and fan out a notification.
    ///
    /// In-process delivery never fails; email/SMS side effects are best
    /// effort and reported in the returned [`DeliveryReport`].
    pub async fn send(&self, request: SendNotification) -> DeliveryReport {
        let notification = Notification {
            id: Uuid::new_v4(),
            channel: request.channel,
            title: request.title,
            body: request.body,
            user_ids: request.user_ids,
            created_at: Utc::now(),
        };

        self.record(&notification);
        self.total_sent.fetch_add(1, Ordering::Relaxed);

        let subscribers_notified = self.fan_out(&notification);

        tracing::debug!(
            id = %notification.id,
            channel = %notification.channel,
            subscribers = subscribers_notified,
            "Notification dispatched"
        );

        let mut emails_sent = 0;
        let mut sms_sent = 0;
        let mut delivery_errors = Vec::new();

        if !request.email_to.is_empty() {
            if let Some(email) = &self.email {
                for to in &request.email_to {
                    match email
                        .send_notification(to, &notification.title, &notification.body)
                        .await
                    {
                        Ok(()) => emails_sent += 1,
                        Err(e) => {
                            tracing::warn!(to = %to, error = %e, "Notification email failed");
                            delivery_errors.push(format!("email {to}: {e}"));
                        }
                    }
                }
            } else {
                delivery_errors.push("email delivery requested but SMTP is not configured".into());
            }
        }

        if !request.sms_to.is_empty() {
            if let Some(sms) = &self.sms {
                for to in &request.sms_to {
                    match sms.send(to, &notification.body).await {
                        Ok(()) => sms_sent += 1,
                        Err(e) => {
                            tracing::warn!(to = %to, error = %e, "Notification SMS failed");
                            delivery_errors.push(format!("sms {to}: {e}"));
                        }
                    }
                }
            } else {
                delivery_errors
                    .push("sms delivery requested but the gateway is not configured".into());
            }
        }

        DeliveryReport {
            notification,
            subscribers_notified,
            emails_sent,
            sms_sent,
            delivery_errors,
        }
    }

    /// Global history, newest first.
    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<Notification> {
        self.history
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Per-channel history, newest first. Unknown channels yield an empty list.
    #[must_use]
    pub fn channel_history(&self, channel: &str, limit: usize) -> Vec<Notification> {
        self.channel_history
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(channel)
            .map(|buf| buf.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot the hub counters.
    #[must_use]
    pub fn stats(&self) -> HubStats {
        let history_len = self
            .history
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len();
        let channels = self
            .channel_history
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len();
        let subscriptions = self
            .subscribers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum();
        HubStats {
            total_sent: self.total_sent.load(Ordering::Relaxed),
            history_len,
            channels,
            subscriptions,
        }
    }

    /// Append to the global and per-channel ring buffers, evicting the oldest
    /// entry once a buffer is at capacity.
    fn record(&self, notification: &Notification) {
        {
            let mut history = self
                .history
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if history.len() == GLOBAL_HISTORY_CAP {
                history.pop_front();
            }
            history.push_back(notification.clone());
        }

        let mut channels = self
            .channel_history
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let buffer = channels
            .entry(notification.channel.clone())
            .or_insert_with(|| VecDeque::with_capacity(CHANNEL_HISTORY_CAP));
        if buffer.len() == CHANNEL_HISTORY_CAP {
            buffer.pop_front();
        }
        buffer.push_back(notification.clone());
    }

    /// Invoke callbacks for the channel key and every listed user key.
    ///
    /// Callbacks are cloned out of the registry first so none of them runs
    /// while the lock is held.
    fn fan_out(&self, notification: &Notification) -> usize {
        let callbacks: Vec<Arc<NotificationCallback>> = {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);

            let mut keys = Vec::with_capacity(1 + notification.user_ids.len());
            keys.push(SubscriptionKey::Channel(notification.channel.clone()));
            keys.extend(notification.user_ids.iter().map(|id| SubscriptionKey::User(*id)));

            keys.iter()
                .filter_map(|key| subscribers.get(key))
                .flatten()
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };

        for callback in &callbacks {
            callback(notification);
        }
        callbacks.len()
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("NotificationHub")
            .field("total_sent", &stats.total_sent)
            .field("history_len", &stats.history_len)
            .field("subscriptions", &stats.subscriptions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn hub() -> NotificationHub {
        NotificationHub::new(None, None)
    }

    fn request(channel: &str) -> SendNotification {
        SendNotification {
            channel: channel.to_string(),
            title: "Stock low".to_string(),
            body: "IK-01 has 2 units left".to_string(),
            user_ids: Vec::new(),
            email_to: Vec::new(),
            sms_to: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_send_stamps_id_and_timestamp() {
        let hub = hub();
        let before = Utc::now();
        let report = hub.send(request("inventory")).await;

        assert_eq!(report.notification.channel, "inventory");
        assert!(report.notification.created_at >= before);
        assert!(report.delivery_errors.is_empty());

        let second = hub.send(request("inventory")).await;
        assert_ne!(report.notification.id, second.notification.id);
    }

    #[tokio::test]
    async fn test_channel_subscribers_receive_sends() {
        let hub = hub();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = Arc::clone(&seen);
        hub.subscribe(SubscriptionKey::Channel("orders".to_string()), move |n| {
            assert_eq!(n.channel, "orders");
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        let report = hub.send(request("orders")).await;
        assert_eq!(report.subscribers_notified, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // Unrelated channel does not fire the callback
        let report = hub.send(request("tickets")).await;
        assert_eq!(report.subscribers_notified, 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_user_subscribers_receive_addressed_sends() {
        let hub = hub();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = Arc::clone(&seen);
        hub.subscribe(SubscriptionKey::User(UserId::new(7)), move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut req = request("orders");
        req.user_ids = vec![UserId::new(7), UserId::new(8)];
        let report = hub.send(req).await;

        assert_eq!(report.subscribers_notified, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = hub();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = Arc::clone(&seen);
        let id = hub.subscribe(SubscriptionKey::Channel("orders".to_string()), move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));

        let report = hub.send(request("orders")).await;
        assert_eq!(report.subscribers_notified, 0);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(hub.stats().subscriptions, 0);
    }

    #[tokio::test]
    async fn test_global_history_evicts_oldest_at_cap() {
        let hub = hub();
        for i in 0..(GLOBAL_HISTORY_CAP + 5) {
            let mut req = request("bulk");
            req.title = format!("n{i}");
            hub.send(req).await;
        }

        let stats = hub.stats();
        assert_eq!(stats.history_len, GLOBAL_HISTORY_CAP);
        assert_eq!(stats.total_sent, (GLOBAL_HISTORY_CAP + 5) as u64);

        // Newest first; the oldest five were evicted
        let history = hub.history(GLOBAL_HISTORY_CAP);
        assert_eq!(history.first().unwrap().title, format!("n{}", GLOBAL_HISTORY_CAP + 4));
        assert_eq!(history.last().unwrap().title, "n5");
    }

    #[tokio::test]
    async fn test_channel_history_is_isolated_and_capped() {
        let hub = hub();
        for i in 0..(CHANNEL_HISTORY_CAP + 3) {
            let mut req = request("orders");
            req.title = format!("o{i}");
            hub.send(req).await;
        }
        hub.send(request("tickets")).await;

        let orders = hub.channel_history("orders", 500);
        assert_eq!(orders.len(), CHANNEL_HISTORY_CAP);
        assert_eq!(orders.first().unwrap().title, format!("o{}", CHANNEL_HISTORY_CAP + 2));

        assert_eq!(hub.channel_history("tickets", 500).len(), 1);
        assert!(hub.channel_history("unknown", 500).is_empty());
    }

    #[tokio::test]
    async fn test_history_limit_applies() {
        let hub = hub();
        for _ in 0..10 {
            hub.send(request("orders")).await;
        }
        assert_eq!(hub.history(3).len(), 3);
    }

    #[tokio::test]
    async fn test_side_effects_without_services_report_errors() {
        let hub = hub();
        let mut req = request("orders");
        req.email_to = vec![Email::parse("ops@craftline.in").unwrap()];
        req.sms_to = vec!["+911234567890".to_string()];

        let report = hub.send(req).await;
        assert_eq!(report.emails_sent, 0);
        assert_eq!(report.sms_sent, 0);
        assert_eq!(report.delivery_errors.len(), 2);
    }
}
