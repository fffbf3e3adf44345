//! Notification service: transient in-app messages.
//!
//! Notifications live only for the session; nothing is persisted.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use worldweaver_domain::{Notification, NotificationId};

use crate::infrastructure::ports::ClockPort;

/// Service for handling notifications across the application.
pub struct NotificationService {
    clock: Arc<dyn ClockPort>,
    notifications: RwLock<Vec<Notification>>,
    snapshot: watch::Sender<Vec<Notification>>,
}

impl NotificationService {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            clock,
            notifications: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Adds a new notification and returns its id.
    pub async fn notify(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationId {
        let notification = Notification::new(title, message, self.clock.now());
        let id = notification.id;
        self.notifications.write().await.push(notification);
        self.publish().await;
        id
    }

    /// Marks a notification as read. Unknown ids are a silent no-op.
    pub async fn mark_as_read(&self, id: NotificationId) {
        {
            let mut notifications = self.notifications.write().await;
            if let Some(notification) = notifications.iter_mut().find(|n| n.id == id) {
                notification.mark_read();
            }
        }
        self.publish().await;
    }

    /// Marks all notifications as read.
    pub async fn mark_all_as_read(&self) {
        {
            let mut notifications = self.notifications.write().await;
            for notification in notifications.iter_mut() {
                notification.mark_read();
            }
        }
        self.publish().await;
    }

    /// Removes a notification.
    pub async fn remove_notification(&self, id: NotificationId) {
        self.notifications.write().await.retain(|n| n.id != id);
        self.publish().await;
    }

    /// Clears all notifications.
    pub async fn clear_all(&self) {
        self.notifications.write().await.clear();
        self.publish().await;
    }

    /// Count of unread notifications.
    pub async fn unread_count(&self) -> usize {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }

    /// Snapshot of all notifications.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.snapshot.subscribe()
    }

    async fn publish(&self) {
        let snapshot = self.notifications.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}
