//! Incoming admin notifications and outgoing broadcasts

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::fixtures::find;
use crate::listing::{status_counts, ListQuery};
use crate::models::{
    AdminNotification, Notification, NotificationTarget, NotificationType,
};
use crate::wizard::cycle;

/// Entries shown in the header dropdown
pub const DROPDOWN_LIMIT: usize = 5;

/// Inbox of notifications addressed to the administrator
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    items: Vec<AdminNotification>,
}

impl NotificationCenter {
    pub fn new(mut items: Vec<AdminNotification>) -> Self {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { items }
    }

    /// Newest first
    pub fn items(&self) -> &[AdminNotification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn latest(&self, limit: usize) -> &[AdminNotification] {
        &self.items[..limit.min(self.items.len())]
    }

    pub fn filtered(&self, query: &ListQuery) -> Vec<AdminNotification> {
        query.apply(&self.items)
    }

    /// (filter, label, count) for every tab, "all" first
    pub fn tabs(&self) -> Vec<(&'static str, &'static str, usize)> {
        status_counts(&self.items)
    }

    pub fn get(&self, id: &str) -> AppResult<&AdminNotification> {
        find(&self.items, id)
    }

    /// Opens a notification, marking it read
    pub fn open(&mut self, id: &str) -> AppResult<&AdminNotification> {
        let item = self
            .items
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::not_found("Notification", id))?;
        item.is_read = true;
        Ok(item)
    }

    /// Returns how many notifications changed
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|n| !n.is_read) {
            item.is_read = true;
            changed += 1;
        }
        if changed > 0 {
            info!("Marked {} notifications as read", changed);
        }
        changed
    }
}

/// Draft of an outgoing notification
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastDraft {
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub target: NotificationTarget,
}

impl Default for BroadcastDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            kind: NotificationType::Push,
            target: NotificationTarget::All,
        }
    }
}

impl BroadcastDraft {
    pub fn can_send(&self) -> bool {
        !self.title.trim().is_empty() && !self.message.trim().is_empty()
    }

    pub fn cycle_kind(&mut self, forward: bool) {
        self.kind = cycle(NotificationType::ALL, self.kind, forward);
    }

    pub fn cycle_target(&mut self, forward: bool) {
        self.target = cycle(NotificationTarget::ALL, self.target, forward);
    }
}

/// Sent notifications plus the compose form
#[derive(Debug, Clone)]
pub struct Broadcasts {
    sent: Vec<Notification>,
    pub draft: BroadcastDraft,
}

impl Broadcasts {
    pub fn new(mut sent: Vec<Notification>) -> Self {
        sent.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Self {
            sent,
            draft: BroadcastDraft::default(),
        }
    }

    /// Newest first
    pub fn sent(&self) -> &[Notification] {
        &self.sent
    }

    /// Sends the draft to `recipients` people and clears title and message.
    /// Returns `None` while title or message is blank.
    pub fn send(&mut self, recipients: u64, now: DateTime<Utc>) -> Option<&Notification> {
        if !self.draft.can_send() {
            return None;
        }
        let notification = Notification {
            id: format!("notif-{}", Uuid::new_v4().simple()),
            title: self.draft.title.trim().to_string(),
            message: self.draft.message.trim().to_string(),
            kind: self.draft.kind,
            target: self.draft.target,
            sent_at: now,
            read_count: 0,
            total_recipients: recipients,
        };
        info!(
            "Sent {} notification '{}' to {}",
            notification.kind, notification.title, notification.target
        );
        self.sent.insert(0, notification);
        self.draft.title.clear();
        self.draft.message.clear();
        self.sent.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;

    fn center() -> NotificationCenter {
        NotificationCenter::new(FixtureSet::embedded().unwrap().admin_notifications)
    }

    #[test]
    fn test_unread_and_mark_all() {
        let mut center = center();
        assert_eq!(center.unread_count(), 4);
        assert_eq!(center.mark_all_read(), 4);
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.mark_all_read(), 0);
    }

    #[test]
    fn test_open_marks_read() {
        let mut center = center();
        assert!(!center.get("an-1").unwrap().is_read);
        assert!(center.open("an-1").unwrap().is_read);
        assert_eq!(center.unread_count(), 3);
        assert!(center.open("an-404").unwrap_err().is_not_found());
    }

    #[test]
    fn test_tabs_and_filters() {
        let center = center();
        let tabs = center.tabs();
        assert_eq!(tabs[0], ("all", "All", 8));
        assert!(tabs.contains(&("unread", "Unread", 4)));
        assert!(tabs.contains(&("payment", "Payments", 2)));

        let unread_payments = center.filtered(
            &ListQuery::new().with_status("unread").with_search("CARD"),
        );
        assert_eq!(unread_payments.len(), 1);
        assert_eq!(unread_payments[0].id, "an-2");
    }

    #[test]
    fn test_latest_is_newest_first() {
        let center = center();
        let latest = center.latest(DROPDOWN_LIMIT);
        assert_eq!(latest.len(), 5);
        assert_eq!(latest[0].id, "an-1");
    }

    #[test]
    fn test_send_requires_title_and_message() {
        let mut broadcasts = Broadcasts::new(Vec::new());
        let now = Utc::now();
        broadcasts.draft.title = "Promo".to_string();
        assert!(broadcasts.send(100, now).is_none());

        broadcasts.draft.message = "Half price".to_string();
        broadcasts.draft.cycle_target(true);
        let sent = broadcasts.send(100, now).unwrap().clone();
        assert_eq!(sent.target, NotificationTarget::Users);
        assert_eq!(sent.read_rate(), 0);
        assert!(sent.id.starts_with("notif-"));
        assert!(broadcasts.draft.title.is_empty());
        assert_eq!(broadcasts.draft.target, NotificationTarget::Users);
        assert_eq!(broadcasts.sent().len(), 1);
    }
}
