//! Paginated activity feed
//!
//! [`ActivityFeed`] owns the clumps shown so far and the users they refer to.
//! Callers fetch the next page with [`ActivityFeed::cursor`] and hand the
//! result to [`ActivityFeed::extend`]. Because `extend` takes `&mut self`, a
//! feed can only have one page being appended at a time.

use std::collections::HashMap;

use crate::clump::{clump_with, ClumpOptions};
use crate::cursor::{next_cursor, Cursor};
use crate::error::{Error, MalformedReason, Result};
use crate::types::{ActivityPage, Clump, UserId, UserRef};

/// Clumped activity accumulated across pages.
#[derive(Debug, Clone, Default)]
pub struct ActivityFeed {
    options: ClumpOptions,
    clumps: Vec<Clump>,
    users: HashMap<UserId, UserRef>,
    exhausted: bool,
}

impl ActivityFeed {
    pub fn new(options: ClumpOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Build a feed from its first page.
    pub fn from_page(page: ActivityPage, options: ClumpOptions) -> Result<Self> {
        let mut feed = Self::new(options);
        feed.extend(page)?;
        Ok(feed)
    }

    /// Append an older page.
    ///
    /// The page is clumped on its own and its clumps are added after the
    /// existing ones. Every record must be strictly older than the current
    /// cursor. On error the feed is left untouched. An empty page marks the
    /// feed as exhausted.
    ///
    /// Returns the number of clumps appended.
    pub fn extend(&mut self, page: ActivityPage) -> Result<usize> {
        if page.is_empty() {
            tracing::debug!(clumps = self.clumps.len(), "Activity feed exhausted");
            self.exhausted = true;
            self.merge_users(page.users);
            return Ok(0);
        }

        let clumps = clump_with(&page.records, self.options)?;

        if !self.clumps.is_empty() {
            let cursor = next_cursor(&self.clumps)?;
            // Pages are descending, so the first record is the newest one.
            let newest = page.records.first().and_then(|r| r.timestamp());
            if matches!(newest, Some(time) if time >= cursor) {
                tracing::warn!(
                    cursor = %cursor,
                    "Rejected activity page overlapping the existing feed"
                );
                return Err(Error::MalformedRecord {
                    index: 0,
                    reason: MalformedReason::NotOlderThanCursor,
                });
            }
        }

        let appended = clumps.len();
        self.clumps.extend(clumps);
        self.merge_users(page.users);

        tracing::debug!(
            appended,
            total = self.clumps.len(),
            users = self.users.len(),
            "Extended activity feed"
        );

        Ok(appended)
    }

    fn merge_users(&mut self, users: Vec<UserRef>) {
        for user in users {
            self.users.entry(user.id).or_insert(user);
        }
    }

    /// Cursor for requesting the next older page.
    pub fn cursor(&self) -> Result<Cursor> {
        next_cursor(&self.clumps).map(Cursor::from)
    }

    /// Whether the last page came back empty.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn clumps(&self) -> &[Clump] {
        &self.clumps
    }

    pub fn user(&self, id: UserId) -> Option<&UserRef> {
        self.users.get(&id)
    }

    /// The user a clump belongs to, if the API sent them.
    pub fn user_for(&self, clump: &Clump) -> Option<&UserRef> {
        self.user(clump.user_id())
    }

    pub fn users(&self) -> impl Iterator<Item = &UserRef> {
        self.users.values()
    }

    pub fn options(&self) -> ClumpOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.clumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clumps.is_empty()
    }
}
