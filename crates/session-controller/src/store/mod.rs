//! In-memory meeting store.
//!
//! The meeting record is the single shared mutable resource in this service.
//! All writes go through [`MeetingStore::mutate`], which runs the caller's
//! closure under a per-meeting exclusive lock against the latest committed
//! state: a status check inside the closure is atomic with the roster write
//! that follows it, so a join can never commit against a meeting that ended
//! concurrently.
//!
//! Committed snapshots are published on a per-meeting watch channel before
//! `mutate` returns, which is the push-based subscription surface the lobby
//! uses for "waiting for host". A durable backend would sit behind the same
//! method set; its transactional guarantees replace the per-meeting lock.

use crate::errors::SessionError;
use crate::models::Meeting;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

/// One stored meeting: the committed record plus its snapshot channel.
struct MeetingEntry {
    /// Latest committed state. The mutex linearizes writes per meeting.
    state: Mutex<Meeting>,

    /// Publishes the committed snapshot after every successful mutation.
    snapshots: watch::Sender<Meeting>,
}

/// Index over all meetings. The outer lock is only held to look up or insert
/// entries, never across a state mutation.
#[derive(Default)]
struct Inner {
    meetings: HashMap<Uuid, Arc<MeetingEntry>>,
    by_code: HashMap<String, Uuid>,
}

/// In-memory meeting store.
#[derive(Default)]
pub struct MeetingStore {
    inner: RwLock<Inner>,
}

impl MeetingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new meeting record.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the meeting ID or meeting code is already in
    /// use. Meeting codes are never reused.
    pub fn create(&self, meeting: Meeting) -> Result<(), SessionError> {
        let mut inner = self.inner.write().map_err(|_| SessionError::Internal)?;

        if inner.meetings.contains_key(&meeting.meeting_id) {
            return Err(SessionError::Conflict("Meeting already exists".to_string()));
        }

        if inner.by_code.contains_key(&meeting.meeting_code) {
            return Err(SessionError::Conflict(
                "Meeting code already in use".to_string(),
            ));
        }

        let (snapshots, _) = watch::channel(meeting.clone());
        inner
            .by_code
            .insert(meeting.meeting_code.clone(), meeting.meeting_id);
        inner.meetings.insert(
            meeting.meeting_id,
            Arc::new(MeetingEntry {
                state: Mutex::new(meeting),
                snapshots,
            }),
        );

        Ok(())
    }

    /// Fetch the current snapshot of a meeting.
    pub async fn get(&self, meeting_id: Uuid) -> Option<Meeting> {
        let entry = self.entry(meeting_id)?;
        let meeting = entry.state.lock().await.clone();
        Some(meeting)
    }

    /// Fetch the current snapshot of a meeting by its code.
    pub async fn get_by_code(&self, code: &str) -> Option<Meeting> {
        let meeting_id = {
            let inner = self.inner.read().ok()?;
            inner.by_code.get(code).copied()?
        };
        self.get(meeting_id).await
    }

    /// Apply a mutation against the latest committed state.
    ///
    /// The closure observes and edits a working copy; on `Ok` the copy is
    /// committed (with `updated_at` bumped) and published to subscribers
    /// before this method returns. On `Err` nothing is committed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown meeting, or the closure's error.
    pub async fn mutate<T>(
        &self,
        meeting_id: Uuid,
        f: impl FnOnce(&mut Meeting) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let entry = self
            .entry(meeting_id)
            .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;

        let mut state = entry.state.lock().await;

        let mut working = state.clone();
        let value = f(&mut working)?;

        working.updated_at = Utc::now();
        *state = working.clone();
        // Receivers may have gone away; that only means nobody is watching.
        let _ = entry.snapshots.send(working);

        Ok(value)
    }

    /// Subscribe to committed snapshots of a meeting.
    ///
    /// The receiver is primed with the current state and gets every
    /// subsequent committed change.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown meeting.
    pub fn subscribe(&self, meeting_id: Uuid) -> Result<watch::Receiver<Meeting>, SessionError> {
        let entry = self
            .entry(meeting_id)
            .ok_or_else(|| SessionError::NotFound("Meeting not found".to_string()))?;
        Ok(entry.snapshots.subscribe())
    }

    fn entry(&self, meeting_id: Uuid) -> Option<Arc<MeetingEntry>> {
        let inner = self.inner.read().ok()?;
        inner.meetings.get(&meeting_id).cloned()
    }
}
