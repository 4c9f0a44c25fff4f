//! The broadcast room: membership registry and bounded history.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, trace};

use linecast_protocol::Frame;

use crate::connection::WriteQueue;

/// Stable identifier for a room member.
///
/// The room tracks members by id and write-queue handle only; it never
/// holds an owning reference to a connection task, so a connection's
/// lifetime is governed solely by its own IO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Shared broadcast domain. Cheap to clone; all clones refer to the same
/// membership set and history.
#[derive(Debug, Clone)]
pub struct Room {
    inner: Arc<Mutex<RoomState>>,
}

#[derive(Debug)]
struct RoomState {
    next_id: u64,
    members: HashMap<ConnId, WriteQueue>,
    history: VecDeque<Frame>,
    max_history: usize,
}

impl Room {
    /// Creates an empty room retaining at most `max_history` frames.
    pub fn new(max_history: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RoomState {
                next_id: 0,
                members: HashMap::new(),
                history: VecDeque::with_capacity(max_history),
                max_history,
            })),
        }
    }

    /// Registers a member and replays the backlog, oldest first.
    ///
    /// Replay and registration happen under one lock, so the new member
    /// sees the full history strictly before any frame delivered after
    /// this call — it can neither miss a broadcast nor receive one out of
    /// order relative to the backlog.
    pub async fn join(&self, queue: WriteQueue) -> ConnId {
        let mut state = self.inner.lock().await;
        let id = ConnId(state.next_id);
        state.next_id += 1;

        for frame in &state.history {
            queue.send(frame.clone());
        }
        state.members.insert(id, queue);

        debug!(%id, members = state.members.len(), "connection joined");
        id
    }

    /// Removes a member. Idempotent; returns whether it was present.
    pub async fn leave(&self, id: ConnId) -> bool {
        let mut state = self.inner.lock().await;
        let removed = state.members.remove(&id).is_some();
        if removed {
            debug!(%id, members = state.members.len(), "connection left");
        }
        removed
    }

    /// Appends the frame to history and fans it out to every member.
    ///
    /// History is appended before fan-out, evicting the oldest entry past
    /// the bound. Members whose write pump has stopped are pruned here;
    /// one dead member never blocks delivery to the rest.
    pub async fn deliver(&self, frame: Frame) {
        let mut state = self.inner.lock().await;

        state.history.push_back(frame.clone());
        while state.history.len() > state.max_history {
            state.history.pop_front();
        }

        let mut dead = Vec::new();
        for (id, queue) in &state.members {
            if !queue.send(frame.clone()) {
                dead.push(*id);
            }
        }
        trace!(members = state.members.len(), dead = dead.len(), "frame fanned out");

        for id in dead {
            state.members.remove(&id);
            debug!(%id, "pruned dead member during fan-out");
        }
    }

    /// Returns the number of registered members.
    pub async fn member_count(&self) -> usize {
        self.inner.lock().await.members.len()
    }

    /// Returns a snapshot of the retained history, oldest first.
    pub async fn history(&self) -> Vec<Frame> {
        self.inner.lock().await.history.iter().cloned().collect()
    }
}
