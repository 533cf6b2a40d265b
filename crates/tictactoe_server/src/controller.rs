//! Process-wide registry: waiting room, session table and AFK set.

use crate::session::SessionView;
use crate::{ClientId, ClientRecord, LobbyError, Session, SessionId, TurnError};
use rand::seq::IteratorRandom;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tictactoe_board::{Coord, Outcome};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What one liveness sweep removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sessions dropped because a participant went stale.
    pub evicted_sessions: Vec<SessionId>,
    /// Stale participants, now in the AFK set.
    pub afk_clients: Vec<ClientId>,
    /// Pending clients dropped from the waiting room.
    pub pruned_pending: Vec<ClientId>,
}

impl SweepReport {
    /// True if the sweep changed nothing.
    pub fn is_empty(&self) -> bool {
        self.evicted_sessions.is_empty() && self.pruned_pending.is_empty()
    }
}

/// State guarded by the controller's lock.
///
/// A client id is in at most one of `pending`, one session, or `afk`.
#[derive(Debug, Default)]
struct Registry {
    pending: HashMap<ClientId, ClientRecord>,
    sessions: HashMap<SessionId, Session>,
    afk: HashSet<ClientId>,
}

impl Registry {
    fn find_session_of(&self, client_id: ClientId) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|session| session.is_participant(client_id))
            .map(Session::id)
    }

    fn enqueue_pending(&mut self, client_id: ClientId) -> bool {
        if self.afk.contains(&client_id) {
            warn!(%client_id, "AFK client must be cleared before queueing");
            return false;
        }
        if self.find_session_of(client_id).is_some() {
            warn!(%client_id, "Client already in a session, not queueing");
            return false;
        }
        if !self.pending.contains_key(&client_id) {
            debug!(%client_id, "Client entered waiting room");
            self.pending.insert(client_id, ClientRecord::new());
        }
        true
    }

    fn find_partner_for(&self, client_id: ClientId) -> Option<ClientId> {
        if !self.pending.contains_key(&client_id) {
            warn!(%client_id, "Partner search for a client that is not pending");
            return None;
        }
        self.pending
            .keys()
            .copied()
            .filter(|id| *id != client_id)
            .choose(&mut rand::thread_rng())
    }

    fn create_session(&mut self, first: ClientId, second: ClientId) -> Option<SessionId> {
        if first == second
            || !self.pending.contains_key(&first)
            || !self.pending.contains_key(&second)
        {
            debug!(%first, %second, "Pair no longer pending, session not created");
            return None;
        }
        let first_record = self.pending.remove(&first)?;
        let second_record = self.pending.remove(&second)?;

        let mut session_id = SessionId::new_random();
        while self.sessions.contains_key(&session_id) {
            session_id = SessionId::new_random();
        }
        let session = Session::new(session_id, (first, first_record), (second, second_record));
        self.sessions.insert(session_id, session);

        info!(%session_id, %first, %second, "Session formed");
        Some(session_id)
    }
}

/// Matchmaker and owner of every live session.
///
/// Cheap to clone; all clones share one registry behind a single mutex, so
/// every operation below is one serialized transaction.
#[derive(Debug, Clone, Default)]
pub struct SessionController {
    registry: Arc<Mutex<Registry>>,
}

impl SessionController {
    /// Creates an empty controller.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session controller");
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| {
            warn!("Registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Allocates a fresh client identifier. Touches no registry state.
    #[instrument(skip(self))]
    pub fn generate_client_id(&self) -> ClientId {
        let client_id = ClientId::new_random();
        debug!(%client_id, "Generated client id");
        client_id
    }

    /// Puts the client in the waiting room with a fresh record.
    ///
    /// Idempotent. Returns `false` without queueing if the client is AFK or
    /// already bound to a session.
    #[instrument(skip(self))]
    pub fn enqueue_pending(&self, client_id: ClientId) -> bool {
        self.registry().enqueue_pending(client_id)
    }

    /// Checks whether the client is in the waiting room.
    pub fn is_pending(&self, client_id: ClientId) -> bool {
        self.registry().pending.contains_key(&client_id)
    }

    /// Picks a random other pending client, uniformly, fresh on every call.
    #[instrument(skip(self))]
    pub fn find_partner_for(&self, client_id: ClientId) -> Option<ClientId> {
        self.registry().find_partner_for(client_id)
    }

    /// Moves both clients from the waiting room into a new session.
    ///
    /// Both are removed or neither is: `None` if either is no longer pending.
    /// `first` plays X.
    #[instrument(skip(self))]
    pub fn create_session(&self, first: ClientId, second: ClientId) -> Option<SessionId> {
        self.registry().create_session(first, second)
    }

    /// Session the client is playing in, if any.
    #[instrument(skip(self))]
    pub fn find_session_of(&self, client_id: ClientId) -> Option<SessionId> {
        self.registry().find_session_of(client_id)
    }

    /// Snapshot of a session.
    #[instrument(skip(self))]
    pub fn get_session(&self, session_id: SessionId) -> Option<Session> {
        let session = self.registry().sessions.get(&session_id).cloned();
        if session.is_none() {
            debug!(%session_id, "Session not found");
        }
        session
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.registry().sessions.len()
    }

    /// Number of clients in the waiting room.
    pub fn pending_count(&self) -> usize {
        self.registry().pending.len()
    }

    /// Adds the client to the AFK set, taking it out of the waiting room.
    ///
    /// A bound client loses its session, as in [`sweep`](Self::sweep); the
    /// evicted session id is returned.
    #[instrument(skip(self))]
    pub fn mark_afk(&self, client_id: ClientId) -> Option<SessionId> {
        let mut guard = self.registry();
        let registry = &mut *guard;
        registry.pending.remove(&client_id);
        let evicted = registry.find_session_of(client_id);
        if let Some(session_id) = evicted {
            registry.sessions.remove(&session_id);
            info!(%session_id, "Session evicted");
        }
        registry.afk.insert(client_id);
        info!(%client_id, "Client marked as AFK");
        evicted
    }

    /// Checks whether the client is in the AFK set.
    pub fn is_afk(&self, client_id: ClientId) -> bool {
        self.registry().afk.contains(&client_id)
    }

    /// Removes the client from the AFK set. Returns whether it was there.
    #[instrument(skip(self))]
    pub fn clear_afk(&self, client_id: ClientId) -> bool {
        self.registry().afk.remove(&client_id)
    }

    /// Join/match in one transaction.
    ///
    /// An AFK client gets its mark cleared and [`LobbyError::Afk`]; a client
    /// already in a session gets that session; otherwise the client is queued
    /// and paired with a random waiting partner, becoming the first
    /// participant. [`LobbyError::NoPartner`] means poll again later.
    #[instrument(skip(self))]
    pub fn try_join(&self, client_id: ClientId) -> Result<SessionId, LobbyError> {
        let mut guard = self.registry();
        let registry = &mut *guard;

        if registry.afk.remove(&client_id) {
            info!(%client_id, "AFK client rejoining, mark cleared");
            return Err(LobbyError::Afk { client_id });
        }
        if let Some(session_id) = registry.find_session_of(client_id) {
            debug!(%session_id, "Client already in session");
            return Ok(session_id);
        }

        registry.enqueue_pending(client_id);
        if let Some(record) = registry.pending.get_mut(&client_id) {
            record.touch_at(Instant::now());
        }

        let partner = registry
            .find_partner_for(client_id)
            .ok_or(LobbyError::NoPartner)?;
        registry
            .create_session(client_id, partner)
            .ok_or(LobbyError::NoPartner)
    }

    /// Session state as one participant sees it; refreshes its liveness.
    #[instrument(skip(self))]
    pub fn read_state(
        &self,
        session_id: SessionId,
        client_id: ClientId,
    ) -> Result<SessionView, LobbyError> {
        let mut registry = self.registry();
        let session = registry
            .sessions
            .get_mut(&session_id)
            .ok_or(LobbyError::SessionNotFound { session_id })?;
        let view = session
            .view_for(client_id)
            .ok_or(LobbyError::NotParticipant { client_id })?;
        session.touch(client_id);
        Ok(view)
    }

    /// Parses `row_col` (`"<row> <col>"`, 1-based) and plays it.
    ///
    /// Checks run in order: session, participant, turn, syntax, cell.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        session_id: SessionId,
        client_id: ClientId,
        row_col: &str,
    ) -> Result<Outcome, LobbyError> {
        let mut registry = self.registry();
        let session = registry
            .sessions
            .get_mut(&session_id)
            .ok_or(LobbyError::SessionNotFound { session_id })?;
        if !session.is_participant(client_id) {
            return Err(LobbyError::NotParticipant { client_id });
        }
        if !session.is_turn_of(client_id) {
            return Err(TurnError::NotYourTurn.into());
        }
        let coord: Coord = row_col.parse()?;
        Ok(session.attempt_turn(client_id, coord.row(), coord.col())?)
    }

    /// Starts the next game in a finished session.
    ///
    /// Returns `false` if the session is gone or its game is still running.
    #[instrument(skip(self))]
    pub fn reset_session(&self, session_id: SessionId) -> bool {
        let mut registry = self.registry();
        match registry.sessions.get_mut(&session_id) {
            Some(session) if session.board().outcome().is_terminal() => {
                session.reset();
                true
            }
            Some(_) => {
                debug!(%session_id, "Game still in progress, reset skipped");
                false
            }
            None => {
                debug!(%session_id, "Session gone, reset skipped");
                false
            }
        }
    }

    /// Evicts every session with a participant idle longer than `timeout`.
    ///
    /// Only the stale participant enters the AFK set; the whole session is
    /// removed, so its partner has to rejoin matchmaking.
    #[instrument(skip(self))]
    pub fn sweep(&self, now: Instant, timeout: Duration) -> SweepReport {
        let mut guard = self.registry();
        let registry = &mut *guard;
        let mut report = SweepReport::default();

        for (session_id, session) in &registry.sessions {
            let stale = session.stale_participants(now, timeout);
            if !stale.is_empty() {
                report.evicted_sessions.push(*session_id);
                report.afk_clients.extend(stale);
            }
        }

        for client_id in &report.afk_clients {
            info!(%client_id, "Client marked as AFK");
            registry.afk.insert(*client_id);
        }
        for session_id in &report.evicted_sessions {
            registry.sessions.remove(session_id);
            info!(%session_id, "Session evicted");
        }

        report
    }

    /// Drops waiting-room entries idle longer than `timeout`.
    ///
    /// They are not marked AFK.
    #[instrument(skip(self))]
    pub fn prune_pending(&self, now: Instant, timeout: Duration) -> Vec<ClientId> {
        let mut registry = self.registry();
        let stale: Vec<ClientId> = registry
            .pending
            .iter()
            .filter(|(_, record)| record.is_stale(now, timeout))
            .map(|(id, _)| *id)
            .collect();
        for client_id in &stale {
            registry.pending.remove(client_id);
            debug!(%client_id, "Pending client pruned");
        }
        stale
    }
}
