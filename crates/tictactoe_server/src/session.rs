//! A session: two participants bound to one board, with running statistics.

use crate::error::TurnError;
use crate::{ClientId, ClientRecord, SessionId};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tictactoe_board::{Board, BoardState, Coord, Mark, Outcome};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Win/loss/draw tally from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, new)]
pub struct ParticipantStats {
    /// Games this participant won.
    pub wins: u32,
    /// Games this participant lost.
    pub losses: u32,
    /// Games that ended in a draw.
    pub draws: u32,
}

/// What one participant sees when polling a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Current grid.
    pub board: Board,
    /// Whether the polling participant moves next.
    pub your_turn: bool,
    /// Outcome of the current game.
    pub outcome: Outcome,
    /// Running tally for the polling participant.
    #[serde(flatten)]
    pub stats: ParticipantStats,
}

/// Two clients playing consecutive games on one board.
///
/// Participant order is fixed at creation: the first participant plays
/// [`Mark::X`] and opens every game, since the turn pointer returns to X on
/// each reset.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    participants: [(ClientId, ClientRecord); 2],
    board: BoardState,
    wins_of_first: u32,
    draws: u32,
    games_played: u32,
}

impl Session {
    /// Binds `first` (X) and `second` (O) to a fresh board.
    #[instrument(skip(first, second), fields(first = %first.0, second = %second.0))]
    pub fn new(
        id: SessionId,
        first: (ClientId, ClientRecord),
        second: (ClientId, ClientRecord),
    ) -> Self {
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            participants: [first, second],
            board: BoardState::new(),
            wins_of_first: 0,
            draws: 0,
            games_played: 0,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Participant ids in creation order.
    pub fn participants(&self) -> [ClientId; 2] {
        [self.participants[0].0, self.participants[1].0]
    }

    /// Liveness record of a participant.
    pub fn record(&self, client_id: ClientId) -> Option<&ClientRecord> {
        self.index_of(client_id).map(|i| &self.participants[i].1)
    }

    /// Board state of the current game.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Games the first participant has won.
    pub fn wins_of_first(&self) -> u32 {
        self.wins_of_first
    }

    /// Games that ended in a draw.
    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Games that reached a terminal outcome.
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    fn index_of(&self, client_id: ClientId) -> Option<usize> {
        self.participants.iter().position(|(id, _)| *id == client_id)
    }

    /// Checks whether the client is one of the two participants.
    pub fn is_participant(&self, client_id: ClientId) -> bool {
        self.index_of(client_id).is_some()
    }

    /// Checks whether the client moves next.
    #[instrument(level = "trace", skip(self), fields(session_id = %self.id))]
    pub fn is_turn_of(&self, client_id: ClientId) -> bool {
        self.participants[self.board.turn_index()].0 == client_id
    }

    /// Places the caller's mark, re-evaluates the outcome and, if this move
    /// ended the game, updates the statistics.
    ///
    /// Statistics change only on the `InProgress` → terminal transition made
    /// here, so a finished game is counted exactly once.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn attempt_turn(
        &mut self,
        client_id: ClientId,
        row: usize,
        col: usize,
    ) -> Result<Outcome, TurnError> {
        if !self.is_participant(client_id) {
            warn!("Unknown client attempted move");
            return Err(TurnError::NotParticipant);
        }
        if self.board.outcome().is_terminal() {
            warn!(outcome = %self.board.outcome(), "Move attempted after game ended");
            return Err(TurnError::GameOver);
        }
        if !self.is_turn_of(client_id) {
            warn!(expected = %self.board.to_move(), "Client tried to move out of turn");
            return Err(TurnError::NotYourTurn);
        }
        let coord = Coord::new(row, col).ok_or(TurnError::OutOfBounds { row, col })?;
        if !self.board.can_place(coord) {
            warn!("Move targets occupied cell");
            return Err(TurnError::CellOccupied { row, col });
        }

        self.board.place(coord);
        let outcome = self.board.evaluate_outcome();
        if outcome.is_terminal() {
            self.record_result(outcome);
        }

        debug!(%outcome, "Move completed successfully");
        Ok(outcome)
    }

    fn record_result(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won(Mark::X) => self.wins_of_first += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Won(Mark::O) | Outcome::InProgress => {}
        }
        self.games_played += 1;
        info!(
            session_id = %self.id,
            %outcome,
            games_played = self.games_played,
            "Game finished"
        );
    }

    fn wins_at(&self, index: usize) -> u32 {
        if index == 0 {
            self.wins_of_first
        } else {
            self.games_played - self.wins_of_first - self.draws
        }
    }

    /// Win/loss/draw tally for a participant, `None` for outsiders.
    pub fn stats_for(&self, client_id: ClientId) -> Option<ParticipantStats> {
        self.index_of(client_id).map(|i| {
            ParticipantStats::new(self.wins_at(i), self.wins_at(1 - i), self.draws)
        })
    }

    /// Snapshot of the session as the given participant sees it.
    pub fn view_for(&self, client_id: ClientId) -> Option<SessionView> {
        let stats = self.stats_for(client_id)?;
        Some(SessionView {
            board: self.board.board().clone(),
            your_turn: self.is_turn_of(client_id),
            outcome: self.board.outcome(),
            stats,
        })
    }

    /// Stamps the participant's record with the current time.
    ///
    /// Returns `false` if the client is not a participant.
    pub fn touch(&mut self, client_id: ClientId) -> bool {
        self.touch_at(client_id, Instant::now())
    }

    /// Stamps the participant's record with `at`.
    #[instrument(level = "trace", skip(self), fields(session_id = %self.id))]
    pub fn touch_at(&mut self, client_id: ClientId, at: Instant) -> bool {
        match self.index_of(client_id) {
            Some(i) => {
                self.participants[i].1.touch_at(at);
                true
            }
            None => {
                debug!("Touch for non-participant ignored");
                false
            }
        }
    }

    /// Participants whose last access is older than `timeout` at `now`.
    pub fn stale_participants(&self, now: Instant, timeout: Duration) -> Vec<ClientId> {
        self.participants
            .iter()
            .filter(|(_, record)| record.is_stale(now, timeout))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Starts the next game. Statistics are kept.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&mut self) {
        info!(games_played = self.games_played, "Resetting board");
        self.board.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, ClientId, ClientId) {
        let a = ClientId::new_random();
        let b = ClientId::new_random();
        let session = Session::new(
            SessionId::new_random(),
            (a, ClientRecord::new()),
            (b, ClientRecord::new()),
        );
        (session, a, b)
    }

    fn play(session: &mut Session, a: ClientId, b: ClientId, moves: &[(usize, usize)]) -> Outcome {
        let mut outcome = Outcome::InProgress;
        for (i, &(row, col)) in moves.iter().enumerate() {
            let mover = if i % 2 == 0 { a } else { b };
            outcome = session.attempt_turn(mover, row, col).unwrap();
        }
        outcome
    }

    #[test]
    fn test_first_participant_moves_first() {
        let (session, a, b) = session();
        assert!(session.is_turn_of(a));
        assert!(!session.is_turn_of(b));
    }

    #[test]
    fn test_first_wins_row() {
        let (mut session, a, b) = session();
        let outcome = play(&mut session, a, b, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
        assert_eq!(outcome, Outcome::Won(Mark::X));
        assert_eq!(session.wins_of_first(), 1);
        assert_eq!(session.games_played(), 1);
        assert_eq!(session.stats_for(a), Some(ParticipantStats::new(1, 0, 0)));
        assert_eq!(session.stats_for(b), Some(ParticipantStats::new(0, 1, 0)));
    }

    #[test]
    fn test_second_wins_counts_derived() {
        let (mut session, a, b) = session();
        let outcome = play(&mut session, a, b, &[(0, 0), (0, 2), (1, 0), (1, 1), (2, 2), (2, 0)]);
        assert_eq!(outcome, Outcome::Won(Mark::O));
        assert_eq!(session.wins_of_first(), 0);
        assert_eq!(session.draws(), 0);
        assert_eq!(session.games_played(), 1);
        assert_eq!(session.stats_for(b), Some(ParticipantStats::new(1, 0, 0)));
        assert_eq!(session.stats_for(a), Some(ParticipantStats::new(0, 1, 0)));
    }

    #[test]
    fn test_draw_counted() {
        let (mut session, a, b) = session();
        let outcome = play(
            &mut session,
            a,
            b,
            &[(0, 0), (0, 2), (0, 1), (1, 0), (1, 2), (1, 1), (2, 0), (2, 1), (2, 2)],
        );
        assert_eq!(outcome, Outcome::Draw);
        assert_eq!(session.draws(), 1);
        assert_eq!(session.wins_of_first(), 0);
        assert_eq!(session.games_played(), 1);
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let (mut session, a, b) = session();
        session.attempt_turn(a, 1, 1).unwrap();
        let before = session.board().clone();

        assert_eq!(
            session.attempt_turn(b, 1, 1),
            Err(TurnError::CellOccupied { row: 1, col: 1 })
        );
        assert_eq!(session.attempt_turn(a, 0, 0), Err(TurnError::NotYourTurn));
        assert_eq!(
            session.attempt_turn(ClientId::new_random(), 0, 0),
            Err(TurnError::NotParticipant)
        );
        assert_eq!(
            session.attempt_turn(b, 3, 0),
            Err(TurnError::OutOfBounds { row: 3, col: 0 })
        );
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn test_moves_refused_after_game_over() {
        let (mut session, a, b) = session();
        play(&mut session, a, b, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
        assert_eq!(session.attempt_turn(b, 2, 0), Err(TurnError::GameOver));
        assert_eq!(session.games_played(), 1);
    }

    #[test]
    fn test_reset_keeps_stats_and_first_opens() {
        let (mut session, a, b) = session();
        play(&mut session, a, b, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
        session.reset();
        assert_eq!(session.board().outcome(), Outcome::InProgress);
        assert!(session.is_turn_of(a));
        assert_eq!(session.games_played(), 1);
        assert_eq!(session.wins_of_first(), 1);
    }

    #[test]
    fn test_touch_only_participants() {
        let (mut session, a, _b) = session();
        let later = Instant::now() + Duration::from_secs(5);
        assert!(session.touch_at(a, later));
        assert_eq!(session.record(a).map(|r| r.last_access_time()), Some(later));
        assert!(!session.touch(ClientId::new_random()));
    }

    #[test]
    fn test_view_for_outsider_is_none() {
        let (session, a, _b) = session();
        assert!(session.view_for(ClientId::new_random()).is_none());
        let view = session.view_for(a).unwrap();
        assert!(view.your_turn);
        assert_eq!(view.outcome, Outcome::InProgress);
    }
}
