//! Concurrency tests for the session controller.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tictactoe_server::{ClientId, LobbyError, SessionController};

#[test]
fn test_overlapping_pairs_form_at_most_one_session() {
    for _ in 0..50 {
        let controller = SessionController::new();
        let shared = controller.generate_client_id();
        let left = controller.generate_client_id();
        let right = controller.generate_client_id();
        for id in [shared, left, right] {
            assert!(controller.enqueue_pending(id));
        }

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [left, right]
            .into_iter()
            .map(|other| {
                let controller = controller.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    controller.create_session(shared, other)
                })
            })
            .collect();
        let created: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().expect("Thread panicked"))
            .collect();

        assert_eq!(created.len(), 1);
        assert_eq!(controller.session_count(), 1);
        assert_eq!(controller.pending_count(), 1);
        assert_eq!(controller.find_session_of(shared), Some(created[0]));
    }
}

#[test]
fn test_concurrent_joins_pair_everyone_exactly_once() {
    const CLIENTS: usize = 16;
    let controller = SessionController::new();
    let ids: Vec<ClientId> = (0..CLIENTS).map(|_| controller.generate_client_id()).collect();
    let barrier = Arc::new(Barrier::new(CLIENTS));

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|id| {
            let controller = controller.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Poll like a real client until matched.
                loop {
                    match controller.try_join(id) {
                        Ok(session_id) => return session_id,
                        Err(LobbyError::NoPartner) => thread::yield_now(),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(controller.session_count(), CLIENTS / 2);
    assert_eq!(controller.pending_count(), 0);
    let sessions: HashSet<_> = ids.iter().filter_map(|id| controller.find_session_of(*id)).collect();
    assert_eq!(sessions.len(), CLIENTS / 2);
    for session_id in sessions {
        let session = controller.get_session(session_id).expect("Session vanished");
        let [first, second] = session.participants();
        assert_ne!(first, second);
    }
}
