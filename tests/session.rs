/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{sync::mpsc::channel, time::Duration};

use rookie::{
    AiConfig, Color, Difficulty, GameMode, GameStatus, Notification, Selection, Session, Square,
};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

/// Two sessions wired back to back, the way the network layer would connect them.
#[test]
fn test_two_peers_stay_in_sync() {
    let (host_out, host_notes) = channel();
    let (guest_out, guest_notes) = channel();
    let (replies, _) = channel();

    let mut host = Session::new(AiConfig::default(), host_out, replies.clone());
    let mut guest = Session::new(AiConfig::default(), guest_out, replies);
    host.set_seat(Some(Color::White));
    guest.set_seat(Some(Color::Black));

    let script = [
        ("host", "e2", "e4"),
        ("guest", "e7", "e5"),
        ("host", "g1", "f3"),
        ("guest", "b8", "c6"),
    ];

    for (who, from, to) in script {
        let (mover, other, notes) = match who {
            "host" => (&mut host, &mut guest, &host_notes),
            _ => (&mut guest, &mut host, &guest_notes),
        };

        // The other side cannot move out of turn
        assert!(other.commit_local_move(sq(from), sq(to)).is_none());

        mover.on_square_selected(sq(from));
        assert!(matches!(
            mover.on_square_selected(sq(to)),
            Selection::Committed(_)
        ));

        let Notification::Move { from, to, .. } = notes.try_recv().unwrap() else {
            panic!("expected a move notification");
        };
        other.apply_remote_move(from, to).unwrap();

        assert_eq!(host.game(), guest.game());
    }

    // A reset travels the same way, and is not echoed back
    host.reset();
    assert_eq!(host_notes.try_recv().unwrap(), Notification::Reset);
    guest.apply_remote_reset();
    assert!(guest_notes.try_recv().is_err());
    assert_eq!(host.game(), guest.game());
    assert!(host.game().history().is_empty());
}

#[test]
fn test_ai_plays_a_whole_game_against_itself() {
    let (outbox, notes) = channel();
    let (replies_tx, replies) = channel();

    let config = AiConfig {
        difficulty: Difficulty::Easy,
        mode: GameMode::Computer,
        ai_color: Color::White,
    };
    let mut session = Session::new(config, outbox, replies_tx);

    for _ in 0..6 {
        let side = session.game().side_to_move();
        session.set_config(AiConfig {
            ai_color: side,
            ..config
        });
        assert!(session.request_ai_move());

        let outcome = replies.recv_timeout(Duration::from_secs(60)).unwrap();
        let mv = session.on_search_finished(outcome).unwrap();
        assert_eq!(mv.piece().color(), side);
        assert_ne!(session.game().side_to_move(), side);
        assert!(!matches!(
            session.game().status(),
            GameStatus::Checkmate { .. } | GameStatus::Stalemate
        ));
    }

    assert_eq!(session.game().history().len(), 6);

    // AI moves are never broadcast
    assert!(notes.try_recv().is_err());
}
