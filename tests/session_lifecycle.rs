//! Session behaviour with the daemons running: autosave, interrupts and
//! shutdown.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use warren::{
    load_game, GameState, InputHandler, Interrupt, Item, Player, RoomGraph, Session, SessionConfig,
    WarrenError,
};

/// Line 0-1-2-3 with items in rooms 0 and 3 only.
fn line_state() -> GameState {
    let mut graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
    for (room, item) in [(0, Item::new(0, 2)), (3, Item::new(1, 1))] {
        graph.room_mut(room).unwrap().items.push(item).unwrap();
        graph.room_mut(item.destination).unwrap().assigned.push(item.id).unwrap();
    }
    GameState::new(graph, Player::new(1))
}

/// Line 0-1-2-3 fully populated, player in room 1.
fn populated_line_state() -> GameState {
    let graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
    let mut state = GameState::new_game(graph, &mut StdRng::seed_from_u64(9)).unwrap();
    state.player.location = 1;
    state
}

fn config(dir: &tempfile::TempDir) -> SessionConfig {
    SessionConfig::new(dir.path().join("autosave"))
        .with_seed(Some(1))
        .with_os_signals(false)
}

#[tokio::test]
async fn test_autosave_runs_during_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autosave");
    let config = config(&dir).with_autosave_timing(Duration::from_millis(10), Duration::from_millis(50));

    let session = Session::start(populated_line_state(), config).unwrap();
    let (reader, mut writer) = tokio::io::duplex(64);
    let mut input = InputHandler::new(BufReader::new(reader));
    let mut out = Vec::new();

    let driver = async {
        writer.write_all(b"move-to 2\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        writer.write_all(b"quit\n").await.unwrap();
    };
    let (state, ()) = tokio::join!(session.run(&mut input, &mut out), driver);

    let state = state.unwrap();
    let saved = load_game(&path).await.unwrap();
    assert_eq!(state.player.location, 2);
    assert_eq!(saved.player.location, 2);
}

#[tokio::test]
async fn test_interrupts_reach_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::start(line_state(), config(&dir)).unwrap();
    let interrupts = session.interrupts();
    let (reader, mut writer) = tokio::io::duplex(64);
    let mut input = InputHandler::new(BufReader::new(reader));
    let mut out = Vec::new();

    let driver = async {
        let swap = interrupts.send_and_wait(Interrupt::User1).await.unwrap().unwrap();
        writer.write_all(b"quit\n").await.unwrap();
        swap
    };
    let (state, swap) = tokio::join!(session.run(&mut input, &mut out), driver);

    let state = state.unwrap();
    assert_eq!(state.graph.locate_item(0), Some(3));
    assert_eq!(state.graph.locate_item(1), Some(0));
    assert_eq!(swap.first_item.id + swap.second_item.id, 1);
    assert_eq!(state.total_item_count(), 2);
}

#[tokio::test]
async fn test_unexpected_interrupt_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::start(line_state(), config(&dir)).unwrap();
    let interrupts = session.interrupts();
    let (reader, writer) = tokio::io::duplex(64);
    let mut input = InputHandler::new(BufReader::new(reader));
    let mut out = Vec::new();

    let driver = async {
        interrupts.send(Interrupt::User2).await.unwrap();
        // Keep the input open so only the daemon can end the session.
        writer
    };
    let (result, _writer) = tokio::join!(session.run(&mut input, &mut out), driver);

    assert!(matches!(result, Err(WarrenError::ProtocolViolation(_))));
}

#[tokio::test]
async fn test_end_of_input_stops_the_daemons() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::start(line_state(), config(&dir)).unwrap();
    let game = session.game().clone();
    let mut input = InputHandler::new("move-to 0\n".as_bytes());
    let mut out = Vec::new();

    let state = session.run(&mut input, &mut out).await.unwrap();

    assert_eq!(state.player.location, 0);
    assert_eq!(game.lock().await.player.location, 0);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("-------- GAME STATE --------"));
    assert!(out.contains("GAME MENU:"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_sigusr1_swaps_items() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::start(line_state(), config(&dir).with_os_signals(true)).unwrap();
    let game = session.game().clone();
    let (reader, mut writer) = tokio::io::duplex(64);
    let mut input = InputHandler::new(BufReader::new(reader));
    let mut out = Vec::new();

    let driver = async {
        let status = tokio::process::Command::new("kill")
            .args(["-USR1", &std::process::id().to_string()])
            .status()
            .await
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), async {
            while game.lock().await.graph.locate_item(0) != Some(3) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        writer.write_all(b"quit\n").await.unwrap();
    };
    let (state, ()) = tokio::join!(session.run(&mut input, &mut out), driver);

    assert_eq!(state.unwrap().graph.locate_item(1), Some(0));
}
