//! # Command Definitions
//!
//! The two text command sets: the main menu, used before a game starts,
//! and the game menu, used while a session runs. Both parse from a single
//! whitespace-separated line.

use crate::game::{ItemId, RoomId};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Why a command line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is not a valid number")]
    NotANumber(String),
}

/// Commands accepted while a game is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// `move-to <room>`
    MoveTo(RoomId),
    /// `pick-up <item>`
    PickUp(ItemId),
    /// `drop <item>`
    Drop(ItemId),
    /// `save <save-path>`
    Save(PathBuf),
    /// `find-path <number-of-threads> <room>`
    FindPath { workers: usize, target: RoomId },
    /// `sigusr1`
    Signal,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Commands accepted at the main menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// `read-map <map-path>`
    ReadMap(PathBuf),
    /// `map-from-dir-tree <dir-path> <out-path>`
    MapFromDirTree { dir: PathBuf, out: PathBuf },
    /// `generate-random-map <number-of-rooms> <out-path>`
    GenerateRandomMap { vertex_count: usize, out: PathBuf },
    /// `load-game <save-path>`
    LoadGame(PathBuf),
    /// `exit`
    Exit,
}

/// Splits a line into a command word and exactly `N` arguments.
fn split_args<'a, const N: usize>(
    mut words: impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<[&'a str; N], ParseError> {
    let usage = || ParseError::Usage { command, expected };
    let mut args = [""; N];
    for arg in args.iter_mut() {
        *arg = words.next().ok_or_else(usage)?;
    }
    if words.next().is_some() {
        return Err(usage());
    }
    Ok(args)
}

fn number<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse().map_err(|_| ParseError::NotANumber(word.to_string()))
}

impl FromStr for GameCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ParseError::Empty)?;

        match command {
            "move-to" => {
                let [room] = split_args(words, "move-to", "<room>")?;
                Ok(Self::MoveTo(number(room)?))
            }
            "pick-up" => {
                let [item] = split_args(words, "pick-up", "<item>")?;
                Ok(Self::PickUp(number(item)?))
            }
            "drop" => {
                let [item] = split_args(words, "drop", "<item>")?;
                Ok(Self::Drop(number(item)?))
            }
            "save" => {
                let [path] = split_args(words, "save", "<save-path>")?;
                Ok(Self::Save(PathBuf::from(path)))
            }
            "find-path" => {
                let [workers, target] =
                    split_args(words, "find-path", "<number-of-threads> <room>")?;
                Ok(Self::FindPath {
                    workers: number(workers)?,
                    target: number(target)?,
                })
            }
            "sigusr1" => {
                let [] = split_args(words, "sigusr1", "no arguments")?;
                Ok(Self::Signal)
            }
            "help" => Ok(Self::Help),
            "quit" => Ok(Self::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

impl FromStr for MenuCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ParseError::Empty)?;

        match command {
            "read-map" => {
                let [path] = split_args(words, "read-map", "<map-path>")?;
                Ok(Self::ReadMap(PathBuf::from(path)))
            }
            "map-from-dir-tree" => {
                let [dir, out] = split_args(words, "map-from-dir-tree", "<dir-path> <out-path>")?;
                Ok(Self::MapFromDirTree {
                    dir: PathBuf::from(dir),
                    out: PathBuf::from(out),
                })
            }
            "generate-random-map" => {
                let [vertex_count, out] =
                    split_args(words, "generate-random-map", "<number-of-rooms> <out-path>")?;
                Ok(Self::GenerateRandomMap {
                    vertex_count: number(vertex_count)?,
                    out: PathBuf::from(out),
                })
            }
            "load-game" => {
                let [path] = split_args(words, "load-game", "<save-path>")?;
                Ok(Self::LoadGame(PathBuf::from(path)))
            }
            "exit" => Ok(Self::Exit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_commands() {
        assert_eq!("move-to 2".parse(), Ok(GameCommand::MoveTo(2)));
        assert_eq!("  pick-up   7 ".parse(), Ok(GameCommand::PickUp(7)));
        assert_eq!("drop 0".parse(), Ok(GameCommand::Drop(0)));
        assert_eq!(
            "save /tmp/game".parse(),
            Ok(GameCommand::Save(PathBuf::from("/tmp/game")))
        );
        assert_eq!(
            "find-path 3 3".parse(),
            Ok(GameCommand::FindPath { workers: 3, target: 3 })
        );
        assert_eq!("sigusr1".parse(), Ok(GameCommand::Signal));
        assert_eq!("quit".parse(), Ok(GameCommand::Quit));
    }

    #[test]
    fn test_game_command_errors() {
        assert_eq!("".parse::<GameCommand>(), Err(ParseError::Empty));
        assert_eq!(
            "fly 3".parse::<GameCommand>(),
            Err(ParseError::Unknown("fly".to_string()))
        );
        assert_eq!(
            "move-to two".parse::<GameCommand>(),
            Err(ParseError::NotANumber("two".to_string()))
        );
        assert_eq!(
            "move-to -1".parse::<GameCommand>(),
            Err(ParseError::NotANumber("-1".to_string()))
        );
        assert!(matches!(
            "find-path 3".parse::<GameCommand>(),
            Err(ParseError::Usage { command: "find-path", .. })
        ));
        assert!(matches!(
            "sigusr1 now".parse::<GameCommand>(),
            Err(ParseError::Usage { .. })
        ));
    }

    #[test]
    fn test_menu_commands() {
        assert_eq!(
            "read-map maps/line".parse(),
            Ok(MenuCommand::ReadMap(PathBuf::from("maps/line")))
        );
        assert_eq!(
            "generate-random-map 16 out".parse(),
            Ok(MenuCommand::GenerateRandomMap {
                vertex_count: 16,
                out: PathBuf::from("out")
            })
        );
        assert_eq!(
            "map-from-dir-tree /usr out".parse(),
            Ok(MenuCommand::MapFromDirTree {
                dir: PathBuf::from("/usr"),
                out: PathBuf::from("out")
            })
        );
        assert_eq!(
            "load-game save".parse(),
            Ok(MenuCommand::LoadGame(PathBuf::from("save")))
        );
        assert_eq!("exit".parse(), Ok(MenuCommand::Exit));
        assert!("generate-random-map many out".parse::<MenuCommand>().is_err());
    }
}
