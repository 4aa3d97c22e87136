//! # Input Module
//!
//! Line-oriented input for both menus.

pub mod commands;

pub use commands::*;

use crate::WarrenResult;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Reads commands one line at a time from an async reader.
///
/// The same handler is shared by the main menu and the game session, so
/// scripted input flows from one into the other.
#[derive(Debug)]
pub struct InputHandler<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> InputHandler<R> {
    /// Creates a handler over a buffered reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{GameCommand, InputHandler};
    ///
    /// tokio_test::block_on(async {
    ///     let mut input = InputHandler::new("\n  move-to 1\n".as_bytes());
    ///     let line = input.next_line().await.unwrap().unwrap();
    ///     assert_eq!(line.parse(), Ok(GameCommand::MoveTo(1)));
    ///     assert_eq!(input.next_line().await.unwrap(), None);
    /// });
    /// ```
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Returns the next non-blank line, trimmed, or `None` at end of input.
    ///
    /// Cancel-safe: dropping the future loses no command.
    pub async fn next_line(&mut self) -> WarrenResult<Option<String>> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
        Ok(None)
    }
}
