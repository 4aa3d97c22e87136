//! # Menus and Messages
//!
//! Menu listings and the `[*]` / `[!]` message prefixes used on stdout.

use std::fmt::Display;
use std::io::{self, Write};

pub const MAIN_MENU: &str = "\
MAIN MENU:
# read-map <map-path>
# map-from-dir-tree <dir-path> <out-path>
# generate-random-map <number-of-rooms> <out-path>
# load-game <save-path>
# exit";

pub const GAME_MENU: &str = "\
GAME MENU:
# move-to <room>
# pick-up <item>
# drop <item>
# save <save-path>
# find-path <number-of-threads> <room>
# sigusr1
# quit";

pub fn render_menu<W: Write>(out: &mut W, menu: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", menu)
}

/// Reports something that worked.
pub fn report_success<W: Write>(out: &mut W, message: impl Display) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[*] {}", message)
}

/// Reports a refused or failed command.
pub fn report_failure<W: Write>(out: &mut W, message: impl Display) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[!] Error. {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let mut out = Vec::new();
        report_success(&mut out, "Moved to 1.").unwrap();
        report_failure(&mut out, "Player's inventory is full").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n[*] Moved to 1.\n\n[!] Error. Player's inventory is full\n"
        );
    }

    #[test]
    fn test_menus_list_every_command() {
        for command in ["move-to", "pick-up", "drop", "save", "find-path", "sigusr1", "quit"] {
            assert!(GAME_MENU.contains(&format!("# {}", command)));
        }
        for command in ["read-map", "map-from-dir-tree", "generate-random-map", "load-game", "exit"] {
            assert!(MAIN_MENU.contains(&format!("# {}", command)));
        }
    }
}
