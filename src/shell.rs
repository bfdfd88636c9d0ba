//! Interactive shell over a small integer kd-tree.
//!
//! Commands, one per line:
//!
//! | command      | effect                      |
//! |--------------|-----------------------------|
//! | `i x y`      | insert a point              |
//! | `s x y`      | search for a point          |
//! | `d x y`      | delete a point              |
//! | `p`          | print the tree shape        |
//! | `q`          | quit                        |
//!
//! Long forms (`insert`, `search`, `delete`, `print`, `quit`) work too.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::kdtree::{KdTree, Point};

/// Number of coordinates per shell point.
pub const SHELL_DIMENSIONS: usize = 2;

/// Point type used by the shell.
pub type ShellPoint = Point<SHELL_DIMENSIONS, i64>;

/// A parsed shell command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Insert(ShellPoint),
    Search(ShellPoint),
    Delete(ShellPoint),
    Print,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Err(Error::InvalidCommand(String::new()));
        };

        let command = match cmd.to_lowercase().as_str() {
            "i" | "insert" => ShellCommand::Insert(parse_point(&mut words, line)?),
            "s" | "search" => ShellCommand::Search(parse_point(&mut words, line)?),
            "d" | "delete" => ShellCommand::Delete(parse_point(&mut words, line)?),
            "p" | "print" => ShellCommand::Print,
            "q" | "quit" => ShellCommand::Quit,
            _ => return Err(Error::InvalidCommand(line.trim().to_string())),
        };

        if words.next().is_some() {
            return Err(Error::InvalidCommand(line.trim().to_string()));
        }
        Ok(command)
    }
}

fn parse_point<'a>(words: &mut impl Iterator<Item = &'a str>, line: &str) -> Result<ShellPoint> {
    let mut point = [0i64; SHELL_DIMENSIONS];
    for coord in point.iter_mut() {
        *coord = words
            .next()
            .and_then(|w| w.parse().ok())
            .ok_or_else(|| Error::InvalidCommand(line.trim().to_string()))?;
    }
    Ok(point)
}

/// Tree state behind the shell.
#[derive(Debug, Default)]
pub struct Shell {
    tree: KdTree<SHELL_DIMENSIONS, i64>,
}

impl Shell {
    /// Start with an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree being edited.
    pub fn tree(&self) -> &KdTree<SHELL_DIMENSIONS, i64> {
        &self.tree
    }

    /// Run one command and return the text to show.
    ///
    /// Returns `None` for [`ShellCommand::Quit`].
    pub fn execute(&mut self, command: ShellCommand) -> Option<String> {
        let reply = match command {
            ShellCommand::Insert(p) => {
                self.tree.insert(p);
                "Inserted point.".to_string()
            }
            ShellCommand::Search(p) => {
                if self.tree.contains(&p) {
                    "Found point.".to_string()
                } else {
                    "Point not found.".to_string()
                }
            }
            ShellCommand::Delete(p) => {
                if self.tree.remove(&p) {
                    "Deleted point.".to_string()
                } else {
                    "Point not found.".to_string()
                }
            }
            ShellCommand::Print => self.tree.to_string(),
            ShellCommand::Quit => return None,
        };
        Some(reply)
    }
}
