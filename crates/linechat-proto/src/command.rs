//! Client command parsing.
//!
//! Every line a client sends is one of three things: the literal `who`, a
//! pipe-delimited `rename|<name>` request, or chat text to broadcast.

/// Literal directory-listing command.
pub const WHO: &str = "who";

/// Prefix of a rename request, including the delimiter.
pub const RENAME_PREFIX: &str = "rename|";

/// Separator between the rename keyword and the requested name.
pub const RENAME_DELIMITER: char = '|';

/// A classified client line, borrowing from the received text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// List everyone currently online.
    Who,
    /// Change the sender's display name.
    Rename(&'a str),
    /// A `rename|` line that does not split into exactly two non-empty
    /// segments.
    MalformedRename,
    /// Broadcast the text to everyone.
    Chat(&'a str),
    /// Nothing but the line terminator.
    Empty,
}

impl<'a> Command<'a> {
    /// Classify one received line. The terminator must already be stripped.
    pub fn parse(line: &'a str) -> Self {
        if line.is_empty() {
            return Command::Empty;
        }
        if line == WHO {
            return Command::Who;
        }
        if line.starts_with(RENAME_PREFIX) {
            let mut parts = line.split(RENAME_DELIMITER);
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(_), Some(name), None) if !name.is_empty() => Command::Rename(name),
                _ => Command::MalformedRename,
            };
        }
        Command::Chat(line)
    }

    /// Short static name used for metrics labels and dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Who => "WHO",
            Command::Rename(_) | Command::MalformedRename => "RENAME",
            Command::Chat(_) => "CHAT",
            Command::Empty => "EMPTY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn who_is_exact_match() {
        assert_eq!(Command::parse("who"), Command::Who);
        assert_eq!(Command::parse("who "), Command::Chat("who "));
        assert_eq!(Command::parse("WHO"), Command::Chat("WHO"));
        assert_eq!(Command::parse("whom"), Command::Chat("whom"));
    }

    #[test]
    fn rename_takes_second_segment() {
        assert_eq!(Command::parse("rename|alice"), Command::Rename("alice"));
        assert_eq!(Command::parse("rename| spaced "), Command::Rename(" spaced "));
    }

    #[test]
    fn rename_needs_exactly_two_segments() {
        assert_eq!(Command::parse("rename|a|b"), Command::MalformedRename);
        assert_eq!(Command::parse("rename|"), Command::MalformedRename);
        assert_eq!(Command::parse("rename||"), Command::MalformedRename);
    }

    #[test]
    fn rename_without_pipe_is_chat() {
        assert_eq!(Command::parse("rename"), Command::Chat("rename"));
        assert_eq!(Command::parse("rename alice"), Command::Chat("rename alice"));
    }

    #[test]
    fn empty_line() {
        assert_eq!(Command::parse(""), Command::Empty);
    }

    #[test]
    fn names_group_rename_variants() {
        assert_eq!(Command::Rename("x").name(), "RENAME");
        assert_eq!(Command::MalformedRename.name(), "RENAME");
        assert_eq!(Command::Chat("x").name(), "CHAT");
    }
}
