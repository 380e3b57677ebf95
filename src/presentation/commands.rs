/// A parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Free text: search for it after the debounce period. Empty clears results.
    Search(String),
    /// Fetch the page after the last one listed.
    NextPage,
    /// Load the poster of the listed movie with this one-based number.
    Poster(usize),
    /// Acknowledge a configuration failure.
    Ack,
    /// Print poster cache counters.
    Stats,
    /// Shrink the poster cache to at most this many entries.
    Trim(usize),
    /// Drop every cached poster.
    Clear,
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
    /// Unrecognised input, with the message to show.
    Invalid(String),
}

impl ConsoleCommand {
    /// Parses one input line. Lines starting with `:` are commands; anything else is a search.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Self::Search(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("next" | "n"), None, None) => Self::NextPage,
            (Some("poster" | "p"), Some(number), None) => match number.parse::<usize>() {
                Ok(number) if number > 0 => Self::Poster(number),
                _ => Self::Invalid(format!("not a movie number: {number}")),
            },
            (Some("ack"), None, None) => Self::Ack,
            (Some("stats"), None, None) => Self::Stats,
            (Some("trim"), Some(count), None) => match count.parse::<usize>() {
                Ok(count) => Self::Trim(count),
                Err(_) => Self::Invalid(format!("not a poster count: {count}")),
            },
            (Some("clear"), None, None) => Self::Clear,
            (Some("help" | "h" | "?"), None, None) => Self::Help,
            (Some("quit" | "q"), None, None) => Self::Quit,
            _ => Self::Invalid(format!("unknown command: {line}")),
        }
    }
}

/// Command summary printed at startup and on `:help`.
pub const HELP: &str = "\
Type to search. Commands:
  :next        fetch the next page
  :poster N    load the poster of movie N
  :ack         dismiss a configuration failure
  :stats       show poster cache statistics
  :trim N      keep at most N posters in memory
  :clear       drop all cached posters
  :quit        exit";

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("star wars", ConsoleCommand::Search("star wars".into()) ; "free text")]
    #[test_case("  dune  ", ConsoleCommand::Search("dune".into()) ; "trimmed text")]
    #[test_case("", ConsoleCommand::Search(String::new()) ; "empty line")]
    #[test_case(":next", ConsoleCommand::NextPage ; "next")]
    #[test_case(":poster 3", ConsoleCommand::Poster(3) ; "poster")]
    #[test_case(":p 1", ConsoleCommand::Poster(1) ; "poster short")]
    #[test_case(":ack", ConsoleCommand::Ack ; "ack")]
    #[test_case(":stats", ConsoleCommand::Stats ; "stats")]
    #[test_case(":trim 5", ConsoleCommand::Trim(5) ; "trim")]
    #[test_case(":trim 0", ConsoleCommand::Trim(0) ; "trim to empty")]
    #[test_case(":clear", ConsoleCommand::Clear ; "clear")]
    #[test_case(":q", ConsoleCommand::Quit ; "quit")]
    fn test_parse(line: &str, expected: ConsoleCommand) {
        assert_eq!(ConsoleCommand::parse(line), expected);
    }

    #[test_case(":poster" ; "missing number")]
    #[test_case(":poster 0" ; "zero")]
    #[test_case(":poster x" ; "not a number")]
    #[test_case(":next 2" ; "extra argument")]
    #[test_case(":trim" ; "missing count")]
    #[test_case(":trim -1" ; "negative count")]
    #[test_case(":rewind" ; "unknown")]
    fn test_parse_invalid(line: &str) {
        assert!(matches!(ConsoleCommand::parse(line), ConsoleCommand::Invalid(_)));
    }
}
