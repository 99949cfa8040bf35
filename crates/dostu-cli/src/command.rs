/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    New,
    Retry,
    History,
    Search(String),
    /// Session id or 1-based position in the last history listing
    Open(String),
    Delete(String),
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim().to_string()),
            None => (rest, String::new()),
        };

        match name {
            "new" => Self::New,
            "retry" => Self::Retry,
            "history" => Self::History,
            "search" => Self::Search(arg),
            "open" if !arg.is_empty() => Self::Open(arg),
            "delete" if !arg.is_empty() => Self::Delete(arg),
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  <text>            send a message
  /new              start a new chat
  /retry            repeat the last message
  /history          list saved chats
  /search <query>   filter saved chats
  /open <n|id>      open a saved chat
  /delete <n|id>    delete a saved chat
  /quit             exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_trimmed() {
        assert_eq!(Command::parse("  Salam  \n"), Command::Send("Salam".to_string()));
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse("/new"), Command::New);
        assert_eq!(Command::parse("/retry"), Command::Retry);
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(Command::parse("/search speed  limit"), Command::Search("speed  limit".to_string()));
        assert_eq!(Command::parse("/open 2"), Command::Open("2".to_string()));
        assert_eq!(Command::parse("/delete abc"), Command::Delete("abc".to_string()));
        assert_eq!(Command::parse("/exit"), Command::Quit);
    }

    #[test]
    fn test_missing_argument_or_unknown_name() {
        assert_eq!(Command::parse("/open"), Command::Unknown("/open".to_string()));
        assert_eq!(Command::parse("/frobnicate x"), Command::Unknown("/frobnicate x".to_string()));
    }
}
