//! Tests for command parsing and message capping

#[cfg(test)]
mod tests {
    use super::super::{parse_command, MAX_MESSAGE_CHARS};
    use crate::utils::truncate_chars;

    #[test]
    fn test_parse_plain_command() {
        let cmd = parse_command("/start").unwrap();
        assert_eq!(cmd.name, "start");
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn test_parse_command_with_args() {
        let cmd = parse_command("/upgrade now please").unwrap();
        assert_eq!(cmd.name, "upgrade");
        assert_eq!(cmd.args, "now please");
    }

    #[test]
    fn test_parse_strips_botname_suffix() {
        let cmd = parse_command("/status@flipbot").unwrap();
        assert_eq!(cmd.name, "status");
    }

    #[test]
    fn test_non_commands_are_none() {
        assert!(parse_command("hello there").is_none());
        assert!(parse_command("https://example.com/item").is_none());
        assert!(parse_command("/").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn test_reply_length_cap() {
        let long = "a".repeat(MAX_MESSAGE_CHARS * 2);
        let capped = truncate_chars(&long, MAX_MESSAGE_CHARS);
        assert_eq!(capped.chars().count(), MAX_MESSAGE_CHARS);
    }
}
