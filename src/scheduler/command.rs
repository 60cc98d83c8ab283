/// Characters stripped from both ends of a command-file line.
const LINE_NOISE: [char; 4] = [' ', '\t', '\r', '\n'];

/// Marks a comment line in a command file.
pub const COMMENT_PREFIX: char = '#';

/// A command-file line after trimming and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedLine {
    Blank,
    Comment(String),
    Command(String),
}

impl NormalizedLine {
    pub fn as_str(&self) -> &str {
        match self {
            NormalizedLine::Blank => "",
            NormalizedLine::Comment(text) | NormalizedLine::Command(text) => text,
        }
    }

    /// The command text, if this line is a command candidate
    pub fn into_command(self) -> Option<String> {
        match self {
            NormalizedLine::Command(command) => Some(command),
            _ => None,
        }
    }
}

/// Strip leading and trailing spaces, tabs, carriage returns and newlines.
/// Interior whitespace is left alone.
pub fn trim_line(raw: &str) -> &str {
    raw.trim_matches(&LINE_NOISE[..])
}

pub fn normalize(raw: &str) -> NormalizedLine {
    let line = trim_line(raw);
    if line.is_empty() {
        NormalizedLine::Blank
    } else if line.starts_with(COMMENT_PREFIX) {
        NormalizedLine::Comment(line.to_string())
    } else {
        NormalizedLine::Command(line.to_string())
    }
}

/// Cut `command` down to at most `max_len` bytes, backing off to the nearest
/// char boundary. Returns true if anything was removed.
pub fn truncate_command(command: &mut String, max_len: usize) -> bool {
    if command.len() <= max_len {
        return false;
    }
    let mut end = max_len;
    while !command.is_char_boundary(end) {
        end -= 1;
    }
    command.truncate(end);
    true
}
