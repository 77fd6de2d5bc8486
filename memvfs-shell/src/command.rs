use thiserror::Error;

/// One parsed line of shell input. Arguments borrow from the line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Mkdir(&'a str),
    Create(&'a str),
    /// `data` is everything after the single space following the name, as raw
    /// bytes.
    Write { name: &'a str, data: &'a [u8] },
    Read(&'a str),
    Delete(&'a str),
    Rmdir(&'a str),
    Ls,
    Cd(&'a str),
    Pwd,
    Df,
    Help,
    Exit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("Invalid command.")]
    Unknown(String),
    #[error("Usage: {0}")]
    MissingArgument(&'static str),
    #[error("Names must be valid UTF-8.")]
    NotUtf8,
}

pub const USAGE: &[&str] = &[
    "mkdir <name>",
    "create <name>",
    "write <name> <data>",
    "read <name>",
    "delete <name>",
    "rmdir <name>",
    "ls",
    "cd <name|..>",
    "pwd",
    "df",
    "help",
    "exit",
];

impl<'a> Command<'a> {
    /// Parses a raw line. Verbs and names must be UTF-8; a `write` payload is
    /// taken as is.
    pub fn parse(line: &'a [u8]) -> Result<Self, ParseError> {
        let mut line = line;
        while let [rest @ .., b'\n'] | [rest @ .., b'\r'] = line {
            line = rest;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::Empty);
        }

        let (verb, rest) = split_word(line);
        let arg = |usage| match split_word(rest).0 {
            [] => Err(ParseError::MissingArgument(usage)),
            name => text(name),
        };

        let command = match verb {
            b"mkdir" => Command::Mkdir(arg("mkdir <name>")?),
            b"create" => Command::Create(arg("create <name>")?),
            b"write" => {
                let (name, data) = split_word(rest);
                if name.is_empty() {
                    return Err(ParseError::MissingArgument("write <name> <data>"));
                }
                // Only the separator goes, the payload keeps its own spacing.
                let data = match data {
                    [b' ', data @ ..] | [b'\t', data @ ..] => data,
                    data => data,
                };
                Command::Write {
                    name: text(name)?,
                    data,
                }
            }
            b"read" => Command::Read(arg("read <name>")?),
            b"delete" => Command::Delete(arg("delete <name>")?),
            b"rmdir" => Command::Rmdir(arg("rmdir <name>")?),
            b"ls" => Command::Ls,
            b"cd" => Command::Cd(arg("cd <name|..>")?),
            b"pwd" => Command::Pwd,
            b"df" => Command::Df,
            b"help" => Command::Help,
            b"exit" => Command::Exit,
            other => {
                return Err(ParseError::Unknown(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            }
        };
        Ok(command)
    }
}

fn text(word: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(word).map_err(|_| ParseError::NotUtf8)
}

/// Splits off the first whitespace-delimited word, skipping leading whitespace.
/// The remainder starts at the whitespace that ended the word.
fn split_word(s: &[u8]) -> (&[u8], &[u8]) {
    let start = s
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(s.len());
    let s = &s[start..];
    match s.iter().position(u8::is_ascii_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, &s[s.len()..]),
    }
}
