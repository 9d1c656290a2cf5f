//! Parsing for the interactive shell commands.

use std::str::FromStr;

use thiserror::Error;

/// Printed for `?`, matching the original simulator's menu.
pub const HELP: &str = "\
----------------LC-3 ISIM Help-----------------------
go               -  run program to completion
run n            -  execute program for n instructions
mdump low high   -  dump memory from low to high
rdump            -  dump the register & bus values
?                -  display this help menu
quit             -  exit the program
";

/// One command of the interactive shell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// `go`: run until halt.
    Go,
    /// `run n`: execute at most `n` cycles.
    Run { cycles: u64 },
    /// `mdump low high`: dump a memory range, bounds inclusive.
    MemoryDump { low: u16, high: u16 },
    /// `rdump`: dump instruction count, PC, flags and registers.
    RegisterDump,
    /// `?`: print the command list.
    Help,
    /// `quit`: leave the shell.
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("invalid command '{0}', try '?'")]
    UnknownCommand(String),
    #[error("'{command}' expects {expected}")]
    BadArguments {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Case-insensitive, whitespace-separated; extra arguments are ignored
    /// like the original shell does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(ParseCommandError::UnknownCommand(String::new()));
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "go" | "g" => Self::Go,
            "run" | "r" => {
                let cycles = parts
                    .next()
                    .and_then(|token| token.parse().ok())
                    .ok_or(ParseCommandError::BadArguments {
                        command: "run",
                        expected: "a decimal cycle count",
                    })?;
                Self::Run { cycles }
            }
            "mdump" | "m" => {
                let bad_arguments = ParseCommandError::BadArguments {
                    command: "mdump",
                    expected: "two addresses, decimal or 0x-prefixed hex",
                };
                let low = parts
                    .next()
                    .and_then(parse_address)
                    .ok_or_else(|| bad_arguments.clone())?;
                let high = parts.next().and_then(parse_address).ok_or(bad_arguments)?;
                Self::MemoryDump { low, high }
            }
            "rdump" | "rd" => Self::RegisterDump,
            "?" | "help" => Self::Help,
            "quit" | "q" => Self::Quit,
            _ => return Err(ParseCommandError::UnknownCommand(name.to_string())),
        };
        Ok(command)
    }
}

/// Decimal by default, hex with a `0x` prefix, mirroring the `%i` scanning
/// of the original shell.
fn parse_address(token: &str) -> Option<u16> {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .map_or_else(|| token.parse().ok(), |hex| u16::from_str_radix(hex, 16).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[parameterized(
        go = { "go", Command::Go },
        go_alias = { "G", Command::Go },
        run = { "run 25", Command::Run { cycles: 25 } },
        run_alias = { "r 1", Command::Run { cycles: 1 } },
        mdump_hex = { "mdump 0x3000 0x300F", Command::MemoryDump { low: 0x3000, high: 0x300F } },
        mdump_decimal = { "m 12288 12303", Command::MemoryDump { low: 0x3000, high: 0x300F } },
        rdump = { "rdump", Command::RegisterDump },
        rdump_alias = { "RD", Command::RegisterDump },
        help = { "?", Command::Help },
        quit = { "quit", Command::Quit },
    )]
    fn parses(line: &str, expected: Command) {
        assert_eq!(line.parse::<Command>().unwrap(), expected);
    }

    #[gtest]
    fn unknown_commands_are_rejected() {
        expect_that!(
            "launch".parse::<Command>(),
            err(eq(&ParseCommandError::UnknownCommand("launch".into())))
        );
    }

    #[gtest]
    fn run_requires_a_count() {
        expect_that!(
            "run many".parse::<Command>(),
            err(matches_pattern!(ParseCommandError::BadArguments {
                command: eq(&"run"),
                ..
            }))
        );
        expect_that!(
            "run".parse::<Command>(),
            err(matches_pattern!(ParseCommandError::BadArguments {
                command: eq(&"run"),
                ..
            }))
        );
    }

    #[gtest]
    fn mdump_requires_both_bounds() {
        expect_that!(
            "mdump 0x3000".parse::<Command>(),
            err(matches_pattern!(ParseCommandError::BadArguments {
                command: eq(&"mdump"),
                ..
            }))
        );
    }
}
