//! Textual machine language images: one hex word per line, origin first.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::errors::LoadProgramError;

/// A parsed program image: the origin (load base) address followed by the
/// words that go to `origin`, `origin + 1` and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl ProgramImage {
    /// Reads and parses an image file.
    ///
    /// # Errors
    /// [`LoadProgramError::Io`] when the file is unreadable, otherwise the
    /// parse errors of [`ProgramImage::from_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadProgramError> {
        fs::read_to_string(path)?.parse()
    }
}

impl FromStr for ProgramImage {
    type Err = LoadProgramError;

    /// One hex token per line, blank lines skipped, optional `0x` prefix.
    /// The first token is the origin address.
    ///
    /// # Errors
    /// [`LoadProgramError::InvalidWord`] with the offending line number, or
    /// [`LoadProgramError::EmptyImage`] when no origin token exists.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut origin = None;
        let mut words = Vec::new();
        for (index, line) in s.lines().enumerate() {
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            let word = parse_word(token).ok_or_else(|| LoadProgramError::InvalidWord {
                line: index + 1,
                token: token.to_string(),
            })?;
            if origin.is_none() {
                origin = Some(word);
            } else {
                words.push(word);
            }
        }
        let origin = origin.ok_or(LoadProgramError::EmptyImage)?;
        Ok(Self { origin, words })
    }
}

fn parse_word(token: &str) -> Option<u16> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u16::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn parses_origin_then_words() {
        let image: ProgramImage = "3000\n1021\nF025\n".parse().unwrap();
        expect_that!(image.origin, eq(0x3000));
        expect_that!(image.words, eq(&vec![0x1021, 0xF025]));
    }

    #[gtest]
    fn accepts_prefixes_blank_lines_and_padding() {
        let image: ProgramImage = "  0x3000  \n\n0X1021\n  f025\n".parse().unwrap();
        expect_that!(image.origin, eq(0x3000));
        expect_that!(image.words, eq(&vec![0x1021, 0xF025]));
    }

    #[gtest]
    fn reports_the_line_of_a_bad_token() {
        let result = "3000\n1021\nxyzzy\n".parse::<ProgramImage>();
        expect_that!(
            result,
            err(matches_pattern!(LoadProgramError::InvalidWord {
                line: eq(&3),
                token: eq("xyzzy"),
            }))
        );
    }

    #[gtest]
    fn an_image_without_tokens_is_empty() {
        let result = "\n  \n".parse::<ProgramImage>();
        expect_that!(result, err(matches_pattern!(LoadProgramError::EmptyImage)));
    }

    #[gtest]
    fn an_origin_alone_is_a_valid_empty_program() {
        let image: ProgramImage = "3000".parse().unwrap();
        expect_that!(image.origin, eq(0x3000));
        expect_that!(image.words, is_empty());
    }

    #[gtest]
    fn missing_file_reports_io() {
        let result = ProgramImage::from_file("does/not/exist.hex");
        expect_that!(result, err(matches_pattern!(LoadProgramError::Io(anything()))));
    }
}
