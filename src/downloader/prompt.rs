// Interactive menus: quality choice and the missing-ffmpeg fallback menu
//
// Input and output are generic so the loops run against in-memory buffers in tests.

use std::io::{BufRead, Write};
use std::num::{IntErrorKind, ParseIntError};

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::Format;

/// Why a menu answer was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceError {
    NotANumber,
    OutOfRange { max: usize },
}

/// Parse a 1-based menu choice against `count` entries
pub fn parse_choice(input: &str, count: usize) -> Result<usize, ChoiceError> {
    let n: i64 = input.trim().parse().map_err(|e: ParseIntError| match e.kind() {
        // Still an integer, just far outside the menu
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ChoiceError::OutOfRange { max: count },
        _ => ChoiceError::NotANumber,
    })?;
    if n >= 1 && (n as u64) <= count as u64 {
        Ok(n as usize)
    } else {
        Err(ChoiceError::OutOfRange { max: count })
    }
}

/// Answers to the missing-ffmpeg menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFallback {
    VideoOnly,
    Progressive,
    Abort,
}

impl MergeFallback {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::VideoOnly),
            "2" => Some(Self::Progressive),
            "3" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Read one line; end of input is an error so loops cannot spin forever
pub fn read_answer<R: BufRead>(input: &mut R) -> Result<String, DownloadError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(DownloadError::InputClosed);
    }
    Ok(line)
}

/// Show the numbered quality list and loop until a valid choice.
/// Returns `None` when no format matches.
pub fn choose_quality<R: BufRead, W: Write>(
    formats: &[Format],
    only_progressive: bool,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Format>, DownloadError> {
    writeln!(output, "\nAvailable video qualities:")?;
    let candidates = FormatSelector::candidates(formats, only_progressive);
    for (i, fmt) in candidates.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, FormatSelector::quality_label(fmt))?;
    }

    if candidates.is_empty() {
        writeln!(output, "No matching qualities available.")?;
        return Ok(None);
    }

    loop {
        write!(output, "\nEnter the number of your preferred quality: ")?;
        output.flush()?;
        let answer = read_answer(input)?;
        match parse_choice(&answer, candidates.len()) {
            Ok(n) => return Ok(Some(candidates[n - 1].clone())),
            Err(ChoiceError::OutOfRange { max }) => writeln!(
                output,
                "Invalid choice. Please enter a number between 1 and {}.",
                max
            )?,
            Err(ChoiceError::NotANumber) => writeln!(output, "Please enter a valid number.")?,
        }
    }
}

/// Print the missing-ffmpeg menu header
pub fn print_merge_fallback_menu<W: Write>(output: &mut W) -> Result<(), DownloadError> {
    writeln!(output, "\nffmpeg is not installed or not on PATH.")?;
    writeln!(output, "Merging video and audio requires ffmpeg. Options:")?;
    writeln!(output, "  1) Download video-only (no audio)")?;
    writeln!(output, "  2) Choose a different quality that includes audio")?;
    writeln!(output, "  3) Abort and install ffmpeg (recommended)")?;
    Ok(())
}

/// Loop until the user answers 1, 2 or 3
pub fn ask_merge_fallback<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<MergeFallback, DownloadError> {
    loop {
        write!(output, "Enter 1, 2 or 3: ")?;
        output.flush()?;
        let answer = read_answer(input)?;
        match MergeFallback::parse(&answer) {
            Some(choice) => return Ok(choice),
            None => writeln!(output, "Invalid choice.")?,
        }
    }
}
