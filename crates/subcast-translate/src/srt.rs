//! Tolerant SubRip (`.srt`) parsing and writing.
//!
//! The parser accepts minor off-spec input: a leading UTF-8 byte-order mark,
//! CRLF/LF mixing, and blocks missing their separating blank line (detected
//! by the next line being a bare integer index).

use crate::error::TranslateError;

/// One parsed subtitle cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Block index as it appeared in the source file (not necessarily dense
    /// or ordered; the parser preserves the file's own sequence).
    pub index: u32,
    /// Raw timing line, e.g. `00:00:01,000 --> 00:00:04,000`.
    pub timing: String,
    /// Subtitle text, possibly spanning multiple lines, newline-joined.
    pub text: String,
}

/// Parse an SRT document into an ordered list of cues.
///
/// # Errors
///
/// Returns [`TranslateError::Parse`] if a block's index or timing line is
/// malformed.
pub fn parse(input: &str) -> Result<Vec<Cue>, TranslateError> {
    let normalized = strip_bom(input).replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.lines().collect();
    let mut cues = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        if lines[pos].trim().is_empty() {
            pos += 1;
            continue;
        }

        let index: u32 = lines[pos].trim().parse().map_err(|_| TranslateError::Parse {
            reason: format!("expected a cue index at line {}, got {:?}", pos + 1, lines[pos]),
        })?;
        pos += 1;

        let timing = *lines.get(pos).ok_or_else(|| TranslateError::Parse {
            reason: format!("missing timing line for cue {index}"),
        })?;
        if !timing.contains("-->") {
            return Err(TranslateError::Parse {
                reason: format!("malformed timing line for cue {index}: {timing:?}"),
            });
        }
        pos += 1;

        let mut text_lines = Vec::new();
        while pos < lines.len() && !lines[pos].trim().is_empty() && !starts_next_block(&lines, pos)
        {
            text_lines.push(lines[pos]);
            pos += 1;
        }
        if pos < lines.len() && lines[pos].trim().is_empty() {
            pos += 1;
        }

        cues.push(Cue {
            index,
            timing: timing.trim().to_string(),
            text: text_lines.join("\n"),
        });
    }

    Ok(cues)
}

/// Render cues back into SRT text, one blank line between blocks, no
/// trailing blank line.
#[must_use]
pub fn write(cues: &[Cue]) -> String {
    cues.iter()
        .map(|cue| format!("{}\n{}\n{}\n", cue.index, cue.timing, cue.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

/// Detect a block missing its separating blank line: the current text line
/// is immediately followed by what looks like the next cue's index and
/// timing line.
fn starts_next_block(lines: &[&str], pos: usize) -> bool {
    lines[pos].trim().parse::<u32>().is_ok()
        && lines
            .get(pos + 1)
            .is_some_and(|next| next.contains("-->"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n";

    #[test]
    fn parses_well_formed_srt() {
        let cues = parse(WELL_FORMED).expect("parses");
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].text, "Hello");
        assert_eq!(cues[1].text, "World");
    }

    #[test]
    fn strips_bom_and_normalizes_crlf() {
        let with_bom = format!("\u{feff}{}", WELL_FORMED.replace('\n', "\r\n"));
        let cues = parse(&with_bom).expect("parses");
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello");
    }

    #[test]
    fn tolerates_missing_blank_line_between_blocks() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nHello\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n";
        let cues = parse(input).expect("parses");
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello");
        assert_eq!(cues[1].text, "World");
    }

    #[test]
    fn multi_line_cue_text_is_newline_joined() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nLine one\nLine two\n";
        let cues = parse(input).expect("parses");
        assert_eq!(cues[0].text, "Line one\nLine two");
    }

    #[test]
    fn rejects_malformed_timing_line() {
        let input = "1\nnot a timing line\nHello\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(err, TranslateError::Parse { .. }));
    }

    #[test]
    fn write_round_trips_through_parse() {
        let cues = parse(WELL_FORMED).expect("parses");
        let rendered = write(&cues);
        let reparsed = parse(&rendered).expect("reparses");
        assert_eq!(cues, reparsed);
    }
}
