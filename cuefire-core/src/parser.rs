//! SubRip (SRT) and WebVTT text parsing
//!
//! Both formats are sequences of blank-line separated blocks. Cue blocks carry
//! a `start --> end` timing line followed by text lines; WebVTT adds a header
//! block and `NOTE`, `STYLE` and `REGION` metadata blocks, which come out as
//! their own [`Node`] kinds.

use crate::{CueRecord, Error, Node, Result};

const VTT_SIGNATURE: &str = "WEBVTT";
const TIMING_ARROW: &str = "-->";

/// A blank-line separated group of lines
struct Block<'a> {
    /// 1-based line number of the first line in the block
    first_line: usize,
    lines: Vec<&'a str>,
}

/// Parses a subtitle document, detecting WebVTT by its signature line and
/// falling back to SubRip otherwise
pub fn parse(text: &str) -> Result<Vec<Node>> {
    let text = strip_bom(text);
    let first_line = text.lines().next().unwrap_or("");
    if has_signature(first_line, VTT_SIGNATURE) {
        parse_vtt(text)
    } else {
        parse_srt(text)
    }
}

/// Parses a SubRip document
pub fn parse_srt(text: &str) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();

    for block in split_blocks(strip_bom(text)) {
        // The numeric counter line is optional in practice
        let timing_at = find_timing_line(&block).ok_or(Error::MissingTiming {
            line: block.first_line,
        })?;
        let line = block.first_line + timing_at;
        let (start_ms, end_ms) = parse_timing(block.lines[timing_at], line)?;
        let text = block.lines[timing_at + 1..].join("\n");

        nodes.push(Node::Cue(CueRecord::new(start_ms, end_ms, text)));
    }

    Ok(nodes)
}

/// Parses a WebVTT document
pub fn parse_vtt(text: &str) -> Result<Vec<Node>> {
    let mut blocks = split_blocks(strip_bom(text)).into_iter();

    let header = blocks.next().ok_or(Error::InvalidHeader { line: 1 })?;
    let signature = header.lines[0];
    if header.first_line != 1 || !has_signature(signature, VTT_SIGNATURE) {
        return Err(Error::InvalidHeader {
            line: header.first_line,
        });
    }
    let mut header_text = vec![signature[VTT_SIGNATURE.len()..].trim()];
    header_text.extend(&header.lines[1..]);
    let header_text = header_text
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut nodes = vec![Node::Header(header_text)];

    for block in blocks {
        let first = block.lines[0];
        if has_signature(first, "NOTE") {
            let mut body = vec![first["NOTE".len()..].trim()];
            body.extend(&block.lines[1..]);
            let body: Vec<&str> = body.into_iter().filter(|l| !l.is_empty()).collect();
            nodes.push(Node::Note(body.join("\n")));
            continue;
        }
        if first.trim_end() == "STYLE" {
            nodes.push(Node::Style(block.lines[1..].join("\n")));
            continue;
        }
        if first.trim_end() == "REGION" {
            nodes.push(Node::Region(block.lines[1..].join("\n")));
            continue;
        }

        // Optional cue identifier precedes the timing line
        let timing_at = find_timing_line(&block).ok_or(Error::MissingTiming {
            line: block.first_line + block.lines.len().min(2) - 1,
        })?;
        let line = block.first_line + timing_at;
        let (start_ms, end_ms) = parse_timing(block.lines[timing_at], line)?;
        let text = block.lines[timing_at + 1..].join("\n");

        nodes.push(Node::Cue(CueRecord::new(start_ms, end_ms, text)));
    }

    Ok(nodes)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// `WEBVTT`, `NOTE` and friends must be followed by end of line, space or tab
fn has_signature(line: &str, signature: &str) -> bool {
    match line.strip_prefix(signature) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t'),
        None => false,
    }
}

fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        current
            .get_or_insert_with(|| Block {
                first_line: i + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Timing sits on the first line, or on the second after a counter/identifier
fn find_timing_line(block: &Block) -> Option<usize> {
    block
        .lines
        .iter()
        .take(2)
        .position(|line| line.contains(TIMING_ARROW))
}

/// Parses `start --> end [settings]` into millisecond bounds
fn parse_timing(line: &str, line_no: usize) -> Result<(u64, u64)> {
    let (start, rest) = line
        .split_once(TIMING_ARROW)
        .ok_or(Error::MissingTiming { line: line_no })?;
    let start = start.trim();
    // WebVTT cue settings follow the end timestamp
    let end = rest.split_whitespace().next().unwrap_or("");

    let invalid = |value: &str| Error::InvalidTimestamp {
        line: line_no,
        value: value.to_string(),
    };
    let start_ms = parse_timestamp(start).ok_or_else(|| invalid(start))?;
    let end_ms = parse_timestamp(end).ok_or_else(|| invalid(end))?;
    Ok((start_ms, end_ms))
}

/// Parses `[HH:]MM:SS[.,]mmm` into milliseconds
pub fn parse_timestamp(value: &str) -> Option<u64> {
    let (clock, fraction) = match value.rfind(|c| c == ',' || c == '.') {
        Some(i) => (&value[..i], Some(&value[i + 1..])),
        None => (value, None),
    };

    let fields: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (number(h)?, number(m)?, number(s)?),
        [m, s] => (0, number(m)?, number(s)?),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = match fraction {
        None => 0,
        Some(f) if (1..=3).contains(&f.len()) => number(f)? * 10u64.pow(3 - f.len() as u32),
        Some(_) => return None,
    };

    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + millis)
}

fn number(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\nworld\n\n2\n00:00:03,000 --> 00:00:04,000\nBye\n";

    fn cues(nodes: Vec<Node>) -> Vec<CueRecord> {
        nodes.into_iter().filter_map(Node::into_cue).collect()
    }

    #[test]
    fn test_parse_srt() {
        let nodes = parse(SRT).unwrap();
        assert_eq!(
            cues(nodes),
            vec![
                CueRecord::new(1000, 2500, "Hello\nworld"),
                CueRecord::new(3000, 4000, "Bye"),
            ]
        );
    }

    #[test]
    fn test_parse_srt_crlf_and_bom() {
        let text = format!("\u{feff}{}", SRT.replace('\n', "\r\n"));
        let parsed = cues(parse(&text).unwrap());
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "Hello\nworld");
    }

    #[test]
    fn test_parse_srt_without_counter() {
        let parsed = cues(parse("00:00:00,000 --> 00:00:01,000\nHi\n").unwrap());
        assert_eq!(parsed, vec![CueRecord::new(0, 1000, "Hi")]);
    }

    #[test]
    fn test_parse_vtt_with_metadata() {
        let text = "WEBVTT - demo\n\nNOTE this is a comment\n\nSTYLE\n::cue { color: red }\n\nintro\n00:01.000 --> 00:02.000 align:start line:0\nHi\n\n01:00:00.500 --> 01:00:01.000\nLater\n";
        let nodes = parse(text).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Header("- demo".into()),
                Node::Note("this is a comment".into()),
                Node::Style("::cue { color: red }".into()),
                Node::Cue(CueRecord::new(1000, 2000, "Hi")),
                Node::Cue(CueRecord::new(3_600_500, 3_601_000, "Later")),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_plain_text_is_missing_timing() {
        let err = parse("this is not a subtitle").unwrap_err();
        assert!(matches!(err, Error::MissingTiming { line: 1 }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_invalid_timestamp_reports_line() {
        let err = parse("1\n00:00:01,000 --> 00:61:00,000\nx\n").unwrap_err();
        match err {
            Error::InvalidTimestamp { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "00:61:00,000");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_vtt_signature_must_be_exact() {
        assert!(matches!(parse_vtt("WEBVTTX\n"), Err(Error::InvalidHeader { line: 1 })));
        // Not detected as WebVTT, so it is parsed as SRT and fails there
        assert!(parse("WEBVTTX\n\n00:01.000 --> 00:02.000\nHi\n").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:01,000"), Some(1000));
        assert_eq!(parse_timestamp("01:02.5"), Some(62_500));
        assert_eq!(parse_timestamp("1:00:00.05"), Some(3_600_050));
        assert_eq!(parse_timestamp("00:00"), Some(0));
        assert_eq!(parse_timestamp("12"), None);
        assert_eq!(parse_timestamp("00:00:01,0000"), None);
        assert_eq!(parse_timestamp("aa:00:01,000"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
