use std::io::BufRead;

use super::{ExtractedContent, SmartExtractor};
use crate::error::Result;

/// Decode one line, dropping bytes that are not valid UTF-8.
fn decode_line(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Read every line of `reader`, keeping the ones `keep` renders.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. Invalid UTF-8 bytes are
/// dropped, so stray binary in a log never stops the scan. Line numbers
/// passed to `keep` are 1-based and lines arrive without their terminator.
/// Returns the total number of lines and the retained renderings in order.
fn scan_lines<R, F>(mut reader: R, mut keep: F) -> Result<(usize, Vec<String>)>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Option<String>,
{
    let mut buf = Vec::new();
    let mut line_count = 0;
    let mut retained = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let chunk = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        // A chunk ending in `\r` would otherwise yield a phantom empty line
        let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);

        for segment in chunk.split(|&b| b == b'\r') {
            line_count += 1;
            let line = decode_line(segment);
            if let Some(rendered) = keep(line_count, &line) {
                retained.push(rendered);
            }
        }
    }

    Ok((line_count, retained))
}

impl SmartExtractor {
    /// Human comments buried in a large machine log
    pub(super) fn log_content<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        original_size: u64,
    ) -> Result<ExtractedContent> {
        let (line_count, lines) = scan_lines(reader, |line_num, line| {
            self.matcher()
                .is_human(line)
                .then(|| format!("Line {line_num}: {}", line.trim()))
        })?;

        let content = if lines.is_empty() {
            format!(
                "=== {filename} ===\n\
                 (Scanned {line_count} lines, no human comments found)\n\
                 This appears to be pure machine-generated logs."
            )
        } else {
            format!(
                "=== Human Comments Found in {filename} ===\n\
                 (Scanned {line_count} lines, found {} with human content)\n\n{}",
                lines.len(),
                lines.join("\n")
            )
        };

        Ok(ExtractedContent::new(
            filename,
            content,
            original_size,
            lines.len(),
        ))
    }

    /// Warnings, errors and human comments from a service log
    pub(super) fn system_log_content<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        original_size: u64,
    ) -> Result<ExtractedContent> {
        let matcher = self.matcher();
        let (line_count, lines) = scan_lines(reader, |line_num, line| {
            if matcher.is_severe(line) {
                Some(format!("Line {line_num}: {}", line.trim()))
            } else if matcher.is_human(line) {
                Some(format!("Line {line_num} (human): {}", line.trim()))
            } else {
                None
            }
        })?;

        let content = if lines.is_empty() {
            format!(
                "=== {filename} ===\n\
                 (Scanned {line_count} lines, all normal INFO logs)\n\
                 No warnings, errors, or human comments found."
            )
        } else {
            format!(
                "=== Important Items from {filename} ===\n\
                 (Scanned {line_count} lines, found {} important)\n\n{}",
                lines.len(),
                lines.join("\n")
            )
        };

        Ok(ExtractedContent::new(
            filename,
            content,
            original_size,
            lines.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::processing::ExtractionMode;

    fn extractor() -> SmartExtractor {
        SmartExtractor::new(&ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_scan_lines_counts_trailing_line_without_newline() {
        let (count, kept) = scan_lines(&b"a\nb\nc"[..], |n, l| Some(format!("{n}:{}", l.trim())))
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(kept, vec!["1:a", "2:b", "3:c"]);
    }

    #[test]
    fn test_scan_lines_empty_input() {
        let (count, kept) = scan_lines(&b""[..], |_, _| Some(String::new())).unwrap();
        assert_eq!(count, 0);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_scan_lines_survives_invalid_utf8() {
        let input = b"ok\n\xff\xfe garbage\n# TODO after binary\n";
        let (count, _) = scan_lines(&input[..], |_, _| None).unwrap();
        assert_eq!(count, 3);

        let result = extractor()
            .extract_bytes("mixed.log", input, ExtractionMode::Log)
            .unwrap();
        assert_eq!(result.items_found(), 1);
        assert!(result.meaningful_content().contains("Line 3: # TODO after binary"));
    }

    #[test]
    fn test_scan_lines_splits_on_every_line_ending() {
        let input = b"a\r\nb\rc\n\r\nd\r";
        let (count, kept) = scan_lines(&input[..], |n, l| Some(format!("{n}:{l}"))).unwrap();
        assert_eq!(count, 5);
        assert_eq!(kept, vec!["1:a", "2:b", "3:c", "4:", "5:d"]);
    }

    #[test]
    fn test_log_with_carriage_return_line_endings() {
        let result = extractor()
            .extract_bytes(
                "mac.log",
                b"INFO ok\r# TODO: fix this\rINFO done\r",
                ExtractionMode::Log,
            )
            .unwrap();

        assert_eq!(result.items_found(), 1);
        assert_eq!(
            result.meaningful_content(),
            "=== Human Comments Found in mac.log ===\n\
             (Scanned 3 lines, found 1 with human content)\n\n\
             Line 2: # TODO: fix this"
        );
        assert!(!result.meaningful_content().contains("INFO ok"));
    }

    #[test]
    fn test_log_drops_invalid_bytes_from_kept_lines() {
        let result = extractor()
            .extract_bytes("bin.log", b"# TODO fix \xff\xfe caf\n", ExtractionMode::Log)
            .unwrap();
        assert!(result.meaningful_content().ends_with("Line 1: # TODO fix  caf"));
        assert!(!result.meaningful_content().contains('\u{FFFD}'));
    }

    #[test]
    fn test_log_keeps_todo_and_drops_info() {
        let input = b"INFO: request completed\n    # TODO: fix this   \nINFO: request completed\n";
        let result = extractor()
            .extract_bytes("api.log", input, ExtractionMode::Log)
            .unwrap();

        assert_eq!(result.items_found(), 1);
        assert_eq!(
            result.meaningful_content(),
            "=== Human Comments Found in api.log ===\n\
             (Scanned 3 lines, found 1 with human content)\n\n\
             Line 2: # TODO: fix this"
        );
    }

    #[test]
    fn test_log_without_human_lines_is_labeled() {
        let input = b"INFO: request completed\nINFO: request completed\n";
        let result = extractor()
            .extract_bytes("quiet.log", input, ExtractionMode::Log)
            .unwrap();

        assert_eq!(result.items_found(), 0);
        assert_eq!(
            result.meaningful_content(),
            "=== quiet.log ===\n\
             (Scanned 2 lines, no human comments found)\n\
             This appears to be pure machine-generated logs."
        );
        assert_eq!(result.original_size(), input.len() as u64);
    }

    #[test]
    fn test_system_log_tags_human_lines() {
        let input = b"[INFO] boot\n[ERROR] connection refused\n[INFO] waiting on db replica\n[warn] slow query\n[INFO] ok\n";
        let result = extractor()
            .extract_bytes("system_logs.txt", input, ExtractionMode::SystemLog)
            .unwrap();

        assert_eq!(result.items_found(), 3);
        assert_eq!(
            result.meaningful_content(),
            "=== Important Items from system_logs.txt ===\n\
             (Scanned 5 lines, found 3 important)\n\n\
             Line 2: [ERROR] connection refused\n\
             Line 3 (human): [INFO] waiting on db replica\n\
             Line 4: [warn] slow query"
        );
    }

    #[test]
    fn test_system_log_severity_wins_over_human_tag() {
        let input = b"[ERROR] need to restart the worker\n";
        let result = extractor()
            .extract_bytes("sys.log", input, ExtractionMode::SystemLog)
            .unwrap();
        assert!(result
            .meaningful_content()
            .ends_with("Line 1: [ERROR] need to restart the worker"));
    }

    #[test]
    fn test_system_log_all_info() {
        let input = b"[INFO] a\n[INFO] b\n[DEBUG] c\n";
        let result = extractor()
            .extract_bytes("sys.log", input, ExtractionMode::SystemLog)
            .unwrap();
        assert_eq!(result.items_found(), 0);
        assert_eq!(
            result.meaningful_content(),
            "=== sys.log ===\n\
             (Scanned 3 lines, all normal INFO logs)\n\
             No warnings, errors, or human comments found."
        );
    }
}
