//! Reads the mission requests of a sweep.
//!
//! Requests are the double-quoted strings of the inputs file, in order and
//! verbatim. Anything outside quotes (numbering, commas, comments) is ignored.
//! Empty quotes still count, so request indices line up with the file.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::PlannerError;

#[allow(clippy::expect_used)]
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(.*?)""#).expect("quoted-string pattern is valid"));

/// Extracts every quoted request from `text`, without trimming.
#[must_use]
pub fn parse_inputs(text: &str) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Reads and parses the inputs file.
pub fn read_inputs(path: &Path) -> Result<Vec<String>, PlannerError> {
    let text = std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let inputs = parse_inputs(&text);
    if inputs.is_empty() {
        return Err(PlannerError::Config(format!(
            "no quoted requests found in {}",
            path.display()
        )));
    }
    Ok(inputs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_requests_in_order() {
        let text = r#"1. "Inspect row 3"
2. "Survey the north field, then land",
# "" empty entry
"Return to base""#;
        assert_eq!(
            parse_inputs(text),
            vec![
                "Inspect row 3",
                "Survey the north field, then land",
                "",
                "Return to base"
            ]
        );
    }

    #[test]
    fn empty_and_padded_requests_keep_their_position() {
        let inputs = parse_inputs(r#""a" "" " padded " "c""#);
        assert_eq!(inputs, vec!["a", "", " padded ", "c"]);
        assert_eq!(inputs.iter().position(|q| q == "c"), Some(3));
    }

    #[test]
    fn several_requests_on_one_line() {
        assert_eq!(parse_inputs(r#"["a", "b"]"#), vec!["a", "b"]);
    }

    #[test]
    fn file_without_requests_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.txt");
        std::fs::write(&path, "no quotes here\n").unwrap();
        assert!(matches!(read_inputs(&path), Err(PlannerError::Config(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_inputs(&dir.path().join("absent.txt")),
            Err(PlannerError::Read { .. })
        ));
    }
}
