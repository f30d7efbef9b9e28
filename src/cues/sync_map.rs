//! Alignment sync map (JSON) reader

use serde::Deserialize;

use crate::domain::model::{Cue, Timestamp};
use crate::error::{CueMixError, CueMixResult};

#[derive(Debug, Deserialize)]
struct SyncMap {
    fragments: Vec<Fragment>,
}

#[derive(Debug, Deserialize)]
struct Fragment {
    begin: String,
    end: String,
    #[serde(default)]
    lines: Vec<String>,
}

/// Parse a sync map into cues; each fragment's first line becomes the cue text
pub fn parse(content: &str) -> CueMixResult<Vec<Cue>> {
    let map: SyncMap = serde_json::from_str(content)
        .map_err(|e| CueMixError::invalid_input(format!("Malformed sync map: {}", e)))?;

    map.fragments
        .into_iter()
        .map(|fragment| {
            let text = fragment
                .lines
                .first()
                .map(|line| line.trim().to_string())
                .unwrap_or_default();
            Ok(Cue::new(
                parse_seconds(&fragment.begin)?,
                parse_seconds(&fragment.end)?,
                text,
            ))
        })
        .collect()
}

fn parse_seconds(value: &str) -> CueMixResult<Timestamp> {
    let seconds: f64 = value.trim().parse().map_err(|_| {
        CueMixError::invalid_input(format!("Invalid sync map time: {}", value))
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CueMixError::invalid_input(format!(
            "Invalid sync map time: {}",
            value
        )));
    }
    Ok(Timestamp::from_seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragments() {
        let json = r#"{"fragments": [
            {"begin": "0.000", "end": "1.290", "id": "f000001", "lines": ["  First sentence. "]},
            {"begin": "1.290", "end": "3.500", "id": "f000002", "lines": ["Second", "ignored"]}
        ]}"#;
        let cues = parse(json).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "First sentence.");
        assert_eq!(cues[0].end.as_millis(), 1_290);
        assert_eq!(cues[1].text, "Second");
        assert_eq!(cues[1].end.as_millis(), 3_500);
    }

    #[test]
    fn test_parse_empty_fragment_list() {
        assert!(parse(r#"{"fragments": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_times() {
        let json = r#"{"fragments": [{"begin": "abc", "end": "1.0", "lines": ["x"]}]}"#;
        assert!(matches!(parse(json), Err(CueMixError::InvalidInput { .. })));
        assert!(parse("not json").is_err());
    }
}
