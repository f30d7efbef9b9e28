//! SubRip (.srt) reading and writing

use crate::domain::model::{Cue, Timestamp};
use crate::error::{CueMixError, CueMixResult};

/// Parse SubRip text into cues
pub fn parse(content: &str) -> CueMixResult<Vec<Cue>> {
    let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in normalized.split("\n\n") {
        let mut lines = block.lines().map(str::trim_end).filter(|l| !l.is_empty());

        let Some(first) = lines.next() else {
            continue;
        };
        // The numeric counter is optional in practice
        let timing = if first.contains("-->") {
            first
        } else {
            lines.next().ok_or_else(|| {
                CueMixError::invalid_input(format!("SRT block '{}' has no timing line", first))
            })?
        };

        let (start, end) = parse_timing(timing)?;
        let text = lines.collect::<Vec<_>>().join("\n");
        cues.push(Cue::new(start, end, text));
    }

    Ok(cues)
}

fn parse_timing(line: &str) -> CueMixResult<(Timestamp, Timestamp)> {
    let (start, end) = line.split_once("-->").ok_or_else(|| {
        CueMixError::invalid_input(format!("Invalid SRT timing line: {}", line))
    })?;
    // Position hints may trail the end time
    let end = end.split_whitespace().next().unwrap_or_default();
    Ok((parse_time(start.trim())?, parse_time(end)?))
}

/// Parse `HH:MM:SS,mmm` (a `.` separator is accepted too)
pub fn parse_time(value: &str) -> CueMixResult<Timestamp> {
    let invalid = || CueMixError::invalid_input(format!("Invalid SRT time: {}", value));

    let (clock, millis) = value
        .split_once(|c: char| c == ',' || c == '.')
        .unwrap_or((value, "0"));
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = parts[2].parse().map_err(|_| invalid())?;
    if minutes >= 60 || seconds >= 60 || millis.is_empty() || millis.len() > 3 {
        return Err(invalid());
    }
    // "5" after the separator means 500ms
    let millis: u64 = format!("{:0<3}", millis).parse().map_err(|_| invalid())?;

    Ok(Timestamp::from_components(hours, minutes, seconds, millis))
}

/// Render cues as SubRip text with 1-based counters
pub fn write(cues: &[Cue]) -> String {
    cues.iter()
        .enumerate()
        .map(|(i, cue)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                cue.start.format_srt(),
                cue.end.format_srt(),
                cue.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
