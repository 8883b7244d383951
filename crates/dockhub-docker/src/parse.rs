//! Parsing of `docker ps --format json` output.

use dockhub_core::ContainerRecord;
use tracing::debug;

/// Parse newline-delimited JSON records.
///
/// Each line stands alone: blank lines are ignored and a line that is not
/// a JSON object is skipped without affecting its neighbours.
pub fn parse_ps_output(stdout: &str) -> Vec<ContainerRecord> {
    stdout
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str::<ContainerRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(line = idx + 1, error = %e, "skipping malformed container record");
                None
            }
        })
        .collect()
}
