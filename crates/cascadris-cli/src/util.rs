use std::{fs::File, io, path::Path};

use anyhow::Context as _;
use cascadris_engine::SessionConfig;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))?;

    Ok(value)
}

/// Reads and validates a session configuration file.
pub fn read_session_config<P>(path: P) -> anyhow::Result<SessionConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let config: SessionConfig = read_json_file("session config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid session config: {}", path.display()))?;
    Ok(config)
}

/// Formats a duration as `m:ss.cc`.
pub fn format_play_time(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{}:{:0>2}.{:0>2}",
        secs / 60,
        secs % 60,
        duration.subsec_millis() / 10
    )
}
