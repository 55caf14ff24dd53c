//! Configuration and trace loading for the `gesture_replay` binary.
//!
//! A recorded trace is a JSON array of [`RecordedFrame`]s: per-frame
//! timestamp, optional hands and the target list. The same format feeds the
//! integration tests, so fixtures recorded from a live session replay
//! byte-for-byte through the engine.

use crate::engine::EngineParams;
use crate::hand::HandFrame;
use crate::picker::TargetPoint;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub engine_params: EngineParams,
}

/// One frame of a recorded landmark trace.
#[derive(Clone, Debug, Deserialize)]
pub struct RecordedFrame {
    pub timestamp_ms: f64,
    #[serde(default)]
    pub left: Option<HandFrame>,
    #[serde(default)]
    pub right: Option<HandFrame>,
    #[serde(default)]
    pub targets: Vec<TargetPoint>,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

pub fn load_trace(path: &Path) -> Result<Vec<RecordedFrame>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read trace {}: {e}", path.display()))?;
    let frames: Vec<RecordedFrame> = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse trace {}: {e}", path.display()))?;
    Ok(frames)
}

pub fn write_json_file(path: &Path, value: &impl Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Parses the replay CLI: either a config file, or `--trace <path>` to run a
/// trace with default parameters.
pub fn parse_cli(program: &str) -> Result<RuntimeConfig, String> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("--trace") => {
            let path = args
                .next()
                .ok_or_else(|| format!("Usage: {program} <config.json> | --trace <trace.json>"))?;
            Ok(RuntimeConfig {
                input_path: PathBuf::from(path),
                output: OutputConfig::default(),
                engine_params: EngineParams::default(),
            })
        }
        Some(path) => load_config(Path::new(path)),
        None => Err(format!(
            "Usage: {program} <config.json> | --trace <trace.json>"
        )),
    }
}
