use anyhow::Context;
use motion_sense::MotionConfig;
use std::path::Path;

/// Address the server binds to unless `MOTION_SENSE_BIND` says otherwise.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const BIND_ENV: &str = "MOTION_SENSE_BIND";
/// Optional path to a JSON file overriding any subset of the motion tunables.
pub const CONFIG_ENV: &str = "MOTION_SENSE_CONFIG";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Tunables handed to every new per-connection session.
    pub motion: MotionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            motion: MotionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var(BIND_ENV)
            .ok()
            .filter(|addr| !addr.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let motion = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => load_motion_config(Path::new(&path))?,
            _ => MotionConfig::default(),
        };

        Ok(Self { bind_addr, motion })
    }
}

/// Reads and validates a (possibly partial) JSON `MotionConfig`.
pub fn load_motion_config(path: &Path) -> anyhow::Result<MotionConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading motion config {}", path.display()))?;
    let config: MotionConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing motion config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid motion config {}", path.display()))?;
    Ok(config)
}
