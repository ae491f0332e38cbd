use lazy_static::lazy_static;
use log::debug;
use parking_lot::RwLock;
use std::env;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref CONFIG: RwLock<MuxerConfig> = RwLock::new(MuxerConfig::load());
}

const CONFIG_PATHS: [&str; 2] = ["./tsmux_config.toml", "./config.toml"];

/// Process-wide defaults picked up by [`TSMuxer::new`](crate::format::ts::TSMuxer::new).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxerConfig {
    /// Pad every stream to a continuity counter of zero on `write_trailer`.
    pub pad_continuity: bool,
}

impl MuxerConfig {
    /// Reads the environment, then the first config file that sets a value.
    fn load() -> Self {
        let mut config = MuxerConfig::default();

        if let Ok(value) = env::var("TSMUX_PAD_CONTINUITY") {
            if let Some(pad) = parse_bool(&value) {
                config.pad_continuity = pad;
                return config;
            }
        }

        for path in &CONFIG_PATHS {
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            if let Some(pad) = find_value(&content, "pad_continuity").and_then(parse_bool) {
                debug!("pad_continuity = {} from {}", pad, path);
                config.pad_continuity = pad;
                break;
            }
        }

        config
    }

    /// Re-reads the environment and config files.
    pub fn reload() {
        let new_config = MuxerConfig::load();
        *CONFIG.write() = new_config;
    }
}

/// Returns the current process-wide configuration.
pub fn muxer_config() -> MuxerConfig {
    CONFIG.read().clone()
}

/// Finds `key = value` in a flat TOML document.
fn find_value<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    content.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let v = v.split('#').next().unwrap_or_default();
        Some(v.trim().trim_matches('"').trim_matches('\''))
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Creates a default config template file if it doesn't exist
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        let template = r#"# tsmux configuration
# Copy this file to 'tsmux_config.toml' and adjust the values.

# Pad each stream with stuffing packets on write_trailer so that its
# continuity counter ends at zero (needed to concatenate HLS segments).
pad_continuity = false
"#;
        fs::write(path, template)?;
    }
    Ok(())
}
