use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;

use crate::framebuffer::EdgePolicy;
use crate::input::{keymap_from_layout, CHIP8_CONVENTIONAL_KEYMAP};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("keymap {0:?} must be 16 distinct characters")]
    InvalidKeymap(String),
}

/// What the frame loop does when the interpreter reports an unknown instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// stop and report the instruction
    #[default]
    Halt,
    /// log it, step over it and keep going
    Skip,
}

/// Runtime settings. Every field has a default, so an empty file (or no
/// file) is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub frame_delay_ms: u64,
    pub sprite_edges: EdgePolicy,
    pub on_unknown_instruction: UnknownPolicy,
    /// character n is the host key for logical key n
    pub keymap: String,
    pub key_hold_frames: u32,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frame_delay_ms: 2,
            sprite_edges: EdgePolicy::Clip,
            on_unknown_instruction: UnknownPolicy::Halt,
            keymap: CHIP8_CONVENTIONAL_KEYMAP.to_string(),
            key_hold_frames: 30,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.key_table()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        Config::from_toml(&fs::read_to_string(path)?)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn key_table(&self) -> Result<HashMap<char, u8>, ConfigError> {
        keymap_from_layout(&self.keymap)
            .ok_or_else(|| ConfigError::InvalidKeymap(self.keymap.clone()))
    }
}
