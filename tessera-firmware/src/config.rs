//! Board configuration loading
//!
//! The board description is compiled into the firmware from `board.toml`
//! (checked by the build script) and parsed at startup.

use defmt::*;
use tessera_core::config::{BoardConfig, PanelLayout};

/// Embedded board configuration (compiled into firmware)
/// Edit board.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

/// Parse the embedded configuration, falling back to the built-in board
pub fn load_config() -> BoardConfig {
    match BoardConfig::from_toml(EMBEDDED_CONFIG) {
        Ok(config) => {
            let (width, height) = config.panel.resolution();
            let layout = match config.panel.layout {
                PanelLayout::Rgb => "rgb",
                PanelLayout::Spi => "spi",
            };
            info!(
                "Board config: {} panel {}x{}, buffer 1/{}",
                layout, width, height, config.render.buffer_divisor
            );
            config
        }
        Err(e) => {
            warn!("Embedded board.toml rejected: {}, using defaults", e);
            BoardConfig::default()
        }
    }
}
