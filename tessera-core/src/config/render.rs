//! Render and main-loop settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do when the draw buffer cannot be allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AllocFailurePolicy {
    /// Log and keep ticking with no display or input registered
    #[default]
    Continue,
    /// Log and park the main task
    Halt,
}

/// Render settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Draw buffer holds `width * height / buffer_divisor` pixels
    pub buffer_divisor: u32,
    /// Panel expects byte-swapped RGB565 words
    pub swap_bytes: bool,
    /// Sleep between main-loop iterations
    pub loop_period_ms: u32,
    /// UI refresh period
    pub refresh_period_ms: u32,
    /// Touch polling period
    pub input_period_ms: u32,
    pub on_alloc_failure: AllocFailurePolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            buffer_divisor: 4,
            swap_bytes: false,
            loop_period_ms: 5,
            refresh_period_ms: 30,
            input_period_ms: 30,
            on_alloc_failure: AllocFailurePolicy::Continue,
        }
    }
}

impl RenderConfig {
    /// Timer periods for the UI library
    pub fn ui_config(&self) -> tessera_ui::UiConfig {
        tessera_ui::UiConfig {
            refresh_period_ms: self.refresh_period_ms,
            input_period_ms: self.input_period_ms,
        }
    }
}
