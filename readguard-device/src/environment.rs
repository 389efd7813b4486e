//! Environment capability consumed by the fingerprint engine.
//!
//! The reading surface runs inside a browser, so most signals are collected
//! by the UI bridge and handed over as an [`EnvironmentSnapshot`]. Native
//! hosts use [`HostEnvironment`], which answers what the OS can tell us and
//! reports the rendering probes as unsupported.

use crate::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Display geometry reported by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
    pub pixel_ratio: f64,
}

/// GPU strings exposed by a 3D rendering context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuInfo {
    pub vendor: String,
    pub renderer: String,
}

/// Fixed drawing instructions for the canvas probe.
///
/// Every environment must draw exactly this so the resulting pixels only
/// vary with the rendering stack, not with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasProbe {
    pub width: u32,
    pub height: u32,
    pub font: &'static str,
    pub text: &'static str,
}

impl CanvasProbe {
    pub const STANDARD: CanvasProbe = CanvasProbe {
        width: 240,
        height: 60,
        font: "14px Arial",
        text: "readguard <canvas> 1.0 \u{1F4D6}",
    };
}

/// Fixed oscillator parameters for the audio probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioProbe {
    pub waveform: &'static str,
    pub frequency_hz: f32,
    pub sample_rate: u32,
    pub frames: usize,
}

impl AudioProbe {
    pub const STANDARD: AudioProbe = AudioProbe {
        waveform: "triangle",
        frequency_hz: 10_000.0,
        sample_rate: 44_100,
        frames: 5_000,
    };
}

/// Read-only view of the device/browser state.
///
/// Each probe may fail independently; the engine substitutes a sentinel
/// for any `Err`.
pub trait Environment {
    fn display(&self) -> ProbeResult<DisplayInfo>;
    fn locale(&self) -> ProbeResult<String>;
    fn timezone(&self) -> ProbeResult<String>;
    fn platform(&self) -> ProbeResult<String>;
    fn logical_cpus(&self) -> ProbeResult<u32>;
    /// Approximate device memory in GiB.
    fn device_memory_gb(&self) -> ProbeResult<f64>;
    fn touch_support(&self) -> ProbeResult<bool>;
    fn gpu(&self) -> ProbeResult<GpuInfo>;
    /// Raw RGBA pixels produced by drawing `probe`.
    fn render_canvas(&self, probe: &CanvasProbe) -> ProbeResult<Vec<u8>>;
    /// Output samples of an offline audio graph driven by `probe`.
    fn render_audio(&self, probe: &AudioProbe) -> ProbeResult<Vec<f32>>;
}

/// Signals captured by the UI bridge.
///
/// Absent fields mean the probe was unsupported on that device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentSnapshot {
    pub display: Option<DisplayInfo>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub platform: Option<String>,
    pub logical_cpus: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub touch_support: Option<bool>,
    pub gpu: Option<GpuInfo>,
    pub canvas_pixels: Option<Vec<u8>>,
    pub audio_samples: Option<Vec<f32>>,
}

impl EnvironmentSnapshot {
    /// Parses a snapshot posted by the UI bridge.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn present<T: Clone>(value: &Option<T>, probe: &'static str) -> ProbeResult<T> {
    value.clone().ok_or(ProbeError::Unsupported(probe))
}

impl Environment for EnvironmentSnapshot {
    fn display(&self) -> ProbeResult<DisplayInfo> {
        present(&self.display, "display")
    }

    fn locale(&self) -> ProbeResult<String> {
        present(&self.locale, "locale")
    }

    fn timezone(&self) -> ProbeResult<String> {
        present(&self.timezone, "timezone")
    }

    fn platform(&self) -> ProbeResult<String> {
        present(&self.platform, "platform")
    }

    fn logical_cpus(&self) -> ProbeResult<u32> {
        present(&self.logical_cpus, "hardwareConcurrency")
    }

    fn device_memory_gb(&self) -> ProbeResult<f64> {
        present(&self.device_memory_gb, "deviceMemory")
    }

    fn touch_support(&self) -> ProbeResult<bool> {
        present(&self.touch_support, "touch")
    }

    fn gpu(&self) -> ProbeResult<GpuInfo> {
        present(&self.gpu, "webgl")
    }

    fn render_canvas(&self, _probe: &CanvasProbe) -> ProbeResult<Vec<u8>> {
        match &self.canvas_pixels {
            Some(pixels) if pixels.is_empty() => {
                Err(ProbeError::Failed("canvas produced no pixels".to_string()))
            }
            Some(pixels) => Ok(pixels.clone()),
            None => Err(ProbeError::Unsupported("canvas")),
        }
    }

    fn render_audio(&self, _probe: &AudioProbe) -> ProbeResult<Vec<f32>> {
        present(&self.audio_samples, "audio")
    }
}

/// Native host probe.
///
/// Only answers what the operating system exposes without a rendering
/// stack; everything else is reported unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostEnvironment;

impl HostEnvironment {
    pub fn new() -> Self {
        Self
    }
}

/// Normalizes POSIX locale strings: `en_US.UTF-8` -> `en-US`.
fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

impl Environment for HostEnvironment {
    fn display(&self) -> ProbeResult<DisplayInfo> {
        Err(ProbeError::Unsupported("display"))
    }

    fn locale(&self) -> ProbeResult<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| normalize_locale(&value))
            .ok_or(ProbeError::Unsupported("locale"))
    }

    fn timezone(&self) -> ProbeResult<String> {
        match std::env::var("TZ") {
            Ok(tz) if !tz.is_empty() => Ok(tz.trim_start_matches(':').to_string()),
            _ => Err(ProbeError::Unsupported("timezone")),
        }
    }

    fn platform(&self) -> ProbeResult<String> {
        Ok(format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn logical_cpus(&self) -> ProbeResult<u32> {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .map_err(|e| ProbeError::Failed(e.to_string()))
    }

    fn device_memory_gb(&self) -> ProbeResult<f64> {
        Err(ProbeError::Unsupported("deviceMemory"))
    }

    fn touch_support(&self) -> ProbeResult<bool> {
        Err(ProbeError::Unsupported("touch"))
    }

    fn gpu(&self) -> ProbeResult<GpuInfo> {
        Err(ProbeError::Unsupported("webgl"))
    }

    fn render_canvas(&self, _probe: &CanvasProbe) -> ProbeResult<Vec<u8>> {
        Err(ProbeError::Unsupported("canvas"))
    }

    fn render_audio(&self, _probe: &AudioProbe) -> ProbeResult<Vec<f32>> {
        Err(ProbeError::Unsupported("audio"))
    }
}
