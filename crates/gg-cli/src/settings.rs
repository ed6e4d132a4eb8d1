//! Settings resolution: a TOML file supplies defaults, command-line
//! flags override them.

use std::path::Path;

use gg_core::colorspace::ColorSpace;
use gg_core::config::{CanvasMode, DitherMode, PixelMode};
use serde::Deserialize;

/// Optional overrides read from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub colors: Option<String>,
    pub format: Option<String>,
    pub symbols: Option<String>,
    pub fill: Option<String>,
    pub color_space: Option<String>,
    pub dither: Option<String>,
    pub dither_grain: Option<i32>,
    pub dither_intensity: Option<f32>,
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub work: Option<f32>,
    pub threads: Option<i32>,
    pub optimize: Option<bool>,
    pub passthrough: Option<String>,
    pub cell_size: Option<String>,
    pub size: Option<String>,
}

/// Loads a TOML settings file.
///
/// # Errors
/// Returns an error when the file cannot be read or parsed.
pub fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Canvas mode for a "--colors" value; `None` for "auto" or unknown.
#[must_use]
pub fn parse_canvas_mode(s: &str) -> Option<CanvasMode> {
    match s {
        "2" => Some(CanvasMode::FgBgBgFg),
        "8" => Some(CanvasMode::Indexed8),
        "16" => Some(CanvasMode::Indexed16),
        "16-8" | "16/8" => Some(CanvasMode::Indexed16_8),
        "240" => Some(CanvasMode::Indexed240),
        "256" => Some(CanvasMode::Indexed256),
        "full" | "truecolor" => Some(CanvasMode::Truecolor),
        other => {
            if other != "auto" {
                log::warn!("unknown color mode {other:?}, detecting instead");
            }
            None
        }
    }
}

/// Pixel mode for a "--format" value; `None` for "auto".
#[must_use]
pub fn parse_pixel_mode(s: &str) -> Option<PixelMode> {
    match s {
        "symbols" => Some(PixelMode::Symbols),
        "sixels" | "sixel" => Some(PixelMode::Sixels),
        "kitty" => Some(PixelMode::Kitty),
        "iterm" | "iterm2" => Some(PixelMode::Iterm2),
        other => {
            if other != "auto" {
                log::warn!("unknown format {other:?}, detecting instead");
            }
            None
        }
    }
}

/// Dither mode for a "--dither" value.
#[must_use]
pub fn parse_dither(s: &str) -> DitherMode {
    match s {
        "ordered" | "bayer" => DitherMode::Ordered,
        "diffusion" | "fs" => DitherMode::Diffusion,
        "noise" => DitherMode::Noise,
        "none" => DitherMode::None,
        other => {
            log::warn!("unknown dither mode {other:?}, using none");
            DitherMode::None
        }
    }
}

/// Color space for a "--color-space" value.
#[must_use]
pub fn parse_color_space(s: &str) -> ColorSpace {
    match s {
        "din99d" => ColorSpace::Din99d,
        "rgb" => ColorSpace::Rgb,
        other => {
            log::warn!("unknown color space {other:?}, using rgb");
            ColorSpace::Rgb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_settings_parse_from_toml() {
        let f: FileConfig = toml::from_str(
            r#"
            colors = "256"
            dither = "ordered"
            work = 0.9
            optimize = true
            "#,
        )
        .unwrap();
        assert_eq!(f.colors.as_deref(), Some("256"));
        assert_eq!(f.work, Some(0.9));
        assert_eq!(f.optimize, Some(true));
        assert!(f.symbols.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("colours = \"256\"").is_err());
    }

    #[test]
    fn mode_strings_map_to_enums() {
        assert_eq!(parse_canvas_mode("2"), Some(CanvasMode::FgBgBgFg));
        assert_eq!(parse_canvas_mode("16-8"), Some(CanvasMode::Indexed16_8));
        assert_eq!(parse_canvas_mode("auto"), None);
        assert_eq!(parse_pixel_mode("sixel"), Some(PixelMode::Sixels));
        assert_eq!(parse_dither("fs"), DitherMode::Diffusion);
        assert_eq!(parse_color_space("din99d"), ColorSpace::Din99d);
    }
}
