use std::path::PathBuf;

use clap::Parser;

/// glyphgrid: render images as terminal character art or pixel graphics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image to render (PNG, JPEG, BMP, GIF).
    pub image: PathBuf,

    /// Output size in cells, "WxH". Either side may be "-" to derive it
    /// from the aspect ratio. Default: fit the terminal size.
    #[arg(short, long)]
    pub size: Option<String>,

    /// Color mode: "2", "8", "16", "16-8", "240", "256", "full".
    /// Default: the richest the terminal supports.
    #[arg(short, long)]
    pub colors: Option<String>,

    /// Output format: "symbols", "sixels", "kitty", "iterm", or "auto"
    /// for the richest one the terminal supports. Default: symbols.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Symbol selector string, e.g. "block+border-wide" or "all".
    #[arg(long)]
    pub symbols: Option<String>,

    /// Fill symbol selectors for the two-color modes.
    #[arg(long)]
    pub fill: Option<String>,

    /// Color space for matching: "rgb" or "din99d". Default: rgb.
    #[arg(long)]
    pub color_space: Option<String>,

    /// Dither mode: "none", "ordered", "diffusion", "noise". Default:
    /// none.
    #[arg(long)]
    pub dither: Option<String>,

    /// Dither grain size in pixels (1, 2, 4 or 8). Default: 4.
    #[arg(long)]
    pub dither_grain: Option<i32>,

    /// Dither intensity; 1.0 is the norm.
    #[arg(long)]
    pub dither_intensity: Option<f32>,

    /// Assumed terminal foreground, "RRGGBB" hex.
    #[arg(long)]
    pub fg: Option<String>,

    /// Assumed terminal background, "RRGGBB" hex.
    #[arg(long)]
    pub bg: Option<String>,

    /// Emit only foreground colors, leaving the background untouched.
    #[arg(long, default_value_t = false)]
    pub fg_only: bool,

    /// Quality/speed tradeoff, 0.0 to 1.0. Default: 0.5.
    #[arg(short, long)]
    pub work: Option<f32>,

    /// Worker threads; 0 picks a sensible default.
    #[arg(long)]
    pub threads: Option<i32>,

    /// Shrink escape output: reuse attributes, skip and repeat cells.
    #[arg(long, default_value_t = false)]
    pub optimize: bool,

    /// Stretch to fill the output size, ignoring the aspect ratio.
    #[arg(long, default_value_t = false)]
    pub stretch: bool,

    /// Cell pixel footprint for pixel formats, "WxH". Default: 8x16.
    #[arg(long)]
    pub cell_size: Option<String>,

    /// Multiplexer passthrough: "none", "screen", "tmux", "auto".
    /// Default: auto.
    #[arg(long)]
    pub passthrough: Option<String>,

    /// Configuration file (TOML) supplying defaults for the above.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Parses "WxH" where either side may be "-" for unconstrained.
///
/// # Errors
/// Returns an error when the string is not two "x"-separated fields.
pub fn parse_size(s: &str) -> anyhow::Result<(i32, i32)> {
    let parse = |f: &str| -> anyhow::Result<i32> {
        if f == "-" {
            return Ok(-1);
        }
        Ok(f.parse::<i32>()?)
    };
    match s.split_once(['x', 'X']) {
        Some((w, h)) => Ok((parse(w)?, parse(h)?)),
        None => anyhow::bail!("expected WxH, got {s:?}"),
    }
}

/// Parses an "RRGGBB" hex color, with or without a leading '#'.
///
/// # Errors
/// Returns an error unless the string is six hex digits.
pub fn parse_color(s: &str) -> anyhow::Result<u32> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        anyhow::bail!("expected RRGGBB, got {s:?}");
    }
    Ok(u32::from_str_radix(hex, 16)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_wildcards() {
        assert_eq!(parse_size("80x24").unwrap(), (80, 24));
        assert_eq!(parse_size("-x40").unwrap(), (-1, 40));
        assert_eq!(parse_size("120X-").unwrap(), (120, -1));
        assert!(parse_size("80").is_err());
    }

    #[test]
    fn colors_accept_optional_hash() {
        assert_eq!(parse_color("#ff8000").unwrap(), 0xff8000);
        assert_eq!(parse_color("0080ff").unwrap(), 0x0080ff);
        assert!(parse_color("#fff").is_err());
    }
}
