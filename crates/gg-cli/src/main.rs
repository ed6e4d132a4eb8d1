use std::io::Write as _;

use anyhow::{Context, Result};
use clap::Parser;
use gg_canvas::canvas::Canvas;
use gg_canvas::config::CanvasConfig;
use gg_core::config::{Optimizations, Passthrough, PixelMode};
use gg_core::geometry::calc_canvas_geometry;
use gg_core::pixels::PixelType;
use gg_symbols::map::SymbolMap;
use gg_term::terminfo::TermInfo;
use gg_term::termdb::TermDb;

pub mod cli;
pub mod settings;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let file = match cli.config.as_deref() {
        Some(path) => settings::load_file(path)
            .with_context(|| format!("config {}", path.display()))?,
        None => settings::FileConfig::default(),
    };

    let ti = TermDb::new().detect(std::env::vars());
    log::debug!("terminal: {}", ti.name());

    let config = build_config(&cli, &file, &ti)?;
    let (width, height) = (config.width, config.height);

    let img = image::open(&cli.image)
        .with_context(|| format!("image {}", cli.image.display()))?
        .to_rgba8();
    let (iw, ih) = img.dimensions();

    let mut canvas = Canvas::new(config)?;
    canvas.draw_all_pixels(PixelType::Rgba8Unassociated, img.as_raw(), iw, ih, iw * 4)?;

    let out = canvas.print(&ti)?;
    log::debug!("{width}x{height} cells, {} bytes of output", out.len());

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(&out)?;
    writeln!(lock)?;
    Ok(())
}

/// Terminal size in cells from the environment, keeping one row free
/// for the prompt.
fn term_size() -> (i32, i32) {
    let get = |k: &str, fallback: i32| {
        std::env::var(k)
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(fallback)
    };
    (get("COLUMNS", 80), (get("LINES", 25) - 1).max(1))
}

fn build_config(
    cli: &cli::Cli,
    file: &settings::FileConfig,
    ti: &TermInfo,
) -> Result<CanvasConfig> {
    let pick = |c: &Option<String>, f: &Option<String>| c.clone().or_else(|| f.clone());

    let mut config = CanvasConfig::new();

    config.canvas_mode = pick(&cli.colors, &file.colors)
        .as_deref()
        .and_then(settings::parse_canvas_mode)
        .unwrap_or_else(|| ti.best_canvas_mode());
    config.pixel_mode = match pick(&cli.format, &file.format).as_deref() {
        None => PixelMode::Symbols,
        Some("auto") => ti.best_pixel_mode(),
        Some(s) => settings::parse_pixel_mode(s).unwrap_or(PixelMode::Symbols),
    };

    if let Some(s) = pick(&cli.color_space, &file.color_space) {
        config.color_space = settings::parse_color_space(&s);
    }
    if let Some(s) = pick(&cli.dither, &file.dither) {
        config.dither_mode = settings::parse_dither(&s);
    }
    if let Some(g) = cli.dither_grain.or(file.dither_grain) {
        config.dither_grain_width = g;
        config.dither_grain_height = g;
    }
    if let Some(i) = cli.dither_intensity.or(file.dither_intensity) {
        config.dither_intensity = i;
    }
    if let Some(c) = pick(&cli.fg, &file.fg) {
        config.fg_color = cli::parse_color(&c)?;
    }
    if let Some(c) = pick(&cli.bg, &file.bg) {
        config.bg_color = cli::parse_color(&c)?;
    }
    if let Some(w) = cli.work.or(file.work) {
        config.work_factor = w;
    }
    if let Some(n) = cli.threads.or(file.threads) {
        config.n_threads = n;
    }
    config.fg_only = cli.fg_only;
    if cli.optimize || file.optimize == Some(true) {
        config.optimizations = Optimizations::ALL;
    }
    if let Some(s) = pick(&cli.cell_size, &file.cell_size) {
        let (w, h) = cli::parse_size(&s)?;
        config.cell_width = w;
        config.cell_height = h;
    }

    // Default selection honors what the terminal can safely show; an
    // explicit selector string is taken at face value.
    let mut symbol_map = SymbolMap::new();
    symbol_map.add_by_tags(ti.safe_symbol_tags());
    if let Some(sel) = pick(&cli.symbols, &file.symbols) {
        symbol_map
            .apply_selectors(&sel)
            .with_context(|| format!("selector {sel:?}"))?;
    }
    config.symbol_map = symbol_map;
    if let Some(sel) = pick(&cli.fill, &file.fill) {
        let mut fill = SymbolMap::new();
        fill.apply_selectors(&sel)
            .with_context(|| format!("fill selector {sel:?}"))?;
        config.fill_symbol_map = fill;
    }

    config.passthrough = match pick(&cli.passthrough, &file.passthrough).as_deref() {
        Some("none") => Passthrough::None,
        Some("tmux") => Passthrough::Tmux,
        Some("screen") => Passthrough::Screen,
        _ => {
            if ti.pixel_passthrough_needed(config.pixel_mode) {
                if std::env::var_os("TMUX").is_some() {
                    Passthrough::Tmux
                } else if std::env::var_os("STY").is_some() {
                    Passthrough::Screen
                } else {
                    Passthrough::None
                }
            } else {
                Passthrough::None
            }
        }
    };

    // Output geometry: fit the image into the requested bounds (or the
    // terminal), preserving aspect unless asked to stretch.
    let img_dims = image::image_dimensions(&cli.image)
        .with_context(|| format!("image {}", cli.image.display()))?;
    let (bw, bh) = match pick(&cli.size, &file.size) {
        Some(s) => cli::parse_size(&s)?,
        None => term_size(),
    };
    let (cw, ch) = config.cell_size_px();
    let font_ratio = cw as f32 / ch as f32;
    let (w, h) = calc_canvas_geometry(
        img_dims.0 as i32,
        img_dims.1 as i32,
        bw,
        bh,
        font_ratio,
        cli.stretch,
        cli.stretch,
    );
    if w == 0 || h == 0 {
        anyhow::bail!("image has no pixels");
    }
    config.width = w;
    config.height = h;

    Ok(config)
}
