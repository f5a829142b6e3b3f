//! hscroll - replay navigation and wheel input against the horizontal
//! scroller on a headless demo page

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hscroll_core::WheelData;
use hscroll_shell::{DemoApp, ShellConfig};

/// hscroll - horizontal scroller demo
#[derive(Parser)]
#[command(name = "hscroll")]
#[command(about = "Open routed panels and scroll them with the wheel, headless", long_about = None)]
struct Cli {
    /// Config file, or directory containing hscroll.toml (defaults to current)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of panels to open
    #[arg(short, long)]
    panels: Option<usize>,

    /// Wheel notches to scroll back towards the first panel
    #[arg(short, long, default_value_t = 5)]
    wheel_ticks: usize,

    /// How panels are opened
    #[arg(short, long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// One navigation to "slow/" repeated
    All,
    /// One navigation per panel, each after the previous completes
    OneByOne,
}

fn load_config(cli: &Cli) -> Result<ShellConfig> {
    let mut config = match &cli.config {
        Some(path) if path.is_dir() => ShellConfig::load_from_dir(path)?,
        Some(path) => ShellConfig::load_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            ShellConfig::load_from_dir(&cwd)?
        }
    };
    if let Some(panels) = cli.panels {
        config.demo.open_count = panels;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut app = DemoApp::new(&config);
    app.shell
        .attached()
        .context("Failed to bind the scroller to the router view")?;
    app.host.settle();

    match cli.mode {
        Mode::All => app.shell.open_all_at_once(),
        Mode::OneByOne => app.shell.open_one_by_one(),
    }
    .context("Navigation failed")?;
    let frames = app.host.settle();
    tracing::info!(
        panels = app.page.panel_count(),
        offset = app.scroll_left(),
        frames,
        "panels opened"
    );

    // Over the header of the rightmost visible panel
    let demo = &config.demo;
    let x = demo.viewport_width - demo.panel_width / 2.0;
    let header_y = demo.header_height / 2.0;
    for tick in 0..cli.wheel_ticks {
        let event = app
            .host
            .wheel(WheelData::at(x, header_y).with_wheel_delta(120.0));
        app.host.settle();
        tracing::info!(
            tick,
            consumed = event.default_prevented,
            offset = app.scroll_left(),
            "wheel over header"
        );
    }

    // Over that panel's list the wheel belongs to the list
    let list_y = demo.header_height + (demo.viewport_height - demo.header_height) / 2.0;
    let event = app
        .host
        .wheel(WheelData::at(x, list_y).with_wheel_delta(120.0));
    app.host.settle();
    tracing::info!(
        consumed = event.default_prevented,
        offset = app.scroll_left(),
        "wheel over list"
    );

    app.shell.detached();
    println!(
        "{} panels, router view scrolled to {:.0}px after {} frames",
        app.page.panel_count(),
        app.scroll_left(),
        app.host.frame_count()
    );
    Ok(())
}
