use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ebtext::config::{load_and_validate_config, ConfigOverrides};
use ebtext::error::find_dialogue_error;
use ebtext::{DialogueConfig, DialogueRenderer, Theme};

const LOG_ENV: &str = "EBTEXT_LOG";
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("EBTEXT_GIT_HASH"),
    ")"
);

#[derive(Debug, Parser)]
#[command(name = "ebtext")]
#[command(about = "Render dialogue text as an animated RPG text box GIF")]
#[command(version = VERSION)]
struct Cli {
    /// YAML config with options, layout, timing and resource paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Theme directory under the resource root.
    #[arg(long, global = true)]
    theme: Option<String>,
    /// Use the alternate font and its baseline offsets.
    #[arg(long, global = true)]
    saturn: bool,
    /// Resource root holding the fonts and theme directories.
    #[arg(long = "res", global = true)]
    resource_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render dialogue to an animated GIF.
    Render {
        #[command(flatten)]
        input: TextInput,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Print the wrapped visual lines without rendering.
    Wrap {
        #[command(flatten)]
        input: TextInput,
        #[arg(long)]
        json: bool,
    },
    /// Load the theme bundle and report what was found.
    Check,
}

#[derive(Debug, Args)]
struct TextInput {
    /// Dialogue text; `\n` starts a new speaker. Read from stdin when omitted.
    text: Option<String>,
    /// Read the dialogue from a file instead.
    #[arg(short = 'i', long = "input", conflicts_with = "text")]
    input: Option<PathBuf>,
}

impl TextInput {
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.input {
            return fs::read_to_string(path)
                .with_context(|| format!("failed to read dialogue {}", path.display()));
        }
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read dialogue from stdin")?;
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct WrapReport<'a> {
    lines: &'a [String],
    glyphs: usize,
    line_breaks: usize,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            // clap already owns status 2 for usage errors.
            match find_dialogue_error(&error) {
                Some(_) => ExitCode::from(3),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        theme: cli.theme.clone(),
        saturn: cli.saturn,
        resource_root: cli.resource_root.clone(),
    };
    let config = load_and_validate_config(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Commands::Render { input, output } => run_render(&config, &input.read()?, &output),
        Commands::Wrap { input, json } => run_wrap(&config, &input.read()?, json),
        Commands::Check => run_check(&config),
    }
}

fn load_theme(config: &DialogueConfig) -> Result<Theme> {
    Theme::load(&config.resources, &config.options, &config.layout).with_context(|| {
        format!(
            "failed to load theme '{}' from {}",
            config.options.theme,
            config.resources.root.display()
        )
    })
}

fn run_render(config: &DialogueConfig, text: &str, output: &Path) -> Result<()> {
    if output.is_dir() {
        bail!("output {} is a directory", output.display());
    }
    let theme = load_theme(config)?;
    let renderer = DialogueRenderer::new(&theme, &config.layout, &config.timing);
    let rendered = renderer.render(text)?;
    let bytes = ebtext::encode_gif(&rendered)?;

    fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} frames, {} scrolls, {:.2}s)",
        output.display(),
        rendered.frames.len(),
        rendered.stats.scrolls,
        rendered.total_duration_ms() as f64 / 1000.0
    );
    Ok(())
}

fn run_wrap(config: &DialogueConfig, text: &str, json: bool) -> Result<()> {
    let theme = load_theme(config)?;
    let renderer = DialogueRenderer::new(&theme, &config.layout, &config.timing);
    let stream = renderer.wrap(text)?;
    let lines = stream.lines();

    if json {
        let report = WrapReport {
            lines: &lines,
            glyphs: stream.glyph_count(),
            line_breaks: stream.line_break_count(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in &lines {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_check(config: &DialogueConfig) -> Result<()> {
    let theme = load_theme(config)?;
    println!(
        "OK: theme '{}' ({}x{} background, body font '{}', marker font '{}')",
        theme.name,
        theme.background.width(),
        theme.background.height(),
        theme.body.name(),
        theme.marker.name()
    );
    if (theme.background.width(), theme.background.height())
        != (config.layout.width, config.layout.height)
    {
        println!(
            "note: background is {}x{} but the layout box is {}x{}",
            theme.background.width(),
            theme.background.height(),
            config.layout.width,
            config.layout.height
        );
    }
    Ok(())
}
