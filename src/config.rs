use crate::selection::{DocumentOrigin, FlowVariant};
use crate::ui::theme::Theme;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Livestock breeds of India on a terminal map
#[derive(Debug, Clone, Parser)]
#[command(name = "livestock-map", version, about)]
pub struct Args {
    /// Catalog of states, species and breeds (JSON)
    #[arg(long, default_value = "data/catalog.json")]
    pub catalog: PathBuf,

    /// State polygons (GeoJSON); a plain outline is drawn if missing
    #[arg(long, default_value = "data/india_states.geojson")]
    pub geodata: PathBuf,

    /// Base URL that document paths are resolved against [default: current directory]
    #[arg(long)]
    pub origin: Option<String>,

    /// How breeds are listed after a state is chosen
    #[arg(long, value_enum, default_value_t = Variant::ByCategory)]
    pub variant: Variant,

    /// Map colours
    #[arg(long, value_enum, default_value_t = ThemeName::Meadow)]
    pub theme: ThemeName,

    /// Command used to open documents, e.g. "firefox --new-tab"
    #[arg(long)]
    pub opener: Option<String>,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Every breed of the state at once, sorted
    Flat,
    /// Pick a species first
    ByCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeName {
    Meadow,
    Contrast,
}

impl From<Variant> for FlowVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Flat => FlowVariant::Flat,
            Variant::ByCategory => FlowVariant::ByCategory,
        }
    }
}

impl From<ThemeName> for Theme {
    fn from(t: ThemeName) -> Self {
        match t {
            ThemeName::Meadow => Theme::meadow(),
            ThemeName::Contrast => Theme::contrast(),
        }
    }
}

impl Args {
    /// Document origin from `--origin`, or the current directory as a file URL
    pub fn document_origin(&self) -> Result<DocumentOrigin> {
        let base = match &self.origin {
            Some(raw) => Url::parse(raw).with_context(|| format!("invalid --origin {raw:?}"))?,
            None => {
                let cwd = std::env::current_dir().context("cannot determine current directory")?;
                match Url::from_directory_path(&cwd) {
                    Ok(url) => url,
                    Err(()) => bail!("cannot express {} as a file URL", cwd.display()),
                }
            }
        };

        if base.cannot_be_a_base() {
            bail!("--origin {base} cannot have document paths joined onto it");
        }
        Ok(DocumentOrigin::new(base))
    }
}
