//! Command-line interface.
//!
//!   yells-at cat.png                         composite one file
//!   yells-at a.png b.jpg -o out/             one result per file
//!   yells-at --paste --data-url              composite the clipboard image
//!   cat cat.png | yells-at -                 read image bytes from stdin
//!   yells-at --uri-list 'data:image/png;base64,...'

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use image_processor::{Geometry, Offset, OutputFormat};

use crate::config::AppConfig;
use crate::config::defaults::{FORMAT, OFFSET, PREFIX, SIZE};
use crate::config::validation::validate_setting;
use crate::input::Source;
use crate::services::OutputMode;

/// Composite an image onto the template and save the result.
#[derive(Parser, Debug)]
#[command(name = "yells-at", version)]
pub struct CliArgs {
    /// Image files to composite, one result each. `-` reads image bytes from stdin.
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// A text/uri-list value; only inline `data:` URLs produce a result.
    #[arg(long = "uri-list", value_name = "URI")]
    pub uri_lists: Vec<String>,

    /// A text/plain value (never contains an image; accepted like a paste).
    #[arg(long = "text", value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Composite whatever is on the system clipboard.
    #[arg(short, long)]
    pub paste: bool,

    /// Template image (overrides YELLS_AT_TEMPLATE).
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Output directory (overrides YELLS_AT_OUTPUT_DIR).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, gif, tiff, webp (overrides YELLS_AT_FORMAT).
    #[arg(short, long, value_name = "FORMAT", value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Box the input is resized into, e.g. 56x56 (overrides YELLS_AT_SIZE).
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub size: Option<Geometry>,

    /// Position on the template, e.g. 10,0 (overrides YELLS_AT_OFFSET).
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true, value_parser = parse_offset)]
    pub offset: Option<Offset>,

    /// Download file name prefix (overrides YELLS_AT_PREFIX).
    #[arg(long, value_name = "PREFIX", value_parser = parse_prefix)]
    pub prefix: Option<String>,

    /// Print each result as a data URL instead of writing files.
    #[arg(long)]
    pub data_url: bool,

    /// Print one JSON report per input on stdout.
    #[arg(long)]
    pub json: bool,

    /// Interactions in command-line order, filled from the parsed matches.
    #[arg(skip)]
    ordered: Vec<Source>,
}

impl CliArgs {
    /// Parse the process arguments, exiting with a usage error on failure.
    pub fn parse_ordered() -> Self {
        Self::try_parse_ordered_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args` and record the order interactions were given in.
    pub fn try_parse_ordered_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.ordered = ordered_sources(&matches)?;
        Ok(cli)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(size) = self.size {
            config.layout.geometry = size;
        }
        if let Some(offset) = self.offset {
            config.layout.offset = offset;
        }
        if let Some(prefix) = &self.prefix {
            config.filename_prefix = prefix.clone();
        }
    }

    /// Interactions in the order they appeared on the command line.
    pub fn sources(&self) -> &[Source] {
        &self.ordered
    }

    pub fn output_mode(&self, config: &AppConfig) -> OutputMode {
        if self.data_url {
            OutputMode::DataUrl
        } else {
            OutputMode::Directory(config.output_dir.clone())
        }
    }
}

/// Merge positional files, `--uri-list`, `--text` and `--paste` by argv index.
fn ordered_sources(matches: &ArgMatches) -> Result<Vec<Source>, clap::Error> {
    let mut indexed: Vec<(usize, Source)> = Vec::new();

    let mut add = |id: &str, to_source: fn(&str) -> Source| {
        if let (Some(values), Some(indices)) =
            (matches.get_many::<String>(id), matches.indices_of(id))
        {
            indexed.extend(indices.zip(values.map(|v| to_source(v))));
        }
    };
    add("inputs", Source::from_arg);
    add("uri_lists", |v| Source::UriList(v.to_string()));
    add("texts", |v| Source::Text(v.to_string()));

    if matches.get_flag("paste") {
        let index = matches.index_of("paste").unwrap_or(usize::MAX);
        indexed.push((index, Source::Clipboard));
    }

    indexed.sort_by_key(|(index, _)| *index);
    let sources: Vec<Source> = indexed.into_iter().map(|(_, source)| source).collect();

    if sources.iter().filter(|s| **s == Source::Stdin).count() > 1 {
        return Err(CliArgs::command().error(
            ErrorKind::ArgumentConflict,
            "`-` (stdin) can be given only once",
        ));
    }
    Ok(sources)
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    let s = s.trim();
    validate_setting(FORMAT, s)?;
    s.parse().map_err(|e: image_processor::ProcessError| e.to_string())
}

fn parse_size(s: &str) -> Result<Geometry, String> {
    let s = s.trim();
    validate_setting(SIZE, s)?;
    s.parse().map_err(|e: image_processor::ProcessError| e.to_string())
}

fn parse_offset(s: &str) -> Result<Offset, String> {
    let s = s.trim();
    validate_setting(OFFSET, s)?;
    s.parse().map_err(|e: image_processor::ProcessError| e.to_string())
}

fn parse_prefix(s: &str) -> Result<String, String> {
    let s = s.trim();
    validate_setting(PREFIX, s)?;
    Ok(s.to_string())
}
