//! `textout translate` command implementation.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;
use textout_config::{CliSettings, Config};
use textout_markup::{OutputFormat, Translator};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the translate command.
#[derive(Args)]
pub(crate) struct TranslateArgs {
    /// Markup files to translate (default: stdin).
    files: Vec<PathBuf>,

    /// Directory for translated files (default: stdout).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format, `html` or `lightscript` (overrides config).
    #[arg(short, long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Tweak passed to the translator as KEY=VALUE; may be repeated.
    #[arg(short, long = "tweak", value_name = "KEY=VALUE", value_parser = parse_tweak)]
    tweaks: Vec<(String, String)>,

    /// Translate as inline text: no paragraphs, block tags kept as text.
    #[arg(long)]
    inline: bool,

    /// Tokenizer buffer capacity in characters (overrides config).
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// Path to configuration file (default: auto-discover textout.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TranslateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut tweaks = self.tweaks;
        if self.inline {
            tweaks.push(("inline".to_owned(), "1".to_owned()));
        }
        let cli_settings = CliSettings {
            format: self.format,
            buffer_capacity: self.buffer_capacity,
            tweaks,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }
        let translator = config.translator();

        match (self.files.is_empty(), self.output_dir) {
            (true, Some(_)) => Err(CliError::Validation(
                "--output-dir requires input files".to_owned(),
            )),
            (true, None) => {
                let sink = BufWriter::new(io::stdout().lock());
                translator.translate_reader(io::stdin().lock(), sink)?.flush()?;
                Ok(())
            }
            (false, None) => {
                let mut stdout = io::stdout().lock();
                for document in translate_files(&translator, &self.files)? {
                    stdout.write_all(&document)?;
                }
                stdout.flush()?;
                Ok(())
            }
            (false, Some(dir)) => {
                let written = translate_to_dir(&translator, &self.files, &dir)?;
                for path in &written {
                    output.detail(&format!("  {}", path.display()));
                }
                output.success(&format!(
                    "Translated {} file(s) to {}",
                    written.len(),
                    dir.display()
                ));
                Ok(())
            }
        }
    }
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|e: textout_markup::TranslateError| e.to_string())
}

fn parse_tweak(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got {value:?}")),
    }
}

/// Translate `files` in parallel, returning the documents in input order.
fn translate_files(translator: &Translator, files: &[PathBuf]) -> Result<Vec<Vec<u8>>, CliError> {
    files
        .par_iter()
        .map(|path| translate_file(translator, path, Vec::new()).map_err(|e| e.in_file(path)))
        .collect()
}

/// Translate `files` in parallel into `dir`, returning the written paths.
fn translate_to_dir(
    translator: &Translator,
    files: &[PathBuf],
    dir: &Path,
) -> Result<Vec<PathBuf>, CliError> {
    fs::create_dir_all(dir)?;
    files
        .par_iter()
        .map(|path| translate_into(translator, path, dir).map_err(|e| e.in_file(path)))
        .collect()
}

fn translate_into(translator: &Translator, path: &Path, dir: &Path) -> Result<PathBuf, CliError> {
    let target = output_path(dir, path, translator.format());
    let sink = BufWriter::new(File::create(&target)?);
    translate_file(translator, path, sink)?.flush()?;
    tracing::debug!(source = %path.display(), target = %target.display(), "Translated");
    Ok(target)
}

fn translate_file<W: Write>(translator: &Translator, path: &Path, sink: W) -> Result<W, CliError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(translator.translate_reader(reader, sink)?)
}

/// `dir/<stem>.<ext>`, with the extension chosen by the output format.
fn output_path(dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let extension = match format {
        OutputFormat::Html => "html",
        OutputFormat::Lightscript => "txt",
    };
    dir.join(stem).with_extension(extension)
}
