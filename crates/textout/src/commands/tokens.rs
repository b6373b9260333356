//! `textout tokens` command implementation.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Args;
use textout_markup::{DEFAULT_BUFFER_CAPACITY, ReadSource, Tokenizer, Unit};

use crate::error::CliError;

/// Arguments for the tokens command.
#[derive(Args)]
pub(crate) struct TokensArgs {
    /// Markup file to tokenize (default: stdin).
    file: Option<PathBuf>,

    /// Print one JSON object per unit.
    #[arg(long)]
    json: bool,

    /// Tokenizer buffer capacity in characters.
    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_capacity: usize,
}

impl TokensArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let stdout = io::stdout().lock();
        let mut sink = BufWriter::new(stdout);

        match &self.file {
            Some(path) => {
                let file = File::open(path).map_err(|e| CliError::from(e).in_file(path))?;
                write_units(BufReader::new(file), &mut sink, self.json, self.buffer_capacity)
                    .map_err(|e| e.in_file(path))?;
            }
            None => {
                write_units(io::stdin().lock(), &mut sink, self.json, self.buffer_capacity)?;
            }
        }

        sink.flush()?;
        Ok(())
    }
}

/// Write every unit read from `reader`, one per line. Returns the unit count.
fn write_units<R: Read, W: Write>(
    reader: R,
    mut sink: W,
    json: bool,
    buffer_capacity: usize,
) -> Result<usize, CliError> {
    let tokenizer = Tokenizer::with_capacity(ReadSource::new(reader), buffer_capacity);
    let mut count = 0;
    for unit in tokenizer {
        let unit = unit?;
        if json {
            serde_json::to_writer(&mut sink, &unit)?;
            writeln!(sink)?;
        } else {
            writeln!(sink, "{}", describe(&unit))?;
        }
        count += 1;
    }
    Ok(count)
}

/// Human-readable line for a unit.
fn describe(unit: &Unit) -> String {
    match unit {
        Unit::Begin {
            name,
            value: Some(value),
            ..
        } => format!("{:<16}{name} = {value:?}", unit.kind()),
        Unit::Begin { name, .. } | Unit::End { name, .. } if !name.is_empty() => {
            format!("{:<16}{name}", unit.kind())
        }
        _ => format!("{:<16}{:?}", unit.kind(), unit.literal()),
    }
}
