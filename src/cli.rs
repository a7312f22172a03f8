use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::bounds::SignPolicy;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Shrink CSV datasets to their narrowest column types",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a CSV file and report the narrowest type for every column
    Reduce(ReduceArgs),
    /// Show the column types and memory footprint of a CSV file as loaded
    Inspect(InputArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Limit number of rows to load
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ReduceArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Proportional slack added to the observed minimum and maximum
    #[arg(long, default_value_t = crate::bounds::DEFAULT_MARGIN, conflicts_with = "exact")]
    pub margin: f64,
    /// Use the observed range with no margin
    #[arg(long)]
    pub exact: bool,
    /// How non-negative columns treat their lower bound
    #[arg(long = "sign", value_enum, default_value_t = SignPolicy::Infer)]
    pub sign: SignPolicy,
    /// Real columns to round to integers before narrowing
    #[arg(long = "round", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub round: Vec<String>,
    /// Remove text columns with too many distinct values
    #[arg(long)]
    pub drop: bool,
    /// Store integer columns with exactly two distinct values as booleans
    #[arg(long = "int-to-bool")]
    pub int_to_bool: bool,
    /// Store text columns with exactly two distinct values as booleans
    #[arg(long = "text-to-bool")]
    pub text_to_bool: bool,
    /// Write the reduced column types as YAML
    #[arg(long = "schema-out")]
    pub schema_out: Option<PathBuf>,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        "pipe" => Ok(b'|'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        _ => Err(format!("Delimiter must be a single ASCII character or 'tab' (got '{value}')")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_aliases() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert!(parse_delimiter("::").is_err());
    }

    #[test]
    fn reduce_arguments_parse() {
        let cli = Cli::try_parse_from([
            "csv-slim",
            "reduce",
            "-i",
            "data.csv",
            "--margin",
            "5",
            "--sign",
            "allow-negative",
            "--round",
            "b,c",
            "--drop",
        ])
        .unwrap();
        let Commands::Reduce(args) = cli.command else {
            panic!("expected reduce");
        };
        assert_eq!(args.margin, 5.0);
        assert_eq!(args.sign, SignPolicy::AllowNegative);
        assert_eq!(args.round, vec!["b".to_string(), "c".to_string()]);
        assert!(args.drop);
        assert!(!args.int_to_bool);
    }

    #[test]
    fn exact_conflicts_with_margin() {
        let parsed = Cli::try_parse_from([
            "csv-slim", "reduce", "-i", "x.csv", "--exact", "--margin", "1",
        ]);
        assert!(parsed.is_err());
    }
}
