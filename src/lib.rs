pub mod bounds;
pub mod cli;
pub mod data;
pub mod dtype;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod load;
pub mod reduce;
pub mod report;
pub mod resolve;
pub mod select;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    bounds::Margin,
    cli::{Cli, Commands, InputArgs, ReduceArgs},
    frame::Frame,
    load::LoadOptions,
    reduce::ReduceOptions,
    report::FrameSchema,
};

pub use crate::{
    bounds::{Envelope, SignPolicy, envelope},
    dtype::{DType, Kind},
    error::ReduceError,
    frame::{Column, ColumnData},
    reduce::{ReduceReport, reduce, reduce_frame},
    resolve::{Verdict, resolve_other},
    select::{select_float, select_integer},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_slim", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Reduce(args) => handle_reduce(&args),
        Commands::Inspect(args) => handle_inspect(&args),
    }
}

fn load_input(args: &InputArgs) -> Result<Frame> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let options = LoadOptions {
        delimiter: Some(delimiter),
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        limit: args.limit,
    };
    info!(
        "Loading '{}' with delimiter '{}'",
        args.input.display(),
        io_utils::printable_delimiter(delimiter)
    );
    load::read_frame(&args.input, &options)
}

fn reduce_options(args: &ReduceArgs) -> Result<ReduceOptions> {
    let margin = if args.exact {
        Margin::Exact
    } else {
        Margin::proportional(args.margin)?
    };
    let round = args
        .round
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    debug!(
        "Margin {margin}, sign policy {:?}, round columns {:?}",
        args.sign, round
    );
    Ok(ReduceOptions::default()
        .with_margin(margin)
        .with_sign_policy(args.sign)
        .with_round_columns(round)
        .with_allow_drop(args.drop)
        .with_collapse_two_valued(args.int_to_bool)
        .with_text_to_bool(args.text_to_bool))
}

fn handle_reduce(args: &ReduceArgs) -> Result<()> {
    let options = reduce_options(args)?;
    let mut frame = load_input(&args.input)?;
    let unknown = options
        .round_columns
        .iter()
        .filter(|name| frame.column_index(name).is_none())
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        warn!("Ignoring --round for unknown column(s): {unknown:?}");
    }

    let report = reduce::reduce(&mut frame, &options)
        .with_context(|| format!("Reducing {:?}", args.input.input))?;

    let (headers, rows) = report::report_rows(&report);
    print!("{}", report::render_table(&headers, &rows));

    if let Some(path) = &args.schema_out {
        FrameSchema::of(&frame)
            .save(path)
            .with_context(|| format!("Writing schema to {path:?}"))?;
        info!("Schema for {} column(s) written to {:?}", frame.width(), path);
    }

    let before = report.bytes_before();
    let after = report.bytes_after();
    let saved = before.saturating_sub(after);
    info!(
        "Reduced {} column(s) from {before} to {after} bytes ({saved} saved, {} dropped)",
        report.columns.len(),
        report.dropped().count()
    );
    Ok(())
}

fn handle_inspect(args: &InputArgs) -> Result<()> {
    let frame = load_input(args)?;
    let (headers, rows) = report::frame_rows(&frame);
    print!("{}", report::render_table(&headers, &rows));
    info!(
        "{} column(s), {} row(s), {} bytes",
        frame.width(),
        frame.row_count().unwrap_or(0),
        frame.memory_usage()
    );
    Ok(())
}
