/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use flexi_logger::Logger;
use log::{error, info};
use starling::planner::OptimiserConfig;
use starling::{Catalogue, Inspector, QueryEngine};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "starling-cli",
    version = "0.1.0",
    author = "Volodymyr Kadzhaia <vkadzhaia@gmail.com>",
    author = "Pieter Bonte <pieter.bonte@kuleuven.be>",
    about = "Estimate and optimise relational algebra queries",
    long_about = "Starling CLI - loads relation statistics from a JSON catalogue, builds the \
        canonical plan of a SELECT-FROM-WHERE query and prints it next to the greedily \
        optimised plan, both annotated with estimated cardinalities."
)]
struct Args {
    #[arg(short, long, help = "JSON catalogue of relation statistics", value_name = "FILE")]
    catalogue: PathBuf,

    #[arg(short, long, help = "Query text", value_name = "QUERY", conflicts_with = "query_file")]
    query: Option<String>,

    #[arg(long, help = "Read the query from a file", value_name = "FILE")]
    query_file: Option<PathBuf>,

    #[arg(long, help = "Keep selections above the joins")]
    no_select_pushdown: bool,

    #[arg(long, help = "Do not narrow join inputs with projections")]
    no_project_pushdown: bool,

    #[arg(long, default_value_t = 2, help = "Spaces per level of the rendered plans")]
    indent: usize,

    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
}

impl Args {
    fn config(&self) -> OptimiserConfig {
        OptimiserConfig {
            push_selections: !self.no_select_pushdown,
            push_projections: !self.no_project_pushdown,
        }
    }

    /// Query text from `--query`, `--query-file` or stdin, in that order
    fn query_text(&self) -> std::io::Result<String> {
        if let Some(query) = &self.query {
            return Ok(query.clone());
        }
        if let Some(path) = &self.query_file {
            return std::fs::read_to_string(path);
        }
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let engine = QueryEngine::with_config(Catalogue::from_file(&args.catalogue)?, args.config());
    info!(
        "loaded {} relations from {}",
        engine.catalogue().len(),
        args.catalogue.display()
    );

    let query = args.query_text()?;
    let explanation = engine.explain(&query)?;

    print!("{}", explanation.render(&Inspector::with_indent(args.indent)));
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so the plans on stdout stay clean
    let _logger = match Logger::try_with_str(&args.log_level).and_then(|logger| logger.start()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("failed to initialise logging: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
