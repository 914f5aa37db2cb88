/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use nom::error::Error as NomError;

/// Errors raised while loading statistics, building, estimating or rewriting a plan.
///
/// None of these are transient: each one ends the current optimisation attempt.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("{0} estimated before its input")]
    MissingInput(&'static str),

    #[error("invalid predicate for {operator}: {predicate}")]
    InvalidPredicate {
        operator: &'static str,
        predicate: String,
    },

    #[error("plan has no relation to optimise")]
    EmptyPlan,

    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    #[error("relation {0} is already in the catalogue")]
    DuplicateRelation(String),

    #[error("attribute {0} is already in the catalogue")]
    DuplicateAttribute(String),

    #[error("invalid statistics: {0}")]
    InvalidStatistics(String),

    #[error("query syntax error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// Renders a nom failure as a line/column message pointing into the query text
pub fn format_parse_error(input: &str, err: nom::Err<NomError<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len() - e.input.len();

            let mut line_no = 1;
            let mut col_no = 1;
            for (i, c) in input.char_indices() {
                if i >= offset {
                    break;
                }
                if c == '\n' {
                    line_no += 1;
                    col_no = 1;
                } else {
                    col_no += 1;
                }
            }

            let error_description = match e.code {
                nom::error::ErrorKind::Tag => ". Expected a keyword or token",
                nom::error::ErrorKind::Char => ". Expected a specific character",
                nom::error::ErrorKind::Alt => ". Expected one of several alternatives",
                nom::error::ErrorKind::TakeWhile1 => ". Expected a name",
                nom::error::ErrorKind::Eof => ". Unexpected trailing input",
                _ => "",
            };

            let error_line = input.lines().nth(line_no - 1).unwrap_or("[end of input]");

            format!(
                "line {}, column {}{}:\n{}\n{}^ Here",
                line_no,
                col_no,
                error_description,
                error_line,
                " ".repeat(col_no - 1)
            )
        }
        nom::Err::Incomplete(_) => {
            "Incomplete input: the parser needs more input to complete parsing".to_string()
        }
    }
}
