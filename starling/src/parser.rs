/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::catalogue::Catalogue;
use crate::custom_error::{format_parse_error, PlanError, Result};
use crate::planner::PlanNode;
use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use shared::{Attribute, NamedRelation, Predicate};

/// A `WHERE` condition as written in the query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateExpr<'a> {
    EqualsValue { attribute: &'a str, value: &'a str },
    EqualsAttribute { left: &'a str, right: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<'a> {
    /// `None` for `SELECT *`
    pub attributes: Option<Vec<&'a str>>,
    pub relations: Vec<&'a str>,
    pub predicates: Vec<PredicateExpr<'a>>,
}

// Helper function to recognize identifiers
pub fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

// Parser for a literal value within double quotes
pub fn parse_literal(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)
}

// Integer or decimal number, kept as written
pub fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

// Parser for the projection list: `*` or `a, b, c`
pub fn parse_select_list(input: &str) -> IResult<&str, Option<Vec<&str>>> {
    alt((
        map(char('*'), |_| None),
        map(separated_list1(comma, identifier), Some),
    ))(input)
}

// Parser for a single `WHERE` condition
pub fn parse_predicate(input: &str) -> IResult<&str, PredicateExpr<'_>> {
    let (input, left) = identifier(input)?;
    let (input, _) = delimited(multispace0, char('='), multispace0)(input)?;

    alt((
        map(parse_literal, move |value| PredicateExpr::EqualsValue {
            attribute: left,
            value,
        }),
        map(parse_number, move |value| PredicateExpr::EqualsValue {
            attribute: left,
            value,
        }),
        map(identifier, move |right| PredicateExpr::EqualsAttribute { left, right }),
    ))(input)
}

fn parse_where(input: &str) -> IResult<&str, Vec<PredicateExpr<'_>>> {
    preceded(
        tuple((multispace1, tag_no_case("WHERE"), multispace1)),
        separated_list1(comma, parse_predicate),
    )(input)
}

// Parser for a complete SELECT-FROM-WHERE query
pub fn parse_select_query(input: &str) -> IResult<&str, Query<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag_no_case("SELECT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, attributes) = parse_select_list(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("FROM")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, relations) = separated_list1(comma, identifier)(input)?;
    let (input, predicates) = opt(parse_where)(input)?;
    let (input, _) = tuple((multispace0, opt(char(';')), multispace0))(input)?;

    Ok((
        input,
        Query {
            attributes,
            relations,
            predicates: predicates.unwrap_or_default(),
        },
    ))
}

/// Parses the whole query text, reporting syntax errors by line and column
pub fn parse_query(input: &str) -> Result<Query<'_>> {
    match all_consuming(parse_select_query)(input) {
        Ok((_, query)) => Ok(query),
        Err(err) => Err(PlanError::Parse(format_parse_error(input, err))),
    }
}

/// Builds the canonical plan for a parsed query.
///
/// Scans appear in `FROM` order and are combined by left-deep products, one
/// selection is stacked per condition in `WHERE` order, and a projection is
/// placed on top unless the query selects `*`.
pub fn build_canonical_plan(query: &Query<'_>, catalogue: &Catalogue) -> Result<PlanNode> {
    let mut relations: Vec<&NamedRelation> = Vec::with_capacity(query.relations.len());
    for name in &query.relations {
        if relations.iter().any(|r| r.name == *name) {
            return Err(PlanError::DuplicateRelation(name.to_string()));
        }
        let relation = catalogue
            .relation(name)
            .ok_or_else(|| PlanError::UnknownRelation(name.to_string()))?;
        relations.push(relation);
    }

    let resolve = |name: &str| -> Result<Attribute> {
        relations
            .iter()
            .find_map(|r| r.relation.attribute(name))
            .cloned()
            .ok_or_else(|| PlanError::AttributeNotFound(name.to_string()))
    };

    let mut scans = relations.iter().map(|r| PlanNode::scan((*r).clone()));
    let mut plan = scans.next().ok_or(PlanError::EmptyPlan)?;
    for scan in scans {
        plan = PlanNode::product(plan, scan);
    }

    for expr in &query.predicates {
        let predicate = match expr {
            PredicateExpr::EqualsValue { attribute, value } => {
                Predicate::equals_value(resolve(*attribute)?, *value)
            }
            PredicateExpr::EqualsAttribute { left, right } => {
                Predicate::equals_attribute(resolve(*left)?, resolve(*right)?)
            }
        };
        plan = PlanNode::selection(plan, predicate);
    }

    if let Some(names) = &query.attributes {
        let attributes = names
            .iter()
            .map(|name| resolve(*name))
            .collect::<Result<Vec<_>>>()?;
        plan = PlanNode::projection(plan, attributes);
    }

    debug!("canonical plan: {}", plan);
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let query = parse_query(
            "select persname, projname\nFROM Person, Project\nWhere persid = manager, age = 42;",
        )
        .unwrap();
        assert_eq!(query.attributes, Some(vec!["persname", "projname"]));
        assert_eq!(query.relations, vec!["Person", "Project"]);
        assert_eq!(
            query.predicates,
            vec![
                PredicateExpr::EqualsAttribute {
                    left: "persid",
                    right: "manager"
                },
                PredicateExpr::EqualsValue {
                    attribute: "age",
                    value: "42"
                },
            ]
        );
    }

    #[test]
    fn test_parse_star_without_where() {
        let query = parse_query("SELECT * FROM R").unwrap();
        assert_eq!(query.attributes, None);
        assert_eq!(query.relations, vec!["R"]);
        assert!(query.predicates.is_empty());
    }

    #[test]
    fn test_parse_quoted_literal() {
        let query = parse_query(r#"SELECT * FROM R WHERE name = "Ada Lovelace""#).unwrap();
        assert_eq!(
            query.predicates,
            vec![PredicateExpr::EqualsValue {
                attribute: "name",
                value: "Ada Lovelace"
            }]
        );
    }

    #[test]
    fn test_parse_error_reports_position() {
        match parse_query("SELECT *\nFORM R") {
            Err(PlanError::Parse(message)) => assert!(message.contains("line 2, column 1")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(matches!(
            parse_query("SELECT * FROM R WHERE a = b extra"),
            Err(PlanError::Parse(_))
        ));
    }
}
