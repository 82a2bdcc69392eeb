//! Validation rule sets: field -> rule expression, and the clauses an expression is made of.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

/// A field's rule expression: `"required|max:255"` or `["required", "max:255"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    Expr(String),
    Clauses(Vec<String>),
}

impl Rule {
    /// Non-empty clauses in declaration order.
    pub fn clauses(&self) -> Vec<&str> {
        match self {
            Rule::Expr(expr) => expr.split('|').map(str::trim).filter(|c| !c.is_empty()).collect(),
            Rule::Clauses(list) => list.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).collect(),
        }
    }

    /// Same expression minus any `unique:<table>,<column>` clause.
    pub fn without_uniqueness(&self) -> Rule {
        match self {
            Rule::Expr(expr) => Rule::Expr(
                expr.split('|')
                    .filter(|c| !is_uniqueness_clause(c))
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
            Rule::Clauses(list) => Rule::Clauses(
                list.iter()
                    .filter(|c| !is_uniqueness_clause(c))
                    .cloned()
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Rule {
    fn from(expr: &str) -> Self {
        Rule::Expr(expr.to_string())
    }
}

impl From<String> for Rule {
    fn from(expr: String) -> Self {
        Rule::Expr(expr)
    }
}

impl From<Vec<&str>> for Rule {
    fn from(list: Vec<&str>) -> Self {
        Rule::Clauses(list.into_iter().map(str::to_string).collect())
    }
}

fn uniqueness_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^unique:\w+,\w+$").expect("static pattern"))
}

fn is_uniqueness_clause(clause: &str) -> bool {
    uniqueness_clause().is_match(clause.trim())
}

/// Field -> rule expression.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(BTreeMap<String, Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, field: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.insert(field, rule);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, rule: impl Into<Rule>) {
        self.0.insert(field.into(), rule.into());
    }

    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rules for updates: uniqueness checks would hit the record being edited, so they are dropped.
    /// Fields keep their entry even when nothing else is left.
    pub fn without_uniqueness(&self) -> RuleSet {
        RuleSet(
            self.0
                .iter()
                .map(|(field, rule)| (field.clone(), rule.without_uniqueness()))
                .collect(),
        )
    }
}

impl<K: Into<String>, R: Into<Rule>> FromIterator<(K, R)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        RuleSet(iter.into_iter().map(|(k, r)| (k.into(), r.into())).collect())
    }
}

/// Free-function form of [`RuleSet::without_uniqueness`].
pub fn drop_uniqueness_rules(rules: &RuleSet) -> RuleSet {
    rules.without_uniqueness()
}

/// One parsed clause of a rule expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    Required,
    Nullable,
    String,
    Integer,
    Numeric,
    Boolean,
    Email,
    Uuid,
    Min(f64),
    Max(f64),
    In(Vec<String>),
    Regex(String),
    Unique { table: String, column: String },
}

impl FromStr for Clause {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        let number = |arg: Option<&str>| -> Result<f64, String> {
            arg.and_then(|a| a.trim().parse::<f64>().ok())
                .ok_or_else(|| format!("'{}' needs a numeric argument", name))
        };
        Ok(match name {
            "required" => Clause::Required,
            "nullable" => Clause::Nullable,
            "string" => Clause::String,
            "integer" => Clause::Integer,
            "numeric" => Clause::Numeric,
            "boolean" => Clause::Boolean,
            "email" => Clause::Email,
            "uuid" => Clause::Uuid,
            "min" => Clause::Min(number(arg)?),
            "max" => Clause::Max(number(arg)?),
            "in" => Clause::In(
                arg.unwrap_or_default()
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .collect(),
            ),
            "regex" => {
                let pattern = arg.ok_or_else(|| "'regex' needs a pattern".to_string())?;
                let pattern = pattern
                    .strip_prefix('/')
                    .and_then(|p| p.strip_suffix('/'))
                    .unwrap_or(pattern);
                Clause::Regex(pattern.to_string())
            }
            "unique" => {
                let (table, column) = arg
                    .and_then(|a| a.split_once(','))
                    .ok_or_else(|| "'unique' needs table,column".to_string())?;
                Clause::Unique {
                    table: table.trim().to_string(),
                    column: column.trim().to_string(),
                }
            }
            other => return Err(format!("unknown rule '{}'", other)),
        })
    }
}
