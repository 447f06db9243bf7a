//! Text functions.
//!
//! Positions and lengths count characters, not bytes. Tokens for `select` are
//! separated by runs of ASCII whitespace (space, tab, line feed, form feed,
//! carriage return); other Unicode spaces belong to the token.

use crate::registry::{Args, Arity, FunctionDef};
use crate::sentinel::Sentinel;

pub(crate) const SUBSTR: FunctionDef = FunctionDef::new(
    "substr",
    Arity::between(2, 3),
    "Substring from start (0-based) with optional length, clamped to the input",
    substr,
);

pub(crate) const SELECT: FunctionDef = FunctionDef::new(
    "select",
    Arity::exactly(2),
    "Whitespace-separated token at index, empty when out of range",
    select,
);

pub(crate) const LOWER: FunctionDef =
    FunctionDef::new("lower", Arity::exactly(1), "Lowercase the input", lower);

pub(crate) const UPPER: FunctionDef =
    FunctionDef::new("upper", Arity::exactly(1), "Uppercase the input", upper);

pub(crate) const LEN: FunctionDef =
    FunctionDef::new("len", Arity::exactly(1), "Character count of the input", len);

fn substr(args: &Args<'_>) -> Result<String, Sentinel> {
    let s = args.str(0);
    let start = args.int(1)?;
    let length = args.opt_int(2)?;

    let total = s.chars().count() as i64;
    let begin = start.clamp(0, total);
    let end = match length {
        Some(length) => start.saturating_add(length).clamp(0, total),
        None => total,
    };
    if end <= begin {
        return Ok(String::new());
    }

    Ok(s.chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect())
}

fn select(args: &Args<'_>) -> Result<String, Sentinel> {
    let index = args.int(1)?;
    let Ok(index) = usize::try_from(index) else {
        return Ok(String::new());
    };

    Ok(args
        .str(0)
        .split_ascii_whitespace()
        .nth(index)
        .unwrap_or_default()
        .to_string())
}

fn lower(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(args.str(0).to_lowercase())
}

fn upper(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(args.str(0).to_uppercase())
}

fn len(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(args.str(0).chars().count().to_string())
}
