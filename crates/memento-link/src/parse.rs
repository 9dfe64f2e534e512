//! Link-format parser.
//!
//! Accepts both the multi-line body form and the single-line header form.
//! Separators inside `<...>` targets or quoted parameter values are not
//! treated as separators, so HTTP-dates such as `Sun, 01 Jan 2012` survive.

use crate::{
  LinkEntry,
  error::{Error, Result},
};

pub(crate) fn parse(input: &str) -> Result<Vec<LinkEntry>> {
  split_outside(input, ',')?
    .into_iter()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(parse_entry)
    .collect()
}

fn parse_entry(raw: &str) -> Result<LinkEntry> {
  let (target, rest) = raw
    .strip_prefix('<')
    .and_then(|s| s.split_once('>'))
    .ok_or_else(|| Error::MissingTarget(raw.to_string()))?;

  let mut rel = None;
  let mut params = Vec::new();

  for part in split_outside(rest, ';')?.into_iter().map(str::trim) {
    if part.is_empty() {
      continue;
    }
    let (key, value) = part
      .split_once('=')
      .ok_or_else(|| Error::MalformedParam(part.to_string()))?;
    let key = key.trim().to_ascii_lowercase();
    let value = unquote(value.trim());
    if key == "rel" {
      rel.get_or_insert(value);
    } else {
      params.push((key, value));
    }
  }

  let rel = rel.ok_or_else(|| Error::MissingRel(raw.to_string()))?;
  Ok(LinkEntry { target: target.trim().to_string(), rel, params })
}

/// Split on `sep` wherever it is outside angle brackets and double quotes.
fn split_outside(input: &str, sep: char) -> Result<Vec<&str>> {
  let mut pieces = Vec::new();
  let mut start = 0;
  let mut in_quotes = false;
  let mut in_target = false;
  let mut escaped = false;

  for (i, c) in input.char_indices() {
    if escaped {
      escaped = false;
      continue;
    }
    match c {
      '\\' if in_quotes => escaped = true,
      '"' if !in_target => in_quotes = !in_quotes,
      '<' if !in_quotes => in_target = true,
      '>' if !in_quotes => in_target = false,
      c if c == sep && !in_quotes && !in_target => {
        pieces.push(&input[start..i]);
        start = i + c.len_utf8();
      }
      _ => {}
    }
  }

  if in_quotes {
    return Err(Error::UnterminatedQuote(input.to_string()));
  }
  pieces.push(&input[start..]);
  Ok(pieces)
}

fn unquote(value: &str) -> String {
  match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
    Some(inner) => inner.replace("\\\"", "\""),
    None => value.to_string(),
  }
}
