//! Link-format serializer.
//!
//! Each entry becomes `<target>; rel="..."; key="value"...`. Bodies place one
//! entry per line; header values keep everything on one line.

use std::collections::HashMap;

use crate::{LinkEntry, MementoLink, TimeMapDocument, relation};

pub(crate) const BODY_SEPARATOR: &str = ",\n";
pub(crate) const HEADER_SEPARATOR: &str = ", ";

pub(crate) fn render(entries: &[LinkEntry], separator: &str) -> String {
  entries
    .iter()
    .map(render_entry)
    .collect::<Vec<_>>()
    .join(separator)
}

fn render_entry(entry: &LinkEntry) -> String {
  let mut out = format!("<{}>; rel=\"{}\"", entry.target, entry.rel);
  for (key, value) in &entry.params {
    out.push_str("; ");
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&value.replace('"', "\\\""));
    out.push('"');
  }
  out
}

pub(crate) fn document_entries(doc: &TimeMapDocument) -> Vec<LinkEntry> {
  let mut entries = Vec::with_capacity(2 + doc.continuations.len() + doc.mementos.len());
  entries.push(doc.self_link.clone());
  entries.extend(doc.continuations.iter().cloned());
  entries.push(doc.original.clone());
  entries.extend(
    merge_mementos(doc.mementos.clone())
      .iter()
      .map(|m| relation::memento(&m.target, m.datetime, m.roles)),
  );
  entries
}

/// Fold mementos with the same target into one, then sort newest first.
/// Mementos sharing a datetime keep the order they were given in.
pub(crate) fn merge_mementos(mementos: Vec<MementoLink>) -> Vec<MementoLink> {
  let mut merged: Vec<MementoLink> = Vec::with_capacity(mementos.len());
  let mut index: HashMap<String, usize> = HashMap::new();
  for m in mementos {
    match index.get(&m.target) {
      Some(&i) => merged[i].roles = merged[i].roles.union(m.roles),
      None => {
        index.insert(m.target.clone(), merged.len());
        merged.push(m);
      }
    }
  }

  merged.sort_by(|a, b| b.datetime.cmp(&a.datetime));
  merged
}
