//! `${address.attribute}` references in declared configs
//!
//! A string that is exactly one reference takes the referenced JSON value
//! as-is (numbers stay numbers, lists stay lists). References embedded in a
//! longer string are spliced in as text.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Outcome of resolving a config
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    /// Every reference resolved
    Ready(Value),
    /// References to addresses with no known state yet
    Pending(Vec<String>),
}

/// Resolve every reference in `config` against `states` (address to state)
pub(crate) fn resolve(config: &Value, states: &HashMap<String, Value>) -> Result<Resolved> {
    let mut pending = Vec::new();
    let value = resolve_value(config, states, &mut pending)?;
    if pending.is_empty() {
        Ok(Resolved::Ready(value))
    } else {
        pending.sort();
        pending.dedup();
        Ok(Resolved::Pending(pending))
    }
}

fn resolve_value(
    value: &Value,
    states: &HashMap<String, Value>,
    pending: &mut Vec<String>,
) -> Result<Value> {
    Ok(match value {
        Value::String(s) => resolve_string(s, states, pending)?,
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| resolve_value(v, states, pending))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), resolve_value(v, states, pending)?)))
                .collect::<Result<_>>()?,
        ),
        other => other.clone(),
    })
}

fn resolve_string(
    s: &str,
    states: &HashMap<String, Value>,
    pending: &mut Vec<String>,
) -> Result<Value> {
    if !s.contains("${") {
        return Ok(Value::String(s.to_string()));
    }

    // whole-string reference keeps the JSON type
    if let Some(reference) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
        if !reference.contains('}') {
            return Ok(match lookup(reference, states)? {
                Some(v) => v,
                None => {
                    pending.push(reference.to_string());
                    Value::String(s.to_string())
                }
            });
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::config(format!("Unterminated reference in {s:?}")))?;
        let reference = &after[..end];
        match lookup(reference, states)? {
            Some(Value::String(v)) => out.push_str(&v),
            Some(v) => out.push_str(&v.to_string()),
            None => {
                pending.push(reference.to_string());
                out.push_str(&rest[start..start + 2 + end + 1]);
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(Value::String(out))
}

/// Look up `address.attr.path`; `Ok(None)` when the address has no state
fn lookup(reference: &str, states: &HashMap<String, Value>) -> Result<Option<Value>> {
    // longest address prefix wins, addresses themselves contain dots
    let mut split_points: Vec<usize> = reference.match_indices('.').map(|(i, _)| i).collect();
    split_points.reverse();

    for i in split_points {
        let (address, path) = (&reference[..i], &reference[i + 1..]);
        let Some(state) = states.get(address) else {
            continue;
        };
        let mut current = state;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|n| items.get(n)),
                _ => None,
            }
            .ok_or_else(|| {
                Error::config(format!("{address} has no attribute {path:?} (in ${{{reference}}})"))
            })?;
        }
        return Ok(Some(current.clone()));
    }

    if reference.contains('.') {
        Ok(None)
    } else {
        Err(Error::config(format!(
            "Malformed reference ${{{reference}}}, expected ${{address.attribute}}"
        )))
    }
}
