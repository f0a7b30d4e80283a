//! Name and identifier helpers
//!
//! Route 53 returns IDs with path prefixes (`/hostedzone/Z123`), names with
//! trailing dots and octal escapes (`\052.example.com.`), and TXT values as
//! quoted 255-byte character-strings. Resources normalize all of these so
//! that declared values and observed values compare equal.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::RecordType;

/// Maximum length of a single DNS character-string
const TXT_CHUNK_LEN: usize = 255;

/// Separator between character-strings of one TXT value
const TXT_JOINT: &str = "\" \"";

/// Strip the `/hostedzone/` prefix from a zone ID
pub fn clean_zone_id(id: &str) -> String {
    id.trim_start_matches("/hostedzone/").to_string()
}

/// Strip the `/change/` prefix from a change ID
pub fn clean_change_id(id: &str) -> String {
    id.trim_start_matches("/change/").to_string()
}

/// Strip the `/delegationset/` prefix from a delegation set ID
pub fn clean_delegation_set_id(id: &str) -> String {
    id.trim_start_matches("/delegationset/").to_string()
}

/// Strip the `/healthcheck/` prefix from a health check ID
pub fn clean_health_check_id(id: &str) -> String {
    id.trim_start_matches("/healthcheck/").to_string()
}

/// Decode the `\DDD` octal escapes Route 53 uses for special characters
///
/// `\052.example.com` becomes `*.example.com`. Anything that is not a valid
/// three-digit octal escape is kept verbatim.
pub fn clean_record_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| name.to_string())
}

/// Canonical form of a DNS name: escapes decoded, lowercase, no trailing dot
pub fn normalize_name(name: &str) -> String {
    clean_record_name(name)
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

/// Append the trailing dot of a fully qualified name
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Expand a possibly relative record name into a name inside `zone`
///
/// An empty name is the zone apex. Names already inside the zone are kept;
/// anything else gets the zone name appended.
pub fn expand_record_name(name: &str, zone: &str) -> String {
    let rn = name.trim_end_matches('.').to_ascii_lowercase();
    let zone = zone.trim_end_matches('.').to_ascii_lowercase();

    if rn.is_empty() {
        return zone;
    }
    if rn == zone || rn.ends_with(&format!(".{zone}")) {
        return rn;
    }
    format!("{rn}.{zone}")
}

/// Normalize an alias target DNS name
///
/// ELB alias targets are accepted with or without the `dualstack.` prefix
/// and in any case; Route 53 stores them lowercased with the prefix.
pub fn normalize_alias_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    lower
        .strip_prefix("dualstack.")
        .unwrap_or(&lower)
        .trim_end_matches('.')
        .to_string()
}

/// Convert a declared TXT/SPF value to wire format
///
/// The value is wrapped in quotes. Values longer than 255 bytes without
/// embedded quotes are split into several quoted character-strings; values
/// with embedded quotes (`x=\" \"foo`) are taken as already split.
pub fn encode_txt_value(value: &str) -> String {
    if value.len() <= TXT_CHUNK_LEN || value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut out = String::with_capacity(value.len() + 8);
    let mut chunk_len = 0;
    out.push('"');
    for c in value.chars() {
        if chunk_len + c.len_utf8() > TXT_CHUNK_LEN {
            out.push_str(TXT_JOINT);
            chunk_len = 0;
        }
        out.push(c);
        chunk_len += c.len_utf8();
    }
    out.push('"');
    out
}

/// Convert a wire-format TXT/SPF value back to the declared form
///
/// The outer quotes are removed. Joints are merged back only when the merged
/// value encodes to exactly this wire value; any other embedded `" "` is
/// kept as written.
pub fn decode_txt_value(value: &str) -> String {
    let inner = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        return value.to_string();
    };

    if inner.contains(TXT_JOINT) {
        let merged = inner.split(TXT_JOINT).collect::<String>();
        if !merged.contains('"') && encode_txt_value(&merged) == value {
            return merged;
        }
    }
    inner.to_string()
}

/// Convert declared values of a record set to wire format
pub fn encode_record_values(values: &[String], record_type: RecordType) -> Vec<String> {
    values
        .iter()
        .map(|v| {
            if record_type.is_text() {
                encode_txt_value(v)
            } else {
                v.clone()
            }
        })
        .collect()
}

/// Convert wire-format values of a record set to the declared form
pub fn decode_record_values(values: &[String], record_type: RecordType) -> Vec<String> {
    values
        .iter()
        .map(|v| {
            if record_type.is_text() {
                decode_txt_value(v)
            } else {
                v.clone()
            }
        })
        .collect()
}

/// Identifier of a record resource: `ZONE_NAME_TYPE[_SETID]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    pub zone_id: String,
    pub name: String,
    pub record_type: RecordType,
    pub set_identifier: Option<String>,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.zone_id, self.name, self.record_type)?;
        if let Some(set) = &self.set_identifier {
            write!(f, "_{set}")?;
        }
        Ok(())
    }
}

impl FromStr for RecordId {
    type Err = Error;

    /// Parse a record ID
    ///
    /// Names may themselves start with or contain underscores
    /// (`_dmarc.example.com`), so the type is located as the first
    /// underscore-delimited segment after the name that is a record type.
    fn from_str(id: &str) -> Result<Self> {
        let malformed = || {
            Error::invalid_input(format!(
                "malformed record ID {id:?}, expected ZONEID_NAME_TYPE[_SETIDENTIFIER]"
            ))
        };

        let (zone_id, rest) = id.split_once('_').ok_or_else(malformed)?;
        if zone_id.is_empty() || rest.is_empty() {
            return Err(malformed());
        }

        for (pos, _) in rest.match_indices('_').filter(|(pos, _)| *pos > 0) {
            let tail = &rest[pos + 1..];
            let (type_str, set) = match tail.split_once('_') {
                Some((t, s)) => (t, Some(s)),
                None => (tail, None),
            };
            if type_str.is_empty() || type_str != type_str.to_ascii_uppercase() {
                continue;
            }
            let Ok(record_type) = type_str.parse::<RecordType>() else {
                continue;
            };
            return Ok(Self {
                zone_id: clean_zone_id(zone_id),
                name: rest[..pos].trim_end_matches('.').to_string(),
                record_type,
                set_identifier: set.filter(|s| !s.is_empty()).map(str::to_string),
            });
        }

        Err(malformed())
    }
}
