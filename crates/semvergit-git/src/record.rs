// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Structured record extraction from git format-string output.
//!
//! Free-form commit text makes delimiter-based parsing of `git show` /
//! `git for-each-ref` output unreliable, so queries embed XML field tags in
//! the format string and the whole response is parsed as an XML document
//! under a synthetic `<list>` root. Git does not escape field values, so
//! before parsing we escape markup that cannot belong to the format string:
//! bare ampersands and any `<` that does not open or close a known field
//! tag. A field value that itself spells out a known tag still defeats this
//! scheme, which is the same limit the format strings have always had.
//!
//! All escaping/unescaping lives here so it is tested once, not per query.

use std::collections::BTreeMap;

use crate::error::GitError;

/// One record extracted from tagged output, keyed by field tag name.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Returns the field value, treating empty text as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// True when `rest` (the text after `&`) begins a well-formed XML entity.
fn is_entity_start(rest: &str) -> bool {
    for entity in ["amp;", "lt;", "gt;", "apos;", "quot;"] {
        if rest.starts_with(entity) {
            return true;
        }
    }
    if let Some(numeric) = rest.strip_prefix('#') {
        let (digits, radix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16),
            None => (numeric, 10),
        };
        let len = digits.chars().take_while(|c| c.is_digit(radix)).count();
        return len > 0 && digits[len..].starts_with(';');
    }
    false
}

/// Escapes markup in raw git output so only the known field tags survive as
/// XML structure. Also strips the `'` quote artifacts that shell-style
/// quoting leaves around the record when the format string was quoted.
#[must_use]
pub fn sanitize(raw: &str, record_tag: &str, field_tags: &[&str]) -> String {
    let raw = raw
        .replace(&format!("'<{record_tag}>"), &format!("<{record_tag}>"))
        .replace(&format!("</{record_tag}>'"), &format!("</{record_tag}>"));

    let mut allowed = Vec::with_capacity(2 * (field_tags.len() + 1));
    for tag in field_tags.iter().copied().chain([record_tag]) {
        allowed.push(format!("{tag}>"));
        allowed.push(format!("/{tag}>"));
    }

    let mut out = String::with_capacity(raw.len());
    let mut index = 0;
    while index < raw.len() {
        let rest = &raw[index..];
        let ch = rest.chars().next().expect("index is on a char boundary");
        match ch {
            '<' => {
                if allowed.iter().any(|tag| rest[1..].starts_with(tag.as_str())) {
                    out.push('<');
                } else {
                    out.push_str("&lt;");
                }
            }
            '&' => {
                if is_entity_start(&rest[1..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            _ => out.push(ch),
        }
        index += ch.len_utf8();
    }
    out
}

/// Parses tagged git output into records.
///
/// The raw text is sanitized, wrapped in a synthetic `<list>` root, parsed
/// as XML, and every `<record_tag>` child becomes one [`Record`] whose
/// fields are the child elements listed in `field_tags`.
///
/// # Errors
///
/// Returns [`GitError::MalformedRecord`] if the sanitized text is still not
/// well-formed XML.
pub fn parse_records(
    raw: &str,
    record_tag: &str,
    field_tags: &[&str],
) -> Result<Vec<Record>, GitError> {
    let sanitized = sanitize(raw, record_tag, field_tags);
    let wrapped = format!("<list>{sanitized}</list>");
    let document = roxmltree::Document::parse(&wrapped)
        .map_err(|error| GitError::MalformedRecord(error.to_string()))?;

    let mut records = Vec::new();
    for node in document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name(record_tag))
    {
        let mut record = Record::default();
        for field in node.children().filter(roxmltree::Node::is_element) {
            let name = field.tag_name().name().to_string();
            let value = field.text().unwrap_or_default().to_string();
            record.fields.insert(name, value);
        }
        records.push(record);
    }
    Ok(records)
}
