//! Enum builder.
//!
//! Member names are split at the first underscore into a prefix and a
//! remainder (`KEY_ENTER` -> `KEY`, `ENTER`). The enumerated type uses the
//! remainders; one top-level alias per member keeps the native name. When a
//! remainder starts with a digit (`KEY_0`) the whole enum is "corrected" and
//! every member identifier gets the prefix initial (`K0`).

use crate::error::ErrorKind;
use crate::model::{EnumDefinition, EnumMember};
use crate::types::escape_keyword;

#[derive(Debug, Default)]
pub struct EnumBuilder {
    doc: Option<String>,
    prefix: String,
    corrected: bool,
    /// (remainder, explicit value)
    members: Vec<(String, Option<String>)>,
}

impl EnumBuilder {
    pub fn begin(doc: Option<String>) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    pub fn add_member(&mut self, raw_name: &str, value: Option<&str>) -> Result<(), ErrorKind> {
        let (prefix, remainder) = raw_name
            .split_once('_')
            .filter(|(p, r)| !p.is_empty() && !r.is_empty())
            .ok_or_else(|| ErrorKind::EnumMemberWithoutPrefix(raw_name.to_string()))?;

        if remainder.starts_with(|c: char| c.is_ascii_digit()) {
            self.corrected = true;
        }
        if self.prefix.is_empty() {
            self.prefix = prefix.to_string();
        }
        if self.members.iter().any(|(r, _)| r == remainder) {
            return Err(ErrorKind::DuplicateEnumMember(remainder.to_string()));
        }

        self.members
            .push((remainder.to_string(), value.map(str::to_string)));
        Ok(())
    }

    /// Close the enum. Unset values continue from the previous value + 1,
    /// starting at 0.
    pub fn end(self, name: &str) -> Result<EnumDefinition, ErrorKind> {
        if name.is_empty() {
            return Err(ErrorKind::EmptyName);
        }
        if self.members.is_empty() {
            return Err(ErrorKind::EmptyDefinition(name.to_string()));
        }

        let mut next: i64 = 0;
        let mut members = Vec::with_capacity(self.members.len());
        for (remainder, explicit) in self.members {
            let (current, text) = match explicit {
                Some(literal) => (parse_enum_value(&literal)?, literal),
                None => (next, next.to_string()),
            };
            next = current
                .checked_add(1)
                .ok_or_else(|| ErrorKind::InvalidEnumValue(text.clone()))?;
            members.push(EnumMember {
                remainder,
                value: text,
            });
        }

        Ok(EnumDefinition {
            name: escape_keyword(name),
            doc: self.doc,
            prefix: self.prefix,
            corrected: self.corrected,
            members,
        })
    }
}

fn parse_enum_value(literal: &str) -> Result<i64, ErrorKind> {
    let invalid = || ErrorKind::InvalidEnumValue(literal.to_string());
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => digits.parse::<i64>().map_err(|_| invalid())?,
    };
    Ok(if negative { -magnitude } else { magnitude })
}
