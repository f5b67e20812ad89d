//! Struct builder. Fields are kept in declaration order, which is the
//! native memory layout the generated `Structure` must reproduce.

use crate::error::ErrorKind;
use crate::model::{FieldDefinition, StructDefinition};
use crate::parser::grammar::split_array_suffix;
use crate::types::{escape_keyword, TypeDescriptor};

#[derive(Debug, Default)]
pub struct StructBuilder {
    doc: Option<String>,
    fields: Vec<FieldDefinition>,
}

impl StructBuilder {
    pub fn begin(doc: Option<String>) -> Self {
        Self {
            doc,
            fields: Vec::new(),
        }
    }

    /// Add one member line. `name_list` holds one or more comma-separated
    /// declarators sharing the base of `raw_type`, each with an optional
    /// `[N]` suffix. As in C, the stars of `raw_type` bind to the first
    /// declarator only; later ones carry their own (`float *a, *b`).
    pub fn add_field(&mut self, name_list: &str, raw_type: &str) -> Result<(), ErrorKind> {
        let leading_depth = raw_type.matches('*').count();
        let mut unsigned = false;
        let mut base = Vec::new();
        let cleaned = raw_type.replace('*', " ");
        for token in cleaned.split_whitespace() {
            match token {
                "unsigned" => unsigned = true,
                "const" => {}
                other => base.push(other),
            }
        }
        // a lone `unsigned` is `unsigned int`
        let base = if base.is_empty() { "int".to_string() } else { base.join(" ") };

        for (idx, declarator) in name_list.split(',').map(str::trim).enumerate() {
            let stripped = declarator.trim_start_matches(|c: char| c == '*' || c.is_whitespace());
            let own_depth = declarator[..declarator.len() - stripped.len()].matches('*').count();
            let pointer_depth = if idx == 0 { leading_depth } else { own_depth };
            let declarator = stripped;
            let (name, array_len) = match split_array_suffix(declarator) {
                Some((name, len)) => {
                    let len = len
                        .parse::<usize>()
                        .map_err(|_| ErrorKind::InvalidArrayLength(declarator.to_string()))?;
                    (name, Some(len))
                }
                None => (declarator, None),
            };

            let descriptor = TypeDescriptor::new(unsigned, &base, pointer_depth, array_len);
            if descriptor.is_void_value() {
                return Err(ErrorKind::VoidValue(name.to_string()));
            }
            self.fields.push(FieldDefinition {
                name: name.to_string(),
                ctype: descriptor.to_ctype()?,
            });
        }
        Ok(())
    }

    pub fn end(self, name: &str) -> Result<StructDefinition, ErrorKind> {
        if name.is_empty() {
            return Err(ErrorKind::EmptyName);
        }
        if self.fields.is_empty() {
            return Err(ErrorKind::EmptyDefinition(name.to_string()));
        }
        Ok(StructDefinition {
            name: escape_keyword(name),
            doc: self.doc,
            fields: self.fields,
        })
    }
}
