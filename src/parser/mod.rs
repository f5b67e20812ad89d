//! Header parser: a single forward pass driven by directive comments.
//!
//! Each line is classified first. Directives switch grammar contexts on and
//! off, plain comments become the pending doc string for the next struct or
//! enum, and code lines go through every active context in activation order.

pub mod directive;
pub mod grammar;
pub mod rules;

use log::{debug, warn};

use crate::builder::{assemble_callback, EnumBuilder, FunctionDefinition, Open, StructBuilder};
use crate::error::{ConstructKind, ErrorKind, GenerateError};
use crate::model::{Bindings, Definition, PaletteEntry};
use crate::types::escape_keyword;
use directive::{Directive, Line};
use grammar::{ColorDecl, Construct, Grammar};
use rules::{ContextKind, RuleSet, Transition};

/// Options that change what the parser recognizes or exports.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Macro that starts every exported function declaration.
    pub api_macro: String,
    /// Also list color constants in the export table.
    pub export_palette: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            api_macro: "RLAPI".to_string(),
            export_palette: false,
        }
    }
}

/// Parse an annotated header into a binding model.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Bindings, GenerateError> {
    let grammar = Grammar::new(&options.api_macro)
        .map_err(|kind| GenerateError::new(0, ConstructKind::Function, kind))?;
    let mut driver = Driver {
        grammar,
        rules: RuleSet::new(),
        pending_doc: None,
        enums: Open::default(),
        structs: Open::default(),
        export_palette: options.export_palette,
        out: Bindings::default(),
    };

    for (idx, line) in source.lines().enumerate() {
        driver.process_line(idx + 1, line)?;
    }

    driver.finish()
}

// -- Driver state -------------------------------------------------------------

struct Driver {
    grammar: Grammar,
    rules: RuleSet,
    pending_doc: Option<String>,
    enums: Open<EnumBuilder>,
    structs: Open<StructBuilder>,
    export_palette: bool,
    out: Bindings,
}

impl Driver {
    fn process_line(&mut self, lineno: usize, line: &str) -> Result<(), GenerateError> {
        let classified = directive::classify(line)
            .map_err(|kind| GenerateError::new(lineno, ConstructKind::Directive, kind))?;

        match classified {
            Line::Directive(dir) => {
                self.pending_doc = None;
                self.apply_directive(&dir, lineno)
                    .map_err(|(construct, kind)| GenerateError::new(lineno, construct, kind))
            }
            Line::Doc(text) => {
                self.pending_doc = Some(text.to_string()).filter(|t| !t.is_empty());
                Ok(())
            }
            Line::Code(code) => {
                let mut matched = false;
                for context in self.rules.active_kinds() {
                    if let Some(construct) = self.grammar.match_line(context, code) {
                        matched = true;
                        let construct_kind = construct_kind(context, &construct);
                        self.dispatch(context, construct, lineno)
                            .map_err(|kind| GenerateError::new(lineno, construct_kind, kind))?;
                    }
                }
                if !matched && !is_filler(code) {
                    self.check_body_line(lineno, code)?;
                }
                Ok(())
            }
        }
    }

    /// Inside an open struct or enum every code line must be a member.
    fn check_body_line(&self, lineno: usize, code: &str) -> Result<(), GenerateError> {
        let construct = if self.structs.opened_at().is_some() {
            ConstructKind::Struct
        } else if self.enums.opened_at().is_some() {
            ConstructKind::Enum
        } else {
            return Ok(());
        };
        Err(GenerateError::new(
            lineno,
            construct,
            ErrorKind::UnmatchedMember(code.trim().to_string()),
        ))
    }

    fn apply_directive(
        &mut self,
        dir: &Directive,
        lineno: usize,
    ) -> Result<(), (ConstructKind, ErrorKind)> {
        let transition = self
            .rules
            .apply(dir, lineno)
            .map_err(|kind| (ConstructKind::Directive, kind))?;
        debug!("line {}: @{} -> {:?}", lineno, dir.command.name(), transition);

        if let Transition::Closed(context) = transition {
            match context {
                ContextKind::Macro => self.out.definitions.push(Definition::Separator),
                ContextKind::Struct if self.structs.opened_at().is_some() => {
                    return Err((ConstructKind::Struct, ErrorKind::UnclosedDefinition));
                }
                ContextKind::Enum if self.enums.opened_at().is_some() => {
                    return Err((ConstructKind::Enum, ErrorKind::UnclosedDefinition));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        context: ContextKind,
        construct: Construct,
        lineno: usize,
    ) -> Result<(), ErrorKind> {
        match construct {
            Construct::Constant { name, value } => {
                let name = escape_keyword(&name);
                self.out.export(name.clone());
                self.out.definitions.push(Definition::Constant { name, value });
            }
            Construct::TypedefAlias { name, target } | Construct::DefineAlias { name, target } => {
                let (name, target) = (escape_keyword(&name), escape_keyword(&target));
                self.out.export(name.clone());
                self.out.definitions.push(Definition::TypeAlias { name, target });
            }
            Construct::OpaqueStruct { tag, name } => {
                let (tag, name) = (escape_keyword(&tag), escape_keyword(&name));
                self.out.export(tag.clone());
                self.out
                    .definitions
                    .push(Definition::OpaqueStruct { name: tag.clone() });
                if name != tag {
                    self.out.export(name.clone());
                    self.out
                        .definitions
                        .push(Definition::TypeAlias { name, target: tag });
                }
            }
            Construct::StructOpen { tag } => {
                debug!("line {}: struct {} opened", lineno, tag.as_deref().unwrap_or("<anonymous>"));
                self.structs
                    .begin(lineno, StructBuilder::begin(self.pending_doc.take()))?;
            }
            Construct::StructMember { raw_type, names } => {
                self.structs.get_mut()?.add_field(&names, &raw_type)?;
            }
            Construct::EnumOpen => {
                self.enums
                    .begin(lineno, EnumBuilder::begin(self.pending_doc.take()))?;
            }
            Construct::EnumMember { name, value } => {
                self.enums.get_mut()?.add_member(&name, value.as_deref())?;
            }
            Construct::Close { name } if context == ContextKind::Enum => {
                let def = self.enums.take()?.end(&name)?;
                debug!("line {}: enum {} with {} members", lineno, def.name, def.members.len());
                self.out.export(def.name.clone());
                for member in &def.members {
                    self.out.export(def.alias_name(member));
                }
                self.out.definitions.push(Definition::Enum(def));
            }
            Construct::Close { name } => {
                let def = self.structs.take()?.end(&name)?;
                debug!("line {}: struct {} with {} fields", lineno, def.name, def.fields.len());
                self.out.export(def.name.clone());
                self.out.definitions.push(Definition::Struct(def));
            }
            Construct::NameAlias { name, target } => {
                let (name, target) = (escape_keyword(&name), escape_keyword(&target));
                self.out.export(name.clone());
                self.out
                    .definitions
                    .push(Definition::NameAlias { name, target });
                if self.rules.consume(ContextKind::NameAlias) {
                    debug!("line {}: name alias countdown finished", lineno);
                    self.out.definitions.push(Definition::Separator);
                }
            }
            Construct::Callback(decl) => {
                let def = assemble_callback(&decl)?;
                self.out.export(def.name.clone());
                self.out.definitions.push(Definition::Callback(def));
                if self.rules.consume(ContextKind::Callback) {
                    debug!("line {}: callback countdown finished", lineno);
                }
            }
            Construct::Function(decl) => {
                let binding = FunctionDefinition::from_decl(&decl)?.to_binding()?;
                self.out.export(binding.wrapper_name.clone());
                self.out.functions.push(binding);
            }
            Construct::Color(decl) => {
                let entry = palette_entry(decl)?;
                if self.export_palette {
                    self.out.export(entry.name.clone());
                }
                self.out.palette.push(entry);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Bindings, GenerateError> {
        if let Some(line) = self.structs.opened_at() {
            return Err(GenerateError::new(
                line,
                ConstructKind::Struct,
                ErrorKind::UnclosedDefinition,
            ));
        }
        if let Some(line) = self.enums.opened_at() {
            return Err(GenerateError::new(
                line,
                ConstructKind::Enum,
                ErrorKind::UnclosedDefinition,
            ));
        }
        self.rules
            .finish()
            .map_err(|(line, kind)| GenerateError::new(line, ConstructKind::Directive, kind))?;

        if self.out.exports.is_empty() {
            warn!("header produced no exported symbols");
        }
        Ok(self.out)
    }
}

fn palette_entry(decl: ColorDecl) -> Result<PaletteEntry, ErrorKind> {
    let mut channels = [0u8; 4];
    for (slot, text) in channels.iter_mut().zip(decl.channels.iter()) {
        *slot = text
            .parse::<u8>()
            .map_err(|_| ErrorKind::InvalidColorChannel(text.clone()))?;
    }
    Ok(PaletteEntry {
        name: escape_keyword(&decl.name),
        type_name: decl.type_name,
        channels,
        comment: decl.comment,
    })
}

/// Blank and comment-only lines carry nothing to translate.
fn is_filler(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.starts_with("//")
}

fn construct_kind(context: ContextKind, construct: &Construct) -> ConstructKind {
    match construct {
        Construct::Constant { .. } => ConstructKind::Macro,
        Construct::TypedefAlias { .. }
        | Construct::DefineAlias { .. }
        | Construct::NameAlias { .. } => ConstructKind::Alias,
        Construct::OpaqueStruct { .. }
        | Construct::StructOpen { .. }
        | Construct::StructMember { .. } => ConstructKind::Struct,
        Construct::EnumOpen | Construct::EnumMember { .. } => ConstructKind::Enum,
        Construct::Close { .. } if context == ContextKind::Enum => ConstructKind::Enum,
        Construct::Close { .. } => ConstructKind::Struct,
        Construct::Callback(_) => ConstructKind::Callback,
        Construct::Function(_) => ConstructKind::Function,
        Construct::Color(_) => ConstructKind::Color,
    }
}
