//! Function and callback assembly from single declaration lines.

use crate::error::ErrorKind;
use crate::model::{CallbackDefinition, FunctionBinding, WrapperParam};
use crate::parser::grammar::{parse_param, split_params, CallbackDecl, FunctionDecl};
use crate::types::{self, ScriptType, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterDefinition {
    Named { name: String, ty: TypeDescriptor },
    /// `...`
    Variadic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: TypeDescriptor,
    pub params: Vec<ParameterDefinition>,
    pub is_variadic_trailing: bool,
}

impl FunctionDefinition {
    pub fn from_decl(decl: &FunctionDecl) -> Result<Self, ErrorKind> {
        let params = parse_params(&decl.params, true)?;
        let is_variadic_trailing = matches!(params.last(), Some(ParameterDefinition::Variadic));
        Ok(Self {
            name: decl.name.clone(),
            return_type: TypeDescriptor::new(decl.unsigned, &decl.ret, decl.pointer_depth, None),
            params,
            is_variadic_trailing,
        })
    }

    /// Map the declaration to its native signature and wrapper.
    ///
    /// The variadic tail is left out of `argtypes`; ctypes takes those
    /// arguments per call.
    pub fn to_binding(&self) -> Result<FunctionBinding, ErrorKind> {
        let restype = self.return_type.to_ctype()?;
        let mut argtypes = Vec::with_capacity(self.params.len());
        let mut params = Vec::with_capacity(self.params.len());

        for param in &self.params {
            if let ParameterDefinition::Named { name, ty } = param {
                let ctype = ty.to_ctype()?;
                params.push(WrapperParam {
                    name: types::script_ident(name),
                    script_type: ScriptType::from(&ctype),
                });
                argtypes.push(ctype);
            }
        }

        Ok(FunctionBinding {
            native_name: self.name.clone(),
            wrapper_name: types::script_ident(&self.name),
            returns: ScriptType::from(&restype),
            argtypes,
            restype,
            params,
            variadic: self.is_variadic_trailing,
        })
    }
}

/// Build a callback type from `typedef Ret (*Name)(params);`.
pub fn assemble_callback(decl: &CallbackDecl) -> Result<CallbackDefinition, ErrorKind> {
    let ret = types::map(false, &decl.ret, decl.pointer_depth, None)?;
    let params = parse_params(&decl.params, false)?
        .into_iter()
        .filter_map(|p| match p {
            ParameterDefinition::Named { ty, .. } => Some(ty.to_ctype()),
            ParameterDefinition::Variadic => None,
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CallbackDefinition {
        name: types::escape_keyword(&decl.name),
        ret,
        params,
    })
}

fn parse_params(text: &str, allow_variadic: bool) -> Result<Vec<ParameterDefinition>, ErrorKind> {
    let parts = split_params(text);
    let last = parts.len().saturating_sub(1);
    let mut params = Vec::with_capacity(parts.len());

    for (i, part) in parts.iter().enumerate() {
        if *part == "..." {
            if !allow_variadic {
                return Err(ErrorKind::VariadicCallback);
            }
            if i != last {
                return Err(ErrorKind::MisplacedVariadic);
            }
            params.push(ParameterDefinition::Variadic);
            continue;
        }

        let shape =
            parse_param(part).ok_or_else(|| ErrorKind::UnmatchedParameter(part.to_string()))?;
        let ty = TypeDescriptor::new(shape.unsigned, &shape.base, shape.pointer_depth, None);
        if ty.is_void_value() {
            return Err(ErrorKind::VoidValue(shape.name));
        }
        params.push(ParameterDefinition::Named {
            name: shape.name,
            ty,
        });
    }
    Ok(params)
}
