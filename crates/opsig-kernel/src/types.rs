//! Type descriptors and their rendering on the target surfaces.
//!
//! Descriptors follow a small grammar:
//!
//! ```text
//! descriptor := base annotation? suffix*
//! annotation := "(" alias "!"? ")"       // "!" marks a mutated alias
//! suffix     := "?" | "[" size? "]"
//! ```
//!
//! so `Value(a!)`, `int[]`, `int[2]`, `Value?[]` and `Value[]?` are all
//! valid. The base name is looked up in a [`TypeMap`]; everything else is
//! structural.

use crate::config::{DeriveConfig, ResourceOptionsConfig};
use crate::error::OpsigError;
use crate::schema::Return;
use std::collections::BTreeMap;

/// Parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Base { name: String, mutable: bool },
    Optional(Box<TypeDescriptor>),
    List {
        elem: Box<TypeDescriptor>,
        size: Option<usize>,
    },
}

impl TypeDescriptor {
    pub fn parse(text: &str) -> Result<Self, OpsigError> {
        let unrenderable = |reason: &str| OpsigError::UnrenderableType {
            ty: text.to_string(),
            reason: reason.to_string(),
        };

        let ident_end = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len());
        if ident_end == 0 {
            return Err(unrenderable("missing base type"));
        }
        let name = &text[..ident_end];
        let mut rest = &text[ident_end..];

        let mut mutable = false;
        if let Some(after) = rest.strip_prefix('(') {
            let Some(close) = after.find(')') else {
                return Err(unrenderable("unterminated alias annotation"));
            };
            mutable = after[..close].ends_with('!');
            rest = &after[close + 1..];
        }

        let mut ty = TypeDescriptor::Base {
            name: name.to_string(),
            mutable,
        };
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('?') {
                if matches!(ty, TypeDescriptor::Optional(_)) {
                    return Err(unrenderable("nested optional"));
                }
                ty = TypeDescriptor::Optional(Box::new(ty));
                rest = after;
            } else if let Some(after) = rest.strip_prefix('[') {
                let Some(close) = after.find(']') else {
                    return Err(unrenderable("unterminated list suffix"));
                };
                let size_text = after[..close].trim();
                let size = if size_text.is_empty() {
                    None
                } else {
                    Some(
                        size_text
                            .parse::<usize>()
                            .map_err(|_| unrenderable("list size is not a number"))?,
                    )
                };
                ty = TypeDescriptor::List {
                    elem: Box::new(ty),
                    size,
                };
                rest = &after[close + 1..];
            } else {
                return Err(unrenderable("unexpected trailing characters"));
            }
        }
        Ok(ty)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional(_))
    }
}

/// Base-type rendering table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap {
    bases: BTreeMap<String, String>,
}

const BUILTIN_BASES: &[(&str, &str)] = &[
    ("int", "Int64"),
    ("float", "Float64"),
    ("bool", "bool"),
    ("str", "StringView"),
    ("Value", "Value"),
    ("Scalar", "Scalar"),
    ("PrecisionKind", "PrecisionKind"),
    ("LayoutKind", "LayoutKind"),
    ("DeviceKind", "DeviceKind"),
    ("MemoryFormat", "MemoryFormat"),
];

impl TypeMap {
    pub fn builtin() -> Self {
        Self {
            bases: BUILTIN_BASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Built-in table with the config's `[types]` entries layered on top.
    pub fn from_config(config: &DeriveConfig) -> Self {
        let mut map = Self::builtin();
        for (base, rendered) in &config.types {
            map.bases.insert(base.clone(), rendered.clone());
        }
        map
    }

    pub fn render(&self, ty: &str) -> Result<String, OpsigError> {
        let descriptor = TypeDescriptor::parse(ty)?;
        self.render_descriptor(&descriptor, ty)
    }

    fn render_descriptor(
        &self,
        descriptor: &TypeDescriptor,
        source: &str,
    ) -> Result<String, OpsigError> {
        match descriptor {
            TypeDescriptor::Base { name, mutable } => {
                let rendered = self
                    .bases
                    .get(name)
                    .ok_or_else(|| OpsigError::UnrenderableType {
                        ty: source.to_string(),
                        reason: format!("no rendering for base type `{name}`"),
                    })?;
                if *mutable {
                    Ok(format!("{rendered}&"))
                } else {
                    Ok(rendered.clone())
                }
            }
            TypeDescriptor::Optional(inner) => Ok(format!(
                "Optional<{}>",
                self.render_descriptor(inner, source)?
            )),
            TypeDescriptor::List { elem, .. } => Ok(format!(
                "ArrayRef<{}>",
                self.render_descriptor(elem, source)?
            )),
        }
    }

    /// Render a return list: nothing is `void`, several values are a tuple.
    pub fn render_returns(&self, returns: &[Return]) -> Result<String, OpsigError> {
        match returns {
            [] => Ok("void".to_string()),
            [single] => self.render(&single.ty),
            many => {
                let rendered = many
                    .iter()
                    .map(|r| self.render(&r.ty))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("Tuple<{}>", rendered.join(", ")))
            }
        }
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Render a declaration default literal as target text.
pub fn render_default(literal: &str) -> String {
    let literal = literal.trim();
    match literal {
        "None" => "nullopt".to_string(),
        "True" => "true".to_string(),
        "False" => "false".to_string(),
        _ => {
            if let Some(inner) = literal.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let items: Vec<String> = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(render_default)
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else if let Some(inner) = literal
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
            {
                format!("\"{inner}\"")
            } else {
                literal.to_string()
            }
        }
    }
}

/// Everything a builder needs to turn schema text into surface text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub types: TypeMap,
    pub resource_options: ResourceOptionsConfig,
    pub receiver_expr: String,
}

impl RenderContext {
    pub fn from_config(config: &DeriveConfig) -> Self {
        Self {
            types: TypeMap::from_config(config),
            resource_options: config.resource_options.clone(),
            receiver_expr: config.receiver.expr.clone(),
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from_config(&DeriveConfig::default())
    }
}
