//! Normalized operator schema.
//!
//! A [`FunctionSchema`] is what the declaration parser hands over: an
//! operator name, ordered arguments, ordered returns and the method flag.
//! It is built once and never mutated; every signature derived from it
//! borrows it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four roles making up a resource-options bundle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRole {
    Precision,
    Layout,
    Device,
    Pinned,
}

impl ResourceRole {
    /// All roles, in bundle slot order.
    pub const ALL: [ResourceRole; 4] = [
        ResourceRole::Precision,
        ResourceRole::Layout,
        ResourceRole::Device,
        ResourceRole::Pinned,
    ];

    /// Index of this role's slot in a bundle.
    pub fn slot(self) -> usize {
        match self {
            Self::Precision => 0,
            Self::Layout => 1,
            Self::Device => 2,
            Self::Pinned => 3,
        }
    }

    /// Field name used when reading this role back out of a composite value.
    pub fn field(self) -> &'static str {
        match self {
            Self::Precision => "precision",
            Self::Layout => "layout",
            Self::Device => "device",
            Self::Pinned => "pinned",
        }
    }

    /// Recognize a role from the declared type and name.
    ///
    /// Only optional arguments qualify. Kind enums are recognized by type;
    /// the pinned flag is a `bool?` recognized by name.
    pub fn recognize(name: &str, ty: &str) -> Option<Self> {
        let base = ty.strip_suffix('?')?;
        match base {
            "PrecisionKind" => Some(Self::Precision),
            "LayoutKind" => Some(Self::Layout),
            "DeviceKind" => Some(Self::Device),
            "bool" if matches!(name, "pinned" | "pin_memory") => Some(Self::Pinned),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// A single declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ArgumentDecl")]
pub struct Argument {
    pub name: String,

    /// Type descriptor, e.g. `int`, `Value?`, `Value(a!)`, `int[]`.
    #[serde(rename = "type")]
    pub ty: String,

    /// Default literal as written in the declaration, e.g. `None`, `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Resource-options role, if this argument fills one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ResourceRole>,
}

/// Wire shape of an [`Argument`]; a missing role is recognized by convention.
#[derive(Deserialize)]
struct ArgumentDecl {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    role: Option<ResourceRole>,
}

impl From<ArgumentDecl> for Argument {
    fn from(decl: ArgumentDecl) -> Self {
        let role = decl
            .role
            .or_else(|| ResourceRole::recognize(&decl.name, &decl.ty));
        Self {
            name: decl.name,
            ty: decl.ty,
            default: decl.default,
            role,
        }
    }
}

impl Argument {
    /// Create an argument without a default; the role is recognized from
    /// the name and type.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        let role = ResourceRole::recognize(&name, &ty);
        Self {
            name,
            ty,
            default: None,
            role,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Override the recognized role.
    pub fn with_role(mut self, role: ResourceRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_optional(&self) -> bool {
        self.ty.ends_with('?')
    }
}

/// A declared return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub ty: String,
}

impl Return {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            name: None,
            ty: ty.into(),
        }
    }
}

/// Operator name with an optional overload tag: `base[.overload]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OperatorName {
    pub base: String,
    pub overload: Option<String>,
}

impl OperatorName {
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((base, overload)) if !overload.is_empty() => Self {
                base: base.to_string(),
                overload: Some(overload.to_string()),
            },
            Some((base, _)) => Self {
                base: base.to_string(),
                overload: None,
            },
            None => Self {
                base: name.to_string(),
                overload: None,
            },
        }
    }

    /// Name unique across overloads, used by the flat surfaces.
    pub fn unambiguous(&self) -> String {
        match &self.overload {
            Some(overload) => format!("{}_{}", self.base, overload),
            None => self.base.clone(),
        }
    }
}

impl From<String> for OperatorName {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<OperatorName> for String {
    fn from(name: OperatorName) -> Self {
        name.to_string()
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.overload {
            Some(overload) => write!(f, "{}.{}", self.base, overload),
            None => f.write_str(&self.base),
        }
    }
}

/// One operator declaration, as produced by the declaration parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSchema {
    pub name: OperatorName,

    #[serde(default)]
    pub arguments: Vec<Argument>,

    #[serde(default)]
    pub returns: Vec<Return>,

    /// Whether the front surface exposes this operator as a method on its
    /// first argument.
    #[serde(default)]
    pub is_method: bool,
}

impl FunctionSchema {
    pub fn new(name: &str, arguments: Vec<Argument>, returns: Vec<Return>) -> Self {
        Self {
            name: OperatorName::parse(name),
            arguments,
            returns,
            is_method: false,
        }
    }

    /// The same schema, exposed as a method.
    pub fn method(self) -> Self {
        Self {
            is_method: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_recognized_by_type_and_name() {
        assert_eq!(
            ResourceRole::recognize("dtype", "PrecisionKind?"),
            Some(ResourceRole::Precision)
        );
        assert_eq!(
            ResourceRole::recognize("whatever", "LayoutKind?"),
            Some(ResourceRole::Layout)
        );
        assert_eq!(
            ResourceRole::recognize("pin_memory", "bool?"),
            Some(ResourceRole::Pinned)
        );
        assert_eq!(ResourceRole::recognize("pinned", "bool"), None);
        assert_eq!(ResourceRole::recognize("flag", "bool?"), None);
        assert_eq!(ResourceRole::recognize("device", "DeviceKind"), None);
    }

    #[test]
    fn operator_name_overloads() {
        let plain = OperatorName::parse("add");
        assert_eq!(plain.unambiguous(), "add");
        assert_eq!(plain.to_string(), "add");

        let out = OperatorName::parse("add.out");
        assert_eq!(out.base, "add");
        assert_eq!(out.unambiguous(), "add_out");
        assert_eq!(out.to_string(), "add.out");
    }

    #[test]
    fn argument_role_inferred_on_deserialize() {
        let arg: Argument =
            serde_json::from_str(r#"{"name": "layout", "type": "LayoutKind?", "default": "None"}"#)
                .unwrap();
        assert_eq!(arg.role, Some(ResourceRole::Layout));
        assert_eq!(arg.default.as_deref(), Some("None"));

        let explicit: Argument =
            serde_json::from_str(r#"{"name": "pin", "type": "bool?", "role": "pinned"}"#).unwrap();
        assert_eq!(explicit.role, Some(ResourceRole::Pinned));
    }

    #[test]
    fn schema_deserializes_from_manifest_entry() {
        let schema: FunctionSchema = serde_json::from_str(
            r#"{
                "name": "abs.out",
                "isMethod": true,
                "arguments": [{"name": "self", "type": "Value"}],
                "returns": [{"type": "Value"}]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.name.unambiguous(), "abs_out");
        assert!(schema.is_method);
        assert_eq!(schema.arguments.len(), 1);
    }
}
