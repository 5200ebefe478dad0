//! Dispatch surface: the flat, default-free routing signature.
//!
//! Built straight from the schema without grouping, so every front overload
//! of an operator meets at the same dispatch signature. Callers always
//! supply every argument; nothing here carries a default.

use crate::error::OpsigError;
use crate::schema::{Argument, FunctionSchema};
use crate::translate::{Expr, Goal};
use crate::types::RenderContext;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchArgument<'a> {
    pub ty: String,
    pub name: String,
    pub argument: &'a Argument,
}

impl fmt::Display for DispatchArgument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSignature<'a> {
    schema: &'a FunctionSchema,
    arguments: Vec<DispatchArgument<'a>>,
    returns_type: String,
}

impl<'a> DispatchSignature<'a> {
    pub fn from_schema(
        schema: &'a FunctionSchema,
        ctx: &RenderContext,
    ) -> Result<Self, OpsigError> {
        let arguments = schema
            .arguments
            .iter()
            .map(|arg| {
                Ok(DispatchArgument {
                    ty: ctx.types.render(&arg.ty)?,
                    name: arg.name.clone(),
                    argument: arg,
                })
            })
            .collect::<Result<Vec<_>, OpsigError>>()?;
        Ok(Self {
            schema,
            arguments,
            returns_type: ctx.types.render_returns(&schema.returns)?,
        })
    }

    pub fn schema(&self) -> &'a FunctionSchema {
        self.schema
    }

    pub fn name(&self) -> String {
        self.schema.name.unambiguous()
    }

    pub fn arguments(&self) -> &[DispatchArgument<'a>] {
        &self.arguments
    }

    pub fn returns_type(&self) -> &str {
        &self.returns_type
    }

    pub fn defn(&self, name: Option<&str>) -> String {
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        let name = name.map_or_else(|| self.name(), str::to_string);
        format!("{} {}({})", self.returns_type, name, args.join(", "))
    }

    /// Bare function type, e.g. `Value(Value, Int64)`, for registration.
    pub fn function_type(&self) -> String {
        let types: Vec<&str> = self.arguments.iter().map(|a| a.ty.as_str()).collect();
        format!("{}({})", self.returns_type, types.join(", "))
    }

    /// Expressions a caller holding dispatch-shaped values passes through.
    pub fn exprs(&self) -> Vec<Expr> {
        self.arguments
            .iter()
            .map(|a| Expr::new(a.ty.as_str(), a.name.as_str()))
            .collect()
    }

    /// This signature's parameters as translation targets.
    pub fn goals(&self) -> Vec<Goal<'_>> {
        self.arguments
            .iter()
            .map(|a| Goal {
                name: &a.name,
                ty: &a.ty,
                default: a.argument.default.as_deref(),
                role: a.argument.role,
            })
            .collect()
    }
}
