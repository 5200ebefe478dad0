//! Implementation surface: the flat entry point of a concrete backend.
//!
//! Same parameter list as the dispatch surface, but declaration defaults
//! are kept so the entry point can be called directly.

use crate::dispatch::DispatchSignature;
use crate::error::OpsigError;
use crate::schema::{Argument, FunctionSchema};
use crate::translate::{Binding, Expr, Surface, translate};
use crate::types::{RenderContext, render_default};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationArgument<'a> {
    pub ty: String,
    pub name: String,
    pub default: Option<String>,
    pub argument: &'a Argument,
}

impl ImplementationArgument<'_> {
    pub fn str_with_default(&self) -> String {
        match &self.default {
            Some(default) => format!("{} {}={}", self.ty, self.name, default),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for ImplementationArgument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationSignature<'a> {
    schema: &'a FunctionSchema,
    arguments: Vec<ImplementationArgument<'a>>,
    returns_type: String,
}

impl<'a> ImplementationSignature<'a> {
    pub fn from_schema(
        schema: &'a FunctionSchema,
        ctx: &RenderContext,
    ) -> Result<Self, OpsigError> {
        let arguments = schema
            .arguments
            .iter()
            .map(|arg| {
                Ok(ImplementationArgument {
                    ty: ctx.types.render(&arg.ty)?,
                    name: arg.name.clone(),
                    default: arg.default.as_deref().map(render_default),
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

    pub fn arguments(&self) -> &[ImplementationArgument<'a>] {
        &self.arguments
    }

    /// Declaration with defaults, for headers.
    pub fn decl(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|a| a.str_with_default())
            .collect();
        format!("{} {}({})", self.returns_type, self.name(), args.join(", "))
    }

    /// Definition header without defaults.
    pub fn defn(&self, name: Option<&str>) -> String {
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        let name = name.map_or_else(|| self.name(), str::to_string);
        format!("{} {}({})", self.returns_type, name, args.join(", "))
    }

    /// Expressions forwarding this signature's parameters to `dispatch`.
    pub fn dispatcher_exprs(
        &self,
        dispatch: &DispatchSignature<'_>,
    ) -> Result<Vec<Expr>, OpsigError> {
        let bindings: Vec<Binding<'_>> = self
            .arguments
            .iter()
            .map(|a| Binding::Value {
                name: &a.name,
                ty: &a.ty,
            })
            .collect();
        translate(&bindings, &dispatch.goals(), Surface::Dispatch)
    }
}
