//! Forwarding-expression translation.
//!
//! Given the values in scope on one surface ([`Binding`]s) and the
//! parameters another surface expects ([`Goal`]s), produce one expression
//! per goal. Translation is one-way and per argument, except for the
//! resource-options composite: a single front value feeds four flat goals.

use crate::error::OpsigError;
use crate::schema::ResourceRole;
use crate::types::render_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three call surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Front,
    Dispatch,
    Implementation,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Dispatch => write!(f, "dispatch"),
            Self::Implementation => write!(f, "implementation"),
        }
    }
}

/// A forwarding expression and the type it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(rename = "type")]
    pub ty: String,
    pub expr: String,
}

impl Expr {
    pub fn new(ty: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            expr: expr.into(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// A value in scope on the calling surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    /// An ordinary named parameter.
    Value { name: &'a str, ty: &'a str },
    /// The implicit method receiver, reachable only through `expr`.
    Receiver {
        name: &'a str,
        ty: &'a str,
        expr: &'a str,
    },
    /// A composite resource-options value.
    ResourceOptions { name: &'a str },
}

/// A parameter the callee surface expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal<'a> {
    pub name: &'a str,
    pub ty: &'a str,
    /// Declaration default literal of the underlying schema argument.
    pub default: Option<&'a str>,
    pub role: Option<ResourceRole>,
}

/// Translate `bindings` into one expression per goal, targeting `surface`.
pub fn translate(
    bindings: &[Binding<'_>],
    goals: &[Goal<'_>],
    surface: Surface,
) -> Result<Vec<Expr>, OpsigError> {
    goals
        .iter()
        .map(|goal| {
            translate_goal(bindings, goal).ok_or_else(|| OpsigError::UnboundArgument {
                name: goal.name.to_string(),
                surface,
            })
        })
        .collect()
}

fn translate_goal(bindings: &[Binding<'_>], goal: &Goal<'_>) -> Option<Expr> {
    for binding in bindings {
        match *binding {
            Binding::Value { name, ty } if name == goal.name => {
                if let Some(expr) = adapt_value(name, ty, goal) {
                    return Some(expr);
                }
            }
            Binding::Receiver { name, ty, expr } if name == goal.name && ty == goal.ty => {
                return Some(Expr::new(goal.ty, expr));
            }
            _ => {}
        }
    }

    let role = goal.role?;
    bindings.iter().find_map(|binding| match binding {
        Binding::ResourceOptions { name } => Some(Expr::new(
            goal.ty,
            format!("{name}.{}_opt()", role.field()),
        )),
        _ => None,
    })
}

fn adapt_value(name: &str, ty: &str, goal: &Goal<'_>) -> Option<Expr> {
    if ty == goal.ty {
        return Some(Expr::new(goal.ty, name));
    }
    if optional_of(goal.ty) == Some(ty) {
        return Some(Expr::new(goal.ty, format!("{}({name})", goal.ty)));
    }
    if optional_of(ty) == Some(goal.ty) {
        // Absence can only be resolved by a concrete literal.
        let default = goal.default.filter(|d| d.trim() != "None")?;
        return Some(Expr::new(
            goal.ty,
            format!("{name}.value_or({})", render_default(default)),
        ));
    }
    None
}

fn optional_of(ty: &str) -> Option<&str> {
    ty.strip_prefix("Optional<")?.strip_suffix('>')
}
