//! Argument grouping.
//!
//! Scans a schema's flat argument list once and produces the grouped view
//! the front surface is built from:
//!
//! - the first argument of a method becomes the [`ReceiverArgument`];
//! - the four resource-options arguments, wherever they sit, collapse into
//!   one [`ResourceOptionsBundle`] placed where the first of them appeared;
//! - everything else passes through as a plain argument.
//!
//! Every schema argument is covered exactly once by the output.

use crate::error::OpsigError;
use crate::schema::{Argument, FunctionSchema, ResourceRole};
use tracing::{debug, trace};

/// The argument recognized as the implicit method receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverArgument<'a> {
    pub argument: &'a Argument,
}

/// The four arguments jointly describing a resource-options policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOptionsBundle<'a> {
    pub precision: &'a Argument,
    pub layout: &'a Argument,
    pub device: &'a Argument,
    pub pinned: &'a Argument,
}

impl<'a> ResourceOptionsBundle<'a> {
    /// The constituents in slot order.
    pub fn all(&self) -> [&'a Argument; 4] {
        [self.precision, self.layout, self.device, self.pinned]
    }

    pub fn get(&self, role: ResourceRole) -> &'a Argument {
        match role {
            ResourceRole::Precision => self.precision,
            ResourceRole::Layout => self.layout,
            ResourceRole::Device => self.device,
            ResourceRole::Pinned => self.pinned,
        }
    }

    /// Whether every constituent carries its own default.
    pub fn all_defaulted(&self) -> bool {
        self.all().iter().all(|arg| arg.default.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupedArgument<'a> {
    Plain(&'a Argument),
    Receiver(ReceiverArgument<'a>),
    ResourceOptions(ResourceOptionsBundle<'a>),
}

impl<'a> GroupedArgument<'a> {
    /// Schema arguments covered by this entry.
    pub fn arguments(&self) -> Vec<&'a Argument> {
        match self {
            GroupedArgument::Plain(arg) => vec![*arg],
            GroupedArgument::Receiver(receiver) => vec![receiver.argument],
            GroupedArgument::ResourceOptions(bundle) => bundle.all().to_vec(),
        }
    }
}

/// Group a schema's arguments.
///
/// Fails when a method has no eligible receiver, when only some of the
/// resource-options roles are present, or when a role is claimed twice.
pub fn group_arguments(schema: &FunctionSchema) -> Result<Vec<GroupedArgument<'_>>, OpsigError> {
    let schema_name = schema.name.to_string();

    if schema.is_method {
        check_receiver(schema)?;
    }
    let receiver_index = schema.is_method.then_some(0);

    let mut slots: [Option<&Argument>; 4] = [None; 4];
    let mut first_slot_index = None;
    for (index, arg) in schema.arguments.iter().enumerate() {
        if Some(index) == receiver_index {
            continue;
        }
        let Some(role) = arg.role else {
            continue;
        };
        let slot = &mut slots[role.slot()];
        if slot.is_some() {
            return Err(OpsigError::DuplicateResourceRole {
                schema: schema_name,
                role,
            });
        }
        *slot = Some(arg);
        first_slot_index.get_or_insert(index);
    }

    let bundle = match slots {
        [None, None, None, None] => None,
        [Some(precision), Some(layout), Some(device), Some(pinned)] => {
            Some(ResourceOptionsBundle {
                precision,
                layout,
                device,
                pinned,
            })
        }
        partial => {
            let (present, missing): (Vec<_>, Vec<_>) = ResourceRole::ALL
                .into_iter()
                .partition(|role| partial[role.slot()].is_some());
            return Err(OpsigError::PartialResourceOptionsGroup {
                schema: schema_name,
                present,
                missing,
            });
        }
    };

    let mut grouped = Vec::with_capacity(schema.arguments.len());
    for (index, arg) in schema.arguments.iter().enumerate() {
        if Some(index) == receiver_index {
            trace!(schema = %schema_name, receiver = %arg.name, "marked receiver");
            grouped.push(GroupedArgument::Receiver(ReceiverArgument { argument: arg }));
            continue;
        }
        match (arg.role, bundle) {
            (Some(_), Some(bundle)) => {
                if Some(index) == first_slot_index {
                    grouped.push(GroupedArgument::ResourceOptions(bundle));
                }
            }
            _ => grouped.push(GroupedArgument::Plain(arg)),
        }
    }

    if bundle.is_some() {
        debug!(schema = %schema_name, position = ?first_slot_index, "grouped resource options");
    }
    Ok(grouped)
}

fn check_receiver(schema: &FunctionSchema) -> Result<(), OpsigError> {
    let violation = |reason: String| OpsigError::SchemaInvariantViolation {
        schema: schema.name.to_string(),
        reason,
    };
    let Some(first) = schema.arguments.first() else {
        return Err(violation("method has no arguments to use as receiver".into()));
    };
    if first.name != "self" {
        return Err(violation(format!(
            "method receiver must be the first argument named `self`, found `{}`",
            first.name
        )));
    }
    if first.is_optional() || first.default.is_some() {
        return Err(violation(
            "method receiver cannot be optional or defaulted".into(),
        ));
    }
    Ok(())
}
