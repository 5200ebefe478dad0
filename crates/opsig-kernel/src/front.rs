//! Front surface: the user-facing overload set.
//!
//! A [`FrontSignature`] is built from the grouped arguments in one of two
//! modes:
//!
//! - **default**: the resource-options bundle becomes one composite
//!   parameter; declaration defaults are kept.
//! - **faithful**: the bundle is exploded back into four parameters and
//!   every parameter loses its default, so the two overloads can never both
//!   match a fully saturated call.
//!
//! The receiver of a method is carried as a pack but never shows up in the
//! explicit parameter list.

use crate::dispatch::DispatchSignature;
use crate::error::OpsigError;
use crate::grouping::{GroupedArgument, ReceiverArgument, ResourceOptionsBundle, group_arguments};
use crate::schema::{Argument, FunctionSchema};
use crate::translate::{Binding, Expr, Surface, translate};
use crate::types::{RenderContext, render_default};
use std::fmt;
use tracing::debug;

/// Where a front argument came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSource<'a> {
    Argument(&'a Argument),
    Bundle(ResourceOptionsBundle<'a>),
}

/// One explicit parameter on the front surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontArgument<'a> {
    pub ty: String,
    pub name: String,
    pub default: Option<String>,
    pub source: ArgumentSource<'a>,
}

impl<'a> FrontArgument<'a> {
    fn from_argument(arg: &'a Argument, ctx: &RenderContext) -> Result<Self, OpsigError> {
        Ok(Self {
            ty: ctx.types.render(&arg.ty)?,
            name: arg.name.clone(),
            default: arg.default.as_deref().map(render_default),
            source: ArgumentSource::Argument(arg),
        })
    }

    pub fn no_default(&self) -> Self {
        Self {
            default: None,
            ..self.clone()
        }
    }

    pub fn str_no_default(&self) -> String {
        format!("{} {}", self.ty, self.name)
    }
}

impl fmt::Display for FrontArgument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{} {}={}", self.ty, self.name, default),
            None => write!(f, "{} {}", self.ty, self.name),
        }
    }
}

/// The resource-options bundle as it appears on the front surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOptionsPack<'a> {
    /// One parameter of the composite type.
    Composite {
        bundle: ResourceOptionsBundle<'a>,
        argument: FrontArgument<'a>,
    },
    /// Four parameters, in slot order.
    Exploded {
        bundle: ResourceOptionsBundle<'a>,
        arguments: [FrontArgument<'a>; 4],
    },
}

/// A semantically related group of front parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontArgumentPack<'a> {
    Single(FrontArgument<'a>),
    Receiver {
        receiver: ReceiverArgument<'a>,
        ty: String,
        /// How the method body names the receiver.
        expr: String,
    },
    ResourceOptions(ResourceOptionsPack<'a>),
}

impl<'a> FrontArgumentPack<'a> {
    /// This pack with every default stripped.
    pub fn no_default(&self) -> Self {
        match self {
            Self::Single(arg) => Self::Single(arg.no_default()),
            // Receivers are never defaulted.
            Self::Receiver { .. } => self.clone(),
            Self::ResourceOptions(ResourceOptionsPack::Composite { bundle, argument }) => {
                Self::ResourceOptions(ResourceOptionsPack::Composite {
                    bundle: *bundle,
                    argument: argument.no_default(),
                })
            }
            Self::ResourceOptions(ResourceOptionsPack::Exploded { bundle, arguments }) => {
                Self::ResourceOptions(ResourceOptionsPack::Exploded {
                    bundle: *bundle,
                    arguments: arguments.clone().map(|arg| arg.no_default()),
                })
            }
        }
    }

    /// Parameters this pack contributes to a declaration.
    pub fn explicit_arguments(&self) -> &[FrontArgument<'a>] {
        match self {
            Self::Single(arg) => std::slice::from_ref(arg),
            Self::Receiver { .. } => &[],
            Self::ResourceOptions(ResourceOptionsPack::Composite { argument, .. }) => {
                std::slice::from_ref(argument)
            }
            Self::ResourceOptions(ResourceOptionsPack::Exploded { arguments, .. }) => {
                &arguments[..]
            }
        }
    }

    fn bindings(&self) -> Vec<Binding<'_>> {
        match self {
            Self::Single(arg) => vec![Binding::Value {
                name: &arg.name,
                ty: &arg.ty,
            }],
            Self::Receiver { receiver, ty, expr } => vec![Binding::Receiver {
                name: &receiver.argument.name,
                ty,
                expr,
            }],
            Self::ResourceOptions(ResourceOptionsPack::Composite { argument, .. }) => {
                vec![Binding::ResourceOptions {
                    name: &argument.name,
                }]
            }
            Self::ResourceOptions(ResourceOptionsPack::Exploded { arguments, .. }) => arguments
                .iter()
                .map(|arg| Binding::Value {
                    name: &arg.name,
                    ty: &arg.ty,
                })
                .collect(),
        }
    }
}

/// Default-mode pack for one grouped argument.
fn argument_pack<'a>(
    grouped: &GroupedArgument<'a>,
    ctx: &RenderContext,
) -> Result<FrontArgumentPack<'a>, OpsigError> {
    match *grouped {
        GroupedArgument::Plain(arg) => Ok(FrontArgumentPack::Single(
            FrontArgument::from_argument(arg, ctx)?,
        )),
        GroupedArgument::Receiver(receiver) => receiver_pack(receiver, ctx),
        GroupedArgument::ResourceOptions(bundle) => {
            let options = &ctx.resource_options;
            let argument = FrontArgument {
                ty: options.type_name.clone(),
                name: options.name.clone(),
                default: bundle.all_defaulted().then(|| options.default.clone()),
                source: ArgumentSource::Bundle(bundle),
            };
            Ok(FrontArgumentPack::ResourceOptions(
                ResourceOptionsPack::Composite {
                    bundle,
                    argument,
                },
            ))
        }
    }
}

/// Faithful-mode pack for one grouped argument, defaults still attached.
fn argument_pack_faithful<'a>(
    grouped: &GroupedArgument<'a>,
    ctx: &RenderContext,
) -> Result<FrontArgumentPack<'a>, OpsigError> {
    match *grouped {
        GroupedArgument::ResourceOptions(bundle) => {
            let [precision, layout, device, pinned] = bundle.all();
            Ok(FrontArgumentPack::ResourceOptions(
                ResourceOptionsPack::Exploded {
                    bundle,
                    arguments: [
                        FrontArgument::from_argument(precision, ctx)?,
                        FrontArgument::from_argument(layout, ctx)?,
                        FrontArgument::from_argument(device, ctx)?,
                        FrontArgument::from_argument(pinned, ctx)?,
                    ],
                },
            ))
        }
        _ => argument_pack(grouped, ctx),
    }
}

fn receiver_pack<'a>(
    receiver: ReceiverArgument<'a>,
    ctx: &RenderContext,
) -> Result<FrontArgumentPack<'a>, OpsigError> {
    Ok(FrontArgumentPack::Receiver {
        receiver,
        ty: ctx.types.render(&receiver.argument.ty)?,
        expr: ctx.receiver_expr.clone(),
    })
}

/// One overload on the front surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontSignature<'a> {
    schema: &'a FunctionSchema,
    argument_packs: Vec<FrontArgumentPack<'a>>,
    returns_type: String,
    faithful: bool,
}

impl<'a> FrontSignature<'a> {
    fn from_grouped_arguments(
        schema: &'a FunctionSchema,
        grouped: &[GroupedArgument<'a>],
        faithful: bool,
        ctx: &RenderContext,
    ) -> Result<Self, OpsigError> {
        let argument_packs = grouped
            .iter()
            .map(|g| {
                if faithful {
                    argument_pack_faithful(g, ctx).map(|pack| pack.no_default())
                } else {
                    argument_pack(g, ctx)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            schema,
            argument_packs,
            returns_type: ctx.types.render_returns(&schema.returns)?,
            faithful,
        })
    }

    pub fn schema(&self) -> &'a FunctionSchema {
        self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.name.base
    }

    pub fn is_faithful(&self) -> bool {
        self.faithful
    }

    pub fn returns_type(&self) -> &str {
        &self.returns_type
    }

    /// Packed view, preserving which parameters belong together.
    pub fn argument_packs(&self) -> &[FrontArgumentPack<'a>] {
        &self.argument_packs
    }

    /// Flattened explicit parameters; the receiver is not among them.
    pub fn arguments(&self) -> Vec<&FrontArgument<'a>> {
        self.argument_packs
            .iter()
            .flat_map(|pack| pack.explicit_arguments())
            .collect()
    }

    /// Declaration text, defaults included.
    pub fn decl(&self) -> String {
        let args: Vec<String> = self.arguments().iter().map(|a| a.to_string()).collect();
        format!("{} {}({})", self.returns_type, self.name(), args.join(", "))
    }

    /// Definition header without defaults. `name` replaces the operator
    /// name outright; otherwise `prefix` is prepended to it.
    pub fn defn(&self, name: Option<&str>, prefix: &str) -> String {
        let args: Vec<String> = self
            .arguments()
            .iter()
            .map(|a| a.str_no_default())
            .collect();
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{prefix}{}", self.name()),
        };
        format!("{} {}({})", self.returns_type, name, args.join(", "))
    }

    /// Expressions forwarding this overload's parameters to `dispatch`.
    pub fn dispatcher_exprs(&self, dispatch: &DispatchSignature<'_>) -> Result<Vec<Expr>, OpsigError> {
        let bindings: Vec<Binding<'_>> = self
            .argument_packs
            .iter()
            .flat_map(|pack| pack.bindings())
            .collect();
        translate(&bindings, &dispatch.goals(), Surface::Dispatch)
    }
}

/// All front overloads derived from one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontSignatureGroup<'a> {
    pub schema: &'a FunctionSchema,
    pub signature: FrontSignature<'a>,
    /// Present exactly when a resource-options bundle was grouped.
    pub faithful_signature: Option<FrontSignature<'a>>,
}

impl<'a> FrontSignatureGroup<'a> {
    pub fn from_schema(
        schema: &'a FunctionSchema,
        ctx: &RenderContext,
    ) -> Result<Self, OpsigError> {
        let grouped = group_arguments(schema)?;
        let grouped_any = grouped
            .iter()
            .any(|g| matches!(g, GroupedArgument::ResourceOptions(_)));

        let faithful_signature = if grouped_any {
            Some(FrontSignature::from_grouped_arguments(
                schema, &grouped, true, ctx,
            )?)
        } else {
            None
        };
        let signature = FrontSignature::from_grouped_arguments(schema, &grouped, false, ctx)?;

        debug!(
            schema = %schema.name,
            overloads = 1 + usize::from(faithful_signature.is_some()),
            "derived front signatures"
        );
        Ok(Self {
            schema,
            signature,
            faithful_signature,
        })
    }

    /// The default overload followed by the faithful one, if any.
    pub fn signatures(&self) -> impl Iterator<Item = &FrontSignature<'a>> {
        std::iter::once(&self.signature).chain(self.faithful_signature.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Return;

    fn empty_schema(pinned_default: Option<&str>) -> FunctionSchema {
        let mut pinned = Argument::new("pinned", "bool?");
        if let Some(default) = pinned_default {
            pinned = pinned.with_default(default);
        }
        FunctionSchema::new(
            "empty",
            vec![
                Argument::new("size", "int[]"),
                Argument::new("precision", "PrecisionKind?").with_default("None"),
                Argument::new("layout", "LayoutKind?").with_default("None"),
                Argument::new("device", "DeviceKind?").with_default("None"),
                pinned,
                Argument::new("memory_format", "MemoryFormat?").with_default("None"),
            ],
            vec![Return::new("Value")],
        )
    }

    #[test]
    fn composite_default_needs_all_four() {
        let ctx = RenderContext::default();

        let all = empty_schema(Some("None"));
        let group = FrontSignatureGroup::from_schema(&all, &ctx).unwrap();
        assert_eq!(
            group.signature.decl(),
            "Value empty(ArrayRef<Int64> size, ResourceOptions options={}, Optional<MemoryFormat> memory_format=nullopt)"
        );

        let three = empty_schema(None);
        let group = FrontSignatureGroup::from_schema(&three, &ctx).unwrap();
        assert_eq!(
            group.signature.decl(),
            "Value empty(ArrayRef<Int64> size, ResourceOptions options, Optional<MemoryFormat> memory_format=nullopt)"
        );
    }

    #[test]
    fn faithful_strips_every_default() {
        let schema = empty_schema(Some("None"));
        let group = FrontSignatureGroup::from_schema(&schema, &RenderContext::default()).unwrap();
        let faithful = group.faithful_signature.as_ref().unwrap();
        assert!(faithful.is_faithful());
        assert_eq!(faithful.arguments().len(), 6);
        assert!(faithful.arguments().iter().all(|a| a.default.is_none()));
        assert_eq!(group.signatures().count(), 2);
    }

    #[test]
    fn defn_name_and_prefix() {
        let schema = empty_schema(Some("None"));
        let group = FrontSignatureGroup::from_schema(&schema, &RenderContext::default()).unwrap();
        let sig = &group.signature;
        assert_eq!(
            sig.defn(None, "cpu_"),
            "Value cpu_empty(ArrayRef<Int64> size, ResourceOptions options, Optional<MemoryFormat> memory_format)"
        );
        assert!(sig.defn(Some("wrapper"), "cpu_").starts_with("Value wrapper("));
    }

    #[test]
    fn no_default_is_total_over_packs() {
        let schema = empty_schema(Some("None"));
        let group = FrontSignatureGroup::from_schema(&schema, &RenderContext::default()).unwrap();
        for pack in group.signature.argument_packs() {
            let stripped = pack.no_default();
            assert_eq!(
                stripped.explicit_arguments().len(),
                pack.explicit_arguments().len()
            );
            assert!(stripped.explicit_arguments().iter().all(|a| a.default.is_none()));
        }
    }

    #[test]
    fn unrenderable_argument_fails_construction() {
        let schema = FunctionSchema::new(
            "seed",
            vec![Argument::new("generator", "Generator?")],
            vec![],
        );
        let err = FrontSignatureGroup::from_schema(&schema, &RenderContext::default()).unwrap_err();
        assert!(matches!(err, OpsigError::UnrenderableType { .. }));
    }
}
