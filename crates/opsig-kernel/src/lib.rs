//! # opsig kernel
//!
//! Derives three mutually consistent call surfaces from one normalized
//! operator schema:
//!
//! - the **front** surface users call, where the resource-options quadruple
//!   is grouped into one parameter and a method's receiver is implicit;
//! - the **dispatch** surface, flat and default-free, where every front
//!   overload meets for routing and registration;
//! - the **implementation** surface, flat with defaults, that backends
//!   define.
//!
//! plus the expressions that forward values from one surface to another.
//!
//! ## Architecture
//!
//! ```text
//! FunctionSchema                 ← given: arguments, returns, method flag
//!     │
//!     ├── group_arguments        ← receiver + resource-options bundle
//!     │       │
//!     │   FrontSignatureGroup    ← default overload (+ faithful overload)
//!     │
//!     ├── DispatchSignature      ← flat, no defaults
//!     └── ImplementationSignature← flat, defaults kept
//!             │
//!         translate              ← forwarding expressions between surfaces
//! ```
//!
//! Everything here is a pure function of the schema and a
//! [`RenderContext`]. No I/O, no shared state.

pub mod config;
pub mod derive;
pub mod dispatch;
pub mod error;
pub mod front;
pub mod grouping;
pub mod implementation;
pub mod report;
pub mod schema;
pub mod translate;
pub mod types;

pub use config::DeriveConfig;
pub use derive::{DerivedSignatures, derive, derive_all};
pub use dispatch::{DispatchArgument, DispatchSignature};
pub use error::{ErrorKind, OpsigError};
pub use front::{
    ArgumentSource, FrontArgument, FrontArgumentPack, FrontSignature, FrontSignatureGroup,
    ResourceOptionsPack,
};
pub use grouping::{GroupedArgument, ReceiverArgument, ResourceOptionsBundle, group_arguments};
pub use implementation::{ImplementationArgument, ImplementationSignature};
pub use report::{FailureReport, SignatureReport};
pub use schema::{Argument, FunctionSchema, OperatorName, ResourceRole, Return};
pub use translate::{Binding, Expr, Goal, Surface, translate};
pub use types::{RenderContext, TypeDescriptor, TypeMap};
