//! One-shot derivation of all three surfaces for a schema entry.

use crate::dispatch::DispatchSignature;
use crate::error::OpsigError;
use crate::front::FrontSignatureGroup;
use crate::implementation::ImplementationSignature;
use crate::report::SignatureReport;
use crate::schema::FunctionSchema;
use crate::types::RenderContext;
use rayon::prelude::*;
use tracing::debug;

/// Every signature derived from one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSignatures<'a> {
    pub schema: &'a FunctionSchema,
    pub front: FrontSignatureGroup<'a>,
    pub dispatch: DispatchSignature<'a>,
    pub implementation: ImplementationSignature<'a>,
}

impl DerivedSignatures<'_> {
    pub fn report(&self) -> Result<SignatureReport, OpsigError> {
        SignatureReport::from_derived(self)
    }
}

/// Derive the front group and the dispatch and implementation signatures.
pub fn derive<'a>(
    schema: &'a FunctionSchema,
    ctx: &RenderContext,
) -> Result<DerivedSignatures<'a>, OpsigError> {
    let front = FrontSignatureGroup::from_schema(schema, ctx)?;
    let dispatch = DispatchSignature::from_schema(schema, ctx)?;
    let implementation = ImplementationSignature::from_schema(schema, ctx)?;
    Ok(DerivedSignatures {
        schema,
        front,
        dispatch,
        implementation,
    })
}

/// Derive and report every entry. Entries are independent, so they run in
/// parallel; results come back in input order.
pub fn derive_all(
    schemas: &[FunctionSchema],
    ctx: &RenderContext,
) -> Vec<Result<SignatureReport, OpsigError>> {
    debug!(entries = schemas.len(), "deriving signatures");
    schemas
        .par_iter()
        .map(|schema| derive(schema, ctx).and_then(|derived| derived.report()))
        .collect()
}
