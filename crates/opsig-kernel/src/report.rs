//! Owned, serializable snapshot of everything derived for one schema.
//!
//! Signature objects borrow their schema; reports do not, so they can be
//! handed to the emission pipeline or printed as JSON. The digest lets a
//! caller skip re-emitting entries whose surfaces did not change.

use crate::derive::DerivedSignatures;
use crate::error::{ErrorKind, OpsigError};
use crate::front::FrontSignature;
use crate::translate::Expr;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReport {
    pub schema: String,
    pub front: FrontReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faithful: Option<FrontReport>,
    pub dispatch: DispatchReport,
    pub implementation: ImplementationReport,
    /// `sig1_` followed by the SHA-256 of all rendered text.
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontReport {
    pub decl: String,
    pub defn: String,
    pub dispatcher_exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub name: String,
    pub defn: String,
    pub function_type: String,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationReport {
    pub name: String,
    pub decl: String,
    pub defn: String,
    pub dispatcher_exprs: Vec<Expr>,
}

/// A schema entry that failed to derive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub schema: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FailureReport {
    pub fn new(schema: impl Into<String>, error: &OpsigError) -> Self {
        Self {
            schema: schema.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl SignatureReport {
    pub fn from_derived(derived: &DerivedSignatures<'_>) -> Result<Self, OpsigError> {
        let front_report = |sig: &FrontSignature<'_>| -> Result<FrontReport, OpsigError> {
            Ok(FrontReport {
                decl: sig.decl(),
                defn: sig.defn(None, ""),
                dispatcher_exprs: sig.dispatcher_exprs(&derived.dispatch)?,
            })
        };

        let front = front_report(&derived.front.signature)?;
        let faithful = derived
            .front
            .faithful_signature
            .as_ref()
            .map(front_report)
            .transpose()?;
        let dispatch = DispatchReport {
            name: derived.dispatch.name(),
            defn: derived.dispatch.defn(None),
            function_type: derived.dispatch.function_type(),
            exprs: derived.dispatch.exprs(),
        };
        let implementation = ImplementationReport {
            name: derived.implementation.name(),
            decl: derived.implementation.decl(),
            defn: derived.implementation.defn(None),
            dispatcher_exprs: derived.implementation.dispatcher_exprs(&derived.dispatch)?,
        };

        let schema = derived.schema.name.to_string();
        let mut digest = DigestBuilder::new()
            .field("schema", &schema)
            .field("front.decl", &front.decl);
        if let Some(faithful) = &faithful {
            digest = digest.field("faithful.decl", &faithful.decl);
        }
        let digest = digest
            .field("dispatch.defn", &dispatch.defn)
            .field("dispatch.type", &dispatch.function_type)
            .field("implementation.decl", &implementation.decl)
            .finish();

        Ok(Self {
            schema,
            front,
            faithful,
            dispatch,
            implementation,
            digest,
        })
    }
}

/// Feeds named fields in a fixed order into one SHA-256.
struct DigestBuilder {
    hasher: Sha256,
}

impl DigestBuilder {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn field(mut self, name: &str, value: &str) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self
    }

    fn finish(self) -> String {
        let hash = self.hasher.finalize();
        format!("sig1_{hash:x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_order_sensitive() {
        let a = DigestBuilder::new().field("x", "1").field("y", "2").finish();
        let b = DigestBuilder::new().field("y", "2").field("x", "1").finish();
        assert_ne!(a, b);
        assert!(a.starts_with("sig1_"));
        assert_eq!(a.len(), "sig1_".len() + 64);
    }

    #[test]
    fn failure_report_carries_kind() {
        let err = OpsigError::UnrenderableType {
            ty: "Generator".into(),
            reason: "no rendering for base type `Generator`".into(),
        };
        let report = FailureReport::new("bernoulli", &err);
        assert_eq!(report.kind, ErrorKind::UnrenderableType);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "unrenderable_type");
    }
}
