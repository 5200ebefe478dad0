use opsig_kernel::{
    DeriveConfig, FailureReport, FunctionSchema, RenderContext, SignatureReport, derive_all,
};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn read_manifest_or_exit(manifest: &str) -> Vec<FunctionSchema> {
    let path = Path::new(manifest);
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        std::process::exit(1);
    });
    let schemas: Vec<FunctionSchema> = serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: failed to parse manifest {}: {e}", path.display());
        std::process::exit(1);
    });
    debug!(path = %path.display(), entries = schemas.len(), "loaded manifest");
    schemas
}

pub fn load_context_or_exit(config: Option<&str>) -> RenderContext {
    let Some(config) = config else {
        return RenderContext::default();
    };
    let text = fs::read_to_string(config).unwrap_or_else(|e| {
        eprintln!("error: failed to read {config}: {e}");
        std::process::exit(1);
    });
    let parsed = DeriveConfig::from_toml_str(&text).unwrap_or_else(|e| {
        eprintln!("error: {config}: {e}");
        std::process::exit(1);
    });
    debug!(path = config, extra_types = parsed.types.len(), "loaded config");
    RenderContext::from_config(&parsed)
}

/// Outcome of deriving a whole manifest, split by entry result.
pub struct ManifestOutcome {
    pub entry_count: usize,
    pub reports: Vec<SignatureReport>,
    pub failures: Vec<FailureReport>,
}

pub fn derive_manifest(schemas: &[FunctionSchema], ctx: &RenderContext) -> ManifestOutcome {
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (schema, result) in schemas.iter().zip(derive_all(schemas, ctx)) {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => failures.push(FailureReport::new(schema.name.to_string(), &err)),
        }
    }
    ManifestOutcome {
        entry_count: schemas.len(),
        reports,
        failures,
    }
}

pub fn print_failures(failures: &[FailureReport]) {
    for failure in failures {
        eprintln!("error: {}: {}", failure.schema, failure.message);
    }
}

pub fn print_json_or_exit<T: Serialize>(payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}
