use crate::support::{
    derive_manifest, load_context_or_exit, print_failures, print_json_or_exit,
    read_manifest_or_exit,
};
use serde_json::json;

pub fn run(manifest: String, config: Option<String>, json_output: bool) {
    let ctx = load_context_or_exit(config.as_deref());
    let schemas = read_manifest_or_exit(&manifest);
    let outcome = derive_manifest(&schemas, &ctx);
    let ok = outcome.failures.is_empty();

    if json_output {
        let payload = json!({
            "manifest": manifest,
            "entryCount": outcome.entry_count,
            "derivedCount": outcome.reports.len(),
            "ok": ok,
            "failures": outcome.failures,
        });
        print_json_or_exit(&payload);
    } else {
        println!("opsig check {manifest}");
        println!("  Entries: {}", outcome.entry_count);
        println!("  Derived: {}", outcome.reports.len());
        println!("  Failed: {}", outcome.failures.len());
        print_failures(&outcome.failures);
    }

    if !ok {
        std::process::exit(1);
    }
}
