use crate::support::{
    derive_manifest, load_context_or_exit, print_failures, print_json_or_exit,
    read_manifest_or_exit,
};
use opsig_kernel::SignatureReport;
use tracing::info;

pub fn run(manifest: String, config: Option<String>, json_output: bool) {
    let ctx = load_context_or_exit(config.as_deref());
    let schemas = read_manifest_or_exit(&manifest);
    let outcome = derive_manifest(&schemas, &ctx);
    info!(
        derived = outcome.reports.len(),
        failed = outcome.failures.len(),
        "derived manifest"
    );

    if json_output {
        print_json_or_exit(&outcome.reports);
    } else {
        for report in &outcome.reports {
            print_report(report);
        }
    }

    print_failures(&outcome.failures);
    if !outcome.failures.is_empty() {
        std::process::exit(1);
    }
}

fn print_report(report: &SignatureReport) {
    println!("{}", report.schema);
    println!("  Front: {}", report.front.decl);
    if let Some(faithful) = &report.faithful {
        println!("  Faithful: {}", faithful.decl);
    }
    println!("  Dispatch: {}", report.dispatch.defn);
    println!("  Dispatch type: {}", report.dispatch.function_type);
    println!("  Implementation: {}", report.implementation.decl);
    println!("  Digest: {}", report.digest);
}
