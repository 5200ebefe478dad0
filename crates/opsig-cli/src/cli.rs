use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "opsig",
    about = "opsig: derive front, dispatch and implementation signatures from operator schemas",
    version
)]
pub struct Cli {
    /// Log derivation decisions to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive every surface for each entry of a schema manifest
    Derive {
        /// Path to a JSON array of operator schemas
        manifest: String,

        /// Path to a TOML derivation config
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every manifest entry derives, without printing signatures
    Check {
        /// Path to a JSON array of operator schemas
        manifest: String,

        /// Path to a TOML derivation config
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
