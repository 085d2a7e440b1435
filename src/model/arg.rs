use clap::{Parser, Subcommand};

/// Universal Login hand-off tooling
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the development methods-lookup endpoint
    Serve {
        /// Rules file (overrides `methodsFile` from the config)
        #[arg(long)]
        methods_file: Option<String>,
    },

    /// Resolve the sign-in methods offered for an identifier
    Lookup {
        /// Email address or phone number as typed by the user
        identifier: String,
    },
}
