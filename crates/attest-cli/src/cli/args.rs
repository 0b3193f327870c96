//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "attest",
    version,
    about = "Notarize documents and verify them against a notarization ledger"
)]
pub struct Cli {
    /// Store location: file:///path/to/dir or memory:// (defaults to the
    /// platform data directory)
    #[arg(long, global = true, env = "ATTEST_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Notarize a document and persist its verified record
    Notarize {
        /// File to notarize
        file: PathBuf,
        /// Document author
        #[arg(long)]
        author: String,
        /// Document title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Issuing institution
        #[arg(long)]
        institution: Option<String>,
        /// Page count, for paginated documents
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Check a file against the ledger
    Verify {
        /// File to verify
        file: PathBuf,
    },
    /// List persisted records
    List {
        /// Emit the raw collection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one record in full
    Show {
        /// Record id
        id: String,
    },
    /// Delete a record (the underlying file is left alone)
    Rm {
        /// Record id
        id: String,
    },
    /// Remove every record
    Clear {
        /// Confirm the irreversible wipe
        #[arg(long)]
        yes: bool,
    },
    /// Request additional witnesses for a notarized record
    Witness {
        /// Record id
        id: String,
    },
}
