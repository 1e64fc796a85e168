//! CLI argument definitions using clap
//!
//! Commands:
//! - aaew-couch views <collection>
//! - aaew-couch count <collection> <view>
//! - aaew-couch dump <collection> <view> [--temp]
//! - aaew-couch public-docs <collection>
//! - aaew-couch collections
//! - aaew-couch projects
//! - aaew-couch users [--no-groups]
//! - aaew-couch template <eclass> [fields...]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Query views and public documents of a BTS lexicon store
#[derive(Parser, Debug)]
#[command(name = "aaew-couch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings; each overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL
    #[arg(long, global = true, env = "COUCHDB_SERVER_URL")]
    pub url: Option<String>,

    /// JSON file with `user` and `pass`
    #[arg(long, global = true)]
    pub auth_file: Option<PathBuf>,

    /// User name (needs --password)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password (needs --user)
    #[arg(long, global = true, env = "COUCHDB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Rows fetched per page
    #[arg(long, global = true)]
    pub window_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the stored views of a collection
    Views {
        collection: String,
    },

    /// Count the rows of a stored view or ad-hoc view source
    Count {
        collection: String,
        /// View name (`design/view`) or map-function source
        view: String,
    },

    /// Stream every row of a view as JSON lines
    Dump {
        collection: String,
        /// View name, or with --temp a file holding map-function source
        view: String,
        /// Run VIEW as an ad-hoc view read from a file
        #[arg(long)]
        temp: bool,
    },

    /// Stream the public documents of a collection
    PublicDocs {
        collection: String,
    },

    /// List public collections of all active projects
    Collections,

    /// List active projects
    Projects,

    /// Stream active users and user groups
    Users {
        /// Leave out user groups
        #[arg(long)]
        no_groups: bool,
    },

    /// Print the ad-hoc view source selecting published documents of an eClass
    Template {
        eclass: String,
        /// Field paths to emit, e.g. `doc.name`, or `doc` for whole documents
        fields: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
