// CLI module for server startup and administrative operations

pub mod migrate;
pub mod roles;

use clap::{Parser, Subcommand};

/// Explorer backend CLI
#[derive(Parser)]
#[command(name = "explorer-backend")]
#[command(about = "Places, reviews and comments REST backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Give the admin role to a user, by email or username
    GrantAdmin {
        identifier: String,
    },

    /// Return an admin to the regular user role
    RevokeAdmin {
        identifier: String,
    },
}
