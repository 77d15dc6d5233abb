//! Command-line interface for the recipe backend.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recipe")]
#[command(about = "Recipe API server and management commands")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for the database, apply migrations and run the HTTP server (default)
    Serve(ServeArgs),
    /// Block until the database accepts connections, then exit
    WaitForDb,
    /// Create a staff superuser account
    CreateSuperuser(CreateSuperuserArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "APP_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "APP_PORT")]
    pub port: u16,
}

#[derive(clap::Args, Debug)]
pub struct CreateSuperuserArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "SUPERUSER_PASSWORD")]
    pub password: String,
}
