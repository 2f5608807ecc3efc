pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::EXPORT_FILENAME;

#[derive(Parser, Debug)]
#[command(name = "recipe-catalog")]
#[command(about = "Recipe catalog - browse, search and curate recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// Write every recipe to a CSV file
    Export {
        /// Output file
        #[arg(short, long, default_value = EXPORT_FILENAME)]
        output: PathBuf,
    },

    /// Load recipes from a CSV file with the export's columns
    Import {
        /// CSV file to read
        input: PathBuf,
    },
}
