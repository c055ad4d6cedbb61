use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Job application tracker API
#[derive(Debug, Parser)]
#[command(name = "job-board", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Copy a local JSON data file into the key-value store
    Migrate {
        /// Data file to read, defaults to DATA_FILE or db.json
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["job-board"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn migrate_takes_optional_file() {
        let cli = Cli::parse_from(["job-board", "migrate", "--file", "server/db.json"]);
        match cli.command {
            Some(Command::Migrate { file }) => {
                assert_eq!(file, Some(PathBuf::from("server/db.json")))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
