use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::bootstrap::{BootstrapOptions, Mode};

/// Course catalog service
#[derive(Debug, Parser)]
#[command(name = "course", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        long,
        global = true,
        env = "COURSE_CONFIG",
        default_value = "config/course.toml"
    )]
    pub config: PathBuf,

    /// Directory holding the SQL migrations applied before serving
    #[arg(
        long,
        global = true,
        env = "COURSE_MIGRATION_DIR",
        default_value = "migrations"
    )]
    pub migration_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the course service
    Server(ServerArgs),
}

#[derive(Debug, Args)]
pub struct ServerArgs {
    /// Prefix of the environment variables that override the config file
    #[arg(long, global = true, default_value = "COURSE_SERVER")]
    pub env_prefix: String,

    #[command(subcommand)]
    pub command: Option<ServerCommand>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum ServerCommand {
    /// Apply migrations, then serve the HTTP API until SIGINT/SIGTERM
    Start,
    /// Load the reference catalog into the database and exit
    Seed,
}

impl Cli {
    /// Bootstrap options for the chosen command, `None` when `server` was
    /// given without a subcommand.
    pub fn into_options(self) -> Option<BootstrapOptions> {
        let Commands::Server(server) = self.command;
        let mode = match server.command? {
            ServerCommand::Start => Mode::Serve,
            ServerCommand::Seed => Mode::Seed,
        };

        Some(BootstrapOptions {
            config_path: self.config,
            env_prefix: server.env_prefix,
            migration_dir: self.migration_dir,
            mode,
        })
    }

    /// Print the help of the `server` command to stdout
    pub fn print_server_help() -> std::io::Result<()> {
        let mut command = Self::command();
        match command.find_subcommand_mut("server") {
            Some(server) => server.print_help(),
            None => command.print_help(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        temp_env::with_vars_unset(["COURSE_CONFIG", "COURSE_MIGRATION_DIR"], || {
            Cli::try_parse_from(args).unwrap()
        })
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_uses_defaults() {
        let options = parse(&["course", "server", "start"]).into_options().unwrap();

        assert_eq!(options.mode, Mode::Serve);
        assert_eq!(options.config_path, PathBuf::from("config/course.toml"));
        assert_eq!(options.migration_dir, PathBuf::from("migrations"));
        assert_eq!(options.env_prefix, "COURSE_SERVER");
    }

    #[test]
    fn test_seed_with_flags() {
        let options = parse(&[
            "course",
            "--config",
            "/etc/course.toml",
            "server",
            "--env-prefix",
            "STAGING_COURSE",
            "seed",
        ])
        .into_options()
        .unwrap();

        assert_eq!(options.mode, Mode::Seed);
        assert_eq!(options.config_path, PathBuf::from("/etc/course.toml"));
        assert_eq!(options.env_prefix, "STAGING_COURSE");
    }

    #[test]
    fn test_flags_after_subcommand() {
        let options = parse(&[
            "course",
            "server",
            "start",
            "--env-prefix",
            "LOCAL",
            "--migration-dir",
            "db/sql",
        ])
        .into_options()
        .unwrap();

        assert_eq!(options.env_prefix, "LOCAL");
        assert_eq!(options.migration_dir, PathBuf::from("db/sql"));
    }

    #[test]
    fn test_server_without_subcommand_has_no_options() {
        assert!(parse(&["course", "server"]).into_options().is_none());
    }

    #[test]
    fn test_config_path_from_env() {
        temp_env::with_var("COURSE_CONFIG", Some("/run/course.toml"), || {
            let cli = Cli::try_parse_from(["course", "server", "start"]).unwrap();
            assert_eq!(cli.config, PathBuf::from("/run/course.toml"));
        });
    }

    #[test]
    fn test_missing_command_is_rejected() {
        assert!(Cli::try_parse_from(["course"]).is_err());
    }
}
