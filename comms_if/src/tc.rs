//! # Executable commands
//!
//! Subcommands accepted by `path_exec`.

use std::path::PathBuf;
use structopt::StructOpt;

/// Offline operations on saved routines.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "path_exec")]
pub enum ExecCmd {
    /// Bake a saved routine into a trajectory for the robot
    #[structopt(name = "bake")]
    Bake {
        /// Editor payload to bake
        #[structopt(parse(from_os_str))]
        input: PathBuf,

        /// Output file, `.csv` for a CSV table, anything else for JSON. If not given the
        /// trajectory is saved into the session archive.
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// Import a payload and export it again, normalising it
    #[structopt(name = "reexport")]
    Reexport {
        #[structopt(parse(from_os_str))]
        input: PathBuf,

        #[structopt(parse(from_os_str))]
        output: PathBuf,
    },

    /// Print a summary of a saved routine
    #[structopt(name = "info")]
    Info {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
}
