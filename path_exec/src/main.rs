//! Headless path executable entry point.
//!
//! Runs the editor's offline operations on saved routines:
//!
//!     - `bake`: import a payload, bake it, and write the trajectory for the robot
//!     - `reexport`: import a payload and export it again
//!     - `info`: summarise a payload
//!
//! Parameters are loaded from `params/path_exec.toml` under the path editor root.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::info;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

// Internal
use comms_if::{export::ExportPayload, tc::ExecCmd};
use path_lib::{bake, export, params::ExecParams, routine::Routine};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Chords per segment used when estimating path length.
const LENGTH_STEPS_PER_SEGMENT: usize = 64;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let cmd = ExecCmd::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("path_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Path Editor Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: ExecParams =
        util::params::load("path_exec.toml").wrap_err("Could not load exec params")?;

    params
        .validate()
        .wrap_err("Exec params are invalid, refusing to run")?;

    info!("Exec parameters loaded");

    // ---- RUN COMMAND ----

    match cmd {
        ExecCmd::Bake { input, output } => run_bake(&session, &params, input, output),
        ExecCmd::Reexport { input, output } => {
            let routine = load_routine(&params, &input)?;

            export::export_routine(&routine, &params.field)
                .save(&output)
                .wrap_err_with(|| format!("Failed to write payload to {:?}", output))?;

            info!("Re-exported {:?} to {:?}", input, output);
            Ok(())
        }
        ExecCmd::Info { input } => {
            let routine = load_routine(&params, &input)?;
            let path = routine.path();

            info!("Routine {:?}:", input);
            info!("    Poses: {}", path.len());
            info!(
                "    Halting poses: {}",
                path.poses().iter().filter(|p| p.shall_halt()).count()
            );
            info!("    Rotations: {}", routine.rotations().len());
            info!("    Command points: {}", routine.command_points().len());
            info!(
                "    Approximate length: {:.2} m",
                params
                    .field
                    .px_to_m(path.approx_length(LENGTH_STEPS_PER_SEGMENT))
            );

            Ok(())
        }
    }
}

/// Load a payload file and rebuild its routine.
fn load_routine(params: &ExecParams, input: &Path) -> Result<Routine, Report> {
    let payload = ExportPayload::load(input).wrap_err("Failed to load the payload")?;

    export::import_routine(&payload, &params.field)
        .wrap_err_with(|| format!("Failed to import routine from {:?}", input))
}

fn run_bake(
    session: &Session,
    params: &ExecParams,
    input: PathBuf,
    output: Option<PathBuf>,
) -> Result<(), Report> {
    let routine = load_routine(params, &input)?;

    let chunks = bake::bake(&routine, params).wrap_err("Failed to bake the routine")?;

    match output {
        Some(output) => {
            export::save_chunks(&chunks, &output)
                .wrap_err_with(|| format!("Failed to write trajectory to {:?}", output))?;

            info!("Trajectory written to {:?}", output);
        }
        None => {
            let archived = session
                .save_json("traj.json", &chunks)
                .wrap_err("Failed to archive the trajectory")?;

            info!("Trajectory archived to {:?}", archived);
        }
    }

    Ok(())
}
