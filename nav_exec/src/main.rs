//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise NavCtrl, which owns the map
//!     - Main loop:
//!         - Telecommand acquisition:
//!             - Feedback from the drive and sensor on the last cycle
//!             - Due commands from the script
//!         - NavCtrl processing, giving the next motion
//!         - Motion execution on the simulated drive
//!         - Archiving
//!     - Save the final map
//!
//! Time is simulated, each cycle advancing it by the configured period. Pass `--realtime` to
//! pace the cycles against the wall clock instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::Tc;
use nav_lib::{
    map::MapEvent,
    nav_ctrl::{InputData, NavCtrl, NavState},
    params::NavExecParams,
    render,
    sim_drive::{MotionExecutor, SimDrive},
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Grid navigation executable.
///
/// Drives a simulated robot toward targets given by a telecommand script or on the command
/// line, mapping the obstacles it finds on the way.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opts {
    /// Telecommand script to execute
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Target X offset from the start point, used when there is no script
    ///
    /// Units: centimetres
    #[structopt(long, allow_hyphen_values = true)]
    target_x: Option<f64>,

    /// Target Y offset from the start point, used when there is no script
    ///
    /// Units: centimetres
    #[structopt(long, allow_hyphen_values = true)]
    target_y: Option<f64>,

    /// Parameter file, relative to the params directory
    #[structopt(short, long, default_value = "nav_exec.toml")]
    params: String,

    /// Pace the cycles against the wall clock
    #[structopt(long)]
    realtime: bool,

    /// Log more, may be repeated
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_level = match opts.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Grid Navigation Executable\n");
    info!("Running on: {:#?}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: NavExecParams =
        util::params::load(&opts.params).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let mut script = match (&opts.script, opts.target_x, opts.target_y) {
        (Some(path), _, _) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script {:?} lasts {:.02} s and contains {} TCs\n",
                si.script_path().unwrap_or_else(|| path.as_path()),
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        }
        (None, Some(_), Some(_)) => None,
        _ => {
            return Err(eyre!(
                "Expected either a script or both --target-x and --target-y"
            ))
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut nav_ctrl = NavCtrl::default();
    nav_ctrl
        .init(params.nav_ctrl.clone(), Some(&session))
        .wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    let map = nav_ctrl
        .map()
        .ok_or_else(|| eyre!("NavCtrl has no map after initialisation"))?;

    let mut drive = SimDrive::new(params.sim.clone(), params.nav_ctrl.map.initial_heading_deg);
    info!("SimDrive init complete");

    info!("Module initialisation complete\n");

    // ---- MAP OBSERVER ----

    let events = map.subscribe().wrap_err("Failed to subscribe to map events")?;
    let observer = thread::spawn(move || {
        for event in events {
            match event {
                MapEvent::Grown { rows, cols } => info!("Map grown to {}x{} cells", rows, cols),
                MapEvent::ObstacleAdded { entity, cell } => {
                    info!("{:?} mapped at {:?}", entity, cell)
                }
                MapEvent::TargetSet { x, y } => info!("New target ({:.2}, {:.2})", x, y),
                MapEvent::TargetCleared { reason } => info!("Target cleared: {:?}", reason),
                MapEvent::Updated => (),
                e => trace!("Map event: {:?}", e),
            }
        }
    });

    // ---- MAIN LOOP ----

    let mut feedback: Vec<Tc> = Vec::new();

    if script.is_none() {
        if let (Some(x), Some(y)) = (opts.target_x, opts.target_y) {
            feedback.push(Tc::Target { x, y, world: true });
        }
    }

    let mut script_ended = script.is_none();
    let mut num_cycles = 0u64;

    info!("Begining main loop\n");

    while num_cycles < params.max_cycles {
        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let time_s = num_cycles as f64 * params.cycle_period_s;

        // ---- TELECOMMAND PROCESSING ----

        // Feedback from the last cycle's motion comes first
        let mut input = InputData {
            tcs: std::mem::take(&mut feedback),
        };

        if let Some(ref mut si) = script {
            match si.get_pending_tcs(time_s) {
                PendingTcs::None => (),
                PendingTcs::Some(tcs) => input.tcs.extend(tcs),
                PendingTcs::EndOfScript => {
                    if !script_ended {
                        info!("End of TC script reached");
                    }
                    script_ended = true;
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let (motion, report) = nav_ctrl
            .proc(&input)
            .wrap_err("Error during NavCtrl processing")?;

        // ---- MOTION EXECUTION ----

        feedback = drive.execute(&motion);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = nav_ctrl.write() {
            warn!("Could not write NavCtrl archives: {}", e);
        }

        num_cycles += 1;

        // Nothing left to do once the script is over and the robot has stopped
        if script_ended && report.state != NavState::Seeking && feedback.is_empty() {
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if opts.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(params.cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - params.cycle_period_s
                ),
            }
        }
    }

    if num_cycles >= params.max_cycles {
        warn!("Cycle limit of {} reached", params.max_cycles);
    }

    // ---- SHUTDOWN ----

    info!(
        "Stopped after {} cycles, robot at ({:.1}, {:.1}) cm",
        num_cycles,
        drive.position_cm().x,
        drive.position_cm().y
    );

    let snapshot = map.snapshot().wrap_err("Could not take the final map snapshot")?;
    let target = map.target().wrap_err("Could not read the final target")?;

    debug!("Final map:\n{}", render::ascii(&snapshot, target));

    if params.render_png {
        let path = session.session_root.join("map.png");
        render::save_png(&snapshot, target, &path).wrap_err("Failed to render the map")?;
        info!("Map image saved to {:?}", path);
    }

    if params.save_snapshot {
        session.save("map_snapshot.json", snapshot);
    }

    // Dropping the last handles on the map ends the observer
    drop(map);
    drop(nav_ctrl);
    observer
        .join()
        .map_err(|_| eyre!("The map observer thread panicked"))?;

    info!(
        "End of execution, took {:.02} s",
        session::get_elapsed_seconds()
    );

    session.exit();

    Ok(())
}
