//! Session management
//!
//! A session is one run of an executable. It owns a timestamped directory
//! under `<sw root>/<sessions dir>` holding the log file, the CSV archives and
//! anything saved with [`Session::save`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use erased_serde::Serialize;
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,

    save_sender: Sender<SaveMsg>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (GRID_NAV_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the\
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,
}

/// Messages processed by the background save thread, in order.
enum SaveMsg {
    Save(PathBuf, Box<dyn Serialize + Send>),

    /// Stop the thread, acknowledging once everything before it is saved.
    Stop(Sender<()>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}`
    /// inside `<sw root>/<sessions_dir>`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        Self::new_in(root.join(sessions_dir), exec_name)
    }

    /// Start a new session directly inside the given directory.
    pub fn new_in<P: AsRef<Path>>(sessions_path: P, exec_name: &str) -> Result<Self, SessionError> {
        // Set the session epoch
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;

        // Format the session epoch as a timestamp
        let timestamp = match SESSION_EPOCH.get() {
            Some(e) => e.format(TIMESTAMP_FORMAT),
            None => return Err(SessionError::CannotGetEpoch),
        };

        // Create the session directory
        let path = sessions_path
            .as_ref()
            .join(format!("{}_{}", exec_name, timestamp));
        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        // Create the archive dir
        let arch_path = path.join("arch");
        fs::create_dir_all(&arch_path).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = path.join(format!("{}.log", exec_name));

        // Spawn background save thread
        let (tx, rx) = channel();
        let session_root = path.clone();
        thread::spawn(move || save_thread(session_root, rx));

        Ok(Session {
            session_root: path,
            arch_root: arch_path,
            log_file_path,
            save_sender: tx,
        })
    }

    /// Exit the session, waiting for the save thread to finish any pending actions
    pub fn exit(self) {
        info!("Stopping save thread");

        let (ack_tx, ack_rx) = channel();

        match self.save_sender.send(SaveMsg::Stop(ack_tx)) {
            Ok(_) => {
                // An error here means the thread is already gone, nothing to wait for
                ack_rx.recv().ok();
                info!("Save thread exited");
            }
            Err(_) => warn!("Save thread had already exited"),
        }
    }

    /// Saves the given data to the given session-relative path in a background thread.
    ///
    /// Only `.json` paths are supported.
    pub fn save<P: AsRef<Path>, T: Serialize + Send + 'static>(&self, path: P, data: T) {
        if let Err(e) = self
            .save_sender
            .send(SaveMsg::Save(path.as_ref().to_path_buf(), Box::new(data)))
        {
            warn!(
                "Could not send data to be saved to path {:?}: {}",
                path.as_ref(),
                e
            )
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// # Panics
/// - This function will panic if the session epoch has not been
///   initialised, which is performed on creating a new Session instance.
pub fn get_elapsed_seconds() -> f64 {
    match try_get_elapsed_seconds() {
        Some(s) => s,
        None => panic!("Cannot get the session epoch!"),
    }
}

/// Get the number of seconds elapsed since the start of the session, or
/// `None` if no session has been started.
pub fn try_get_elapsed_seconds() -> Option<f64> {
    SESSION_EPOCH
        .get()
        .map(|e| time::duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN))
}

/// Return a reference to the session's epoch.
///
/// # Panics
/// - This function will panic if the session epoch has not been
///   initialised, which is performed on creating a new Session instance.
pub fn get_epoch() -> &'static DateTime<Utc> {
    match SESSION_EPOCH.get() {
        Some(e) => e,
        None => panic!("Cannot get the session epoch!"),
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn save_thread(session_root: PathBuf, receiver: Receiver<SaveMsg>) {
    // Dropping every session clone also ends the loop
    while let Ok(msg) = receiver.recv() {
        match msg {
            SaveMsg::Save(path, data) => save_json(&session_root.join(path), data),
            SaveMsg::Stop(ack) => {
                ack.send(()).ok();
                break;
            }
        }
    }
}

fn save_json(full_path: &Path, data: Box<dyn Serialize + Send>) {
    match full_path.extension().and_then(|s| s.to_str()) {
        Some("json") => (),
        ext => {
            warn!(
                "Unrecognised file path extension for {:?} (got {:?})",
                full_path, ext
            );
            return;
        }
    }

    // Create the parent path if needed
    if let Some(parent) = full_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!(
                "Couldn't create parent directory for {:?}: {}",
                full_path, e
            );
            return;
        }
    }

    let file = match OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(full_path)
    {
        Ok(f) => f,
        Err(e) => {
            warn!("Couldn't create file {:?}: {}", full_path, e);
            return;
        }
    };

    if let Err(e) = serde_json::to_writer_pretty(&file, &data) {
        warn!("Couldn't serialize data for file {:?}: {}", full_path, e);
    }
}
