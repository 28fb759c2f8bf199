//! # Navigation script interpreter module
//!
//! This module provides an interpreter for navigation scripts, allowing
//! telecommands to be replayed from a file. Each command is a line of the
//! form
//!
//! ```text
//! <time_s>: <tc json>;
//! ```
//!
//! Lines which don't match (blank lines, comments) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

#[derive(Debug, PartialEq)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_script(&script)?;
        interp.script_path = Some(path);

        Ok(interp)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        // Empty queue of commands
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = match RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
        {
            Ok(r) => r,
            Err(e) => crate::raise_error!("Script regex is invalid: {}", e),
        };

        for cap in re.captures_iter(script) {
            // Both groups are mandatory in the regex so are always present
            let (time_str, tc_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(c)) => (t.as_str(), c.as_str()),
                _ => continue,
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(tc_str).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        // Commands are executed in time order, stable for equal times
        tc_queue
            .make_contiguous()
            .sort_by(|a, b| a.exec_time_s.total_cmp(&b.exec_time_s));

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: tc_queue,
        })
    }

    /// Return the TCs which are due at `current_time_s`.
    pub fn get_pending_tcs(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Pop items from the queue while the head's exec time has been
        // reached.
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }

            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }

    /// The path the script was loaded from, if any.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
