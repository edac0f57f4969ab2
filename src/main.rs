//! minipm - local-first project tasks with dependency-aware scheduling

use std::process::ExitCode;

use minipm::ScheduleError;

fn main() -> ExitCode {
    match minipm::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ScheduleError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
