//! Lists, updates and finishes todos stored in group database replicas.
//!
//! Usage:
//!
//! ```text
//! grouptodo [--config grouptodorc.json] update [--all] [--reindex] [-i INDEX] [field edits]
//! grouptodo [--config grouptodorc.json] finish [-i INDEX] [-e END_DATE]
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use grouptodo::cli::{Cli, RunStatus, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::ReplicaFailures) => ExitCode::FAILURE,
        Err(err) => {
            let mut stderr = io::stderr().lock();
            let _write_result = writeln!(stderr, "error: {err}");
            ExitCode::FAILURE
        }
    }
}
