//! Process exit codes.

use std::io::Write;

/// Exit codes reported by the planner. The numeric values are part of the
/// external interface; wrappers dispatch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// Search stopped without a plan and without proving unsolvability.
    SearchUnsolvedIncomplete = 12,
    SearchOutOfMemory = 22,
    SearchTimeout = 23,
    /// Unexpected failure outside the search itself (e.g. plan-file i/o).
    SearchCriticalError = 32,
    /// Malformed task input or configuration.
    SearchInputError = 33,
    /// A requested feature combination is not supported.
    SearchUnsupported = 34,
}

impl ExitCode {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Report the exit code and terminate.
    ///
    /// The report goes straight to stderr with a single `write`, safe to
    /// call from any termination path, including after partial output.
    pub fn report_and_exit(self) -> ! {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "exit code: {}", self.code());
        let _ = stderr.flush();
        std::process::exit(self.code())
    }
}
