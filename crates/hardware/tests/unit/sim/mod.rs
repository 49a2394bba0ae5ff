
/// Trace parsing and the trace runner.
pub mod runner;
