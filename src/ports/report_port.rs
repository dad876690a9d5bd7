//! Dashboard rendering port.

use crate::domain::error::StagwatchError;
use crate::domain::pipeline::Snapshot;

/// Port for rendering a refreshed snapshot.
pub trait ReportPort {
    fn render(&self, snapshot: &Snapshot) -> Result<String, StagwatchError>;

    /// Default implementation: renders and writes the result to `output_path`.
    fn write(&self, snapshot: &Snapshot, output_path: &str) -> Result<(), StagwatchError> {
        let content = self.render(snapshot)?;
        std::fs::write(output_path, content).map_err(|e| StagwatchError::Report {
            reason: format!("failed to write {output_path}: {e}"),
        })
    }
}
