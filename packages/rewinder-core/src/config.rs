//! Interception configuration.

use crate::driver::EntryPoint;

/// Interception configuration.
#[derive(Debug, Clone)]
pub struct RewinderConfig {
    /// Entry points that receive an interception wrapper
    pub entry_points: Vec<EntryPoint>,
    /// Record every insertion of a `;`-separated batch, not only the first statement
    pub split_statements: bool,
}

impl Default for RewinderConfig {
    fn default() -> Self {
        Self {
            entry_points: EntryPoint::ALL.to_vec(),
            split_statements: true,
        }
    }
}

impl RewinderConfig {
    /// Returns whether `entry_point` is intercepted under this configuration.
    pub fn intercepts(&self, entry_point: EntryPoint) -> bool {
        self.entry_points.contains(&entry_point)
    }
}
