use serde::{Deserialize, Serialize};

use crate::re::optimizer::DEFAULT_SCAN_THRESHOLD;

/// Options that control how patterns are compiled.
///
/// The defaults are what [`crate::Pattern::new`] uses. The structure can be
/// deserialized, which allows loading it from a configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Apply the scan optimizer to compiled patterns. The optimizer never
    /// changes the result of a search, only how fast it runs.
    pub optimize: bool,
    /// Maximum number of characters in a class for the class to be used
    /// as the target of a scan. Larger classes match too often for a scan
    /// to be faster than trying the pattern at every position.
    pub scan_threshold: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config { optimize: true, scan_threshold: DEFAULT_SCAN_THRESHOLD }
    }
}
