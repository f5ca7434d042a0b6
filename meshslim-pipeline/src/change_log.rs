//! Human-readable record of what the pipeline changed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Changes applied to one mesh, node or texture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub name: String,
    pub changes: Vec<String>,
}

impl ChangeLogEntry {
    pub fn new<S: Into<String>>(name: S, changes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            changes,
        }
    }

    pub fn single<S: Into<String>, C: Into<String>>(name: S, change: C) -> Self {
        Self::new(name, vec![change.into()])
    }
}

impl fmt::Display for ChangeLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.changes.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_json_shape() {
        let entry = ChangeLogEntry::new(
            "hull",
            vec!["Merged 12 duplicate vertices".to_string(), "Recomputed normals".to_string()],
        );
        assert_eq!(entry.to_string(), "hull: Merged 12 duplicate vertices; Recomputed normals");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "hull");
        assert_eq!(json["changes"].as_array().unwrap().len(), 2);
    }
}
