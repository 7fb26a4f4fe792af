use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{request::ServiceName, target_graph::TargetGraph},
    value_objects::ProjectKind,
};

/// The registry record for one project.
///
/// Created once by the configuration builder and owned by the registry from
/// then on. Serializes to the workspace `project.json` shape:
///
/// ```json
/// {
///   "name": "billing",
///   "root": "apps/services/billing",
///   "projectType": "application",
///   "sourceRoot": "apps/services/billing",
///   "targets": { "build": { "executor": "@nx-go/nx-go:build", ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub name: ServiceName,
    /// Workspace-relative, always `/`-separated.
    pub root: String,
    #[serde(rename = "projectType")]
    pub kind: ProjectKind,
    pub source_root: String,
    #[serde(default)]
    pub targets: TargetGraph,
}

impl ProjectDescriptor {
    /// Pretty JSON with a trailing newline, stable across runs.
    pub fn to_json_pretty(&self) -> String {
        // Serializing plain strings and ordered maps cannot fail.
        let mut out = serde_json::to_string_pretty(self).unwrap_or_default();
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::target_graph::TargetSpec;

    fn descriptor() -> ProjectDescriptor {
        ProjectDescriptor {
            name: ServiceName::parse("billing").unwrap(),
            root: "apps/services/billing".into(),
            kind: ProjectKind::Application,
            source_root: "apps/services/billing".into(),
            targets: TargetGraph::new().with_target("lint", TargetSpec::new("@nx-go/nx-go:lint")),
        }
    }

    #[test]
    fn serializes_kind_as_project_type() {
        let json: serde_json::Value = serde_json::from_str(&descriptor().to_json_pretty()).unwrap();
        assert_eq!(json["projectType"], "application");
        assert_eq!(json["sourceRoot"], "apps/services/billing");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn json_round_trips() {
        let d = descriptor();
        let back: ProjectDescriptor = serde_json::from_str(&d.to_json_pretty()).unwrap();
        assert_eq!(back, d);
    }
}
