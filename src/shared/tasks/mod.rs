mod lenient;
mod node;
pub mod tree_ops;
pub mod wbs;

pub use lenient::leading_number;
pub use node::{Note, TaskNode, TaskStatus};
pub use wbs::{WbsCode, parent_key};

/// Top-level tasks of one project, in ascending WBS order. This is the
/// unit that is built on import, persisted, and re-aggregated on edit.
pub type Forest = Vec<TaskNode>;

/// Decode a forest from its JSON document form.
pub fn forest_from_json(json: &str) -> crate::shared::error::Result<Forest> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a forest as pretty JSON, the persisted document form.
pub fn forest_to_json(forest: &[TaskNode]) -> crate::shared::error::Result<String> {
    Ok(serde_json::to_string_pretty(forest)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
  {
    "id": "1",
    "wbs": "1",
    "taskName": "Civil works",
    "weightage": 0,
    "progress": 40,
    "status": "In Progress",
    "subtasks": [
      {
        "id": "1.1",
        "wbs": "1.1",
        "taskName": "Piling",
        "plannedStartDate": "2024-01-01",
        "plannedEndDate": "2024-01-10",
        "actualEndDate": null,
        "weightage": 2,
        "progress": 40,
        "status": "In Progress",
        "isCritical": true,
        "notes": [{"text": "rig on site", "timestamp": "2024-01-02T09:00:00", "source": "import"}],
        "subtasks": []
      }
    ]
  }
]"#
    }

    #[test]
    fn test_json_roundtrip() {
        let forest = forest_from_json(sample_json()).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].subtasks[0].notes[0].text.as_deref(), Some("rig on site"));

        let json = forest_to_json(&forest).unwrap();
        let again = forest_from_json(&json).unwrap();
        assert_eq!(forest, again);
    }

    #[test]
    fn test_yaml_dump_readable() {
        let forest = forest_from_json(sample_json()).unwrap();
        let yaml = serde_yaml::to_string(&forest).unwrap();
        assert!(yaml.contains("taskName: Piling"));
        assert!(yaml.contains("isCritical: true"));
    }

    #[test]
    fn test_rejects_non_array_document() {
        assert!(forest_from_json(r#"{"tasks": []}"#).is_err());
    }
}
