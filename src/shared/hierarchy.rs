//! Rebuild a task tree from flat spreadsheet rows.
//!
//! Each row carries a WBS code; the tree is implied by the codes alone
//! (`1.2` is a child of `1`). Rows are matched to logical fields through a
//! table of column synonyms because every scheduling tool exports its own
//! headers.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::shared::dates;
use crate::shared::tasks::{Forest, Note, TaskNode, WbsCode, leading_number};

/// One spreadsheet row: column header → raw cell text.
pub type ImportRow = HashMap<String, String>;

/// Accepted column headers per logical field, in priority order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub wbs: Vec<String>,
    pub name: Vec<String>,
    pub duration: Vec<String>,
    pub start: Vec<String>,
    pub finish: Vec<String>,
    pub predecessors: Vec<String>,
    pub weightage: Vec<String>,
    pub notes: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            wbs: names(&["WBS", "Activity ID", "ID"]),
            name: names(&["Name", "Task Name", "Activity Name"]),
            duration: names(&["Duration"]),
            start: names(&["Start", "start", "Start_Date"]),
            finish: names(&["Finish", "finish", "Finish_Date"]),
            predecessors: names(&["Predecessors", "predecessors"]),
            weightage: names(&["Weightage", "Weightage (%)", "weightage"]),
            notes: names(&["Notes"]),
        }
    }
}

/// Cell for the first synonym the row has a column for. A blank cell in
/// that column counts as missing; later synonyms are not consulted.
fn pick<'a>(row: &'a ImportRow, synonyms: &[String]) -> Option<&'a str> {
    let cell = synonyms.iter().find_map(|name| row.get(name))?;
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Weightage cell → finite non-negative number; anything else is 0.
pub fn coerce_weightage(raw: Option<&str>) -> f64 {
    raw.map(|s| s.trim().trim_end_matches('%').trim())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0)
}

/// Builds a [`Forest`] from import rows.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    columns: ColumnMapping,
    date_formats: Vec<String>,
    imported_at: DateTime<Utc>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_formats: Vec::new(),
            imported_at: Utc::now(),
        }
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Extra `chrono` formats tried when normalising planned dates to ISO.
    #[must_use]
    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    /// Timestamp stamped on notes created from the import.
    #[must_use]
    pub fn imported_at(mut self, at: DateTime<Utc>) -> Self {
        self.imported_at = at;
        self
    }

    /// Convert rows into the top-level forest.
    ///
    /// Rows without a parseable WBS are dropped. Every node is indexed
    /// before any attachment, so a child finds its parent regardless of row
    /// order; a repeated WBS replaces the earlier row outright.
    pub fn build(&self, rows: &[ImportRow]) -> Forest {
        let mut by_wbs: BTreeMap<WbsCode, TaskNode> = BTreeMap::new();
        let mut skipped = 0usize;

        for (line, row) in rows.iter().enumerate() {
            let Some((code, node)) = self.node_from_row(row) else {
                skipped += 1;
                debug!(row = line, "skipping row without a usable WBS code");
                continue;
            };
            if by_wbs.insert(code, node).is_some() {
                debug!(row = line, "duplicate WBS code, later row replaces earlier one");
            }
        }

        // Ascending WBS visitation fixes sibling order.
        let mut children: HashMap<WbsCode, Vec<WbsCode>> = HashMap::new();
        let mut roots = Vec::new();
        for code in by_wbs.keys() {
            match code.parent().filter(|p| by_wbs.contains_key(p)) {
                Some(parent) => children.entry(parent).or_default().push(code.clone()),
                None => roots.push(code.clone()),
            }
        }

        let forest: Forest = roots
            .iter()
            .filter_map(|code| assemble(code, &mut by_wbs, &mut children))
            .collect();

        debug!(
            rows = rows.len(),
            skipped,
            roots = forest.len(),
            "built task hierarchy"
        );
        forest
    }

    fn node_from_row(&self, row: &ImportRow) -> Option<(WbsCode, TaskNode)> {
        let code = WbsCode::parse(pick(row, &self.columns.wbs)?)?;
        let mut node = TaskNode::new(code.to_string());

        node.task_name = pick(row, &self.columns.name).map(str::to_string);
        node.planned_start_date = pick(row, &self.columns.start).map(|s| self.date(s));
        node.planned_end_date = pick(row, &self.columns.finish).map(|s| self.date(s));
        node.predecessor_string = pick(row, &self.columns.predecessors).map(str::to_string);
        node.original_duration_days =
            pick(row, &self.columns.duration).map(|s| leading_number(s).unwrap_or(0.0));
        node.weightage = coerce_weightage(pick(row, &self.columns.weightage));

        if let Some(text) = pick(row, &self.columns.notes) {
            node.notes.push(Note {
                text: Some(text.to_string()),
                timestamp: Some(self.imported_at.to_rfc3339()),
                source: Some("import".to_string()),
            });
        }

        Some((code, node))
    }

    fn date(&self, raw: &str) -> String {
        dates::normalize(raw, &self.date_formats).unwrap_or_else(|| raw.to_string())
    }
}

fn assemble(
    code: &WbsCode,
    by_wbs: &mut BTreeMap<WbsCode, TaskNode>,
    children: &mut HashMap<WbsCode, Vec<WbsCode>>,
) -> Option<TaskNode> {
    let mut node = by_wbs.remove(code)?;
    if let Some(kids) = children.remove(code) {
        node.subtasks = kids
            .iter()
            .filter_map(|kid| assemble(kid, by_wbs, children))
            .collect();
    }
    Some(node)
}

/// Build with the default column synonyms and no extra date formats.
pub fn build_hierarchy(rows: &[ImportRow]) -> Forest {
    HierarchyBuilder::default().build(rows)
}
