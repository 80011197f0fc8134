//! Tree manipulation operations for a schedule forest.
//!
//! Finding nodes, adding/removing tasks, and flattening the tree for the
//! analytics and audit passes.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::shared::error::{Result, WbsError};

use super::node::TaskNode;
use super::wbs;

// ── Find operations ─────────────────────────────────────────────────

/// Find a node (leaf or parent) by ID (immutable).
pub fn find_node<'a>(nodes: &'a [TaskNode], id: &str) -> Option<&'a TaskNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.subtasks, id) {
            return Some(found);
        }
    }
    None
}

/// Find a node (leaf or parent) by ID (mutable).
pub fn find_node_mut<'a>(nodes: &'a mut [TaskNode], id: &str) -> Option<&'a mut TaskNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.subtasks, id) {
            return Some(found);
        }
    }
    None
}

/// The node whose subtasks directly contain `id`. `None` for top-level
/// or unknown IDs.
pub fn parent_of<'a>(nodes: &'a [TaskNode], id: &str) -> Option<&'a TaskNode> {
    for node in nodes {
        if node.subtasks.iter().any(|c| c.id == id) {
            return Some(node);
        }
        if let Some(found) = parent_of(&node.subtasks, id) {
            return Some(found);
        }
    }
    None
}

// ── Add/Remove operations ───────────────────────────────────────────

/// Add a task node to a parent's subtasks (or root level).
/// Optionally insert at a specific position index.
pub fn add_task(
    root_tasks: &mut Vec<TaskNode>,
    parent_id: Option<&str>,
    node: TaskNode,
    position: Option<usize>,
) -> Result<()> {
    let target = match parent_id {
        Some(pid) => {
            let parent = find_node_mut(root_tasks, pid)
                .ok_or_else(|| WbsError::TaskNotFound(pid.to_string()))?;
            &mut parent.subtasks
        }
        None => root_tasks,
    };
    let pos = position.unwrap_or(target.len()).min(target.len());
    target.insert(pos, node);
    Ok(())
}

/// Place a node where its WBS says it belongs: under the node whose ID is
/// its parent key when that exists, otherwise at the root, in ascending
/// WBS order among its new siblings.
pub fn insert_by_wbs(root_tasks: &mut Vec<TaskNode>, node: TaskNode) -> Result<()> {
    if find_node(root_tasks, &node.id).is_some() {
        return Err(WbsError::DuplicateTask(node.id));
    }

    let parent_id = wbs::parent_key(&node.wbs)
        .filter(|key| find_node(root_tasks, key).is_some())
        .map(str::to_string);

    let siblings = match parent_id.as_deref() {
        Some(pid) => find_node(root_tasks, pid).map_or(&[][..], |p| &p.subtasks[..]),
        None => &root_tasks[..],
    };
    let position = siblings
        .iter()
        .position(|s| wbs::compare(&s.wbs, &node.wbs) == Ordering::Greater);

    add_task(root_tasks, parent_id.as_deref(), node, position)
}

/// Remove a task (and its subtasks) by ID. Returns the removed node.
/// Also cleans up dependency references pointing to the removed tasks.
pub fn remove_task(root_tasks: &mut Vec<TaskNode>, id: &str) -> Option<TaskNode> {
    fn remove_from(nodes: &mut Vec<TaskNode>, id: &str) -> Option<TaskNode> {
        if let Some(pos) = nodes.iter().position(|n| n.id == id) {
            return Some(nodes.remove(pos));
        }
        for node in nodes.iter_mut() {
            if let Some(found) = remove_from(&mut node.subtasks, id) {
                return Some(found);
            }
        }
        None
    }

    let removed = remove_from(root_tasks, id)?;
    let removed_ids = all_ids(std::slice::from_ref(&removed));

    fn clean_deps(nodes: &mut [TaskNode], removed_ids: &HashSet<String>) {
        for node in nodes.iter_mut() {
            node.dependencies.retain(|d| !removed_ids.contains(d));
            clean_deps(&mut node.subtasks, removed_ids);
        }
    }
    clean_deps(root_tasks, &removed_ids);

    Some(removed)
}

// ── Collection operations ───────────────────────────────────────────

/// Collect all task IDs in the tree.
pub fn all_ids(nodes: &[TaskNode]) -> HashSet<String> {
    flatten(nodes).into_iter().map(|n| n.id.clone()).collect()
}

/// Every node in pre-order (parent before its subtasks, siblings in order).
pub fn flatten(nodes: &[TaskNode]) -> Vec<&TaskNode> {
    fn collect<'a>(nodes: &'a [TaskNode], out: &mut Vec<&'a TaskNode>) {
        for node in nodes {
            out.push(node);
            collect(&node.subtasks, out);
        }
    }
    let mut out = Vec::new();
    collect(nodes, &mut out);
    out
}

/// Leaf nodes only, in pre-order.
pub fn leaves(nodes: &[TaskNode]) -> Vec<&TaskNode> {
    flatten(nodes).into_iter().filter(|n| n.is_leaf()).collect()
}

/// Map ID → node. When IDs repeat, the last node in pre-order wins.
pub fn index_by_id(nodes: &[TaskNode]) -> HashMap<&str, &TaskNode> {
    flatten(nodes)
        .into_iter()
        .map(|n| (n.id.as_str(), n))
        .collect()
}
