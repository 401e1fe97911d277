//! Workspace id reconciliation.
//!
//! Hyprland only reports workspaces that currently hold windows, and the
//! report can fail entirely. The id list the shell publishes is therefore
//! recomputed from scratch on every refresh: a fixed baseline keeps the bar
//! usable when nothing is reported, and the active id is always included so
//! the focused workspace can never disappear from view.

/// Workspaces that are always shown, whatever Hyprland reports.
pub const BASELINE_WORKSPACES: [i32; 3] = [1, 2, 3];

/// Normalizes a reported workspace id collection.
///
/// Returns the union of [`BASELINE_WORKSPACES`], `active`, and every
/// strictly positive id in `reported`, deduplicated and sorted ascending.
/// Hyprland uses negative ids for special workspaces (scratchpads); those
/// never show up in the bar.
#[must_use]
pub fn normalize_workspace_ids(reported: &[i32], active: i32) -> Vec<i32> {
    let mut ids: Vec<i32> = BASELINE_WORKSPACES
        .into_iter()
        .chain(std::iter::once(active))
        .chain(reported.iter().copied().filter(|id| *id > 0))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_yields_baseline() {
        assert_eq!(normalize_workspace_ids(&[], 1), vec![1, 2, 3]);
    }

    #[test]
    fn negative_ids_are_dropped_and_active_is_kept() {
        assert_eq!(normalize_workspace_ids(&[5, -1, 2], 7), vec![1, 2, 3, 5, 7]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(normalize_workspace_ids(&[2, 2, 3, 3, 4], 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn result_is_sorted_ascending() {
        let ids = normalize_workspace_ids(&[9, 4, 12], 6);
        assert_eq!(ids, vec![1, 2, 3, 4, 6, 9, 12]);
    }

    #[test]
    fn active_outside_baseline_is_included() {
        assert!(normalize_workspace_ids(&[], 8).contains(&8));
    }
}
