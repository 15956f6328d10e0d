pub mod listing;
pub mod reconciler;

pub use listing::{
    list_catalog, list_configuration_sets, list_rule_statuses, rule_statuses_query, Catalog, RuleStatusEntry,
    StatusPartition,
};
pub use reconciler::{
    apply_disabled, apply_publishers, apply_rule_ids, apply_tags, change_status, patch_ruleset, reconcile,
    set_configuration_set, ReconcileSummary, WafTarget,
};
