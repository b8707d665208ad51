//! Plain-text rendering of per-instance outcomes.

use seerrsync_core::{InstanceOutcome, RunMode, ServiceChange};

/// Print one instance's outcome to stdout.
pub fn render(outcome: &InstanceOutcome, mode: RunMode) {
    let header = format!("{} ({})", outcome.name, outcome.version);

    if outcome.needs_initialization {
        println!("{header}: first-time setup pending; run `seerrsync apply` to initialize");
        return;
    }

    if outcome.initialized {
        println!("{header}: first-time setup completed");
    }

    if outcome.plan.is_empty() {
        println!("{header}: up to date");
    } else {
        let verb = match mode {
            RunMode::Plan => "change(s) planned",
            RunMode::Apply => "change(s) applied",
        };
        println!("{header}: {} {verb}", outcome.plan.len());

        for change in &outcome.plan.group_changes {
            println!("  ~ {}", change.label());
            for field in change.fields() {
                println!("      {field}");
            }
        }
        for change in &outcome.plan.notification_changes {
            println!("  ~ {}", change.label());
            for field in &change.fields {
                println!("      {field}");
            }
        }
        for change in &outcome.plan.service_changes {
            match change {
                ServiceChange::Create { .. } => println!("  + {}", change.label()),
                ServiceChange::Update { fields, .. } => {
                    println!("  ~ {}", change.label());
                    for field in fields {
                        println!("      {field}");
                    }
                }
            }
        }
    }

    for warning in &outcome.plan.warnings {
        println!("  warning: {warning}");
    }

    if let Some(applied) = &outcome.applied {
        for (kind, name, id) in &applied.created {
            println!("  created {kind}[\"{name}\"] with remote id {id}");
        }
    }

    if let Some(pruned) = &outcome.pruned {
        let verb = match mode {
            RunMode::Plan => "would be deleted",
            RunMode::Apply => "deleted",
        };
        for name in &pruned.deleted {
            println!("  - {name} (unmanaged, {verb})");
        }
        for name in &pruned.skipped {
            println!("  ! {name} is unmanaged; set delete_unmanaged to remove it");
        }
        for (name, err) in &pruned.failed {
            println!("  ! failed to delete {name}: {err}");
        }
    }
}
