//! Asset history action names and detail rendering.
//!
//! History rows are append-only. The repositories write them inside the same
//! transaction as the asset mutation they describe.

use serde_json::json;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known action values for `asset_history.action`.
pub mod actions {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const ASSIGNED: &str = "assigned";
    pub const RELEASED: &str = "released";
    pub const MAINTENANCE_REQUESTED: &str = "maintenance_requested";
    pub const MAINTENANCE_RESOLVED: &str = "maintenance_resolved";
}

/// All valid history actions.
pub const VALID_ACTIONS: &[&str] = &[
    actions::CREATED,
    actions::UPDATED,
    actions::ASSIGNED,
    actions::RELEASED,
    actions::MAINTENANCE_REQUESTED,
    actions::MAINTENANCE_RESOLVED,
];

// ---------------------------------------------------------------------------
// Change tracking
// ---------------------------------------------------------------------------

/// Ordered list of field changes for an `updated` history entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<(String, String, String)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `field` if `new` is set and differs from `old`.
    ///
    /// `None` for `new` means the field was not part of the patch.
    pub fn track<T>(&mut self, field: &str, old: Option<&T>, new: Option<&T>)
    where
        T: PartialEq + std::fmt::Display + ?Sized,
    {
        let Some(new) = new else { return };
        if old == Some(new) {
            return;
        }
        self.changes.push((
            field.to_string(),
            old.map_or_else(|| "none".to_string(), ToString::to_string),
            new.to_string(),
        ));
    }

    /// Like [`track`](Self::track) for a column that may be cleared.
    ///
    /// `Some(None)` records a change to `none` when the field currently has a value.
    pub fn track_nullable<T>(&mut self, field: &str, old: Option<&T>, new: Option<Option<&T>>)
    where
        T: PartialEq + std::fmt::Display + ?Sized,
    {
        match new {
            Some(Some(value)) => self.track(field, old, Some(value)),
            Some(None) => {
                if let Some(old) = old {
                    self.changes
                        .push((field.to_string(), old.to_string(), "none".to_string()));
                }
            }
            None => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Names of the changed fields, in the order they were tracked.
    pub fn fields(&self) -> Vec<&str> {
        self.changes.iter().map(|(f, _, _)| f.as_str()).collect()
    }

    /// Render as `Asset updated: a: x → y, b: ...`.
    pub fn details(&self) -> String {
        let parts: Vec<String> = self
            .changes
            .iter()
            .map(|(field, old, new)| format!("{field}: {old} → {new}"))
            .collect();
        format!("Asset updated: {}", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Detail strings
// ---------------------------------------------------------------------------

pub fn created_details(asset_name: &str) -> String {
    format!("Asset created: {asset_name}")
}

pub fn assigned_details(username: &str) -> String {
    format!("Asset assigned to {username}")
}

pub fn released_details() -> String {
    "Asset released and marked as available".to_string()
}

pub fn maintenance_requested_details(ticket_id: DbId, title: &str) -> String {
    format!("Maintenance ticket #{ticket_id} created: {title}")
}

pub fn maintenance_resolved_details(ticket_id: DbId) -> String {
    format!("Maintenance ticket #{ticket_id} resolved")
}

/// `extra_data` for a `maintenance_requested` entry.
pub fn maintenance_requested_extra(
    old_status: &str,
    new_status: &str,
    ticket_id: DbId,
) -> serde_json::Value {
    json!({
        "old_status": old_status,
        "new_status": new_status,
        "ticket_id": ticket_id,
    })
}

/// `extra_data` for a `maintenance_resolved` entry.
pub fn maintenance_resolved_extra(ticket_id: DbId, new_asset_status: &str) -> serde_json::Value {
    json!({
        "ticket_id": ticket_id,
        "new_asset_status": new_asset_status,
    })
}
