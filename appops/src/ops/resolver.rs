use std::borrow::Cow;
use std::sync::Arc;

use super::codes::{Op, N_OP};
use super::mode::{mode_name, Mode};
use super::table::{OpRow, OpTable};

/// Query layer over an [OpTable]
///
/// Lookups that take an `Op` require it to be in `[0, N_OP)` and panic
/// otherwise, use [ModeResolver::row] when the id came from somewhere
/// untrusted.
#[derive(Clone, Debug)]
pub struct ModeResolver {
    table: Arc<OpTable>,
}

impl Default for ModeResolver {
    fn default() -> Self {
        Self::new(OpTable::builtin())
    }
}

impl ModeResolver {
    pub fn new(table: Arc<OpTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &OpTable {
        &self.table
    }

    pub fn row(&self, op: Op) -> Option<&OpRow> {
        self.table.row(op)
    }

    pub fn switch_for(&self, op: Op) -> Op {
        self.table.get(op).switch
    }

    /// Debug name for an op. `None` is the "no op" value, ids past the table
    /// get a generated name.
    pub fn name_for(&self, op: Option<Op>) -> Cow<'_, str> {
        match op {
            None => Cow::Borrowed("NONE"),
            Some(op) => match self.table.row(op) {
                Some(row) => Cow::Borrowed(row.name.as_str()),
                None => Cow::Owned(format!("Unknown({})", op)),
            },
        }
    }

    pub fn id_for_debug_name(&self, name: &str) -> crate::Result<Op> {
        self.table.id_for_debug_name(name)
    }

    pub fn public_name_for(&self, op: Op) -> Option<&str> {
        self.table.get(op).public_name.as_deref()
    }

    pub fn op_for_public_name(&self, public_name: &str) -> Option<Op> {
        self.table.op_for_public_name(public_name)
    }

    pub fn permission_for(&self, op: Op) -> Option<&str> {
        self.table.get(op).permission.as_deref()
    }

    pub fn restriction_for(&self, op: Op) -> Option<&str> {
        self.table.get(op).restriction.as_deref()
    }

    pub fn op_for_permission(&self, permission: &str) -> Option<Op> {
        self.table.op_for_permission(permission)
    }

    pub fn system_bypass_allowed(&self, op: Op) -> bool {
        self.table.get(op).allow_system_bypass
    }

    pub fn default_mode_for(&self, op: Op) -> Mode {
        self.table.get(op).default_mode
    }

    pub fn reset_allowed(&self, op: Op) -> bool {
        self.table.get(op).allow_reset
    }

    pub fn mode_name(&self, mode: i32) -> String {
        mode_name(mode)
    }

    /// Resolve a user supplied op reference: a numeric id, a debug name, or
    /// a public name
    pub fn parse_op(&self, value: &str) -> crate::Result<Op> {
        if let Ok(op) = value.parse::<Op>() {
            if (op as usize) < N_OP {
                return Ok(op);
            }
            return Err(crate::Error::NotFound(format!("op id {}", op)));
        }
        if let Some(op) = self.op_for_public_name(value) {
            return Ok(op);
        }
        self.id_for_debug_name(value)
    }
}
