//! Partial `UPDATE` statements over a fixed set of columns.
//!
//! Request structs name every updatable column as an `Option`; only the
//! fields that are `Some` end up in the `SET` list. Column names are
//! `&'static str`, so nothing from the request body reaches the SQL text.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

pub struct Patch<'a> {
    builder: QueryBuilder<'a, Postgres>,
    assigned: usize,
}

impl<'a> Patch<'a> {
    pub fn new(table: &'static str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {table} SET ")),
            assigned: 0,
        }
    }

    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            if self.assigned > 0 {
                self.builder.push(", ");
            }
            self.builder.push(column).push(" = ").push_bind(value);
            self.assigned += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Scope the update to one row owned by `user_id`, bump `updated_at` and
    /// return the row. `None` when no column was set.
    pub fn finish_owned(mut self, id: i64, user_id: i64) -> Option<QueryBuilder<'a, Postgres>> {
        if self.is_empty() {
            return None;
        }
        self.builder
            .push(", updated_at = NOW() WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING *");
        Some(self.builder)
    }

    /// Like [`Patch::finish_owned`] for tables keyed by the user id itself.
    pub fn finish_for_user(mut self, user_id: i64) -> Option<QueryBuilder<'a, Postgres>> {
        if self.is_empty() {
            return None;
        }
        self.builder
            .push(", updated_at = NOW() WHERE id = ")
            .push_bind(user_id)
            .push(" RETURNING *");
        Some(self.builder)
    }
}
