//! # Access Guard
//!
//! Maps a caller's Discord id to admin / non-admin.

use std::collections::HashSet;

use crate::domain::types::UserId;

#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    ids: HashSet<UserId>,
}

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.ids.contains(&user)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
