//! Resource access predicate
//!
//! A requester may read or write a resource when they own it, or when their
//! role is clinical (physio or admin). Every service operation consults
//! this one check instead of comparing user ids at each call site.

use crate::types::Identity;

/// Whether `requester` may access a resource owned by `owner_id`
pub fn can_access(requester: &Identity, owner_id: &str) -> bool {
    requester.user_id == owner_id || requester.role.is_clinical()
}
