use std::sync::{Arc, Weak};

use crate::metadata::typesystem::{CilType, CilTypeRc};

/// Weak link from a member or nested type back to the type declaring it
///
/// Types own their members and nested types; the links pointing back up never keep a
/// type alive.
#[derive(Clone, Debug)]
pub struct CilTypeRef {
    weak_ref: Weak<CilType>,
}

impl CilTypeRef {
    /// Link to `owner` without taking ownership
    pub fn new(owner: &CilTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(owner),
        }
    }

    /// The linked type, or `None` once it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<CilTypeRc> {
        self.weak_ref.upgrade()
    }
}
