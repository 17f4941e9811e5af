use crate::{auth::AuthUser, error::ApiError, models::Role};

/// Policy
///
/// A declarative per-operation access policy: the static set of roles
/// allowed to invoke the operation. Every protected handler evaluates its
/// policy before the handler body runs, so role branching lives here instead
/// of being scattered through the endpoints.
///
/// Operations with an additional ownership constraint (a faculty member may
/// only read rosters of their own classes, a student only their own record)
/// apply [`require_ownership`] after the role check.
pub struct Policy {
    allow: &'static [Role],
}

impl Policy {
    pub const fn new(allow: &'static [Role]) -> Self {
        Self { allow }
    }

    /// authorize
    ///
    /// Checks the caller's resolved role against the allow-list.
    pub fn authorize(&self, user: &AuthUser) -> Result<(), ApiError> {
        if self.allow.contains(&user.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Not authorized"))
        }
    }
}

// --- Per-operation policies ---

pub const ADMIN_ONLY: Policy = Policy::new(&[Role::Admin]);
pub const FACULTY_ONLY: Policy = Policy::new(&[Role::Faculty]);
pub const COUNSELOR_ONLY: Policy = Policy::new(&[Role::Counselor]);
pub const STUDENT_ONLY: Policy = Policy::new(&[Role::Student]);
/// Staff roles allowed to list student records.
pub const STAFF: Policy = Policy::new(&[Role::Admin, Role::Faculty, Role::Counselor]);
/// Roles allowed to read counseling sessions; writes stay counselor-only.
pub const SESSION_READERS: Policy = Policy::new(&[Role::Admin, Role::Counselor]);

/// require_ownership
///
/// The optional ownership predicate evaluated after a role check. `owned`
/// is the operation-specific condition (e.g. the class's faculty_id equals
/// the caller's username).
pub fn require_ownership(owned: bool) -> Result<(), ApiError> {
    if owned {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not the owner of this resource"))
    }
}
