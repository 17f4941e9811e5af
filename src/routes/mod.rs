/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated
/// modules. Access control is applied explicitly at the module level (and
/// re-checked by each handler's policy), preventing accidental exposure of
/// protected endpoints.

/// Routes accessible to all users (token exchange, health probe).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware; role checks are
/// per-operation policies inside the handlers.
pub mod authenticated;

/// Routes nested under '/admin', restricted to the 'admin' role.
pub mod admin;

/// Routes nested under '/faculty', restricted to the 'faculty' role, with
/// per-class ownership checks.
pub mod faculty;
