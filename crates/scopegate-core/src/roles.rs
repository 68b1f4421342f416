//! Built-in role tags
//!
//! Role tags travel in `ActorRef::typ` and `ActorContext::role`. Deployments
//! may use their own tags; these are the defaults the configuration falls back to.

/// Operator with access across every tenant
pub const SYSTEM_ADMIN: &str = "system_admin";
/// Administrator of a single tenant
pub const TENANT_ADMIN: &str = "tenant_admin";
/// Regular tenant member
pub const MEMBER: &str = "member";
/// Restricted support staff: sees only rows about themselves
pub const SUPPORT: &str = "support";

pub const DEFAULT_ADMIN_ROLES: &[&str] = &[SYSTEM_ADMIN];
pub const DEFAULT_RESTRICTED_ROLES: &[&str] = &[SUPPORT];

/// Turn a static role list into owned config values
pub fn to_owned_roles(roles: &[&str]) -> Vec<Box<str>> {
	roles.iter().map(|r| Box::from(*r)).collect()
}

/// Check if `role` is one of `roles`
pub fn contains_role<S: AsRef<str>>(roles: &[S], role: &str) -> bool {
	roles.iter().any(|r| r.as_ref() == role)
}


// vim: ts=4
