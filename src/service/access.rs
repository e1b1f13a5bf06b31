use crate::{
    models::usermodel::{User, UserRole},
    service::error::ServiceError,
};

pub const CLIENT_ONLY: &[UserRole] = &[UserRole::Client];
pub const FREELANCER_ONLY: &[UserRole] = &[UserRole::Freelancer];
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];
pub const PARTICIPANTS: &[UserRole] = &[UserRole::Client, UserRole::Freelancer];
pub const BROWSERS: &[UserRole] = &[UserRole::Freelancer, UserRole::Admin];

/// The single role guard every workflow entry point goes through.
pub fn require_role(principal: &User, allowed: &[UserRole]) -> Result<(), ServiceError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied(principal.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::user_with_role;

    #[test]
    fn allows_listed_roles_only() {
        let client = user_with_role(UserRole::Client);
        let admin = user_with_role(UserRole::Admin);

        assert!(require_role(&client, PARTICIPANTS).is_ok());
        assert!(require_role(&admin, ADMIN_ONLY).is_ok());
        assert!(matches!(
            require_role(&client, ADMIN_ONLY),
            Err(ServiceError::PermissionDenied(UserRole::Client))
        ));
        assert!(require_role(&admin, PARTICIPANTS).is_err());
    }
}
