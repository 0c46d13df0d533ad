//! Access policy for administrative operations. The settlement engine never consults it;
//! handlers check it before calling into services.

use uuid::Uuid;

use crate::error::ServiceError;

/// Operation a caller wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SettleMatch,
}

/// Target of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Match(Uuid),
}

/// Identity presented by an HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Raw value of the `X-Admin-Token` header.
    pub token: String,
}

/// Decides whether a caller may perform an action on a resource.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: &Caller, action: Action, resource: Resource) -> bool;
}

/// Grants every action to callers presenting the configured admin token.
///
/// Without a configured token nobody is authorized.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthorizer {
    admin_token: Option<String>,
}

impl StaticTokenAuthorizer {
    pub fn new(admin_token: Option<String>) -> Self {
        let admin_token = admin_token.filter(|token| !token.trim().is_empty());
        Self { admin_token }
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn authorize(&self, caller: &Caller, _action: Action, _resource: Resource) -> bool {
        matches!(&self.admin_token, Some(expected) if *expected == caller.token)
    }
}

/// Fail with [`ServiceError::Forbidden`] unless `caller` may perform `action`.
pub fn ensure_authorized(
    authorizer: &dyn Authorizer,
    caller: &Caller,
    action: Action,
    resource: Resource,
) -> Result<(), ServiceError> {
    if authorizer.authorize(caller, action, resource) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "caller may not perform {action:?} on {resource:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(token: &str) -> Caller {
        Caller {
            token: token.into(),
        }
    }

    #[test]
    fn matching_token_is_authorized() {
        let authorizer = StaticTokenAuthorizer::new(Some("s3cret".into()));
        let resource = Resource::Match(Uuid::new_v4());
        assert!(authorizer.authorize(&caller("s3cret"), Action::SettleMatch, resource));
        assert!(!authorizer.authorize(&caller("guess"), Action::SettleMatch, resource));
    }

    #[test]
    fn missing_or_blank_configuration_denies_everyone() {
        let resource = Resource::Match(Uuid::new_v4());
        for configured in [None, Some("   ".to_string())] {
            let authorizer = StaticTokenAuthorizer::new(configured);
            let result =
                ensure_authorized(&authorizer, &caller("   "), Action::SettleMatch, resource);
            assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        }
    }
}
