use warden_core::PrincipalId;

/// Principal context for a request.
///
/// The identity is resolved by the upstream authentication collaborator;
/// this service never verifies credentials itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId) -> Self {
        Self { principal_id }
    }

    pub fn principal_id(&self) -> &PrincipalId {
        &self.principal_id
    }
}
