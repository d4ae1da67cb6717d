/// Where the admin secret comes from. Injectable so tests and future
/// secret stores don't read process-wide environment state ad hoc.
pub trait CredentialSource: Send + Sync {
    fn admin_password(&self) -> &str;
}

pub struct StaticCredential {
    password: String,
}

impl StaticCredential {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl CredentialSource for StaticCredential {
    fn admin_password(&self) -> &str {
        &self.password
    }
}

/// The admin trust boundary: one shared secret compared per request.
/// No per-user identity, no sessions.
pub struct AdminGate {
    source: Box<dyn CredentialSource>,
}

impl AdminGate {
    pub fn new(source: impl CredentialSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn authorize(&self, supplied: Option<&str>) -> bool {
        supplied.is_some_and(|s| s == self.source.admin_password())
    }
}
