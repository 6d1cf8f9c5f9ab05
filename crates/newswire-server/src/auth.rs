/// Verifies admin credentials before a mutation is allowed through.
/// Handlers gate on this; the service layer assumes callers are authorized.
pub trait AdminAuthenticator: Send + Sync {
    fn verify(&self, credential: Option<&str>) -> bool;
}

/// Compares the presented token against a single configured secret.
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AdminAuthenticator for StaticTokenAuth {
    fn verify(&self, credential: Option<&str>) -> bool {
        credential == Some(self.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_token() {
        let auth = StaticTokenAuth::new("s3cret");
        assert!(auth.verify(Some("s3cret")));
    }

    #[test]
    fn rejects_wrong_or_missing_token() {
        let auth = StaticTokenAuth::new("s3cret");
        assert!(!auth.verify(Some("nope")));
        assert!(!auth.verify(Some("")));
        assert!(!auth.verify(None));
    }
}
