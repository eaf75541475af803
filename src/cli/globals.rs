use crate::auth::DEFAULT_TOKEN_TTL_SECONDS;
use secrecy::SecretString;

/// Settings shared by every action: how session tokens are signed and how long they live.
#[derive(Debug)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    pub fn set_token_ttl(&mut self, seconds: i64) {
        self.token_ttl_seconds = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let mut args = GlobalArgs::new(SecretString::from("s3cr3t".to_string()));
        assert_eq!(args.jwt_secret.expose_secret(), "s3cr3t");
        assert_eq!(args.token_ttl_seconds, 360_000);

        args.set_token_ttl(60);
        assert_eq!(args.token_ttl_seconds, 60);
    }

    #[test]
    fn test_debug_hides_secret() {
        let args = GlobalArgs::new(SecretString::from("s3cr3t".to_string()));
        assert!(!format!("{args:?}").contains("s3cr3t"));
    }
}
