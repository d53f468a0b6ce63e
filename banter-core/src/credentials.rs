use crate::error::ConfigError;

const REQUIRED_VARS: [&str; 5] = [
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "REDDIT_USER_AGENT",
    "REDDIT_USERNAME",
    "REDDIT_PASSWORD",
];

/// Script-app credentials for the password grant.
///
/// Values are only ever read from the environment (typically via a .env
/// file) and are never logged; Debug output redacts the secrets.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RedditCredentials {
    /// Read credentials from the environment. Placeholder values left over
    /// from a template .env (anything starting with "your_") count as
    /// missing. All missing variables are reported at once.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut values = Vec::with_capacity(REQUIRED_VARS.len());
        let mut missing = Vec::new();

        for var in REQUIRED_VARS {
            match std::env::var(var) {
                Ok(value) if !value.is_empty() && !value.starts_with("your_") => {
                    values.push(value);
                }
                _ => missing.push(var),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials {
                vars: missing.join(", "),
            });
        }

        let mut values = values.into_iter();
        Ok(Self {
            client_id: values.next().unwrap(),
            client_secret: values.next().unwrap(),
            user_agent: values.next().unwrap(),
            username: values.next().unwrap(),
            password: values.next().unwrap(),
        })
    }
}
