use anyhow::{ensure, Context};

pub const DEFAULT_SUPABASE_URL: &str = "https://uvslysbkatpszsrzbsui.supabase.co";
pub const DEFAULT_BUCKET: &str = "aiet-attachments";
pub const DEFAULT_SHARED_PASSWORD: &str = "stem2025";
pub const DEFAULT_ADMIN_EMAIL: &str = "ahn@anarchy.io";
// "6 months", counted as 6 * 30 days
pub const DEFAULT_SESSION_DAYS: i64 = 6 * 30;
pub const MAX_SESSION_DAYS: i64 = 10 * 365;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub bucket: String,
    pub shared_password: String,
    pub admin_email: String,
    pub session_days: i64,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            supabase_url: String::from(DEFAULT_SUPABASE_URL),
            // not shipped: without a key every remote call fails and local storage takes over
            supabase_anon_key: String::new(),
            bucket: String::from(DEFAULT_BUCKET),
            shared_password: String::from(DEFAULT_SHARED_PASSWORD),
            admin_email: String::from(DEFAULT_ADMIN_EMAIL),
            session_days: DEFAULT_SESSION_DAYS,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by the AIET_* environment variables that are set
    pub fn from_env() -> anyhow::Result<ClientConfig> {
        ClientConfig::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, but with the variables as they were when building
    ///
    /// Used by the browser build, which has no process environment.
    pub fn from_build_env() -> anyhow::Result<ClientConfig> {
        ClientConfig::from_lookup(|var| {
            match var {
                "AIET_SUPABASE_URL" => option_env!("AIET_SUPABASE_URL"),
                "AIET_SUPABASE_ANON_KEY" => option_env!("AIET_SUPABASE_ANON_KEY"),
                "AIET_BUCKET" => option_env!("AIET_BUCKET"),
                "AIET_SHARED_PASSWORD" => option_env!("AIET_SHARED_PASSWORD"),
                "AIET_ADMIN_EMAIL" => option_env!("AIET_ADMIN_EMAIL"),
                "AIET_SESSION_DAYS" => option_env!("AIET_SESSION_DAYS"),
                _ => None,
            }
            .map(String::from)
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup("AIET_SUPABASE_URL") {
            config.supabase_url = url;
        }
        if let Some(key) = lookup("AIET_SUPABASE_ANON_KEY") {
            config.supabase_anon_key = key;
        }
        if let Some(bucket) = lookup("AIET_BUCKET") {
            config.bucket = bucket;
        }
        if let Some(pass) = lookup("AIET_SHARED_PASSWORD") {
            config.shared_password = pass;
        }
        if let Some(email) = lookup("AIET_ADMIN_EMAIL") {
            config.admin_email = email;
        }
        if let Some(days) = lookup("AIET_SESSION_DAYS") {
            let parsed: i64 = days
                .trim()
                .parse()
                .with_context(|| format!("parsing AIET_SESSION_DAYS value {days:?}"))?;
            ensure!(
                (1..=MAX_SESSION_DAYS).contains(&parsed),
                "AIET_SESSION_DAYS must be between 1 and {MAX_SESSION_DAYS}, got {parsed}"
            );
            config.session_days = parsed;
        }
        Ok(config)
    }

    /// Session lifetime, with `session_days` clamped to 1..=MAX_SESSION_DAYS
    pub fn session_duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_days.clamp(1, MAX_SESSION_DAYS))
    }
}
