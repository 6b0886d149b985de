use std::env;

/// Browser origins served in production, plus the usual local dev ports.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://jovial-snickerdoodle-7f8d91.netlify.app",
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:4173",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub mongodb_uri: String,
    pub smtp_relay: String,
    pub mail_user: String,
    pub mail_pass: String,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mongodb_uri =
            env::var("MONGODB_URI").map_err(|_| "MONGODB_URI must be set in the environment")?;

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse::<u16>()
            .map_err(|_| "SERVER_PORT must be a number")?;
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let smtp_relay = env::var("SMTP_RELAY").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let mail_user = env::var("MAIL_USER").unwrap_or_default();
        let mail_pass = env::var("MAIL_PASS").unwrap_or_default();

        let allowed_origins =
            merge_allowed_origins(env::var("ALLOWED_ORIGINS").ok().as_deref());

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            mongodb_uri,
            smtp_relay,
            mail_user,
            mail_pass,
            allowed_origins,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn merge_allowed_origins(extra: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|o| o.to_string())
        .collect();

    if let Some(extra) = extra {
        for origin in extra.split(',') {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
    }

    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_always_present() {
        let origins = merge_allowed_origins(None);
        assert!(origins.iter().any(|o| o == "http://localhost:3000"));
        assert!(origins.iter().any(|o| o == "http://localhost:5173"));
    }

    #[test]
    fn test_extra_origins_merged_and_deduped() {
        let origins = merge_allowed_origins(Some(
            "https://app.example.com/, http://localhost:3000",
        ));
        assert!(origins.iter().any(|o| o == "https://app.example.com"));
        assert_eq!(
            origins
                .iter()
                .filter(|o| o.as_str() == "http://localhost:3000")
                .count(),
            1
        );
    }
}
