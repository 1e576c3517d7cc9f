use anyhow::{Context, Result, anyhow};
use axum::http::HeaderValue;
use products_hr::{EMPLOYEE_ADDED_MESSAGE, IntakePolicy};

const DEFAULT_EVENT_BUFFER: usize = 64;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Browser origins allowed by CORS. Never empty once loaded.
    pub cors_allowed_origins: Vec<HeaderValue>,
    pub require_all_fields: bool,
    pub confirmation_message: String,
    pub event_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec![HeaderValue::from_static("http://localhost:5173")],
            require_all_fields: false,
            confirmation_message: EMPLOYEE_ADDED_MESSAGE.into(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors_allowed_origins,
        };

        let require_all_fields = lookup("HR_REQUIRE_ALL_FIELDS")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.require_all_fields);

        let confirmation_message = lookup("HR_CONFIRMATION_MESSAGE")
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or(defaults.confirmation_message);

        let event_buffer = match lookup("HR_EVENT_BUFFER") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid HR_EVENT_BUFFER `{raw}`"))?,
            None => defaults.event_buffer,
        };
        if event_buffer == 0 {
            return Err(anyhow!("HR_EVENT_BUFFER must be greater than zero"));
        }

        Ok(Self {
            cors_allowed_origins,
            require_all_fields,
            confirmation_message,
            event_buffer,
        })
    }

    pub fn intake_policy(&self) -> IntakePolicy {
        IntakePolicy {
            require_all_fields: self.require_all_fields,
            confirmation_message: self.confirmation_message.clone(),
        }
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin `{}`", origin.escape_debug()))
        })
        .collect::<Result<Vec<_>>>()?;
    if origins.is_empty() {
        return Err(anyhow!("CORS_ALLOWED_ORIGINS must list at least one origin"));
    }
    Ok(origins)
}
