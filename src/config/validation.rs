use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Provider credentials missing (set SH_CLIENT_ID and SH_CLIENT_SECRET)")]
    MissingCredentials,

    #[error("Invalid {field} '{value}', expected an http:// or https:// URL")]
    InvalidUrl { field: String, value: String },

    #[error("Timeout must be positive: {field} = 0")]
    InvalidTimeout { field: String },

    #[error("Retention settings must be positive: {field} = 0")]
    InvalidRetention { field: String },

    #[error("Artifact url_prefix '{0}' must start with '/' and not end with '/'")]
    InvalidUrlPrefix(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_provider(config)?;
    validate_artifacts(config)?;
    validate_retention(config)?;
    Ok(())
}

fn validate_provider(config: &Config) -> Result<(), ValidationError> {
    let provider = &config.provider;

    if provider.client_id.is_none() || provider.client_secret.is_none() {
        return Err(ValidationError::MissingCredentials);
    }

    for (field, value) in [("base_url", &provider.base_url), ("auth_url", &provider.auth_url)] {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ValidationError::InvalidUrl {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }

    if provider.connect_timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "connect_timeout_secs".to_string(),
        });
    }

    if provider.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "request_timeout_secs".to_string(),
        });
    }

    Ok(())
}

fn validate_artifacts(config: &Config) -> Result<(), ValidationError> {
    let prefix = &config.artifacts.url_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        return Err(ValidationError::InvalidUrlPrefix(prefix.clone()));
    }
    Ok(())
}

fn validate_retention(config: &Config) -> Result<(), ValidationError> {
    if config.retention.artifact_ttl_hours == 0 {
        return Err(ValidationError::InvalidRetention {
            field: "artifact_ttl_hours".to_string(),
        });
    }

    if config.retention.sweep_interval_secs == 0 {
        return Err(ValidationError::InvalidRetention {
            field: "sweep_interval_secs".to_string(),
        });
    }

    Ok(())
}
