use super::models::Config;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Timeout must be positive: {field} = {value}")]
    InvalidTimeout { field: String, value: u64 },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_endpoint(config)?;
    validate_timeouts(config)?;
    Ok(())
}

/// Endpoint must be an absolute http(s) URL
fn validate_endpoint(config: &Config) -> Result<(), ValidationError> {
    let endpoint = &config.api.endpoint;
    let invalid = |reason: String| ValidationError::InvalidEndpoint {
        endpoint: endpoint.clone(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(())
}

fn validate_timeouts(config: &Config) -> Result<(), ValidationError> {
    for (field, value) in [
        ("connect_timeout_secs", config.api.connect_timeout_secs),
        ("request_timeout_secs", config.api.request_timeout_secs),
    ] {
        if value == 0 {
            return Err(ValidationError::InvalidTimeout {
                field: field.to_string(),
                value,
            });
        }
    }

    Ok(())
}
