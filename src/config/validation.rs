use crate::config::types::{Config, OutputConfig, Recipe, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_recipe(&config.recipe)?;
    Ok(())
}

/// Validates the source base URL
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.vault_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "vault-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a recipe
///
/// # Rules
///
/// - `max-nodes` must be at least 1
/// - at least one section must be included
/// - `note-title-pattern` must contain `{id}` so every entry gets a distinct title
/// - both folders must be non-empty relative paths without `..` segments
pub fn validate_recipe(recipe: &Recipe) -> Result<(), ConfigError> {
    if recipe.max_nodes < 1 {
        return Err(ConfigError::Validation(format!(
            "max-nodes must be >= 1, got {}",
            recipe.max_nodes
        )));
    }

    if recipe.include_sections.is_empty() {
        return Err(ConfigError::Validation(
            "include-sections must name at least one section".to_string(),
        ));
    }

    if !recipe.note_title_pattern.contains("{id}") {
        return Err(ConfigError::Validation(format!(
            "note-title-pattern must contain {{id}}, got '{}'",
            recipe.note_title_pattern
        )));
    }

    validate_folder("root-folder", &recipe.root_folder)?;
    validate_folder("scripture-root-folder", &recipe.scripture_root_folder)?;

    Ok(())
}

/// Validates a vault-relative folder path
fn validate_folder(name: &str, folder: &str) -> Result<(), ConfigError> {
    let trimmed = folder.trim_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if folder.starts_with('/') || folder.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "{} must be a relative path with '/' separators, got '{}'",
            name, folder
        )));
    }

    if trimmed.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain empty or '..' segments, got '{}'",
            name, folder
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
