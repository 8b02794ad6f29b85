use anyhow::Context;
use protocol::Mode;
use std::path::Path;

pub(crate) use protocol::config::RelayConfig;

const MAX_TEMPERATURE: f32 = 5.0;

fn validate_relay_config(config: &RelayConfig) -> anyhow::Result<()> {
    let generation = &config.generation;
    if generation.model().trim().is_empty() {
        anyhow::bail!("generation.model cannot be empty");
    }
    if generation.endpoint().trim().is_empty() {
        anyhow::bail!("generation.endpoint cannot be empty");
    }
    if generation.max_tokens == 0 {
        anyhow::bail!("generation.max_tokens must be greater than zero");
    }
    if !(0.0..=MAX_TEMPERATURE).contains(&generation.temperature) {
        anyhow::bail!(
            "generation.temperature must be between 0 and {}",
            MAX_TEMPERATURE
        );
    }
    if generation.timeout_secs == 0 {
        anyhow::bail!("generation.timeout_secs must be greater than zero");
    }

    let threat_intel = &config.threat_intel;
    if threat_intel.base_url.trim().is_empty() {
        anyhow::bail!("threat_intel.base_url cannot be empty");
    }
    if threat_intel.timeout_secs == 0 {
        anyhow::bail!("threat_intel.timeout_secs must be greater than zero");
    }
    if threat_intel.poll_attempts == 0 {
        anyhow::bail!("threat_intel.poll_attempts must be greater than zero");
    }

    for mode in Mode::ALL {
        if let Some(persona) = config.personas.get(mode) {
            if persona.trim().is_empty() {
                anyhow::bail!("personas.{} cannot be blank", mode);
            }
        }
    }
    Ok(())
}

pub(crate) fn load_relay_config(path: Option<&Path>) -> anyhow::Result<RelayConfig> {
    let Some(path) = path else {
        return Ok(RelayConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: RelayConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_relay_config(&config)?;
    Ok(config)
}

/// Reads a credential once. Blank values count as missing.
pub(crate) fn read_api_key(env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
