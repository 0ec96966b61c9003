use lettre::message::Mailbox;
use lettre::Address;
use log::{info, warn};
use std::path::Path;

use crate::config::RelayConfig;

/// Run startup checks. Call this before Rocket launches.
/// Logs the effective configuration and warns about risky settings.
/// Never aborts: every setting has a usable default.
pub fn run(config: &RelayConfig) {
    info!("Mail relay boot check starting...");

    // ── 1. Effective configuration ──────────────────────
    info!(
        "  Upstream: {}:{} (STARTTLS {}, auth {})",
        config.smtp_host,
        config.smtp_port,
        if config.use_tls { "on" } else { "off" },
        if config.smtp_credentials().is_some() { "on" } else { "off" },
    );
    info!(
        "  Defaults: to={} from=\"{}\" <{}>",
        config.default_to, config.sender_name, config.default_from
    );
    info!("  SMTP timeout: {}s", config.smtp_timeout.as_secs());

    // ── 2. Warnings ─────────────────────────────────────
    let warnings = warnings(config, Path::new("Rocket.toml").exists());
    for w in &warnings {
        warn!("  {}", w);
    }

    // ── Summary ─────────────────────────────────────────
    if warnings.is_empty() {
        info!("Boot check passed. All systems go.");
    } else {
        warn!(
            "Boot check passed with {} warning(s). Review the settings above.",
            warnings.len()
        );
    }
}

fn warnings(config: &RelayConfig, rocket_toml_present: bool) -> Vec<String> {
    let mut out = Vec::new();

    if config.api_secret.is_none() {
        out.push("API_SECRET not set: /send accepts unauthenticated requests".to_string());
    }

    match (config.smtp_user.is_some(), config.smtp_pass.is_some()) {
        (true, false) => out.push("SMTP_USER set without SMTP_PASS: SMTP auth skipped".to_string()),
        (false, true) => out.push("SMTP_PASS set without SMTP_USER: SMTP auth skipped".to_string()),
        _ => {}
    }

    if !config.use_tls && config.smtp_credentials().is_some() {
        out.push("SMTP_USE_TLS is off: credentials will be sent in plaintext".to_string());
    }

    if let Err(e) = config.default_to.trim().parse::<Mailbox>() {
        out.push(format!(
            "DEFAULT_TO {:?} is not a valid address ({}): requests without `to` will fail",
            config.default_to, e
        ));
    }

    if let Err(e) = config.default_from.trim().parse::<Address>() {
        out.push(format!(
            "DEFAULT_FROM {:?} is not a valid address ({}): requests without `from_email` will fail",
            config.default_from, e
        ));
    }

    if config.smtp_timeout.is_zero() {
        out.push("SMTP_TIMEOUT_SECS is 0: upstream calls may fail immediately".to_string());
    }

    if !rocket_toml_present {
        out.push("Rocket.toml not found: using Rocket's default listener".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secured_config_has_no_warnings() {
        let config = RelayConfig {
            api_secret: Some("s3cret".into()),
            smtp_user: Some("relay".into()),
            smtp_pass: Some("pw".into()),
            ..RelayConfig::default()
        };
        assert!(warnings(&config, true).is_empty());
    }

    #[test]
    fn missing_secret_is_flagged() {
        let w = warnings(&RelayConfig::default(), true);
        assert_eq!(w.len(), 1);
        assert!(w[0].starts_with("API_SECRET"));
    }

    #[test]
    fn half_credentials_and_plaintext_auth_are_flagged() {
        let config = RelayConfig {
            api_secret: Some("s3cret".into()),
            smtp_user: Some("relay".into()),
            ..RelayConfig::default()
        };
        assert!(warnings(&config, true)[0].contains("SMTP auth skipped"));

        let config = RelayConfig {
            api_secret: Some("s3cret".into()),
            smtp_user: Some("relay".into()),
            smtp_pass: Some("pw".into()),
            use_tls: false,
            ..RelayConfig::default()
        };
        assert!(warnings(&config, true)[0].contains("plaintext"));
    }

    #[test]
    fn invalid_default_addresses_are_flagged() {
        let config = RelayConfig {
            api_secret: Some("s3cret".into()),
            default_to: "not an address".into(),
            default_from: "Name <web@example.com>".into(),
            ..RelayConfig::default()
        };
        let w = warnings(&config, true);
        assert_eq!(w.len(), 2);
        assert!(w[0].starts_with("DEFAULT_TO"));
        assert!(w[1].starts_with("DEFAULT_FROM"));
    }

    #[test]
    fn missing_rocket_toml_is_flagged() {
        let config = RelayConfig {
            api_secret: Some("s3cret".into()),
            ..RelayConfig::default()
        };
        let w = warnings(&config, false);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("Rocket.toml"));
    }
}
