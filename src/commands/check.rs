//! Check command - Resolves settings and prints a one-line summary.
//!
//! Advisories reach the operator through the log on stderr; stdout only
//! carries the summary.

use std::io::Write;

use crate::cli::args::CheckArgs;
use crate::config::EnvVars;
use crate::errors::{SettingsError, SettingsResult};

/// Execute the check command
pub fn execute(args: CheckArgs, env: &EnvVars, out: &mut impl Write) -> SettingsResult<()> {
    let resolution = super::resolve(env, args.no_probe)?;
    let settings = &resolution.settings;

    tracing::info!(
        environment = %settings.environment,
        integrations = settings.integrations.len(),
        "Settings resolved"
    );

    writeln!(
        out,
        "settings OK for environment '{}' ({} advisories)",
        settings.environment,
        resolution.advisories.len()
    )
    .map_err(|e| SettingsError::output(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_prints_summary_without_repeating_advisories() {
        let env: EnvVars = [
            ("DATABASE_URL", "postgres://localhost/bullettrain"),
            ("ENVIRONMENT", "qa"),
        ]
        .into_iter()
        .collect();

        let mut out = Vec::new();
        execute(CheckArgs { no_probe: true }, &env, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("settings OK for environment 'qa' ("));
        assert!(!text.contains("warning:"));
        assert!(!text.contains("ENVIRONMENT env variable"));
    }

    #[test]
    fn test_check_fails_without_database_url() {
        let env = EnvVars::default();
        let mut out = Vec::new();

        let err = execute(CheckArgs { no_probe: true }, &env, &mut out).unwrap_err();
        assert_eq!(err, SettingsError::Missing { name: "DATABASE_URL" });
    }
}
