use clap::Parser;
use std::path::PathBuf;

use crate::descriptor::SeedPlan;
use crate::seeder::{LogoutPolicy, SeedOptions};
use crate::target::{ConnectionTarget, HOST_ENV, PORT_ENV};
use crate::types::SeedResult;

/// Name of the password file inside the base directory.
const PASSWORD_FILE_NAME: &str = "codechecker.passwords.json";

#[derive(Debug, Parser)]
#[command(about = "Seed a report server with the products and runs used by the end-to-end tests", long_about = None)]
pub struct SeederCli {
    /// Server host. Takes precedence over the `HOST` environment variable
    #[clap(long)]
    pub host: Option<String>,

    /// Server port. Takes precedence over the `PORT` environment variable
    #[clap(long)]
    pub port: Option<u16>,

    /// Directory holding the `reports` directory and the password file
    #[clap(long, default_value = "__codechecker")]
    pub base_dir: PathBuf,

    /// TOML file listing the products and runs to seed, instead of the built-in fixture
    #[clap(long)]
    pub plan: Option<PathBuf>,

    /// The user to log in as
    #[clap(long, short, default_value = "root")]
    pub username: String,

    /// Print the client commands without running them
    #[clap(long, default_value = "false")]
    pub dry_run: bool,

    /// Leave the session open when seeding fails, instead of logging out
    #[clap(long, default_value = "false")]
    pub no_logout_on_failure: bool,
}

impl SeederCli {
    /// Resolve the server, applying command line overrides on top of the environment.
    pub fn target(&self) -> SeedResult<ConnectionTarget> {
        self.target_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`SeederCli::target`] with the environment read through `env`. A variable is only
    /// consulted when the matching flag was not given.
    pub fn target_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> SeedResult<ConnectionTarget> {
        let port = self.port.map(|port| port.to_string());
        ConnectionTarget::from_lookup(|key| match key {
            HOST_ENV if self.host.is_some() => self.host.clone(),
            PORT_ENV if port.is_some() => port.clone(),
            _ => env(key),
        })
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join("reports")
    }

    pub fn plan(&self, target: &ConnectionTarget) -> SeedResult<SeedPlan> {
        match &self.plan {
            Some(path) => SeedPlan::from_toml_file(path, target, &self.reports_dir()),
            None => Ok(SeedPlan::builtin(target, &self.reports_dir())),
        }
    }

    pub fn options(&self) -> SeedOptions {
        let mut options = SeedOptions::new(self.base_dir.join(PASSWORD_FILE_NAME));
        options.username = self.username.clone();
        if self.no_logout_on_failure {
            options.logout_policy = LogoutPolicy::OnSuccess;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = SeederCli::parse_from(["e2e-seeder"]);

        assert_eq!(PathBuf::from("__codechecker/reports"), cli.reports_dir());
        let options = cli.options();
        assert_eq!("root", options.username);
        assert_eq!(
            PathBuf::from("__codechecker/codechecker.passwords.json"),
            options.password_file
        );
        assert_eq!(LogoutPolicy::Always, options.logout_policy);
        assert!(!cli.dry_run);
    }

    #[test]
    fn explicit_host_and_port() {
        let cli = SeederCli::parse_from([
            "e2e-seeder",
            "--host",
            "example.test",
            "--port",
            "9999",
            "--no-logout-on-failure",
        ]);

        assert_eq!(
            "http://example.test:9999",
            cli.target().unwrap().base_url()
        );
        assert_eq!(LogoutPolicy::OnSuccess, cli.options().logout_policy);
    }

    #[test]
    fn port_flag_ignores_invalid_port_env() {
        let cli = SeederCli::parse_from(["e2e-seeder", "--port", "9999"]);
        let target = cli
            .target_with_env(|key| match key {
                "PORT" => Some("eighty".to_string()),
                "HOST" => Some("example.test".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!("http://example.test:9999", target.base_url());
    }

    #[test]
    fn host_flag_ignores_invalid_host_env() {
        let cli = SeederCli::parse_from(["e2e-seeder", "--host", "example.test"]);
        let target = cli
            .target_with_env(|key| match key {
                "HOST" => Some("bad host".to_string()),
                "PORT" => Some("9999".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!("http://example.test:9999", target.base_url());
    }

    #[test]
    fn invalid_env_fails_without_flags() {
        let cli = SeederCli::parse_from(["e2e-seeder"]);
        let result = cli.target_with_env(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn missing_plan_file_is_an_error() {
        let cli = SeederCli::parse_from(["e2e-seeder", "--plan", "/non/existent/plan.toml"]);
        let target = ConnectionTarget::new("localhost", 8001).unwrap();
        assert!(cli.plan(&target).is_err());
    }
}
