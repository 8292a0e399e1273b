use std::path::PathBuf;

use crate::command::ClientCommand;
use crate::descriptor::{ProductDescriptor, RunDescriptor, SeedPlan};
use crate::error::ProcessFailure;
use crate::runner::CommandRunner;
use crate::target::ConnectionTarget;

/// When to end the session opened by [`Seeder::authenticate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoutPolicy {
    /// Log out after seeding, including when adding a product or storing a run failed.
    #[default]
    Always,
    /// Log out only when everything succeeded. A failure leaves the session open.
    OnSuccess,
}

/// Settings for a seeding run that are not part of the [`SeedPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOptions {
    pub username: String,
    /// JSON credentials file handed to the client on login.
    pub password_file: PathBuf,
    pub logout_policy: LogoutPolicy,
}

impl SeedOptions {
    pub fn new(password_file: impl Into<PathBuf>) -> Self {
        Self {
            username: "root".to_string(),
            password_file: password_file.into(),
            logout_policy: LogoutPolicy::default(),
        }
    }
}

/// Puts a [`SeedPlan`] onto the server through the client: login, every product, every run, then
/// logout. Each step waits for the client to exit before the next one starts.
pub struct Seeder<R> {
    plan: SeedPlan,
    target: ConnectionTarget,
    options: SeedOptions,
    runner: R,
}

impl<R: CommandRunner> Seeder<R> {
    pub fn new(plan: SeedPlan, target: ConnectionTarget, options: SeedOptions, runner: R) -> Self {
        Self {
            plan,
            target,
            options,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    pub fn authenticate(&mut self, username: &str) -> Result<(), ProcessFailure> {
        let command = ClientCommand::login(
            username,
            self.target.base_url(),
            &self.options.password_file,
        );
        self.runner.run(&command)
    }

    pub fn provision_product(&mut self, product: &ProductDescriptor) -> Result<(), ProcessFailure> {
        provision_product(&mut self.runner, &self.target, product)
    }

    pub fn store_run(&mut self, run: &RunDescriptor) -> Result<(), ProcessFailure> {
        store_run(&mut self.runner, run)
    }

    pub fn deauthenticate(&mut self) -> Result<(), ProcessFailure> {
        let command = ClientCommand::logout(self.target.base_url());
        self.runner.run(&command)
    }

    /// Run the whole plan.
    ///
    /// The first failing command stops the run and its error is returned. If login succeeded, the
    /// [`LogoutPolicy`] decides whether logout is still attempted; a logout failure after an
    /// earlier failure is logged and the earlier failure is returned.
    pub fn seed(&mut self) -> Result<(), ProcessFailure> {
        self.check_plan();

        let username = self.options.username.clone();
        self.authenticate(&username)?;

        match self.populate() {
            Ok(()) => self.deauthenticate(),
            Err(e) => {
                match self.options.logout_policy {
                    LogoutPolicy::Always => {
                        log::warn!("Seeding failed, logging out before exiting");
                        if let Err(logout_err) = self.deauthenticate() {
                            log::error!("Logout after failed seeding also failed: {logout_err}");
                        }
                    }
                    LogoutPolicy::OnSuccess => {
                        log::warn!("Seeding failed, the session is left open");
                    }
                }
                Err(e)
            }
        }
    }

    fn populate(&mut self) -> Result<(), ProcessFailure> {
        let Self {
            plan,
            target,
            runner,
            ..
        } = self;

        for product in &plan.products {
            provision_product(runner, target, product)?;
        }

        for run in &plan.runs {
            store_run(runner, run)?;
        }

        Ok(())
    }

    /// Warn about things the client is going to reject, without stopping.
    fn check_plan(&self) {
        for endpoint in self.plan.duplicate_endpoints() {
            log::warn!("Product endpoint '{endpoint}' is listed more than once");
        }

        let password_file = &self.options.password_file;
        match std::fs::read_to_string(password_file) {
            Ok(content) => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                    log::warn!(
                        "Password file {} is not valid JSON: {e}",
                        password_file.display()
                    );
                }
            }
            Err(e) => log::warn!(
                "Cannot read password file {}: {e}",
                password_file.display()
            ),
        }

        for run in &self.plan.runs {
            if !run.output.is_dir() {
                log::warn!(
                    "Report directory {} for run '{}' does not exist",
                    run.output.display(),
                    run.name
                );
            }
        }
    }
}

fn provision_product(
    runner: &mut impl CommandRunner,
    target: &ConnectionTarget,
    product: &ProductDescriptor,
) -> Result<(), ProcessFailure> {
    runner.run(&ClientCommand::add_product(product, target.base_url()))
}

fn store_run(runner: &mut impl CommandRunner, run: &RunDescriptor) -> Result<(), ProcessFailure> {
    runner.run(&ClientCommand::store(run))
}
