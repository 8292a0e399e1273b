use anyhow::Context;
use clap::Parser;
use e2e_seeder::prelude::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(SeederCli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:?}");
            match e.downcast_ref::<ProcessFailure>() {
                Some(failure) => ExitCode::from(failure.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: SeederCli) -> SeedResult<()> {
    let target = cli.target()?;
    let plan = cli.plan(&target)?;
    log::debug!("Seeding {target:?} with {plan:?}");

    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(ProcessRunner::from_env()?)
    };

    Seeder::new(plan, target.clone(), cli.options(), runner)
        .seed()
        .with_context(|| format!("Failed to seed {}", target.base_url()))
}
