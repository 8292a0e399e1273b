mod cli;
mod client_binary;
mod command;
mod descriptor;
mod error;
mod runner;
mod seeder;
mod target;
mod types;

pub mod prelude {
    pub use crate::cli::SeederCli;
    pub use crate::client_binary::{client_path, CLIENT_BINARY, SEEDER_CLIENT_PATH_ENV};
    pub use crate::command::{ClientCommand, CommandArg, PASS_FILE_ENV};
    pub use crate::descriptor::{ProductDescriptor, RunDescriptor, SeedPlan};
    pub use crate::error::ProcessFailure;
    pub use crate::runner::{CommandRunner, DryRunRunner, ProcessRunner, RecordingRunner};
    pub use crate::seeder::{LogoutPolicy, SeedOptions, Seeder};
    pub use crate::target::{ConnectionTarget, DEFAULT_HOST, DEFAULT_PORT};
    pub use crate::types::SeedResult;
}
