pub mod action;
pub mod config;
pub mod output;
pub mod release;

pub use action::run;
pub use config::Config;
pub use output::ActionOutput;
pub use release::{Error, GitHubReleaseClient, ReleaseApi, Result, UploadOrchestrator};
