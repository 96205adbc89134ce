pub mod change_event;
pub mod config;
pub mod repository;

pub use change_event::{ChangeEvent, ChangeKind};
pub use config::{
    AppConfig, Config, GithubConfig, LoggingConfig, SourceConfig, SourceKind, TeamsConfig,
};
pub use repository::{parse_link, RepositoryLocator};
