pub mod explorer;
pub mod outcome;
pub mod restorer;

pub use explorer::{ExplorerConfig, TransitionExplorer};
pub use outcome::{ItemReport, Phase, RemovalOutcome, RemovalStrategy, Restoration};
pub use restorer::{RestorerConfig, StatusRestorer};
