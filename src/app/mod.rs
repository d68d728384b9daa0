pub mod cli;
pub mod run;
pub mod scaffold;
pub mod util;

pub use cli::Cli;
pub use run::run;
