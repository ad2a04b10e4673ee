pub mod cli;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod debounce;
pub mod errors;
pub mod history;
pub mod notebook;
pub mod storage;
pub mod store;
pub mod vault;

pub use notebook::{BootOutcome, Notebook, NotebookOptions, PersistStatus, SaveFailure};
