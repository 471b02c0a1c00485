pub mod load;
pub mod types;

pub use types::{
    Config, DEFAULT_CONTAINER_EXTENSION, DEFAULT_EXTENSION, DEFAULT_LANGUAGE, DEFAULT_MODULES,
    DEFAULT_WORKERS,
    FileSettings, RunMode, Verbosity, WORKING_DIR_NAME,
};
