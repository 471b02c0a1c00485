mod file_scanner;
mod file_tools;
mod final_list;
mod path_validator;

pub use file_scanner::{ModuleDirectory, scan_container_files, scan_module_directories};
pub use file_tools::{move_replacing, remove_empty_directories, write_atomically};
pub use final_list::{INDEX_MANIFEST_NAME, write_index_manifest, write_path_list};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
