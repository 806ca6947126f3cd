pub mod credentials;
pub mod error;
pub mod runner;
pub mod status;

// Re-export commonly used items
pub use credentials::{CredentialError, CredentialInjector};
pub use error::{CommandError, FailureKind};
pub use runner::{classify_failure, render_command, to_args, CommandRunner, SystemRunner};
pub use status::{changed_files, format_file_entry, is_ahead, parse_status_line, ChangeKind};
