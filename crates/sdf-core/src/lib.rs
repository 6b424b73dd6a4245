pub mod aws;
pub mod clock;
pub mod error;
pub mod id;
pub mod redact;

pub use aws::sdk_error;
pub use clock::{RecordingSleeper, Sleeper, TokioSleeper};
pub use error::{ErrorCategory, ErrorKind, ProvisionError, Result};
pub use id::{generate_password, generate_physical_id, random_string};
pub use redact::{redact_statement, redact_statements};
