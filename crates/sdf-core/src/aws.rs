//! Mapping of AWS SDK failures onto [`ProvisionError`].

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use crate::error::{ErrorKind, ProvisionError};

/// Classify an SDK failure once, from its error code or message.
pub fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> ProvisionError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_owned);
    let message = DisplayErrorContext(&err).to_string();
    ProvisionError::remote(operation, ErrorKind::classify(code.as_deref(), &message), message)
}
