//! `operations`: list the registry as JSON lines.

use contentctl_core::Registry;

use crate::client::{CliError, CliResult};
use crate::output::open_output;

pub(crate) async fn handle_operations(registry: &Registry) -> CliResult<()> {
    let mut sink = open_output(None, false).await?;
    for descriptor in registry.descriptors() {
        sink.write_value(descriptor)
            .await
            .map_err(CliError::failure)?;
    }
    Ok(())
}
