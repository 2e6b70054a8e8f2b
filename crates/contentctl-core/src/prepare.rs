//! Prepare mode: validate an invocation and emit its record without executing it.

use std::path::PathBuf;

use serde_json::Value;

use crate::arguments::Arguments;
use crate::error::ContractError;
use crate::record::OperationRecord;
use crate::registry::Registry;
use crate::shape::compose;

/// Build the record equivalent to invoking `operation` with `arguments`.
///
/// The arguments are checked against the operation's contract first. A
/// relative `document_file` is made absolute so the record replays from any
/// working directory.
///
/// # Errors
///
/// Returns [`ContractError::UnknownOperation`] or any composition error.
pub fn prepare(
    registry: &Registry,
    operation: &str,
    mut arguments: Arguments,
) -> Result<OperationRecord, ContractError> {
    let descriptor = registry.lookup(operation)?;
    compose(descriptor, &arguments)?;

    let document_file = arguments
        .get("document_file")
        .and_then(Value::as_str)
        .map(PathBuf::from);
    if let Some(path) = document_file {
        let absolute = std::path::absolute(&path)
            .map_err(|_| ContractError::invalid("document_file", "path cannot be resolved"))?;
        arguments.insert("document_file", absolute.to_string_lossy().into_owned());
    }

    Ok(OperationRecord::new(descriptor.name.clone(), arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_line;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn preparing_twice_is_byte_identical() {
        let registry = Registry::standard().expect("standard registry builds");
        let arguments = Arguments::new()
            .with("space_id", "samplespace1")
            .with("limit", 10)
            .with("skip", 0);

        let first = prepare(&registry, "list-content-types", arguments.clone()).expect("prepares");
        let second = prepare(&registry, "list-content-types", arguments).expect("prepares");
        assert_eq!(
            encode_line(&first).expect("encodes"),
            encode_line(&second).expect("encodes")
        );
        assert_eq!(
            encode_line(&first).expect("encodes"),
            r#"{"operation":"list-content-types","arguments":{"limit":10,"skip":0,"space_id":"samplespace1"}}"#
        );
    }

    #[test]
    fn document_file_is_made_absolute() {
        let registry = Registry::standard().expect("standard registry builds");
        let record = prepare(
            &registry,
            "post-asset",
            Arguments::new()
                .with("space_id", "s")
                .with("document_file", "fixtures/asset.json"),
        )
        .expect("prepares");
        let path = record
            .arguments
            .get("document_file")
            .and_then(Value::as_str)
            .expect("path kept");
        assert!(Path::new(path).is_absolute());
        assert!(path.ends_with("fixtures/asset.json"));
    }

    #[test]
    fn prepare_validates_the_contract() {
        let registry = Registry::standard().expect("standard registry builds");
        let err = prepare(
            &registry,
            "post-entry",
            Arguments::new()
                .with("space_id", "s")
                .with("document_body", json!({})),
        )
        .expect_err("content type missing");
        assert_eq!(err, ContractError::MissingContentType);

        let err = prepare(&registry, "nope", Arguments::new()).expect_err("unknown");
        assert_eq!(err.kind(), "UnknownOperation");
    }
}
