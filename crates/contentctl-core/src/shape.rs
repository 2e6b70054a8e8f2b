//! Composed request shape for one operation invocation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::arguments::Arguments;
use crate::error::ContractError;
use crate::flag::Flag;
use crate::registry::{Descriptor, Host, Method};
use crate::template;

/// Everything the executor needs to issue the request, short of base URL and
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestShape {
    /// HTTP verb.
    pub method: Method,
    /// Base URL family.
    pub host: Host,
    /// Rendered path, e.g. `/spaces/abc/entries/xyz`.
    pub path: String,
    /// Query parameters.
    pub query: BTreeMap<String, String>,
    /// Operation-specific headers (auth headers are added by the executor).
    pub headers: BTreeMap<String, String>,
    /// Request body, when the operation sends one.
    pub payload: Option<Payload>,
    /// Confirmation state for destructive operations.
    pub confirmation: Confirmation,
}

/// Request body and its content negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Document or binary.
    pub kind: PayloadKind,
    /// Where the bytes come from.
    pub source: BodySource,
}

/// Content negotiation class of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Management API JSON document.
    Document,
    /// Opaque upload bytes.
    Binary,
}

impl PayloadKind {
    /// `Content-Type` header value for this payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Document => "application/vnd.contentful.management.v1+json",
            Self::Binary => "application/octet-stream",
        }
    }
}

/// Where payload bytes are read from. Files are read by the executor so
/// composition stays free of IO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// Read from this path at execution time.
    File(PathBuf),
    /// Already in memory.
    Inline(Vec<u8>),
}

/// Confirmation state of a composed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The operation is not destructive.
    NotRequired,
    /// The caller passed `force: true`.
    Forced,
    /// The caller passed `force: false`; the front end must confirm interactively.
    Pending,
}

impl Confirmation {
    /// Whether the request may be sent without asking anyone.
    #[must_use]
    pub const fn is_cleared(self) -> bool {
        matches!(self, Self::NotRequired | Self::Forced)
    }
}

/// Build the request shape for `descriptor` from the supplied arguments.
///
/// Flags are applied in canonical order so the first reported error is stable;
/// the resulting shape does not depend on that order.
///
/// # Errors
///
/// Returns a [`ContractError`] when a required argument is missing or a flag's
/// argument rules are broken.
pub fn compose(descriptor: &Descriptor, arguments: &Arguments) -> Result<RequestShape, ContractError> {
    compose_in_order(descriptor, descriptor.flags.iter().copied(), arguments)
}

pub(crate) fn compose_in_order(
    descriptor: &Descriptor,
    flags: impl IntoIterator<Item = Flag>,
    arguments: &Arguments,
) -> Result<RequestShape, ContractError> {
    descriptor.validate(arguments)?;

    let mut template = descriptor.url_template.clone();
    let mut placeholders = descriptor.required_arguments.clone();
    let mut shape = RequestShape {
        method: descriptor.method,
        host: descriptor.host,
        path: String::new(),
        query: BTreeMap::new(),
        headers: BTreeMap::new(),
        payload: None,
        confirmation: Confirmation::NotRequired,
    };

    for flag in flags {
        let delta = flag.contribute(&descriptor.name, arguments)?;
        shape.query.extend(delta.query);
        shape.headers.extend(delta.headers);
        if delta.payload.is_some() {
            shape.payload = delta.payload;
        }
        if let Some(confirmation) = delta.confirmation {
            shape.confirmation = confirmation;
        }
        if let Some((from, to)) = delta.scope {
            template = template.replacen(from, to, 1);
            placeholders.push("environment_id".to_string());
        }
    }

    shape.path = template::render(&template, &placeholders, arguments)?;
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::standard().expect("standard registry builds")
    }

    fn permutations(flags: &[Flag]) -> Vec<Vec<Flag>> {
        if flags.len() <= 1 {
            return vec![flags.to_vec()];
        }
        let mut result = Vec::new();
        for index in 0..flags.len() {
            let mut rest = flags.to_vec();
            let head = rest.remove(index);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                result.push(tail);
            }
        }
        result
    }

    #[test]
    fn composition_is_order_independent() {
        let registry = registry();
        let cases = [
            (
                "list-entries",
                Arguments::new()
                    .with("space_id", "samplespace1")
                    .with("environment_id", "staging")
                    .with("skip", 10)
                    .with("limit", 5)
                    .with("select", "sys.id")
                    .with("order", "-sys.createdAt")
                    .with("content_type", "news")
                    .with("query_term", json!(["fields.slug=home"])),
            ),
            (
                "put-entry",
                Arguments::new()
                    .with("space_id", "samplespace1")
                    .with("entry_id", "e1")
                    .with("content_type", "news")
                    .with("document_version", 3)
                    .with("document_body", json!({"fields": {}})),
            ),
        ];

        for (name, arguments) in cases {
            let descriptor = registry.lookup(name).expect("registered");
            let flags: Vec<Flag> = descriptor.flags.iter().copied().collect();
            let expected = compose(descriptor, &arguments).expect("composes");
            for order in permutations(&flags) {
                let shape = compose_in_order(descriptor, order.clone(), &arguments)
                    .expect("composes in any order");
                assert_eq!(shape, expected, "order {order:?} changed the shape");
            }
        }

        let descriptor = registry.lookup("list-entries").expect("registered");
        let flags: Vec<Flag> = descriptor.flags.iter().copied().collect();
        for term in ["limit=5", "skip=1", "order=sys.id", "content_type=blog"] {
            let arguments = Arguments::new()
                .with("space_id", "samplespace1")
                .with("limit", 10)
                .with("query_term", json!([term]));
            for order in permutations(&flags) {
                let err = compose_in_order(descriptor, order.clone(), &arguments)
                    .expect_err("named keys cannot come from query terms");
                assert_eq!(err.kind(), "InvalidArgument", "order {order:?} with {term}");
            }
        }
    }

    #[test]
    fn list_content_types_without_paging_has_no_query() {
        let registry = registry();
        let descriptor = registry.lookup("list-content-types").expect("registered");
        let shape = compose(
            descriptor,
            &Arguments::new().with("space_id", "samplespace1"),
        )
        .expect("composes");
        assert_eq!(shape.path, "/spaces/samplespace1/content_types/");
        assert!(shape.query.is_empty());
        assert_eq!(shape.method, Method::Get);
        assert_eq!(shape.host, Host::Api);
    }

    #[test]
    fn collection_adds_skip_and_limit() {
        let registry = registry();
        let descriptor = registry.lookup("list-locales").expect("registered");
        let shape = compose(
            descriptor,
            &Arguments::new()
                .with("space_id", "s")
                .with("skip", 0)
                .with("limit", "100"),
        )
        .expect("composes");
        assert_eq!(shape.query.get("skip").map(String::as_str), Some("0"));
        assert_eq!(shape.query.get("limit").map(String::as_str), Some("100"));
    }

    #[test]
    fn negative_limit_is_rejected() {
        let registry = registry();
        let descriptor = registry.lookup("list-roles").expect("registered");
        let err = compose(
            descriptor,
            &Arguments::new().with("space_id", "s").with("limit", -1),
        )
        .expect_err("negative limit");
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn post_entry_carries_content_type_header_and_document() {
        let registry = registry();
        let descriptor = registry.lookup("post-entry").expect("registered");
        let shape = compose(
            descriptor,
            &Arguments::new()
                .with("space_id", "samplespace1")
                .with("content_type", "news")
                .with("document_file", "/tmp/entry.json"),
        )
        .expect("composes");
        assert_eq!(
            shape.headers.get("X-Contentful-Content-Type").map(String::as_str),
            Some("news")
        );
        assert_eq!(
            shape.payload,
            Some(Payload {
                kind: PayloadKind::Document,
                source: BodySource::File(PathBuf::from("/tmp/entry.json")),
            })
        );
    }

    #[test]
    fn body_rules_are_enforced() {
        let registry = registry();
        let descriptor = registry.lookup("post-asset").expect("registered");
        let base = Arguments::new().with("space_id", "s");

        let err = compose(descriptor, &base).expect_err("no body");
        assert_eq!(err, ContractError::MissingBody);

        let both = base
            .clone()
            .with("document_file", "a.json")
            .with("document_body", "{}");
        let err = compose(descriptor, &both).expect_err("two bodies");
        assert_eq!(err, ContractError::AmbiguousBody);
    }

    #[test]
    fn version_rules_distinguish_allows_and_requires() {
        let registry = registry();
        let publish = registry.lookup("publish-entry").expect("registered");
        let args = Arguments::new().with("space_id", "s").with("entry_id", "e");
        assert_eq!(
            compose(publish, &args).expect_err("version required"),
            ContractError::MissingVersion
        );

        let shape = compose(publish, &args.clone().with("document_version", 7))
            .expect("version supplied");
        assert_eq!(
            shape.headers.get("X-Contentful-Version").map(String::as_str),
            Some("7")
        );

        let put_asset = registry.lookup("put-asset").expect("registered");
        let shape = compose(
            put_asset,
            &Arguments::new()
                .with("space_id", "s")
                .with("asset_id", "a")
                .with("document_body", "{}"),
        )
        .expect("version optional");
        assert!(!shape.headers.contains_key("X-Contentful-Version"));
    }

    #[test]
    fn missing_content_type_is_reported() {
        let registry = registry();
        let descriptor = registry.lookup("post-entry").expect("registered");
        let err = compose(
            descriptor,
            &Arguments::new()
                .with("space_id", "s")
                .with("document_body", "{}"),
        )
        .expect_err("content type required");
        assert_eq!(err, ContractError::MissingContentType);
    }

    #[test]
    fn asset_collection_adds_mimetype_group() {
        let registry = registry();
        let descriptor = registry.lookup("list-assets").expect("registered");
        let shape = compose(
            descriptor,
            &Arguments::new()
                .with("space_id", "s")
                .with("mimetype_group", "image")
                .with("order", "sys.createdAt"),
        )
        .expect("composes");
        assert_eq!(
            shape.query.get("mimetype_group").map(String::as_str),
            Some("image")
        );
        assert_eq!(
            shape.query.get("order").map(String::as_str),
            Some("sys.createdAt")
        );
    }

    #[test]
    fn organization_header_is_optional() {
        let registry = registry();
        let descriptor = registry.lookup("post-space").expect("registered");
        let args = Arguments::new().with("document_body", json!({"name": "demo"}));
        let shape = compose(descriptor, &args).expect("composes");
        assert!(!shape.headers.contains_key("X-Contentful-Organization"));

        let shape = compose(descriptor, &args.with("organization", "org-1")).expect("composes");
        assert_eq!(
            shape.headers.get("X-Contentful-Organization").map(String::as_str),
            Some("org-1")
        );
    }

    #[test]
    fn dangerous_operations_need_an_explicit_choice() {
        let registry = registry();
        let descriptor = registry.lookup("delete-space").expect("registered");
        let args = Arguments::new().with("space_id", "s");

        let err = compose(descriptor, &args).expect_err("confirmation required");
        assert_eq!(
            err,
            ContractError::ConfirmationRequired {
                operation: "delete-space".to_string()
            }
        );

        let forced = compose(descriptor, &args.clone().with("force", true)).expect("forced");
        assert_eq!(forced.confirmation, Confirmation::Forced);
        assert!(forced.confirmation.is_cleared());

        let pending = compose(descriptor, &args.with("force", false)).expect("explicit no-force");
        assert_eq!(pending.confirmation, Confirmation::Pending);
        assert!(!pending.confirmation.is_cleared());
    }

    #[test]
    fn environment_scope_rewrites_the_space_prefix() {
        let registry = registry();
        let descriptor = registry.lookup("get-entry").expect("registered");
        let args = Arguments::new().with("space_id", "s").with("entry_id", "e");

        let shape = compose(descriptor, &args).expect("space level");
        assert_eq!(shape.path, "/spaces/s/entries/e");

        let shape =
            compose(descriptor, &args.clone().with("environment_id", "")).expect("empty environment");
        assert_eq!(shape.path, "/spaces/s/entries/e");

        let shape =
            compose(descriptor, &args.with("environment_id", "master")).expect("environment");
        assert_eq!(shape.path, "/spaces/s/environments/master/entries/e");
    }

    #[test]
    fn binary_uploads_target_upload_host() {
        let registry = registry();
        let descriptor = registry.lookup("post-upload").expect("registered");
        let shape = compose(
            descriptor,
            &Arguments::new()
                .with("space_id", "s")
                .with("document_file", "image.png"),
        )
        .expect("composes");
        assert_eq!(shape.host, Host::Upload);
        assert_eq!(
            shape.payload.map(|payload| payload.kind),
            Some(PayloadKind::Binary)
        );
    }

    #[test]
    fn missing_placeholder_argument_is_reported() {
        let registry = registry();
        let descriptor = registry.lookup("get-entry").expect("registered");
        let err = compose(descriptor, &Arguments::new().with("space_id", "s"))
            .expect_err("entry id missing");
        assert_eq!(
            err,
            ContractError::MissingArgument {
                name: "entry_id".to_string()
            }
        );
    }
}
