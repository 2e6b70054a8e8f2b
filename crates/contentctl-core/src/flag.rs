//! Behavioural flags attached to operation descriptors.
//!
//! Each flag is a pure function from the supplied [`Arguments`] to a
//! [`ShapeDelta`]. Deltas from different flags never touch the same slot (the
//! registry rejects such combinations up front), so merging them is
//! order-independent.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::arguments::Arguments;
use crate::error::ContractError;
use crate::shape::{BodySource, Confirmation, Payload, PayloadKind};

pub(crate) const HEADER_VERSION: &str = "X-Contentful-Version";
pub(crate) const HEADER_CONTENT_TYPE: &str = "X-Contentful-Content-Type";
pub(crate) const HEADER_ORGANIZATION: &str = "X-Contentful-Organization";

/// Path prefix rewritten by [`Flag::EnvironmentScoped`].
pub(crate) const SPACE_PREFIX: &str = "/spaces/{space_id}";
const ENVIRONMENT_PREFIX: &str = "/spaces/{space_id}/environments/{environment_id}";

/// Query keys owned by named options; free-form terms may not set them.
const NAMED_QUERY_KEYS: &[&str] = &["skip", "limit", "select", "order", "content_type"];

/// The closed set of flags an operation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// `c`: paginated collection (`skip`, `limit`).
    Collection,
    /// `D`: sends a JSON document body.
    SendsDocument,
    /// `v`: accepts an optional `document_version`.
    AllowsVersion,
    /// `V`: requires `document_version`.
    RequiresVersion,
    /// `t`: requires a `content_type` discriminator header.
    RequiresContentType,
    /// `e`: entry search (`select`, `order`, `content_type`, free-form terms).
    EntryCollection,
    /// `a`: asset search (`select`, `order`, `mimetype_group`).
    AssetCollection,
    /// `o`: optional organization scoping header.
    Organization,
    /// `!`: destructive; needs an explicit `force` choice.
    Dangerous,
    /// `B`: sends a raw binary body.
    SendsBinary,
    /// `E`: scoped to an environment when `environment_id` is supplied.
    EnvironmentScoped,
}

/// A part of the request a flag writes to. At most one flag per descriptor may
/// claim each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Body,
    Version,
    ContentTypeHeader,
    Organization,
    Confirmation,
    Scope,
    Query(&'static str),
    QueryTerms,
}

impl Flag {
    /// Every flag, in canonical order.
    pub const ALL: [Self; 11] = [
        Self::Collection,
        Self::SendsDocument,
        Self::AllowsVersion,
        Self::RequiresVersion,
        Self::RequiresContentType,
        Self::EntryCollection,
        Self::AssetCollection,
        Self::Organization,
        Self::Dangerous,
        Self::SendsBinary,
        Self::EnvironmentScoped,
    ];

    /// Single-letter code used in the operation table.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Collection => 'c',
            Self::SendsDocument => 'D',
            Self::AllowsVersion => 'v',
            Self::RequiresVersion => 'V',
            Self::RequiresContentType => 't',
            Self::EntryCollection => 'e',
            Self::AssetCollection => 'a',
            Self::Organization => 'o',
            Self::Dangerous => '!',
            Self::SendsBinary => 'B',
            Self::EnvironmentScoped => 'E',
        }
    }

    /// Inverse of [`Flag::letter`].
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.letter() == letter)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::SendsDocument => "sends-document",
            Self::AllowsVersion => "allows-version",
            Self::RequiresVersion => "requires-version",
            Self::RequiresContentType => "requires-content-type",
            Self::EntryCollection => "entry-collection",
            Self::AssetCollection => "asset-collection",
            Self::Organization => "organization",
            Self::Dangerous => "dangerous",
            Self::SendsBinary => "sends-binary",
            Self::EnvironmentScoped => "environment-scoped",
        }
    }

    pub(crate) const fn slots(self) -> &'static [Slot] {
        match self {
            Self::Collection => &[Slot::Query("skip"), Slot::Query("limit")],
            Self::SendsDocument | Self::SendsBinary => &[Slot::Body],
            Self::AllowsVersion | Self::RequiresVersion => &[Slot::Version],
            Self::RequiresContentType => &[Slot::ContentTypeHeader],
            Self::EntryCollection => &[
                Slot::Query("select"),
                Slot::Query("order"),
                Slot::Query("content_type"),
                Slot::QueryTerms,
            ],
            Self::AssetCollection => &[
                Slot::Query("select"),
                Slot::Query("order"),
                Slot::Query("mimetype_group"),
            ],
            Self::Organization => &[Slot::Organization],
            Self::Dangerous => &[Slot::Confirmation],
            Self::EnvironmentScoped => &[Slot::Scope],
        }
    }

    /// Whether two flags contribute to the same part of a request.
    #[must_use]
    pub fn conflicts_with(self, other: Self) -> bool {
        self != other
            && self
                .slots()
                .iter()
                .any(|slot| other.slots().contains(slot))
    }

    /// Compute this flag's contribution for the supplied arguments.
    ///
    /// # Errors
    ///
    /// Returns the [`ContractError`] describing the first argument rule the
    /// caller broke.
    pub(crate) fn contribute(
        self,
        operation: &str,
        arguments: &Arguments,
    ) -> Result<ShapeDelta, ContractError> {
        let mut delta = ShapeDelta::default();
        match self {
            Self::Collection => {
                for name in ["skip", "limit"] {
                    if let Some(value) = arguments.non_negative(name)? {
                        delta.query.insert(name.to_string(), value.to_string());
                    }
                }
            }
            Self::SendsDocument => {
                delta.payload = Some(resolve_payload(arguments, PayloadKind::Document)?);
            }
            Self::SendsBinary => {
                delta.payload = Some(resolve_payload(arguments, PayloadKind::Binary)?);
            }
            Self::AllowsVersion | Self::RequiresVersion => {
                match arguments.non_negative("document_version")? {
                    Some(version) => {
                        delta
                            .headers
                            .insert(HEADER_VERSION.to_string(), version.to_string());
                    }
                    None if self == Self::RequiresVersion => {
                        return Err(ContractError::MissingVersion);
                    }
                    None => {}
                }
            }
            Self::RequiresContentType => {
                let content_type = arguments
                    .text("content_type")?
                    .ok_or(ContractError::MissingContentType)?;
                delta
                    .headers
                    .insert(HEADER_CONTENT_TYPE.to_string(), content_type);
            }
            Self::EntryCollection => {
                copy_text(arguments, &["select", "order", "content_type"], &mut delta)?;
                for term in arguments.strings("query_term")? {
                    let (key, value) = term.split_once('=').unwrap_or((term.as_str(), ""));
                    if NAMED_QUERY_KEYS.contains(&key) {
                        return Err(ContractError::invalid(
                            "query_term",
                            "use the named option instead of a query term for this key",
                        ));
                    }
                    delta.query.insert(key.to_string(), value.to_string());
                }
            }
            Self::AssetCollection => {
                copy_text(arguments, &["select", "order", "mimetype_group"], &mut delta)?;
            }
            Self::Organization => {
                if let Some(organization) = arguments.text("organization")? {
                    delta
                        .headers
                        .insert(HEADER_ORGANIZATION.to_string(), organization);
                }
            }
            Self::Dangerous => {
                let confirmation = match arguments.boolean("force")? {
                    Some(true) => Confirmation::Forced,
                    Some(false) => Confirmation::Pending,
                    None => {
                        return Err(ContractError::ConfirmationRequired {
                            operation: operation.to_string(),
                        });
                    }
                };
                delta.confirmation = Some(confirmation);
            }
            Self::EnvironmentScoped => {
                if arguments
                    .text("environment_id")?
                    .is_some_and(|id| !id.is_empty())
                {
                    delta.scope = Some((SPACE_PREFIX, ENVIRONMENT_PREFIX));
                }
            }
        }
        Ok(delta)
    }
}

impl Display for Flag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Partial request produced by a single flag.
#[derive(Debug, Default)]
pub(crate) struct ShapeDelta {
    pub(crate) query: BTreeMap<String, String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) payload: Option<Payload>,
    pub(crate) confirmation: Option<Confirmation>,
    /// Template prefix replacement, `(from, to)`.
    pub(crate) scope: Option<(&'static str, &'static str)>,
}

fn copy_text(
    arguments: &Arguments,
    names: &[&str],
    delta: &mut ShapeDelta,
) -> Result<(), ContractError> {
    for name in names {
        if let Some(value) = arguments.text(name)? {
            delta.query.insert((*name).to_string(), value);
        }
    }
    Ok(())
}

fn resolve_payload(arguments: &Arguments, kind: PayloadKind) -> Result<Payload, ContractError> {
    let source = match (arguments.get("document_file"), arguments.get("document_body")) {
        (Some(_), Some(_)) => return Err(ContractError::AmbiguousBody),
        (None, None) => return Err(ContractError::MissingBody),
        (Some(Value::String(path)), None) => BodySource::File(PathBuf::from(path)),
        (Some(_), None) => {
            return Err(ContractError::invalid("document_file", "expected a path"));
        }
        (None, Some(Value::String(text))) => BodySource::Inline(text.clone().into_bytes()),
        (None, Some(document)) => BodySource::Inline(document.to_string().into_bytes()),
    };
    Ok(Payload { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn letters_round_trip() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_letter(flag.letter()), Some(flag));
        }
        assert_eq!(Flag::from_letter('x'), None);
    }

    #[test]
    fn body_flags_and_version_flags_conflict() {
        assert!(Flag::SendsDocument.conflicts_with(Flag::SendsBinary));
        assert!(Flag::AllowsVersion.conflicts_with(Flag::RequiresVersion));
        assert!(Flag::EntryCollection.conflicts_with(Flag::AssetCollection));
        assert!(!Flag::Collection.conflicts_with(Flag::EntryCollection));
        assert!(!Flag::RequiresContentType.conflicts_with(Flag::EntryCollection));
        assert!(!Flag::Dangerous.conflicts_with(Flag::Dangerous));
    }

    #[test]
    fn inline_object_bodies_are_serialized() {
        let args = Arguments::new().with("document_body", json!({"fields": {}}));
        let delta = Flag::SendsDocument
            .contribute("post-entry", &args)
            .expect("body should resolve");
        let payload = delta.payload.expect("payload");
        assert_eq!(payload.kind, PayloadKind::Document);
        assert_eq!(
            payload.source,
            BodySource::Inline(br#"{"fields":{}}"#.to_vec())
        );
    }

    #[test]
    fn query_terms_without_value_map_to_empty_string() {
        let args = Arguments::new().with(
            "query_term",
            json!(["fields.title[match]=news", "sys.archivedAt[exists]"]),
        );
        let delta = Flag::EntryCollection
            .contribute("list-entries", &args)
            .expect("terms should parse");
        assert_eq!(
            delta.query.get("fields.title[match]").map(String::as_str),
            Some("news")
        );
        assert_eq!(
            delta.query.get("sys.archivedAt[exists]").map(String::as_str),
            Some("")
        );
    }

    #[test]
    fn non_string_document_file_is_rejected() {
        let args = Arguments::new().with("document_file", 7);
        let err = Flag::SendsBinary
            .contribute("post-upload", &args)
            .expect_err("number is not a path");
        assert!(matches!(err, ContractError::InvalidArgument { name, .. } if name == "document_file"));
    }
}
