//! Built-in Content Management API operations.
//!
//! Columns: name, method, host, path template, flag letters (see [`crate::Flag::letter`]).

use crate::registry::{Host, Method};

pub(crate) type OperationRow = (&'static str, Method, Host, &'static str, &'static str);

#[rustfmt::skip]
pub(crate) const STANDARD_OPERATIONS: &[OperationRow] = &[
    ("list-content-types", Method::Get, Host::Api, "/spaces/{space_id}/content_types/", "Ec"),
    ("put-content-type", Method::Put, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}", "EDv"),
    ("get-content-type", Method::Get, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}", "E"),
    ("put-content-type-editor", Method::Put, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}/editor_interface", "EDV"),
    ("get-content-type-editor", Method::Get, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}/editor_interface", "E"),
    ("delete-content-type", Method::Delete, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}", "EV"),
    ("publish-content-type", Method::Put, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}/published", "EV"),
    ("unpublish-content-type", Method::Delete, Host::Api, "/spaces/{space_id}/content_types/{content_type_id}/published", "E"),
    ("list-entries", Method::Get, Host::Api, "/spaces/{space_id}/entries/", "Ece"),
    ("post-entry", Method::Post, Host::Api, "/spaces/{space_id}/entries/", "EDt"),
    ("put-entry", Method::Put, Host::Api, "/spaces/{space_id}/entries/{entry_id}", "EDtv"),
    ("get-entry", Method::Get, Host::Api, "/spaces/{space_id}/entries/{entry_id}", "E"),
    ("delete-entry", Method::Delete, Host::Api, "/spaces/{space_id}/entries/{entry_id}", "EV"),
    ("publish-entry", Method::Put, Host::Api, "/spaces/{space_id}/entries/{entry_id}/published", "EV"),
    ("unpublish-entry", Method::Delete, Host::Api, "/spaces/{space_id}/entries/{entry_id}/published", "EV"),
    ("archive-entry", Method::Put, Host::Api, "/spaces/{space_id}/entries/{entry_id}/archived", "EV"),
    ("unarchive-entry", Method::Delete, Host::Api, "/spaces/{space_id}/entries/{entry_id}/archived", "EV"),
    ("list-assets", Method::Get, Host::Api, "/spaces/{space_id}/assets/", "Eca"),
    ("post-asset", Method::Post, Host::Api, "/spaces/{space_id}/assets/", "ED"),
    ("put-asset", Method::Put, Host::Api, "/spaces/{space_id}/assets/{asset_id}", "EDv"),
    ("get-asset", Method::Get, Host::Api, "/spaces/{space_id}/assets/{asset_id}", "E"),
    ("delete-asset", Method::Delete, Host::Api, "/spaces/{space_id}/assets/{asset_id}", "EV"),
    ("process-asset", Method::Put, Host::Api, "/spaces/{space_id}/assets/{asset_id}/files/{locale}/process", "EV"),
    ("publish-asset", Method::Put, Host::Api, "/spaces/{space_id}/assets/{asset_id}/published", "EV"),
    ("unpublish-asset", Method::Delete, Host::Api, "/spaces/{space_id}/assets/{asset_id}/published", "EV"),
    ("archive-asset", Method::Put, Host::Api, "/spaces/{space_id}/assets/{asset_id}/archived", "EV"),
    ("unarchive-asset", Method::Delete, Host::Api, "/spaces/{space_id}/assets/{asset_id}/archived", "EV"),
    ("get-locales", Method::Get, Host::Api, "/spaces/{space_id}/locales", "E"),
    ("list-locales", Method::Get, Host::Api, "/spaces/{space_id}/locales/", "Ec"),
    ("post-locale", Method::Post, Host::Api, "/spaces/{space_id}/locales/", "ED"),
    ("put-locale", Method::Put, Host::Api, "/spaces/{space_id}/locales/{locale_id}", "ED"),
    ("get-locale", Method::Get, Host::Api, "/spaces/{space_id}/locales/{locale_id}", "E"),
    ("delete-locale", Method::Delete, Host::Api, "/spaces/{space_id}/locales/{locale_id}", "E"),
    ("list-space-memberships", Method::Get, Host::Api, "/spaces/{space_id}/space_memberships/", "Ec"),
    ("post-space-membership", Method::Post, Host::Api, "/spaces/{space_id}/space_memberships/", "ED"),
    ("put-space-membership", Method::Put, Host::Api, "/spaces/{space_id}/space_memberships/{membership_id}", "ED"),
    ("get-space-membership", Method::Get, Host::Api, "/spaces/{space_id}/space_memberships/{membership_id}", "E"),
    ("delete-space-membership", Method::Delete, Host::Api, "/spaces/{space_id}/space_memberships/{membership_id}", "E"),
    ("list-roles", Method::Get, Host::Api, "/spaces/{space_id}/roles/", "Ec"),
    ("post-role", Method::Post, Host::Api, "/spaces/{space_id}/roles/", "ED"),
    ("put-role", Method::Put, Host::Api, "/spaces/{space_id}/roles/{role_id}", "ED"),
    ("get-role", Method::Get, Host::Api, "/spaces/{space_id}/roles/{role_id}", "E"),
    ("delete-role", Method::Delete, Host::Api, "/spaces/{space_id}/roles/{role_id}", "E"),
    ("get-environment", Method::Get, Host::Api, "/spaces/{space_id}/environments/{environment_id}", ""),
    ("put-environment", Method::Put, Host::Api, "/spaces/{space_id}/environments/{environment_id}", "D"),
    ("delete-environment", Method::Delete, Host::Api, "/spaces/{space_id}/environments/{environment_id}", "!"),
    ("list-environments", Method::Get, Host::Api, "/spaces/{space_id}/environments/", "c"),
    ("list-spaces", Method::Get, Host::Api, "/spaces/", ""),
    ("post-space", Method::Post, Host::Api, "/spaces/", "oD"),
    ("put-space", Method::Put, Host::Api, "/spaces/{space_id}", "oD"),
    ("get-space", Method::Get, Host::Api, "/spaces/{space_id}", ""),
    ("delete-space", Method::Delete, Host::Api, "/spaces/{space_id}", "!"),
    ("post-upload", Method::Post, Host::Upload, "/spaces/{space_id}/uploads", "B"),
    ("get-upload", Method::Get, Host::Upload, "/spaces/{space_id}/uploads/{upload_id}", ""),
    ("delete-upload", Method::Delete, Host::Upload, "/spaces/{space_id}/uploads/{upload_id}", ""),
    ("post-webhook", Method::Post, Host::Api, "/spaces/{space_id}/webhook_definitions", "D"),
    ("put-webhook", Method::Put, Host::Api, "/spaces/{space_id}/webhook_definitions/{webhook_id}", "D"),
    ("get-webhook", Method::Get, Host::Api, "/spaces/{space_id}/webhook_definitions/{webhook_id}", ""),
    ("delete-webhook", Method::Delete, Host::Api, "/spaces/{space_id}/webhook_definitions/{webhook_id}", ""),
    ("list-webhooks", Method::Get, Host::Api, "/spaces/{space_id}/webhook_definitions", ""),
    ("list-webhook-calls", Method::Get, Host::Api, "/spaces/{space_id}/webhooks/{webhook_id}/calls", ""),
    ("get-webhook-call", Method::Get, Host::Api, "/spaces/{space_id}/webhooks/{webhook_id}/calls/{call_id}", ""),
    ("get-webhook-health", Method::Get, Host::Api, "/spaces/{space_id}/webhooks/{webhook_id}/health", ""),
];
