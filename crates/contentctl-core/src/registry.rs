//! Operation descriptors and the immutable registry that holds them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::arguments::Arguments;
use crate::error::{ContractError, RegistryError};
use crate::flag::{Flag, SPACE_PREFIX};
use crate::table::STANDARD_OPERATIONS;
use crate::template::TemplateParser;

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Lowercase verb as used in the operation table and dry-run output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

impl Display for Method {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Base URL family an operation is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    /// Management API host.
    Api,
    /// Upload host.
    Upload,
}

/// Static definition of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Unique operation name, e.g. `put-entry`.
    pub name: String,
    /// HTTP verb.
    pub method: Method,
    /// Base URL family.
    pub host: Host,
    /// Path template with `{placeholder}` segments.
    pub url_template: String,
    /// Placeholder names, in template order. Every one must be supplied.
    pub required_arguments: Vec<String>,
    /// Flags composed for this operation.
    pub flags: BTreeSet<Flag>,
}

impl Descriptor {
    /// Whether the descriptor carries `flag`.
    #[must_use]
    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Check that every required argument was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingArgument`] naming the first absent argument.
    pub fn validate(&self, arguments: &Arguments) -> Result<(), ContractError> {
        match self
            .required_arguments
            .iter()
            .find(|name| !arguments.contains(name))
        {
            Some(name) => Err(ContractError::MissingArgument { name: name.clone() }),
            None => Ok(()),
        }
    }

    /// Flag letters in canonical order, e.g. `"cE"`.
    #[must_use]
    pub fn flag_letters(&self) -> String {
        self.flags.iter().map(|flag| flag.letter()).collect()
    }
}

/// Immutable name → descriptor table.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: BTreeMap<String, Descriptor>,
}

impl Registry {
    /// Start an empty registry definition.
    #[must_use]
    pub const fn builder() -> RegistryBuilder {
        RegistryBuilder { rows: Vec::new() }
    }

    /// The full Content Management API operation table.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the built-in table is inconsistent.
    pub fn standard() -> Result<Self, RegistryError> {
        STANDARD_OPERATIONS
            .iter()
            .fold(Self::builder(), |builder, row| {
                builder.operation(row.0, row.1, row.2, row.3, row.4)
            })
            .build()
    }

    /// Find an operation by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnknownOperation`] when the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<&Descriptor, ContractError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| ContractError::UnknownOperation {
                name: name.to_string(),
            })
    }

    /// Check `arguments` against `descriptor`'s required arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingArgument`] naming the first absent argument.
    pub fn validate(
        &self,
        descriptor: &Descriptor,
        arguments: &Arguments,
    ) -> Result<(), ContractError> {
        descriptor.validate(arguments)
    }

    /// All descriptors in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Collects operation rows and validates them into a [`Registry`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    rows: Vec<Row>,
}

#[derive(Debug, Clone)]
struct Row {
    name: String,
    method: Method,
    host: Host,
    template: String,
    flags: String,
}

impl RegistryBuilder {
    /// Add one operation. `flags` uses the single-letter codes of [`Flag::letter`].
    #[must_use]
    pub fn operation(
        mut self,
        name: impl Into<String>,
        method: Method,
        host: Host,
        template: impl Into<String>,
        flags: impl Into<String>,
    ) -> Self {
        self.rows.push(Row {
            name: name.into(),
            method,
            host,
            template: template.into(),
            flags: flags.into(),
        });
        self
    }

    /// Validate every row and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] found: duplicate names, unknown flag
    /// letters, malformed templates, conflicting flags, or flags that do not fit
    /// the row's host or template.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let parser = TemplateParser::new().map_err(|source| RegistryError::Pattern { source })?;
        let mut descriptors = BTreeMap::new();

        for row in self.rows {
            let descriptor = build_descriptor(&parser, row)?;
            if descriptors.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateOperation {
                    name: descriptor.name,
                });
            }
            descriptors.insert(descriptor.name.clone(), descriptor);
        }

        Ok(Registry { descriptors })
    }
}

fn build_descriptor(parser: &TemplateParser, row: Row) -> Result<Descriptor, RegistryError> {
    let mut flags = BTreeSet::new();
    for letter in row.flags.chars() {
        let flag = Flag::from_letter(letter).ok_or_else(|| RegistryError::UnknownFlag {
            operation: row.name.clone(),
            letter,
        })?;
        flags.insert(flag);
    }

    for (index, first) in flags.iter().enumerate() {
        if let Some(second) = flags
            .iter()
            .skip(index + 1)
            .find(|other| first.conflicts_with(**other))
        {
            return Err(RegistryError::ConflictingFlags {
                operation: row.name,
                first: *first,
                second: *second,
            });
        }
    }

    if flags.contains(&Flag::SendsBinary) && row.host != Host::Upload {
        return Err(RegistryError::IncompatibleFlag {
            operation: row.name,
            flag: Flag::SendsBinary,
            reason: "binary payloads must target the upload host",
        });
    }
    if flags.contains(&Flag::EnvironmentScoped) && !row.template.starts_with(SPACE_PREFIX) {
        return Err(RegistryError::IncompatibleFlag {
            operation: row.name,
            flag: Flag::EnvironmentScoped,
            reason: "environment scoping needs a template under /spaces/{space_id}",
        });
    }

    let required_arguments = parser.placeholders(&row.template).map_err(|reason| {
        RegistryError::InvalidTemplate {
            operation: row.name.clone(),
            reason,
        }
    })?;
    if flags.contains(&Flag::EnvironmentScoped)
        && required_arguments.iter().any(|name| name == "environment_id")
    {
        return Err(RegistryError::IncompatibleFlag {
            operation: row.name,
            flag: Flag::EnvironmentScoped,
            reason: "environment_id is already a fixed placeholder",
        });
    }

    Ok(Descriptor {
        name: row.name,
        method: row.method,
        host: row.host,
        url_template: row.template,
        required_arguments,
        flags,
    })
}
