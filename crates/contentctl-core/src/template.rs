//! URL template parsing and rendering.

use regex::Regex;

use crate::arguments::Arguments;
use crate::error::ContractError;

const PLACEHOLDER_PATTERN: &str = r"\{([a-z][a-z0-9_]*)\}";

/// Placeholder scanner compiled once per registry build.
pub(crate) struct TemplateParser {
    pattern: Regex,
}

impl TemplateParser {
    pub(crate) fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(PLACEHOLDER_PATTERN)?,
        })
    }

    /// Placeholder names in order of first appearance.
    ///
    /// Returns `Err` with a reason when braces are left over after removing
    /// well-formed placeholders.
    pub(crate) fn placeholders(&self, template: &str) -> Result<Vec<String>, &'static str> {
        if !template.starts_with('/') {
            return Err("template must start with '/'");
        }
        let leftover = self.pattern.replace_all(template, "");
        if leftover.contains('{') || leftover.contains('}') {
            return Err("unbalanced or malformed placeholder");
        }
        let mut names: Vec<String> = Vec::new();
        for capture in self.pattern.captures_iter(template) {
            let name = &capture[1];
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Substitute each named placeholder with its argument value.
pub(crate) fn render(
    template: &str,
    placeholders: &[String],
    arguments: &Arguments,
) -> Result<String, ContractError> {
    let mut rendered = template.to_string();
    for name in placeholders {
        let value = arguments
            .text(name)?
            .ok_or_else(|| ContractError::MissingArgument { name: name.clone() })?;
        if value.is_empty() || value.contains('/') {
            return Err(ContractError::invalid(name, "expected a single path segment"));
        }
        rendered = rendered.replace(&format!("{{{name}}}"), &value);
    }
    Ok(rendered)
}
