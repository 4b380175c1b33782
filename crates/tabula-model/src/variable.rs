//! Variable metadata: variables, categories and attributes
//!
//! Metadata is immutable once built. Each type has a builder that validates
//! mandatory fields in `build()`.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use tabula_types::{Value, ValueType};

/// A named, optionally namespaced and localized piece of metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    value: Value,
}

impl Attribute {
    pub fn builder(name: impl Into<String>) -> AttributeBuilder {
        AttributeBuilder {
            name: name.into(),
            namespace: None,
            locale: None,
            value: None,
        }
    }

    /// A plain text attribute
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            locale: None,
            value: Value::text(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn is_localised(&self) -> bool {
        self.locale.is_some()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct AttributeBuilder {
    name: String,
    namespace: Option<String>,
    locale: Option<String>,
    value: Option<Value>,
}

impl AttributeBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.value(Value::text(value))
    }

    pub fn build(self) -> ModelResult<Attribute> {
        if self.name.is_empty() {
            return Err(ModelError::missing("attribute", "name"));
        }
        let value = self
            .value
            .ok_or_else(|| ModelError::missing(format!("attribute {}", self.name), "value"))?;
        Ok(Attribute {
            name: self.name,
            namespace: self.namespace,
            locale: self.locale,
            value,
        })
    }
}

/// Shared lookups over a list of attributes
fn find_attribute<'a>(
    attributes: &'a [Attribute],
    namespace: Option<&str>,
    name: &str,
    locale: Option<&str>,
) -> Option<&'a Attribute> {
    attributes.iter().find(|a| {
        a.name == name
            && a.namespace.as_deref() == namespace
            && (locale.is_none() || a.locale.as_deref() == locale)
    })
}

/// One allowed answer of a categorical variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default)]
    missing: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<Attribute>,
}

impl Category {
    pub fn builder(name: impl Into<String>) -> CategoryBuilder {
        CategoryBuilder {
            name: name.into(),
            code: None,
            missing: false,
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, None, name, None)
    }
}

#[derive(Debug, Clone)]
pub struct CategoryBuilder {
    name: String,
    code: Option<String>,
    missing: bool,
    attributes: Vec<Attribute>,
}

impl CategoryBuilder {
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> ModelResult<Category> {
        if self.name.is_empty() {
            return Err(ModelError::missing("category", "name"));
        }
        Ok(Category {
            name: self.name,
            code: self.code,
            missing: self.missing,
            attributes: self.attributes,
        })
    }
}

/// Immutable variable metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    name: String,
    value_type: ValueType,
    entity_type: String,
    #[serde(default)]
    repeatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    occurrence_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    referenced_entity_type: Option<String>,
    #[serde(default)]
    index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<Attribute>,
}

impl Variable {
    pub fn builder(
        name: impl Into<String>,
        value_type: ValueType,
        entity_type: impl Into<String>,
    ) -> VariableBuilder {
        VariableBuilder {
            name: name.into(),
            value_type,
            entity_type: entity_type.into(),
            repeatable: false,
            occurrence_group: None,
            unit: None,
            mime_type: None,
            referenced_entity_type: None,
            index: 0,
            categories: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn occurrence_group(&self) -> Option<&str> {
        self.occurrence_group.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn referenced_entity_type(&self) -> Option<&str> {
        self.referenced_entity_type.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Whether the category of that name marks a missing answer
    pub fn is_missing_value(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        let text = value.to_string();
        self.category(&text).is_some_and(Category::is_missing)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn has_namespaced_attribute(&self, namespace: &str, name: &str) -> bool {
        self.namespaced_attribute(namespace, name).is_some()
    }

    /// First non-namespaced attribute of that name, any locale
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, None, name, None)
    }

    pub fn localised_attribute(&self, name: &str, locale: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, None, name, Some(locale))
    }

    pub fn namespaced_attribute(&self, namespace: &str, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, Some(namespace), name, None)
    }

    /// Text of a non-namespaced attribute, `None` when absent or null
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .map(Attribute::value)
            .filter(|v| !v.is_null())
            .map(ToString::to_string)
    }
}

#[derive(Debug, Clone)]
pub struct VariableBuilder {
    name: String,
    value_type: ValueType,
    entity_type: String,
    repeatable: bool,
    occurrence_group: Option<String>,
    unit: Option<String>,
    mime_type: Option<String>,
    referenced_entity_type: Option<String>,
    index: usize,
    categories: Vec<Category>,
    attributes: Vec<Attribute>,
}

impl VariableBuilder {
    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn occurrence_group(mut self, group: impl Into<String>) -> Self {
        self.occurrence_group = Some(group.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn referenced_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.referenced_entity_type = Some(entity_type.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Add plain categories by name
    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(names.into_iter().map(|name| Category {
            name: name.into(),
            code: None,
            missing: false,
            attributes: Vec::new(),
        }));
        self
    }

    /// Add a plain text attribute
    pub fn attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attribute(Attribute::text(name, value))
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> ModelResult<Variable> {
        if self.name.is_empty() {
            return Err(ModelError::missing("variable", "name"));
        }
        if self.entity_type.is_empty() {
            return Err(ModelError::missing(format!("variable {}", self.name), "entity type"));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.name == category.name) {
                return Err(ModelError::DuplicateCategory {
                    variable: self.name,
                    category: category.name.clone(),
                });
            }
        }
        Ok(Variable {
            name: self.name,
            value_type: self.value_type,
            entity_type: self.entity_type,
            repeatable: self.repeatable,
            occurrence_group: self.occurrence_group,
            unit: self.unit,
            mime_type: self.mime_type,
            referenced_entity_type: self.referenced_entity_type,
            index: self.index,
            categories: self.categories,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn participant_variable() -> VariableBuilder {
        Variable::builder("gender", ValueType::Text, "Participant")
    }

    #[test]
    fn test_attribute_lookup_by_namespace_and_locale() {
        let variable = participant_variable()
            .attribute("label", "Gender")
            .with_attribute(
                Attribute::builder("label")
                    .locale("fr")
                    .text("Sexe")
                    .build()
                    .unwrap(),
            )
            .with_attribute(
                Attribute::builder("source")
                    .namespace("ns1")
                    .text("questionnaire")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(variable.attribute_text("label").as_deref(), Some("Gender"));
        assert_eq!(
            variable
                .localised_attribute("label", "fr")
                .map(|a| a.value().to_string()),
            Some("Sexe".to_string())
        );
        assert!(variable.localised_attribute("label", "fr").unwrap().is_localised());
        assert!(!variable.has_attribute("source"));
        assert!(variable.has_namespaced_attribute("ns1", "source"));
    }

    #[test]
    fn test_categories_and_missing_values() {
        let variable = participant_variable()
            .categories(["F", "M"])
            .category(Category::builder("PNA").code("9999").missing(true).build().unwrap())
            .build()
            .unwrap();

        assert_eq!(variable.categories().len(), 3);
        assert_eq!(variable.category("PNA").and_then(Category::code), Some("9999"));
        assert!(variable.is_missing_value(&Value::text("PNA")));
        assert!(!variable.is_missing_value(&Value::text("F")));
        assert!(variable.is_missing_value(&ValueType::Text.null_value()));
    }

    #[test]
    fn test_build_rejects_missing_fields() {
        assert!(matches!(
            Variable::builder("", ValueType::Text, "Participant").build(),
            Err(ModelError::MissingArgument { .. })
        ));
        assert!(matches!(
            Variable::builder("gender", ValueType::Text, "").build(),
            Err(ModelError::MissingArgument { .. })
        ));
        assert!(matches!(
            participant_variable().categories(["F", "F"]).build(),
            Err(ModelError::DuplicateCategory { .. })
        ));
        assert!(Attribute::builder("label").build().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let variable = participant_variable()
            .repeatable(true)
            .occurrence_group("visits")
            .categories(["F", "M"])
            .attribute("label", "Gender")
            .build()
            .unwrap();
        let json = serde_json::to_string(&variable).unwrap();
        let back: Variable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, variable);
    }
}
