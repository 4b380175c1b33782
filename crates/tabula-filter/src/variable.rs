//! Variable filters
//!
//! Used to select the variables of a table, e.g. when copying a table into
//! another datasource.

use crate::{Filter, FilterError, FilterKind, FilterResult};
use regex::Regex;
use std::sync::Arc;
use tabula_model::Variable;

/// How a text is compared
#[derive(Debug, Clone)]
enum TextMatcher {
    Exact(String),
    Pattern(Regex),
}

impl TextMatcher {
    fn pattern(pattern: &str) -> FilterResult<Self> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Self::Pattern)
            .map_err(|e| FilterError::pattern(pattern, e))
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == text,
            Self::Pattern(regex) => regex.is_match(text),
        }
    }
}

impl std::fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(text) => write!(f, "{:?}", text),
            Self::Pattern(regex) => write!(f, "/{}/", regex),
        }
    }
}

/// Matches variables by name
#[derive(Debug, Clone)]
pub struct VariableNameFilter {
    kind: FilterKind,
    name: TextMatcher,
}

impl VariableNameFilter {
    pub fn exact(kind: FilterKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: TextMatcher::Exact(name.into()),
        }
    }

    /// The pattern must match the whole name
    pub fn matching(kind: FilterKind, pattern: &str) -> FilterResult<Self> {
        Ok(Self {
            kind,
            name: TextMatcher::pattern(pattern)?,
        })
    }
}

impl Filter<Arc<Variable>> for VariableNameFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn matches(&self, item: &Arc<Variable>) -> FilterResult<Option<bool>> {
        Ok(Some(self.name.is_match(item.name())))
    }

    fn describe(&self) -> String {
        format!("{} variable name {}", self.kind, self.name)
    }
}

/// Matches variables carrying an attribute, optionally with a given value
///
/// A null attribute value never matches a value constraint.
#[derive(Debug, Clone)]
pub struct VariableAttributeFilter {
    kind: FilterKind,
    namespace: Option<String>,
    attribute: String,
    value: Option<TextMatcher>,
}

impl VariableAttributeFilter {
    pub fn builder(attribute: impl Into<String>) -> VariableAttributeFilterBuilder {
        VariableAttributeFilterBuilder {
            namespace: None,
            attribute: attribute.into(),
            value: None,
            pattern: None,
            kind: None,
        }
    }
}

impl Filter<Arc<Variable>> for VariableAttributeFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn matches(&self, item: &Arc<Variable>) -> FilterResult<Option<bool>> {
        let attribute = match &self.namespace {
            Some(namespace) => item.namespaced_attribute(namespace, &self.attribute),
            None => item.attribute(&self.attribute),
        };
        let Some(attribute) = attribute else {
            return Ok(Some(false));
        };
        Ok(Some(match &self.value {
            None => true,
            Some(_) if attribute.value().is_null() => false,
            Some(matcher) => matcher.is_match(&attribute.value().to_string()),
        }))
    }

    fn describe(&self) -> String {
        let name = match &self.namespace {
            Some(namespace) => format!("{}::{}", namespace, self.attribute),
            None => self.attribute.clone(),
        };
        match &self.value {
            Some(value) => format!("{} attribute {}={}", self.kind, name, value),
            None => format!("{} attribute {}", self.kind, name),
        }
    }
}

pub struct VariableAttributeFilterBuilder {
    namespace: Option<String>,
    attribute: String,
    value: Option<String>,
    pattern: Option<String>,
    kind: Option<FilterKind>,
}

impl VariableAttributeFilterBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Require this exact attribute value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Require an attribute value matching a pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn include(mut self) -> Self {
        self.kind = Some(FilterKind::Include);
        self
    }

    pub fn exclude(mut self) -> Self {
        self.kind = Some(FilterKind::Exclude);
        self
    }

    pub fn build(self) -> FilterResult<VariableAttributeFilter> {
        if self.attribute.is_empty() {
            return Err(FilterError::missing("attribute", "attribute name"));
        }
        let kind = self
            .kind
            .ok_or_else(|| FilterError::missing("attribute", "include or exclude"))?;
        let value = match (self.value, self.pattern) {
            (Some(value), None) => Some(TextMatcher::Exact(value)),
            (None, Some(pattern)) => Some(TextMatcher::pattern(&pattern)?),
            (None, None) => None,
            (Some(_), Some(_)) => {
                return Err(FilterError::missing("attribute", "either a value or a pattern, not both"));
            }
        };
        Ok(VariableAttributeFilter {
            kind,
            namespace: self.namespace,
            attribute: self.attribute,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterChain;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tabula_model::Attribute;
    use tabula_types::ValueType;

    fn variables() -> Vec<Arc<Variable>> {
        let build = |name: &str, stage: Option<&str>| {
            let mut builder = Variable::builder(name, ValueType::Text, "Participant");
            if let Some(stage) = stage {
                builder = builder.attribute("stage", stage);
            }
            Arc::new(builder.build().unwrap())
        };
        vec![
            build("age", Some("baseline")),
            build("weight", Some("followup")),
            build("height", None),
            build("age_group", Some("baseline")),
        ]
    }

    fn names(variables: &[Arc<Variable>]) -> Vec<&str> {
        variables.iter().map(|v| v.name()).collect()
    }

    #[rstest]
    #[case(VariableNameFilter::exact(FilterKind::Include, "age"), vec!["age"])]
    #[case(VariableNameFilter::matching(FilterKind::Include, "age.*").unwrap(), vec!["age", "age_group"])]
    #[case(VariableNameFilter::exact(FilterKind::Exclude, "age"), vec!["weight", "height", "age_group"])]
    fn test_name_filters(#[case] filter: VariableNameFilter, #[case] expected: Vec<&str>) {
        let chain = FilterChain::<Arc<Variable>>::new().with(filter);
        assert_eq!(names(&chain.apply(variables()).unwrap()), expected);
    }

    #[test]
    fn test_attribute_filters() {
        let present = VariableAttributeFilter::builder("stage").include().build().unwrap();
        let chain = FilterChain::<Arc<Variable>>::new().with(present);
        assert_eq!(
            names(&chain.apply(variables()).unwrap()),
            vec!["age", "weight", "age_group"]
        );

        let baseline = VariableAttributeFilter::builder("stage")
            .value("baseline")
            .exclude()
            .build()
            .unwrap();
        let chain = FilterChain::<Arc<Variable>>::new().with(baseline);
        assert_eq!(names(&chain.apply(variables()).unwrap()), vec!["weight", "height"]);

        let follow = VariableAttributeFilter::builder("stage")
            .pattern("follow.*")
            .include()
            .build()
            .unwrap();
        let chain = FilterChain::<Arc<Variable>>::new().with(follow);
        assert_eq!(names(&chain.apply(variables()).unwrap()), vec!["weight"]);
    }

    #[test]
    fn test_namespaced_attribute() {
        let variable = Arc::new(
            Variable::builder("bmi", ValueType::Decimal, "Participant")
                .with_attribute(
                    Attribute::builder("unit")
                        .namespace("qa")
                        .text("kg/m2")
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        );
        let namespaced = VariableAttributeFilter::builder("unit")
            .namespace("qa")
            .include()
            .build()
            .unwrap();
        let plain = VariableAttributeFilter::builder("unit").include().build().unwrap();
        assert_eq!(namespaced.matches(&variable).unwrap(), Some(true));
        assert_eq!(plain.matches(&variable).unwrap(), Some(false));
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            VariableAttributeFilter::builder("stage").build(),
            Err(FilterError::MissingArgument { .. })
        ));
        assert!(matches!(
            VariableAttributeFilter::builder("stage")
                .value("a")
                .pattern("b")
                .include()
                .build(),
            Err(FilterError::MissingArgument { .. })
        ));
        assert!(matches!(
            VariableAttributeFilter::builder("stage").pattern("[").include().build(),
            Err(FilterError::Pattern { .. })
        ));
    }
}
