//! Script filters over value sets
//!
//! The script must yield a boolean. A null result means the script has no
//! opinion about the value set.

use crate::{Filter, FilterError, FilterKind, FilterResult};
use tabula_eval::{ScriptEngine, ScriptValueSource};
use tabula_model::ValueSet;
use tabula_types::ValueType;

#[derive(Debug)]
pub struct ScriptFilter {
    kind: FilterKind,
    source: ScriptValueSource,
}

impl ScriptFilter {
    pub fn builder() -> ScriptFilterBuilder {
        ScriptFilterBuilder::default()
    }

    pub fn script(&self) -> &str {
        self.source.script()
    }
}

impl Filter<ValueSet> for ScriptFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn matches(&self, item: &ValueSet) -> FilterResult<Option<bool>> {
        let value = self.source.evaluate(item)?;
        if value.is_sequence() {
            return Err(FilterError::NotBoolean {
                found: format!("{} sequence", value.value_type()),
            });
        }
        let value = ValueType::Boolean.convert(&value).map_err(|_| FilterError::NotBoolean {
            found: value.value_type().to_string(),
        })?;
        Ok(value.as_bool().map_err(tabula_eval::EvalError::from)?)
    }

    fn describe(&self) -> String {
        format!("{} script[{}]", self.kind, self.source.script())
    }
}

#[derive(Debug, Default)]
pub struct ScriptFilterBuilder {
    script: Option<String>,
    kind: Option<FilterKind>,
    engine: Option<ScriptEngine>,
}

impl ScriptFilterBuilder {
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
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

    /// Engine running the script, the global engine when not set
    pub fn engine(mut self, engine: ScriptEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build and compile the filter
    pub fn build(self) -> FilterResult<ScriptFilter> {
        let script = self
            .script
            .ok_or_else(|| FilterError::missing("script", "script"))?;
        let kind = self
            .kind
            .ok_or_else(|| FilterError::missing("script", "include or exclude"))?;
        let engine = self
            .engine
            .unwrap_or_else(|| ScriptEngine::global().clone());
        let source = ScriptValueSource::new(script, engine);
        source.initialise()?;
        Ok(ScriptFilter { kind, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tabula_eval::EvalError;
    use tabula_model::{Datasource, StaticDatasource, StaticTable, Variable, VariableEntity};

    fn datasource() -> Arc<StaticDatasource> {
        let age = Variable::builder("age", ValueType::Integer, "Participant")
            .build()
            .unwrap();
        StaticDatasource::builder("filters")
            .table(
                StaticTable::builder("Participants", "Participant")
                    .variable(age)
                    .row("p1", [("age", 34i64)])
                    .row("p2", [("age", 70i64)])
                    .row("p3", Vec::<(String, i64)>::new()),
            )
            .build()
            .unwrap()
    }

    fn value_set(ds: &Arc<StaticDatasource>, id: &str) -> ValueSet {
        ds.value_table("Participants")
            .unwrap()
            .value_set(&VariableEntity::new("Participant", id))
            .unwrap()
    }

    fn filter(script: &str) -> ScriptFilter {
        ScriptFilter::builder().script(script).include().build().unwrap()
    }

    #[test]
    fn test_script_outcomes() {
        let ds = datasource();
        let adult = filter("$('age') >= 65");
        assert_eq!(adult.matches(&value_set(&ds, "p1")).unwrap(), Some(false));
        assert_eq!(adult.matches(&value_set(&ds, "p2")).unwrap(), Some(true));
        // null age: no opinion
        assert_eq!(adult.matches(&value_set(&ds, "p3")).unwrap(), None);
    }

    #[test]
    fn test_text_booleans_are_converted() {
        let ds = datasource();
        assert_eq!(filter("'true'").matches(&value_set(&ds, "p1")).unwrap(), Some(true));
        assert!(matches!(
            filter("'maybe'").matches(&value_set(&ds, "p1")),
            Err(FilterError::NotBoolean { .. })
        ));
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            ScriptFilter::builder().include().build(),
            Err(FilterError::MissingArgument { .. })
        ));
        assert!(matches!(
            ScriptFilter::builder().script("true").build(),
            Err(FilterError::MissingArgument { .. })
        ));
        assert!(matches!(
            ScriptFilter::builder().script("nope()").exclude().build(),
            Err(FilterError::Eval(EvalError::UndefinedFunction { .. }))
        ));
    }
}
