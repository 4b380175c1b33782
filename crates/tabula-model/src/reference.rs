//! Variable references and their resolution against a value set
//!
//! A reference names a variable, optionally qualified by a table and a
//! datasource: `variable`, `table:variable` or `datasource.table:variable`.
//! Missing qualifiers are taken from the context value set.

use crate::{
    DatasourceRegistry, ModelError, ModelResult, ValueSet, ValueTable, VariableValueSource,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tabula_types::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableReference {
    datasource: Option<String>,
    table: Option<String>,
    variable: String,
}

impl VariableReference {
    /// A reference to a variable of the context table
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            datasource: None,
            table: None,
            variable: name.into(),
        }
    }

    pub fn qualified(
        datasource: Option<String>,
        table: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            datasource,
            table: Some(table.into()),
            variable: variable.into(),
        }
    }

    pub fn parse(reference: &str) -> ModelResult<Self> {
        let invalid = || ModelError::InvalidReference {
            reference: reference.to_string(),
        };
        let reference = reference.trim();
        let Some((qualifier, variable)) = reference.split_once(':') else {
            if reference.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::variable(reference));
        };
        let (datasource, table) = match qualifier.split_once('.') {
            Some((datasource, table)) => (Some(datasource), table),
            None => (None, qualifier),
        };
        if variable.is_empty() || table.is_empty() || datasource.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self::qualified(
            datasource.map(str::to_string),
            table,
            variable,
        ))
    }

    pub fn datasource_name(&self) -> Option<&str> {
        self.datasource.as_deref()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn variable_name(&self) -> &str {
        &self.variable
    }

    /// The referenced table, using `context` for missing qualifiers
    pub fn resolve_table(&self, context: Option<&ValueSet>) -> ModelResult<Arc<dyn ValueTable>> {
        let Some(table) = &self.table else {
            return context
                .map(|vs| vs.table().clone())
                .ok_or(ModelError::NoContext);
        };
        let datasource = match &self.datasource {
            Some(name) => DatasourceRegistry::global().datasource(name)?,
            None => context.ok_or(ModelError::NoContext)?.table().datasource()?,
        };
        datasource.value_table(table)
    }

    /// Whether the referenced table differs from the context's table
    pub fn is_join(&self, context: &ValueSet) -> ModelResult<bool> {
        let table = self.resolve_table(Some(context))?;
        Ok(!context.same_table(&table))
    }

    /// The context entity's value set in the referenced table
    pub fn join(&self, context: &ValueSet) -> ModelResult<ValueSet> {
        let table = self.resolve_table(Some(context))?;
        if context.same_table(&table) {
            return Ok(context.clone());
        }
        table.value_set(context.entity())
    }

    pub fn resolve_source(&self, context: &ValueSet) -> ModelResult<Arc<dyn VariableValueSource>> {
        self.resolve_table(Some(context))?
            .variable_value_source(&self.variable)
    }

    /// Value of the referenced variable for the context entity
    pub fn value(&self, context: &ValueSet) -> ModelResult<Value> {
        let joined = self.join(context)?;
        joined
            .table()
            .variable_value_source(&self.variable)?
            .value(&joined)
    }
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(datasource) = &self.datasource {
            write!(f, "{}.", datasource)?;
        }
        if let Some(table) = &self.table {
            write!(f, "{}:", table)?;
        }
        f.write_str(&self.variable)
    }
}

impl FromStr for VariableReference {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}
