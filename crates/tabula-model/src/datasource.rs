//! Backend contracts: datasources, value tables and value sets

use crate::{ModelError, ModelResult, Variable, VariableEntity, VariableValueSource};
use std::fmt;
use std::sync::Arc;

/// Owner of value tables and unit of connection lifecycle
pub trait Datasource: Send + Sync {
    fn name(&self) -> &str;

    /// Open backend resources; called once on registration
    fn initialise(&self) -> ModelResult<()> {
        Ok(())
    }

    /// Release backend resources; called once on shutdown
    fn dispose(&self) -> ModelResult<()> {
        Ok(())
    }

    fn value_tables(&self) -> Vec<Arc<dyn ValueTable>>;

    fn value_table(&self, name: &str) -> ModelResult<Arc<dyn ValueTable>> {
        self.value_tables()
            .into_iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| ModelError::NoSuchValueTable {
                name: name.to_string(),
            })
    }

    fn has_value_table(&self, name: &str) -> bool {
        self.value_tables().iter().any(|table| table.name() == name)
    }
}

/// A named set of rows sharing one entity type and one variable schema
pub trait ValueTable: Send + Sync {
    fn name(&self) -> &str;

    /// The owning datasource
    fn datasource(&self) -> ModelResult<Arc<dyn Datasource>>;

    fn entity_type(&self) -> &str;

    fn entities(&self) -> Vec<VariableEntity>;

    fn has_value_set(&self, entity: &VariableEntity) -> bool {
        entity.entity_type() == self.entity_type() && self.entities().contains(entity)
    }

    /// The row of one entity; fails with `NoSuchValueSet` when absent
    fn value_set(&self, entity: &VariableEntity) -> ModelResult<ValueSet>;

    fn value_sets(&self) -> ModelResult<Vec<ValueSet>> {
        self.entities()
            .iter()
            .map(|entity| self.value_set(entity))
            .collect()
    }

    fn variables(&self) -> Vec<Arc<Variable>>;

    fn variable(&self, name: &str) -> ModelResult<Arc<Variable>> {
        self.variables()
            .into_iter()
            .find(|variable| variable.name() == name)
            .ok_or_else(|| ModelError::no_such_variable(self.name(), name))
    }

    fn variable_value_source(&self, name: &str) -> ModelResult<Arc<dyn VariableValueSource>>;
}

/// One entity's row in one table
#[derive(Clone)]
pub struct ValueSet {
    table: Arc<dyn ValueTable>,
    entity: VariableEntity,
}

impl ValueSet {
    pub fn new(table: Arc<dyn ValueTable>, entity: VariableEntity) -> Self {
        Self { table, entity }
    }

    pub fn table(&self) -> &Arc<dyn ValueTable> {
        &self.table
    }

    pub fn entity(&self) -> &VariableEntity {
        &self.entity
    }

    /// Whether both value sets belong to the very same table instance
    pub fn same_table(&self, other: &Arc<dyn ValueTable>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.table), Arc::as_ptr(other))
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSet")
            .field("table", &self.table.name())
            .field("entity", &self.entity)
            .finish()
    }
}
