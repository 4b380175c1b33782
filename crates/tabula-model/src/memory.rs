//! In-memory datasource
//!
//! Tables hold literal rows keyed by entity identifier. Stored variables read
//! their column from the rows; derived variables are any other value source
//! registered on the table.

use crate::{
    ColumnReader, ColumnValueSource, Datasource, ModelError, ModelResult, ValueSet, ValueTable,
    Variable, VariableEntity, VariableValueSource,
};
use indexmap::IndexMap;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tabula_types::RawValue;

type Row = IndexMap<String, RawValue>;

struct StaticRows {
    table: String,
    rows: IndexMap<VariableEntity, Row>,
}

impl ColumnReader for StaticRows {
    fn read(&self, value_set: &ValueSet, variable: &Variable) -> ModelResult<RawValue> {
        let row = self
            .rows
            .get(value_set.entity())
            .ok_or_else(|| ModelError::NoSuchValueSet {
                table: self.table.clone(),
                entity: value_set.entity().to_string(),
            })?;
        Ok(row.get(variable.name()).cloned().unwrap_or(RawValue::Null))
    }
}

pub struct StaticDatasource {
    name: String,
    tables: IndexMap<String, Arc<StaticTable>>,
    initialised: AtomicBool,
}

impl StaticDatasource {
    pub fn builder(name: impl Into<String>) -> StaticDatasourceBuilder {
        StaticDatasourceBuilder {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::Acquire)
    }
}

impl Datasource for StaticDatasource {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialise(&self) -> ModelResult<()> {
        if !self.initialised.swap(true, Ordering::AcqRel) {
            info!("Initialised datasource {} ({} tables)", self.name, self.tables.len());
        }
        Ok(())
    }

    fn dispose(&self) -> ModelResult<()> {
        if self.initialised.swap(false, Ordering::AcqRel) {
            info!("Disposed datasource {}", self.name);
        }
        Ok(())
    }

    fn value_tables(&self) -> Vec<Arc<dyn ValueTable>> {
        self.tables
            .values()
            .map(|table| table.clone() as Arc<dyn ValueTable>)
            .collect()
    }

    fn value_table(&self, name: &str) -> ModelResult<Arc<dyn ValueTable>> {
        self.tables
            .get(name)
            .map(|table| table.clone() as Arc<dyn ValueTable>)
            .ok_or_else(|| ModelError::NoSuchValueTable {
                name: name.to_string(),
            })
    }

    fn has_value_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

pub struct StaticTable {
    name: String,
    entity_type: String,
    datasource: Weak<StaticDatasource>,
    this: Weak<StaticTable>,
    rows: Arc<StaticRows>,
    variables: Vec<Arc<Variable>>,
    sources: IndexMap<String, Arc<dyn VariableValueSource>>,
}

impl StaticTable {
    pub fn builder(name: impl Into<String>, entity_type: impl Into<String>) -> StaticTableBuilder {
        StaticTableBuilder {
            name: name.into(),
            entity_type: entity_type.into(),
            stored: Vec::new(),
            derived: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl ValueTable for StaticTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn datasource(&self) -> ModelResult<Arc<dyn Datasource>> {
        self.datasource
            .upgrade()
            .map(|datasource| datasource as Arc<dyn Datasource>)
            .ok_or_else(|| ModelError::Detached {
                table: self.name.clone(),
            })
    }

    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn entities(&self) -> Vec<VariableEntity> {
        self.rows.rows.keys().cloned().collect()
    }

    fn has_value_set(&self, entity: &VariableEntity) -> bool {
        self.rows.rows.contains_key(entity)
    }

    fn value_set(&self, entity: &VariableEntity) -> ModelResult<ValueSet> {
        if !self.has_value_set(entity) {
            return Err(ModelError::NoSuchValueSet {
                table: self.name.clone(),
                entity: entity.to_string(),
            });
        }
        let table = self.this.upgrade().ok_or_else(|| ModelError::Detached {
            table: self.name.clone(),
        })?;
        Ok(ValueSet::new(table, entity.clone()))
    }

    fn variables(&self) -> Vec<Arc<Variable>> {
        self.variables.clone()
    }

    fn variable_value_source(&self, name: &str) -> ModelResult<Arc<dyn VariableValueSource>> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::no_such_variable(&self.name, name))
    }
}

pub struct StaticDatasourceBuilder {
    name: String,
    tables: Vec<StaticTableBuilder>,
}

impl StaticDatasourceBuilder {
    pub fn table(mut self, table: StaticTableBuilder) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(self) -> ModelResult<Arc<StaticDatasource>> {
        if self.name.is_empty() {
            return Err(ModelError::missing("datasource", "name"));
        }
        let mut validated = Vec::with_capacity(self.tables.len());
        for table in self.tables {
            if validated.iter().any(|valid: &ValidTable| valid.name == table.name) {
                return Err(ModelError::DuplicateValueTable {
                    datasource: self.name,
                    name: table.name,
                });
            }
            validated.push(table.validate()?);
        }
        debug!("Building static datasource {} with {} tables", self.name, validated.len());

        let name = self.name;
        Ok(Arc::new_cyclic(|datasource: &Weak<StaticDatasource>| {
            let tables = validated
                .into_iter()
                .map(|valid| {
                    let table = valid.into_table(datasource.clone());
                    (table.name.clone(), table)
                })
                .collect();
            StaticDatasource {
                name,
                tables,
                initialised: AtomicBool::new(false),
            }
        }))
    }
}

pub struct StaticTableBuilder {
    name: String,
    entity_type: String,
    stored: Vec<Variable>,
    derived: Vec<Arc<dyn VariableValueSource>>,
    rows: Vec<(String, Row)>,
}

impl StaticTableBuilder {
    /// A stored variable whose values come from the rows
    pub fn variable(mut self, variable: Variable) -> Self {
        self.stored.push(variable);
        self
    }

    /// A derived variable computed by its own value source
    pub fn source(mut self, source: Arc<dyn VariableValueSource>) -> Self {
        self.derived.push(source);
        self
    }

    /// A row of raw values by variable name; identifiers are unique per table
    pub fn row<I, K, V>(mut self, identifier: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        let row = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.rows.push((identifier.into(), row));
        self
    }

    fn validate(self) -> ModelResult<ValidTable> {
        if self.name.is_empty() {
            return Err(ModelError::missing("table", "name"));
        }
        let mut names: Vec<&str> = Vec::new();
        let variable_names = self
            .stored
            .iter()
            .map(|v| v.name())
            .chain(self.derived.iter().map(|s| s.variable().name()));
        for name in variable_names {
            if names.contains(&name) {
                return Err(ModelError::DuplicateVariable {
                    table: self.name.clone(),
                    name: name.to_string(),
                });
            }
            names.push(name);
        }

        let entity_type = self.entity_type;
        let mut rows = IndexMap::with_capacity(self.rows.len());
        for (identifier, row) in self.rows {
            let entity = VariableEntity::new(&entity_type, identifier);
            if rows.contains_key(&entity) {
                return Err(ModelError::DuplicateRow {
                    table: self.name,
                    identifier: entity.identifier().to_string(),
                });
            }
            rows.insert(entity, row);
        }
        Ok(ValidTable {
            rows: Arc::new(StaticRows {
                table: self.name.clone(),
                rows,
            }),
            name: self.name,
            entity_type,
            stored: self.stored,
            derived: self.derived,
        })
    }
}

struct ValidTable {
    name: String,
    entity_type: String,
    rows: Arc<StaticRows>,
    stored: Vec<Variable>,
    derived: Vec<Arc<dyn VariableValueSource>>,
}

impl ValidTable {
    fn into_table(self, datasource: Weak<StaticDatasource>) -> Arc<StaticTable> {
        let reader: Arc<dyn ColumnReader> = self.rows.clone();
        let mut variables = Vec::new();
        let mut sources: IndexMap<String, Arc<dyn VariableValueSource>> = IndexMap::new();
        for variable in self.stored {
            let variable = Arc::new(variable);
            let source = Arc::new(ColumnValueSource::new(variable.clone(), reader.clone()));
            sources.insert(variable.name().to_string(), source);
            variables.push(variable);
        }
        for source in self.derived {
            let variable = source.variable().clone();
            sources.insert(variable.name().to_string(), source);
            variables.push(variable);
        }
        Arc::new_cyclic(|this| StaticTable {
            name: self.name,
            entity_type: self.entity_type,
            datasource,
            this: this.clone(),
            rows: self.rows,
            variables,
            sources,
        })
    }
}
