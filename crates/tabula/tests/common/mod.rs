//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use std::sync::Arc;
use tabula::prelude::*;

pub fn variable(name: &str, value_type: ValueType) -> Variable {
    Variable::builder(name, value_type, "Participant")
        .build()
        .unwrap()
}

/// A study with stored visit dates and weights, and derived variables over them
///
/// Participants `p0` to `p{count - 1}` visit on consecutive days from 2012-03-01;
/// every third participant has no weight.
pub fn study(name: &str, count: usize) -> Arc<StaticDatasource> {
    let mut participants = StaticTable::builder("Participants", "Participant")
        .variable(variable("visit", ValueType::Date))
        .derived_over(
            variable("age", ValueType::Integer),
            "dayOfYear()",
            VariableReference::variable("visit"),
        )
        .derived(
            variable("summary", ValueType::Text),
            "entityId() + ':' + $('age') + ':' + $('Measures:weight').isNull()",
        );
    let mut measures =
        StaticTable::builder("Measures", "Participant").variable(variable("weight", ValueType::Decimal));

    for i in 0..count {
        let id = format!("p{}", i);
        let day = i32::try_from(i).unwrap() + 1;
        participants = participants.row(&id, [("visit", CalendarDate::new(2012, 2, day))]);
        let weight = if i % 3 == 0 {
            RawValue::Null
        } else {
            RawValue::Integer(60 + i64::try_from(i).unwrap())
        };
        measures = measures.row(&id, [("weight", weight)]);
    }

    StaticDatasource::builder(name)
        .table(participants)
        .table(measures)
        .build()
        .unwrap()
}

pub fn value_set(ds: &Arc<StaticDatasource>, table: &str, id: &str) -> ValueSet {
    ds.value_table(table)
        .unwrap()
        .value_set(&VariableEntity::new("Participant", id))
        .unwrap()
}

pub fn value_of(ds: &Arc<StaticDatasource>, id: &str, variable: &str) -> ModelResult<Value> {
    let value_set = value_set(ds, "Participants", id);
    value_set
        .table()
        .variable_value_source(variable)?
        .value(&value_set)
}
