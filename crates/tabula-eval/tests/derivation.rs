//! Derived variable tests
//!
//! Covers:
//! - `$` references, joins across tables and across registered datasources
//! - Nested derived variables evaluated on one context stack
//! - Cyclic definitions hitting the depth limit
//! - Null and sequence propagation through derived variables

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabula_eval::*;
use tabula_model::tabula_types::{CalendarDate, RawValue, Value, ValueType};
use tabula_model::*;

fn variable(name: &str, value_type: ValueType) -> Variable {
    Variable::builder(name, value_type, "Participant").build().unwrap()
}

fn repeatable(name: &str, value_type: ValueType) -> Variable {
    Variable::builder(name, value_type, "Participant")
        .repeatable(true)
        .build()
        .unwrap()
}

fn date(year: i32, month: i32, day: i32) -> RawValue {
    CalendarDate::new(year, month, day).into()
}

fn study(name: &str) -> Arc<StaticDatasource> {
    StaticDatasource::builder(name)
        .table(
            StaticTable::builder("Participants", "Participant")
                .variable(variable("visit", ValueType::Date))
                .variable(repeatable("visits", ValueType::Date))
                .derived(variable("heavy", ValueType::Boolean), "$('Measures:weight') > 70")
                .derived_over(
                    repeatable("visitYears", ValueType::Integer),
                    "year()",
                    VariableReference::variable("visits"),
                )
                .derived_over(
                    variable("visitDay", ValueType::Integer),
                    "dayOfYear()",
                    VariableReference::variable("visit"),
                )
                .derived(variable("inner", ValueType::Text), "currentVariable()")
                .derived(
                    variable("outer", ValueType::Text),
                    "$('inner') + '/' + currentVariable()",
                )
                .derived(variable("ping", ValueType::Integer), "$('pong')")
                .derived(variable("pong", ValueType::Integer), "$('ping') + 1")
                .row(
                    "p1",
                    [
                        ("visit", date(2012, 2, 1)),
                        (
                            "visits",
                            RawValue::List(vec![date(2011, 4, 2), date(2012, 0, 9)]),
                        ),
                    ],
                )
                .row("p2", Vec::<(String, RawValue)>::new()),
        )
        .table(
            StaticTable::builder("Measures", "Participant")
                .variable(variable("weight", ValueType::Decimal))
                .row("p1", [("weight", 71.5)]),
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

fn derived(ds: &Arc<StaticDatasource>, id: &str, name: &str) -> ModelResult<Value> {
    let value_set = value_set(ds, id);
    value_set
        .table()
        .variable_value_source(name)?
        .value(&value_set)
}

// === References ===

#[test]
fn test_reference_joins_other_table() {
    let ds = study("derivation-join");
    assert_eq!(derived(&ds, "p1", "heavy").unwrap(), Value::boolean(true));
    // p2 has no row in Measures
    assert!(matches!(
        derived(&ds, "p2", "heavy"),
        Err(ModelError::NoSuchValueSet { .. })
    ));
}

#[test]
fn test_reference_to_registered_datasource() {
    let remote = study("derivation-remote");
    DatasourceRegistry::global().register(remote.clone()).unwrap();

    let local = study("derivation-local");
    let value_set = value_set(&local, "p1");
    let value = ScriptEngine::global()
        .evaluate_script(
            "$('derivation-remote.Measures:weight') * 2",
            &value_set,
        )
        .unwrap();
    assert_eq!(value.to_string(), "143");

    assert!(matches!(
        ScriptEngine::global().evaluate_script("$('nowhere.Measures:weight')", &value_set),
        Err(EvalError::Model(ModelError::NoSuchDatasource { .. }))
    ));
    DatasourceRegistry::global()
        .unregister("derivation-remote")
        .unwrap();
}

// === Nesting ===

#[test]
fn test_nested_derivation_shares_context_stack() {
    let ds = study("derivation-nested");
    assert_eq!(derived(&ds, "p1", "outer").unwrap(), Value::text("inner/outer"));
}

#[test]
fn test_context_is_restored_after_evaluation() {
    let ds = study("derivation-restore");
    let value_set = value_set(&ds, "p1");
    let source = ScriptVariableValueSource::with_script(
        Arc::new(variable("sample", ValueType::Text)),
        "$('outer')",
        ScriptEngine::global().clone(),
    );
    let mut ctx = ScriptEngine::global().new_context();
    assert_eq!(
        source.evaluate_in(&mut ctx, &value_set).unwrap(),
        Value::text("inner/outer")
    );
    assert_eq!(ctx.depth(), 0);
    assert!(ctx.frames().is_empty());
}

#[test]
fn test_cyclic_definition_hits_depth_limit() {
    let ds = study("derivation-cycle");
    let value_set = value_set(&ds, "p1");
    let source = value_set.table().variable_value_source("ping").unwrap();
    let script = source
        .as_any()
        .downcast_ref::<ScriptVariableValueSource>()
        .unwrap();
    assert!(matches!(
        script.evaluate(&value_set),
        Err(EvalError::RecursionLimit { max_depth: DEFAULT_MAX_DEPTH })
    ));
    assert!(matches!(
        source.value(&value_set),
        Err(ModelError::Derivation { .. })
    ));
}

#[test]
fn test_depth_limit_is_configurable() {
    let ds = study("derivation-shallow");
    let engine = ScriptEngine::with_config(EngineConfig::default().with_max_depth(1));
    let source = ScriptVariableValueSource::with_script(
        Arc::new(variable("sample", ValueType::Text)),
        "$('outer')",
        engine,
    );
    assert!(matches!(
        source.evaluate(&value_set(&ds, "p1")),
        Err(EvalError::RecursionLimit { max_depth: 1 })
    ));
}

// === Propagation ===

#[test]
fn test_sequence_subject_is_lifted() {
    let ds = study("derivation-sequence");
    let years = derived(&ds, "p1", "visitYears").unwrap();
    assert!(years.is_sequence());
    assert_eq!(years.to_string(), "2011,2012");
    assert_eq!(derived(&ds, "p2", "visitYears").unwrap(), ValueType::Integer.null_sequence());
}

#[test]
fn test_null_subject_propagates() {
    let ds = study("derivation-null");
    assert_eq!(derived(&ds, "p1", "visitDay").unwrap(), Value::integer(61));
    assert_eq!(derived(&ds, "p2", "visitDay").unwrap(), ValueType::Integer.null_value());
}
