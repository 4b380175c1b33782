//! Evaluator benchmarks using divan
//!
//! Benchmarks for script compilation and evaluation against value sets.

use std::sync::Arc;
use tabula::prelude::*;

fn main() {
    divan::main();
}

fn study() -> Arc<StaticDatasource> {
    let visit = Variable::builder("visit", ValueType::Date, "Participant")
        .build()
        .unwrap();
    let weight = Variable::builder("weight", ValueType::Decimal, "Participant")
        .build()
        .unwrap();
    let age = Variable::builder("age", ValueType::Integer, "Participant")
        .build()
        .unwrap();
    StaticDatasource::builder("bench")
        .table(
            StaticTable::builder("Participants", "Participant")
                .variable(visit)
                .variable(weight)
                .derived_over(age, "dayOfYear()", VariableReference::variable("visit"))
                .row("p1", [("visit", RawValue::from("2012-03-01")), ("weight", RawValue::from(72.5))]),
        )
        .build()
        .unwrap()
}

fn value_set(ds: &Arc<StaticDatasource>) -> ValueSet {
    ds.value_table("Participants")
        .unwrap()
        .value_set(&VariableEntity::new("Participant", "p1"))
        .unwrap()
}

// === Compilation Benchmarks ===

mod compile {
    use super::*;

    #[divan::bench(args = ["1 + 2 * 3", "$('visit').dayOfYear() > 60 ? 'late' : 'early'"])]
    fn script(bencher: divan::Bencher, source: &str) {
        let engine = ScriptEngine::global();
        bencher.bench_local(|| engine.compile(divan::black_box(source)).unwrap());
    }
}

// === Evaluation Benchmarks ===

mod evaluate {
    use super::*;

    #[divan::bench(args = [
        "1 + 2 * 3",
        "$('weight') * 2 > 100",
        "$('visit').format('yyyy-MM-dd')",
        "$('age') + 1",
    ])]
    fn compiled(bencher: divan::Bencher, source: &str) {
        let ds = study();
        let value_set = value_set(&ds);
        let source = ScriptValueSource::new(source, ScriptEngine::global().clone());
        source.initialise().unwrap();
        bencher.bench_local(|| source.evaluate(divan::black_box(&value_set)).unwrap());
    }

    #[divan::bench]
    fn derived_variable(bencher: divan::Bencher) {
        let ds = study();
        let value_set = value_set(&ds);
        let age = value_set.table().variable_value_source("age").unwrap();
        bencher.bench_local(|| age.value(divan::black_box(&value_set)).unwrap());
    }
}

// === Filter Benchmarks ===

mod filters {
    use super::*;

    #[divan::bench]
    fn script_filter_chain(bencher: divan::Bencher) {
        let ds = study();
        let value_set = value_set(&ds);
        let chain = FilterChain::<ValueSet>::new()
            .with(
                ScriptFilter::builder()
                    .script("$('weight') > 70")
                    .include()
                    .build()
                    .unwrap(),
            )
            .with(EntityIdFilter::exclude("x.*").unwrap());
        bencher.bench_local(|| chain.is_included(divan::black_box(&value_set)).unwrap());
    }
}
