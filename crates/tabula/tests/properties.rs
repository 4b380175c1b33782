//! Property tests for the propagation of nulls and sequences through built-ins

use proptest::prelude::*;
use tabula::prelude::*;

fn evaluate(script: &str, subject: Value) -> Result<Value, EvalError> {
    let engine = ScriptEngine::global();
    let program = engine.compile(script)?;
    let mut ctx = engine.new_context();
    let mut scope = ctx.push_subject(subject);
    engine.evaluate(&program, &mut scope)
}

const DATE_FUNCTIONS: [&str; 8] = [
    "year()",
    "month()",
    "dayOfMonth()",
    "dayOfWeek()",
    "dayOfYear()",
    "weekOfYear()",
    "weekOfMonth()",
    "weekend()",
];

fn date() -> impl Strategy<Value = CalendarDate> {
    (1900i32..2100, 0i32..12, 1i32..29).prop_map(|(y, m, d)| CalendarDate::new(y, m, d))
}

proptest! {
    #[test]
    fn test_sequences_are_lifted_element_wise(
        dates in prop::collection::vec(date(), 0..6),
        function in 0usize..DATE_FUNCTIONS.len(),
    ) {
        let script = DATE_FUNCTIONS[function];
        let sequence = ValueType::Date
            .sequence_of(dates.iter().copied().map(Value::date))
            .unwrap();
        let lifted = evaluate(script, sequence).unwrap();
        prop_assert!(lifted.is_sequence());

        let expected: Vec<Value> = dates
            .iter()
            .map(|d| evaluate(script, Value::date(*d)).unwrap())
            .collect();
        prop_assert_eq!(lifted.elements().unwrap().unwrap_or_default(), expected.as_slice());
    }

    #[test]
    fn test_nulls_propagate(function in 0usize..DATE_FUNCTIONS.len()) {
        let script = DATE_FUNCTIONS[function];
        let result = evaluate(script, ValueType::Date.null_value()).unwrap();
        prop_assert!(result.is_null());
        prop_assert!(!result.is_sequence());
    }

    #[test]
    fn test_text_round_trip(year in 1900i32..2100, month in 0i32..12, day in 1i32..29) {
        let date = Value::date(CalendarDate::new(year, month, day));
        let text = ValueType::Text.convert(&date).unwrap();
        let back = ValueType::for_name("date").unwrap().convert(&text).unwrap();
        prop_assert_eq!(back, date);
    }
}
