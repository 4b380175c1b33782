//! DateTime Functions
//!
//! Field extraction, calendar predicates, ordering against other instants and
//! pattern formatting. Every function takes a `date` or `datetime` subject and
//! follows the propagation law. Calendar conventions: months are 0-based,
//! weeks start on Sunday and week 1 of a year or month contains its first day.

use super::format::format_pattern;
use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use crate::operators::arithmetic::add_days;
use crate::registry::{Call, FunctionDefinition, FunctionRegistry, ReturnType};
use crate::temporal::instant;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc, Weekday};
use std::cmp::Ordering;
use tabula_types::{Value, ValueType};

pub(super) fn register(registry: &mut FunctionRegistry) {
    field(registry, "year", |dt| i64::from(dt.year()));
    field(registry, "month", |dt| i64::from(dt.month0()));
    field(registry, "dayOfMonth", |dt| i64::from(dt.day()));
    field(registry, "dayOfWeek", |dt| {
        i64::from(dt.weekday().number_from_sunday())
    });
    field(registry, "dayOfYear", |dt| i64::from(dt.ordinal()));
    field(registry, "weekOfYear", |dt| week_of_year(dt.date_naive()));
    field(registry, "weekOfMonth", |dt| week_of_month(dt.date_naive()));
    field(registry, "hour", |dt| i64::from(dt.hour() % 12));
    field(registry, "hourOfDay", |dt| i64::from(dt.hour()));
    field(registry, "minute", |dt| i64::from(dt.minute()));
    field(registry, "second", |dt| i64::from(dt.second()));
    field(registry, "millisecond", |dt| i64::from(dt.timestamp_subsec_millis()));

    flag(registry, "weekend", |dt| {
        matches!(dt.weekday(), Weekday::Sat | Weekday::Sun)
    });
    flag(registry, "weekday", |dt| {
        !matches!(dt.weekday(), Weekday::Sat | Weekday::Sun)
    });

    registry.register(
        FunctionDefinition::new("after", ReturnType::Fixed(ValueType::Boolean))
            .arguments(0, 2)
            .lifted()
            .with_implementation(|call, _ctx| compare_to_operands(call, Ordering::Greater)),
    );
    registry.register(
        FunctionDefinition::new("before", ReturnType::Fixed(ValueType::Boolean))
            .arguments(0, 2)
            .lifted()
            .with_implementation(|call, _ctx| compare_to_operands(call, Ordering::Less)),
    );

    registry.register(
        FunctionDefinition::new("addDays", ReturnType::Subject)
            .arguments(1, 1)
            .lifted()
            .with_implementation(|call, _ctx| {
                let days = call.args.first().map(Value::as_i64).transpose()?.flatten();
                match days {
                    Some(days) => add_days(call.function, call.scalar()?, days),
                    None => Ok(call.subject()?.value_type().null_value()),
                }
            }),
    );

    registry.register(
        FunctionDefinition::new("format", ReturnType::Fixed(ValueType::Text))
            .arguments(1, 2)
            .lifted()
            .with_implementation(format),
    );

    registry.register(
        FunctionDefinition::new("now", ReturnType::Fixed(ValueType::DateTime))
            .with_implementation(|_call, _ctx| Ok(Value::date_time(now()))),
    );
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn subject_instant(call: &Call<'_>) -> EvalResult<DateTime<FixedOffset>> {
    instant(call.function, call.scalar()?)
}

/// Register an integer field of the subject
fn field(registry: &mut FunctionRegistry, name: &str, extract: fn(&DateTime<FixedOffset>) -> i64) {
    registry.register(
        FunctionDefinition::new(name, ReturnType::Fixed(ValueType::Integer))
            .lifted()
            .with_implementation(move |call, _ctx| {
                Ok(Value::integer(extract(&subject_instant(call)?)))
            }),
    );
}

/// Register a boolean predicate on the subject
fn flag(registry: &mut FunctionRegistry, name: &str, test: fn(&DateTime<FixedOffset>) -> bool) {
    registry.register(
        FunctionDefinition::new(name, ReturnType::Fixed(ValueType::Boolean))
            .lifted()
            .with_implementation(move |call, _ctx| {
                Ok(Value::boolean(test(&subject_instant(call)?)))
            }),
    );
}

/// Week of the year, weeks starting on Sunday
///
/// Days of the last week of December that contains January 1st of the next
/// year belong to week 1.
pub(crate) fn week_of_year(date: NaiveDate) -> i64 {
    let offset = date.weekday().num_days_from_sunday();
    let end_of_week = date
        .checked_add_days(chrono::Days::new(u64::from(6 - offset)))
        .map_or(date.year(), |end| end.year());
    if end_of_week != date.year() {
        return 1;
    }
    let first_offset = date
        .with_ordinal0(0)
        .map_or(0, |first| first.weekday().num_days_from_sunday());
    i64::from((date.ordinal0() + first_offset) / 7 + 1)
}

/// Week of the month, weeks starting on Sunday
pub(crate) fn week_of_month(date: NaiveDate) -> i64 {
    let first_offset = date
        .with_day0(0)
        .map_or(0, |first| first.weekday().num_days_from_sunday());
    i64::from((date.day0() + first_offset) / 7 + 1)
}

/// Compare the subject with now, or with each operand
///
/// True only when the expected ordering holds for every operand; null when
/// any operand is null.
fn compare_to_operands(call: &Call<'_>, expected: Ordering) -> EvalResult<Value> {
    let subject = subject_instant(call)?;
    if call.args.is_empty() {
        return Ok(Value::boolean(subject.cmp(&now()) == expected));
    }
    let mut result = true;
    for arg in call.args {
        let Some(operand) = arg.scalar()? else {
            return Ok(ValueType::Boolean.null_value());
        };
        result &= subject.cmp(&instant(call.function, operand)?) == expected;
    }
    Ok(Value::boolean(result))
}

/// `format(pattern[, locale])`
fn format(call: &Call<'_>, ctx: &mut EvaluationContext) -> EvalResult<Value> {
    let Some(pattern) = call.arg(0).map(Value::as_str).transpose()?.flatten() else {
        return Ok(ValueType::Text.null_value());
    };
    // a null locale is the same as none
    let locale = call
        .arg(1)
        .map(Value::as_str)
        .transpose()?
        .flatten()
        .or_else(|| ctx.default_locale())
        .map(str::to_string);
    let dt = subject_instant(call)?;
    let text = format_pattern(&dt, pattern, locale.as_deref())
        .map_err(|message| EvalError::invalid_operand(call.function, message))?;
    Ok(Value::text(text))
}
