//! Function registry for the script engine
//!
//! Maps function names to their definitions. Calls are resolved against the
//! registry when a script compiles, so an unknown name or a wrong number of
//! arguments is reported before any value set is evaluated.

use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabula_types::{Scalar, Value, ValueType};

/// Type alias for function implementations
pub type FunctionFn =
    Arc<dyn Fn(&Call<'_>, &mut EvaluationContext) -> EvalResult<Value> + Send + Sync>;

/// Evaluated operands of one function call
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    /// Name of the called function
    pub function: &'a str,
    /// The method receiver, otherwise the context subject
    pub subject: Option<&'a Value>,
    pub args: &'a [Value],
}

impl<'a> Call<'a> {
    /// The subject, failing when the call has none
    pub fn subject(&self) -> EvalResult<&'a Value> {
        self.subject
            .ok_or_else(|| EvalError::no_subject(self.function))
    }

    /// The non-null scalar subject of a lifted function
    pub fn scalar(&self) -> EvalResult<&'a Scalar> {
        self.subject()?
            .scalar()?
            .ok_or_else(|| EvalError::internal(format!("{} called with a null subject", self.function)))
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}

/// Type of a function's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Fixed(ValueType),
    /// Same type as the subject
    Subject,
}

impl ReturnType {
    pub fn resolve(&self, subject: ValueType) -> ValueType {
        match self {
            Self::Fixed(value_type) => *value_type,
            Self::Subject => subject,
        }
    }
}

/// Function definition for built-in and host functions
#[derive(Clone)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Minimum number of arguments
    pub min_args: usize,
    /// Maximum number of arguments
    pub max_args: usize,
    /// Return type
    pub return_type: ReturnType,
    /// Whether the engine applies null propagation and sequence lifting over the subject
    pub lifted: bool,
    /// Implementation (None for declared but unavailable functions)
    pub implementation: Option<FunctionFn>,
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("return_type", &self.return_type)
            .field("lifted", &self.lifted)
            .finish()
    }
}

impl FunctionDefinition {
    /// Create a new function definition taking no arguments
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            min_args: 0,
            max_args: 0,
            return_type,
            lifted: false,
            implementation: None,
        }
    }

    /// Set the accepted number of arguments
    pub fn arguments(mut self, min: usize, max: usize) -> Self {
        self.min_args = min;
        self.max_args = max.max(min);
        self
    }

    /// Apply the subject propagation law
    ///
    /// A null subject yields a null of the return type without calling the
    /// implementation, and a sequence subject is mapped element by element.
    pub fn lifted(mut self) -> Self {
        self.lifted = true;
        self
    }

    /// Set implementation
    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&Call<'_>, &mut EvaluationContext) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    /// Check the number of arguments of a call
    pub fn check_arity(&self, found: usize) -> EvalResult<()> {
        if (self.min_args..=self.max_args).contains(&found) {
            return Ok(());
        }
        let expected = if self.min_args == self.max_args {
            self.min_args.to_string()
        } else {
            format!("{} to {}", self.min_args, self.max_args)
        };
        Err(EvalError::Arity {
            name: self.name.clone(),
            expected,
            found,
        })
    }
}

/// Registry for function definitions
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<FunctionDefinition>>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in functions registered
    pub fn with_standard_functions() -> Self {
        let mut registry = Self::new();
        crate::functions::register_standard_functions(&mut registry);
        registry
    }

    /// Register a function, replacing any previous definition of that name
    pub fn register(&mut self, definition: FunctionDefinition) {
        self.functions
            .insert(definition.name.clone(), Arc::new(definition));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FunctionDefinition>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_messages() {
        let fixed = FunctionDefinition::new("year", ReturnType::Fixed(ValueType::Integer));
        assert!(fixed.check_arity(0).is_ok());
        let err = fixed.check_arity(1).unwrap_err();
        assert_eq!(err.to_string(), "Function year expects 0 arguments, found 1");

        let range = FunctionDefinition::new("after", ReturnType::Fixed(ValueType::Boolean))
            .arguments(0, 2);
        assert!(range.check_arity(2).is_ok());
        let err = range.check_arity(3).unwrap_err();
        assert_eq!(err.to_string(), "Function after expects 0 to 2 arguments, found 3");
    }

    #[test]
    fn test_standard_functions_registered() {
        let registry = FunctionRegistry::with_standard_functions();
        for name in [
            "year", "month", "dayOfMonth", "dayOfWeek", "dayOfYear", "weekOfYear",
            "weekOfMonth", "hour", "hourOfDay", "minute", "second", "millisecond",
            "weekend", "weekday", "after", "before", "format", "$", "newValue", "now",
            "isNull", "type", "size", "first", "last", "valueAt", "trim", "upper",
            "lower", "addDays", "currentVariable", "currentTable", "currentDatasource",
            "entityId", "entityType",
        ] {
            assert!(registry.contains(name), "{} is not registered", name);
            assert!(registry.get(name).unwrap().implementation.is_some());
        }
    }

    #[test]
    fn test_resolve_return_type() {
        assert_eq!(ReturnType::Subject.resolve(ValueType::Date), ValueType::Date);
        assert_eq!(
            ReturnType::Fixed(ValueType::Text).resolve(ValueType::Date),
            ValueType::Text
        );
    }
}
