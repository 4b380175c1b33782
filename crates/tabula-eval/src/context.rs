//! Resolution context for script evaluation
//!
//! The context is a stack of frames. Evaluating a script pushes the
//! datasource, table, variable and value set it runs against; built-ins read
//! the topmost frame of each kind. Frames are pushed through a
//! [`ContextScope`] guard that pops exactly what it pushed when dropped, so
//! early returns and errors leave the stack as they found it.

use crate::config::EngineConfig;
use crate::error::{EvalError, EvalResult};
use log::trace;
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tabula_model::{Datasource, ValueSet, ValueTable, Variable};
use tabula_types::Value;

/// One entry of the resolution stack
#[derive(Clone)]
pub enum Frame {
    Datasource(Arc<dyn Datasource>),
    Table(Arc<dyn ValueTable>),
    Variable(Arc<Variable>),
    ValueSet(ValueSet),
    /// The value `this` and subject-less calls operate on
    Subject(Value),
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datasource(ds) => write!(f, "Datasource({})", ds.name()),
            Self::Table(table) => write!(f, "Table({})", table.name()),
            Self::Variable(variable) => write!(f, "Variable({})", variable.name()),
            Self::ValueSet(value_set) => write!(f, "ValueSet({})", value_set.entity()),
            Self::Subject(value) => write!(f, "Subject({})", value),
        }
    }
}

/// Evaluation state of one call chain; never shared between threads
#[derive(Debug)]
pub struct EvaluationContext {
    frames: SmallVec<[Frame; 8]>,
    depth: usize,
    max_depth: usize,
    default_locale: Option<String>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    /// Create an empty context with default settings
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            frames: SmallVec::new(),
            depth: 0,
            max_depth: config.max_depth,
            default_locale: config.default_locale.clone(),
        }
    }

    /// Enter the evaluation of a script against a value set
    ///
    /// Pushes the datasource, table, optional variable and value set frames,
    /// in that order, and counts one level of nesting.
    pub fn enter(
        &mut self,
        value_set: &ValueSet,
        variable: Option<Arc<Variable>>,
    ) -> EvalResult<ContextScope<'_>> {
        if self.depth >= self.max_depth {
            return Err(EvalError::RecursionLimit {
                max_depth: self.max_depth,
            });
        }
        let datasource = value_set.table().datasource()?;
        let mark = self.frames.len();
        self.depth += 1;
        trace!(
            "Entering {}:{} for {} at depth {}",
            value_set.table().name(),
            variable.as_ref().map_or("<script>", |v| v.name()),
            value_set.entity(),
            self.depth
        );

        self.frames.push(Frame::Datasource(datasource));
        self.frames.push(Frame::Table(value_set.table().clone()));
        if let Some(variable) = variable {
            self.frames.push(Frame::Variable(variable));
        }
        self.frames.push(Frame::ValueSet(value_set.clone()));

        Ok(ContextScope {
            context: self,
            mark,
            nested: true,
        })
    }

    /// Push a subject for `this` and subject-less calls
    pub fn push_subject(&mut self, subject: Value) -> ContextScope<'_> {
        trace!("Pushing subject {}", subject);
        let mark = self.frames.len();
        self.frames.push(Frame::Subject(subject));
        ContextScope {
            context: self,
            mark,
            nested: false,
        }
    }

    fn top<T>(&self, select: impl Fn(&Frame) -> Option<&T>) -> Option<&T> {
        self.frames.iter().rev().find_map(select)
    }

    pub fn current_datasource(&self) -> Option<&Arc<dyn Datasource>> {
        self.top(|frame| match frame {
            Frame::Datasource(ds) => Some(ds),
            _ => None,
        })
    }

    pub fn current_table(&self) -> Option<&Arc<dyn ValueTable>> {
        self.top(|frame| match frame {
            Frame::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn current_variable(&self) -> Option<&Arc<Variable>> {
        self.top(|frame| match frame {
            Frame::Variable(variable) => Some(variable),
            _ => None,
        })
    }

    pub fn current_value_set(&self) -> Option<&ValueSet> {
        self.top(|frame| match frame {
            Frame::ValueSet(value_set) => Some(value_set),
            _ => None,
        })
    }

    /// The innermost subject, if any
    ///
    /// A subject pushed by an outer evaluation is hidden once a nested
    /// evaluation enters another value set.
    pub fn subject(&self) -> Option<&Value> {
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Subject(value) => return Some(value),
                Frame::ValueSet(_) => return None,
                _ => {}
            }
        }
        None
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of nested evaluations currently entered
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }
}

/// Guard popping the frames pushed by [`EvaluationContext::enter`] or
/// [`EvaluationContext::push_subject`]
pub struct ContextScope<'a> {
    context: &'a mut EvaluationContext,
    mark: usize,
    nested: bool,
}

impl Deref for ContextScope<'_> {
    type Target = EvaluationContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.context.frames.truncate(self.mark);
        if self.nested {
            self.context.depth -= 1;
        }
        trace!(
            "Popped to {} frames at depth {}",
            self.context.frames.len(),
            self.context.depth
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_model::{StaticDatasource, StaticTable, VariableEntity};
    use tabula_types::ValueType;

    fn value_set() -> ValueSet {
        let ds = StaticDatasource::builder("context-tests")
            .table(
                StaticTable::builder("Participants", "Participant")
                    .variable(
                        Variable::builder("age", ValueType::Integer, "Participant")
                            .build()
                            .unwrap(),
                    )
                    .row("p1", [("age", 42i64)]),
            )
            .build()
            .unwrap();
        ds.value_table("Participants")
            .unwrap()
            .value_set(&VariableEntity::new("Participant", "p1"))
            .unwrap()
    }

    #[test]
    fn test_enter_pushes_frames_in_order() {
        let value_set = value_set();
        let variable = value_set.table().variable("age").unwrap();
        let mut ctx = EvaluationContext::new();
        {
            let scope = ctx.enter(&value_set, Some(variable)).unwrap();
            let kinds: Vec<String> = scope.frames().iter().map(|f| format!("{:?}", f)).collect();
            assert_eq!(
                kinds,
                vec![
                    "Datasource(context-tests)",
                    "Table(Participants)",
                    "Variable(age)",
                    "ValueSet(Participant:p1)",
                ]
            );
            assert_eq!(scope.depth(), 1);
            assert_eq!(scope.current_variable().unwrap().name(), "age");
        }
        assert!(ctx.frames().is_empty());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_scope_pops_on_error_path() {
        fn failing(ctx: &mut EvaluationContext, value_set: &ValueSet) -> EvalResult<()> {
            let mut scope = ctx.enter(value_set, None)?;
            let _subject = scope.push_subject(Value::integer(1));
            Err(EvalError::DivisionByZero)
        }

        let value_set = value_set();
        let mut ctx = EvaluationContext::new();
        assert!(failing(&mut ctx, &value_set).is_err());
        assert!(ctx.frames().is_empty());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let value_set = value_set();
        let mut ctx = EvaluationContext::with_config(&EngineConfig::default().with_max_depth(1));
        let mut scope = ctx.enter(&value_set, None).unwrap();
        assert!(matches!(
            scope.enter(&value_set, None),
            Err(EvalError::RecursionLimit { max_depth: 1 })
        ));
    }

    #[test]
    fn test_subject_is_scoped_to_value_set() {
        let value_set = value_set();
        let mut ctx = EvaluationContext::new();
        let mut outer = ctx.enter(&value_set, None).unwrap();
        let mut subject = outer.push_subject(Value::integer(7));
        assert_eq!(subject.subject(), Some(&Value::integer(7)));

        let nested = subject.enter(&value_set, None).unwrap();
        assert_eq!(nested.subject(), None);
    }
}
