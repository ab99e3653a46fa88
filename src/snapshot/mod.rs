//! Execution trace: frames and console output
//!
//! A [`Frame`] is an immutable record of one execution step. Frames are only
//! ever appended through [`FrameRecorder::record`], which stamps the next
//! logical time and deep-clones every value it is handed, so a recorded frame
//! never changes when the program later mutates an array or object.
//!
//! `time` starts at 0 and advances by one per frame; `time_in_ms` is the same
//! number expressed in milliseconds for timeline-based consumers.

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{Location, NodeType};
use std::collections::BTreeMap;
use std::fmt;

/// Milliseconds of timeline per frame.
pub const TIME_SCALE_MS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Success,
    Error,
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStatus::Success => f.pad("SUCCESS"),
            FrameStatus::Error => f.pad("ERROR"),
        }
    }
}

/// What an expression statement did, for describers.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionDetail {
    Call { callee: String, args: Vec<Value> },
    Assignment { target: String },
    Update { target: String, operator: &'static str, previous: Value },
    Binary { operator: &'static str },
    Other,
}

/// Payload of a frame, one shape per kind of step.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Expression {
        value: Value,
        detail: ExpressionDetail,
    },
    VariableDeclaration {
        name: String,
        value: Value,
        is_const: bool,
    },
    IfCondition {
        value: Value,
    },
    WhileCondition {
        value: Value,
        iteration: usize,
    },
    ForCondition {
        value: Value,
        iteration: usize,
    },
    ForUpdate {
        value: Value,
        iteration: usize,
    },
    ForOfIteration {
        variable: String,
        value: Value,
        index: usize,
    },
    ForInIteration {
        variable: String,
        key: String,
        index: usize,
    },
    /// A `for...of` / `for...in` over an empty collection
    EmptyIteration {
        collection: Value,
    },
    RepeatIteration {
        iteration: usize,
        count: Option<usize>,
    },
    Return {
        value: Option<Value>,
    },
    Break,
    Continue,
}

impl EvaluationResult {
    /// The main value this step produced, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            EvaluationResult::Expression { value, .. }
            | EvaluationResult::VariableDeclaration { value, .. }
            | EvaluationResult::IfCondition { value }
            | EvaluationResult::WhileCondition { value, .. }
            | EvaluationResult::ForCondition { value, .. }
            | EvaluationResult::ForUpdate { value, .. }
            | EvaluationResult::ForOfIteration { value, .. }
            | EvaluationResult::EmptyIteration { collection: value } => Some(value),
            EvaluationResult::Return { value } => value.as_ref(),
            EvaluationResult::ForInIteration { .. }
            | EvaluationResult::RepeatIteration { .. }
            | EvaluationResult::Break
            | EvaluationResult::Continue => None,
        }
    }

    /// Immutable copy for storage in a frame.
    pub fn snapshot(&self) -> EvaluationResult {
        let mut copy = self.clone();
        match &mut copy {
            EvaluationResult::Expression { value, detail } => {
                *value = value.deep_clone();
                match detail {
                    ExpressionDetail::Call { args, .. } => {
                        for arg in args.iter_mut() {
                            *arg = arg.deep_clone();
                        }
                    }
                    ExpressionDetail::Update { previous, .. } => *previous = previous.deep_clone(),
                    ExpressionDetail::Assignment { .. } | ExpressionDetail::Binary { .. } | ExpressionDetail::Other => {}
                }
            }
            EvaluationResult::VariableDeclaration { value, .. }
            | EvaluationResult::IfCondition { value }
            | EvaluationResult::WhileCondition { value, .. }
            | EvaluationResult::ForCondition { value, .. }
            | EvaluationResult::ForUpdate { value, .. }
            | EvaluationResult::ForOfIteration { value, .. }
            | EvaluationResult::EmptyIteration { collection: value } => *value = value.deep_clone(),
            EvaluationResult::Return { value: Some(value) } => *value = value.deep_clone(),
            EvaluationResult::Return { value: None }
            | EvaluationResult::ForInIteration { .. }
            | EvaluationResult::RepeatIteration { .. }
            | EvaluationResult::Break
            | EvaluationResult::Continue => {}
        }
        copy
    }
}

/// One recorded execution step
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: usize,
    pub time_in_ms: usize,
    pub line: usize,
    pub location: Location,
    /// Source text of the node this frame describes
    pub code: String,
    pub status: FrameStatus,
    pub result: Option<EvaluationResult>,
    pub error: Option<RuntimeError>,
    pub variables: BTreeMap<String, Value>,
    pub node: NodeType,
}

/// One `console.log` call
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub time: usize,
    pub time_in_ms: usize,
    pub output: String,
}

/// Inputs for one frame, before it is stamped and snapshotted.
pub struct FrameRecord<'a> {
    pub location: Location,
    pub code: String,
    pub node: NodeType,
    pub result: Option<&'a EvaluationResult>,
    pub error: Option<RuntimeError>,
    pub variables: &'a BTreeMap<String, Value>,
}

/// Append-only store of frames and log lines for one run.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frames: Vec<Frame>,
    log_lines: Vec<LogLine>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        FrameRecorder::default()
    }

    /// Logical time the next frame will get.
    pub fn time(&self) -> usize {
        self.frames.len()
    }

    pub fn record(&mut self, record: FrameRecord<'_>) -> &Frame {
        let time = self.time();
        let status = if record.error.is_some() {
            FrameStatus::Error
        } else {
            FrameStatus::Success
        };
        let variables = record
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.deep_clone()))
            .collect();

        tracing::trace!(time, line = record.location.line, node = %record.node, %status, "frame");

        self.frames.push(Frame {
            time,
            time_in_ms: time * TIME_SCALE_MS,
            line: record.location.line,
            location: record.location,
            code: record.code,
            status,
            result: record.result.map(EvaluationResult::snapshot),
            error: record.error,
            variables,
            node: record.node,
        });
        &self.frames[time]
    }

    /// Remove the most recent frame; its time is reused by the next one.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn log(&mut self, output: String) {
        let time = self.time();
        self.log_lines.push(LogLine {
            time,
            time_in_ms: time * TIME_SCALE_MS,
            output,
        });
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn log_lines(&self) -> &[LogLine] {
        &self.log_lines
    }

    pub fn into_parts(self) -> (Vec<Frame>, Vec<LogLine>) {
        (self.frames, self.log_lines)
    }
}
