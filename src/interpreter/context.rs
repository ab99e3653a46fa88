//! What built-in and host functions can see of the running interpreter.

use crate::features::LanguageFeatures;
use crate::snapshot::FrameRecorder;

/// Borrowed view handed to stdlib and external functions for one call.
pub struct ExecutionContext<'r> {
    recorder: &'r mut FrameRecorder,
    features: &'r LanguageFeatures,
}

impl<'r> ExecutionContext<'r> {
    pub(crate) fn new(recorder: &'r mut FrameRecorder, features: &'r LanguageFeatures) -> Self {
        ExecutionContext { recorder, features }
    }

    /// Append a console line stamped with the upcoming frame time.
    pub fn log(&mut self, output: String) {
        self.recorder.log(output);
    }

    /// Logical time of the frame the current call will produce.
    pub fn time(&self) -> usize {
        self.recorder.time()
    }

    pub fn features(&self) -> &LanguageFeatures {
        self.features
    }
}
