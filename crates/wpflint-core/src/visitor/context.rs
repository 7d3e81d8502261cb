//! What a walk carries besides the tree: the file it came from and an optional stop signal

use crate::cancellation::CancellationToken;
use crate::parser::ParsedFile;

#[derive(Clone, Copy)]
pub struct VisitorContext<'a> {
    file: &'a ParsedFile,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> VisitorContext<'a> {
    pub fn new(file: &'a ParsedFile) -> Self {
        Self {
            file,
            cancellation: None,
        }
    }

    /// Walks under this context stop early once `token` is cancelled.
    pub fn with_cancellation(self, token: &'a CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self
        }
    }

    pub fn file(&self) -> &'a ParsedFile {
        self.file
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some_and(CancellationToken::is_cancelled)
    }
}
