//! Parsing off the interactive thread.
//!
//! Each scheduled parse runs on tokio's blocking pool with a timeout.
//! Scheduling a newer revision cancels the one in flight; a cancelled parse
//! resolves to `Ok(None)` and its result is never delivered. Cancellation and
//! timeout both abort tree-sitter through its progress callback, so the
//! parser always goes back to the pool.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tree_sitter::{ParseOptions, ParseState};

use super::model::Revision;
use crate::error::{ExplorerError, ExplorerResult};
use crate::language::DocumentParserPool;
use crate::syntax::{SyntaxTree, lower_tree};

/// Timeout for blocking parse operations to prevent hangs on pathological inputs.
pub const PARSE_TIMEOUT: Duration = Duration::from_secs(10);

/// A finished parse, tagged with the revision it was started for.
#[derive(Debug)]
pub struct ParseOutcome {
    pub revision: Revision,
    pub text: Arc<str>,
    pub tree: SyntaxTree,
}

/// Schedules parses of one document in the background.
pub struct BackgroundParser {
    language_id: String,
    pool: Arc<Mutex<DocumentParserPool>>,
    timeout: Duration,
    in_flight: Option<CancellationToken>,
}

impl BackgroundParser {
    pub fn new(language_id: impl Into<String>, pool: DocumentParserPool) -> Self {
        Self {
            language_id: language_id.into(),
            pool: Arc::new(Mutex::new(pool)),
            timeout: PARSE_TIMEOUT,
            in_flight: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start parsing `text` for `revision`, superseding any earlier request.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// A handle resolving to the outcome, `Ok(None)` if the request was
    /// cancelled before it completed.
    pub fn schedule(
        &mut self,
        revision: Revision,
        text: Arc<str>,
    ) -> JoinHandle<ExplorerResult<Option<ParseOutcome>>> {
        self.cancel();
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        log::debug!(
            target: "cst_explorer::background",
            "Scheduling parse of {} ({} bytes)",
            revision,
            text.len()
        );

        let request = ParseRequest {
            language_id: self.language_id.clone(),
            pool: Arc::clone(&self.pool),
            timeout: self.timeout,
            revision,
            text,
        };
        tokio::spawn(async move {
            let outcome = request.run(&token).await;
            if token.is_cancelled() {
                log::debug!(
                    target: "cst_explorer::background",
                    "Parse of {} cancelled",
                    revision
                );
                return Ok(None);
            }
            outcome
        })
    }

    /// Cancel the request in flight, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

impl Drop for BackgroundParser {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ParseRequest {
    language_id: String,
    pool: Arc<Mutex<DocumentParserPool>>,
    timeout: Duration,
    revision: Revision,
    text: Arc<str>,
}

impl ParseRequest {
    /// Parse on the blocking pool. Resolves to `Ok(None)` when the parse was
    /// aborted through `cancel`.
    async fn run(self, cancel: &CancellationToken) -> ExplorerResult<Option<ParseOutcome>> {
        // Checkout parser (brief lock)
        let mut parser = {
            let mut pool = self.pool.lock().await;
            pool.acquire(&self.language_id)?
        };

        // Cancelled by the caller, or by us on timeout
        let abort = cancel.child_token();
        let text = Arc::clone(&self.text);
        let mut task = tokio::task::spawn_blocking({
            let abort = abort.clone();
            move || {
                let parsed = parse_abortable(&mut parser, &text, &abort)
                    .map(|tree| lower_tree(&tree, &text));
                (parser, parsed)
            }
        });

        let mut timed_out = false;
        let joined = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                log::warn!(
                    target: "cst_explorer::background",
                    "Parse timeout after {:?} for language '{}' ({} bytes)",
                    self.timeout,
                    self.language_id,
                    self.text.len()
                );
                timed_out = true;
                abort.cancel();
                task.await
            }
        };

        let (parser, parsed) = match joined {
            Ok(result) => result,
            Err(join_err) => {
                log::error!(
                    target: "cst_explorer::background",
                    "Parse task panicked for language '{}': {}",
                    self.language_id,
                    join_err
                );
                return Err(ExplorerError::internal(format!(
                    "parse task failed: {}",
                    join_err
                )));
            }
        };

        // Return parser to pool (brief lock)
        self.pool
            .lock()
            .await
            .release(self.language_id.clone(), parser);

        if timed_out {
            return Err(ExplorerError::parse(
                &self.language_id,
                format!("timed out after {:?}", self.timeout),
            ));
        }
        let tree = match parsed {
            Some(tree) => tree?,
            None if cancel.is_cancelled() => return Ok(None),
            None => return Err(ExplorerError::parse(&self.language_id, "parser returned no tree")),
        };
        Ok(Some(ParseOutcome {
            revision: self.revision,
            text: self.text,
            tree,
        }))
    }
}

/// Parse `text`, giving up as soon as `abort` is cancelled.
fn parse_abortable(
    parser: &mut tree_sitter::Parser,
    text: &str,
    abort: &CancellationToken,
) -> Option<tree_sitter::Tree> {
    let bytes = text.as_bytes();
    let mut should_stop = |_: &ParseState| {
        if abort.is_cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    let options = ParseOptions::new().progress_callback(&mut should_stop);
    parser.parse_with_options(
        &mut |offset, _| bytes.get(offset..).unwrap_or_default(),
        None,
        Some(options),
    )
}
