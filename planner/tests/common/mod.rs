//! Scripted collaborators shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use mission_planner::prelude::*;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Marker a scripted validator accepts.
pub const VALID_MARK: &str = "<valid/>";

/// A reply that never arrives.
pub const HANG: &str = "__hang__";

/// What the scripted client observed.
#[derive(Debug, Default)]
pub struct CallLog {
    pub primers: Vec<String>,
    pub images: usize,
    pub prompts: Vec<(String, bool)>,
    pub resets: usize,
    pub released: usize,
}

/// Replies are consumed in order; a reply of `Err` fails that call.
pub struct ScriptedClient {
    name: String,
    replies: VecDeque<Result<String, String>>,
    images: bool,
    log: Arc<Mutex<CallLog>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> (Self, Arc<Mutex<CallLog>>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let log = Arc::new(Mutex::new(CallLog::default()));
        let client = Self {
            name: "scripted".into(),
            replies: replies.into_iter().map(|r| Ok(r.into())).collect(),
            images: false,
            log: Arc::clone(&log),
        };
        (client, log)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_images(mut self) -> Self {
        self.images = true;
        self
    }

    pub fn then_fail(mut self, message: &str) -> Self {
        self.replies.push_back(Err(message.into()));
        self
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_images(&self) -> bool {
        self.images
    }

    async fn init_context(&mut self, primer: &str) -> Result<(), BackendError> {
        self.log.lock().unwrap().primers.push(primer.to_string());
        Ok(())
    }

    async fn init_image_context(&mut self, _image: &Path) -> Result<(), BackendError> {
        self.log.lock().unwrap().images += 1;
        Ok(())
    }

    async fn ask(&mut self, prompt: &str, use_context: bool) -> Result<String, BackendError> {
        self.log
            .lock()
            .unwrap()
            .prompts
            .push((prompt.to_string(), use_context));
        match self.replies.pop_front() {
            Some(Ok(reply)) if reply == HANG => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(BackendError::Unsupported(message)),
            None => Err(BackendError::Unsupported("script exhausted".into())),
        }
    }

    fn reset_context(&mut self) {
        self.log.lock().unwrap().resets += 1;
    }

    async fn release_resources(&mut self) -> Result<(), BackendError> {
        self.log.lock().unwrap().released += 1;
        Ok(())
    }
}

/// Accepts documents containing [`VALID_MARK`]; otherwise reports a
/// diagnostic naming the attempt number it has seen.
#[derive(Default)]
pub struct MarkerValidator {
    seen: Mutex<usize>,
}

#[async_trait]
impl SchemaValidator for MarkerValidator {
    async fn validate(&self, document: &Path) -> Validation {
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        match std::fs::read_to_string(document) {
            Ok(text) if text.contains(VALID_MARK) => Validation::valid("Document is valid."),
            Ok(_) => Validation::invalid(format!("Document is invalid: defect #{}", *seen)),
            Err(e) => Validation::invalid(format!("An error occurred: {e}")),
        }
    }

    fn describe(&self) -> String {
        "marker validator".into()
    }
}

/// Wraps `body` in an xml fence with chatter around it.
pub fn fenced(body: &str) -> String {
    format!("Here is the plan:\n```xml\n{body}\n```\nLet me know if you need changes.")
}

/// Never finishes a validation.
pub struct StalledValidator;

#[async_trait]
impl SchemaValidator for StalledValidator {
    async fn validate(&self, _document: &Path) -> Validation {
        std::future::pending::<Validation>().await
    }

    fn describe(&self) -> String {
        "stalled validator".into()
    }
}
