//! In-memory backend for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::backend::HttpBackend;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Records every request and replies from a queue; the last queued response
/// is repeated once the queue drains.
pub(crate) struct FakeBackend {
    requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<HttpResponse>>,
}

impl FakeBackend {
    pub(crate) fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            responses: RefCell::new(responses.into()),
        }
    }

    pub(crate) fn with_body(status: u16, body: &str) -> Self {
        Self::new(vec![response(status, body)])
    }

    pub(crate) fn with_json(status: u16, body: Value) -> Self {
        Self::with_body(status, &body.to_string())
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}

impl HttpBackend for FakeBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        let mut queue = self.responses.borrow_mut();
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.ok_or_else(|| ApiError::Transport("no response queued".to_string()))
    }
}
