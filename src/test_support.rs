use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::chat::client::{CompletionClient, CompletionError, CompletionRequest};
use crate::models::resume::{Education, Experience, PersonalInfo, Project, ResumeDocument};

pub(crate) fn sample() -> ResumeDocument {
    ResumeDocument {
        personal_info: PersonalInfo {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "555-123-4567".into(),
            location: "Berlin".into(),
        },
        summary: "Backend engineer with 8 years of experience.".into(),
        education: vec![Education {
            degree: "BSc Computer Science".into(),
            institution: "TU Berlin".into(),
            year: "2016".into(),
            gpa: "1.3".into(),
        }],
        skills: vec!["Rust".into(), "PostgreSQL".into(), "Kubernetes".into()],
        experience: vec![Experience {
            title: "Senior Engineer".into(),
            company: "Acme".into(),
            duration: "2019 - present".into(),
            description: "Payments platform.".into(),
            responsibilities: vec![
                "Led the ledger rewrite".into(),
                "Reduced p99 by 40%".into(),
            ],
        }],
        projects: vec![Project {
            name: "ledger-rs".into(),
            description: "Double-entry bookkeeping library.".into(),
        }],
    }
}

/// Replays canned replies in order and records every request it sees.
/// Once the script runs out every call fails with `EmptyContent`.
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyContent));

        async move { reply }
    }
}
