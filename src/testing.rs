//! Test doubles for the provider seams

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::conversation::ChatMessage;
use crate::providers::{
    ChatBackend, ChatOptions, ProviderAvailability, ProviderError, ProviderReply,
};

type Call = (Vec<ChatMessage>, ChatOptions);

enum Script {
    Replies(Mutex<VecDeque<Result<ProviderReply, String>>>),
    Panic,
}

/// Backend that plays back canned replies and records every call
pub struct ScriptedBackend {
    script: Script,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(
            replies
                .into_iter()
                .map(|r| Ok(ProviderReply::Text(r.into())))
                .collect(),
        )
    }

    pub fn scripted(replies: Vec<Result<ProviderReply, String>>) -> Self {
        Self {
            script: Script::Replies(Mutex::new(replies.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::scripted(vec![])
    }

    pub fn panicking() -> Self {
        Self {
            script: Script::Panic,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ProviderReply, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));

        match &self.script {
            Script::Panic => panic!("backend exploded"),
            Script::Replies(replies) => match replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(ProviderError::InvalidResponse(message)),
                None => Err(ProviderError::InvalidResponse("script exhausted".into())),
            },
        }
    }
}

/// Backend that holds each call open until released
pub struct GatedBackend {
    reply: String,
    started: Notify,
    release: Notify,
    calls: AtomicUsize,
}

impl GatedBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait until a call has reached the backend
    pub async fn started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for GatedBackend {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _options: &ChatOptions,
    ) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(ProviderReply::Text(self.reply.clone()))
    }
}

/// Probe that reports available from its n-th call on
pub struct CountingProbe {
    available_after: Option<usize>,
    calls: AtomicUsize,
}

impl CountingProbe {
    pub fn available_after(n: usize) -> Self {
        Self {
            available_after: Some(n),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn never() -> Self {
        Self {
            available_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAvailability for CountingProbe {
    async fn is_available(&self) -> bool {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.available_after.is_some_and(|after| n >= after)
    }
}
