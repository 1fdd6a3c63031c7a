use tokio::sync::mpsc;

use crate::api::{self, CompletionError, Content};

/// The resolution of one completion request, delivered back to the UI loop.
///
/// Outcomes are tagged with the owning chat's id so the reply lands on that
/// chat even when the user has switched or reordered chats mid-flight, and
/// with the request id so stale deliveries can never release a later gate.
#[derive(Debug)]
pub struct CompletionOutcome {
    pub request_id: u64,
    pub chat_id: String,
    pub result: Result<String, CompletionError>,
}

pub struct CompletionParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub contents: Vec<Content>,
    pub chat_id: String,
    pub request_id: u64,
}

/// Runs completion requests off the UI thread.
///
/// One request is in flight at a time (the controller enforces the gate);
/// the service just carries the call and posts its outcome on the channel.
/// There is no cancellation: a spawned request always runs to an outcome.
#[derive(Clone)]
pub struct CompletionService {
    tx: mpsc::UnboundedSender<CompletionOutcome>,
}

impl CompletionService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CompletionOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_request(&self, params: CompletionParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let CompletionParams {
                client,
                base_url,
                api_key,
                model,
                contents,
                chat_id,
                request_id,
            } = params;

            let result =
                api::generate_content(&client, &base_url, &api_key, &model, contents).await;
            let _ = tx.send(CompletionOutcome {
                request_id,
                chat_id,
                result,
            });
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, outcome: CompletionOutcome) {
        let _ = self.tx.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_keep_their_tags() {
        let (service, mut rx) = CompletionService::new();
        service.send_for_test(CompletionOutcome {
            request_id: 7,
            chat_id: "chat-abc".to_string(),
            result: Ok("Hi there".to_string()),
        });

        let outcome = rx.try_recv().unwrap();
        assert_eq!(outcome.request_id, 7);
        assert_eq!(outcome.chat_id, "chat-abc");
        assert_eq!(outcome.result.unwrap(), "Hi there");
    }

    #[test]
    fn outcomes_arrive_in_send_order() {
        let (service, mut rx) = CompletionService::new();
        for id in 0..3 {
            service.send_for_test(CompletionOutcome {
                request_id: id,
                chat_id: format!("chat-{id}"),
                result: Ok(String::new()),
            });
        }

        for expected in 0..3 {
            assert_eq!(rx.try_recv().unwrap().request_id, expected);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn network_failure_still_delivers_an_outcome() {
        let (service, mut rx) = CompletionService::new();
        service.spawn_request(CompletionParams {
            client: reqwest::Client::new(),
            base_url: "http://geminal.test.invalid".to_string(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            contents: Vec::new(),
            chat_id: "chat-1".to_string(),
            request_id: 3,
        });

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.request_id, 3);
        assert_eq!(outcome.chat_id, "chat-1");
        assert!(matches!(outcome.result, Err(CompletionError::Network(_))));
    }
}
