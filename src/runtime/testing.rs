//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::RuntimeManager;
use crate::game::{AnswerSlot, Question, Session};
use crate::oracle::{OracleError, OracleRequest};
use crate::router::{CommandTokens, InboundMessage, OutboundReply};
use crate::store::InMemorySessionStore;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Oracle
// ============================================================================

/// Mock oracle that returns queued raw replies
pub struct MockOracle {
    responses: Mutex<VecDeque<Result<String, OracleError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<OracleRequest>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a raw oracle reply
    pub fn queue_reply(&self, raw: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(raw.into()));
    }

    /// Queue an oracle failure
    pub fn queue_error(&self, error: OracleError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Unavailable("No mock reply queued".to_string())))
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerOracle for MockOracle {
    async fn ask(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.next_response(request)
    }
}

// ============================================================================
// Delayed Mock Oracle (for ordering tests)
// ============================================================================

/// Mock oracle with configurable delay
pub struct DelayedMockOracle {
    inner: MockOracle,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockOracle {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockOracle::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, raw: impl Into<String>) {
        self.inner.queue_reply(raw);
    }

    pub fn recorded_requests(&self) -> Vec<OracleRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AnswerOracle for DelayedMockOracle {
    async fn ask(&self, request: &OracleRequest) -> Result<String, OracleError> {
        // notify_one keeps a permit if nobody is waiting yet
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_response(request)
    }
}

// ============================================================================
// Fixed Question Provider
// ============================================================================

/// Always hands out the same question
pub struct FixedQuestion(pub Question);

impl QuestionProvider for FixedQuestion {
    fn sample(&self) -> Question {
        self.0.clone()
    }
}

// ============================================================================
// Test Game Builder
// ============================================================================

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// A runtime manager wired to in-memory mocks, driven through `dispatch`
pub struct TestGame<O: AnswerOracle + 'static> {
    pub manager: Arc<RuntimeManager>,
    pub store: Arc<InMemorySessionStore>,
    pub oracle: Arc<O>,
    /// Reply subscriptions for every chat the test has talked to
    replies: Mutex<HashMap<String, broadcast::Receiver<OutboundReply>>>,
}

impl TestGame<MockOracle> {
    /// Create a simple test game with an instant oracle
    pub fn new() -> TestGameBuilder<MockOracle> {
        TestGameBuilder::new()
    }
}

pub struct TestGameBuilder<O> {
    oracle: O,
    question: Option<Question>,
    tokens: CommandTokens,
}

impl<O: AnswerOracle + 'static> TestGameBuilder<O> {
    pub fn question(mut self, question: Question) -> Self {
        self.question = Some(question);
        self
    }

    pub fn tokens(mut self, tokens: CommandTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn oracle<P: AnswerOracle + 'static>(self, oracle: P) -> TestGameBuilder<P> {
        TestGameBuilder {
            oracle,
            question: self.question,
            tokens: self.tokens,
        }
    }

    pub fn build(self) -> TestGame<O> {
        let store = Arc::new(InMemorySessionStore::new());
        let oracle = Arc::new(self.oracle);
        let question = self.question.unwrap_or_else(fruit_question);

        let manager = Arc::new(RuntimeManager::new(
            store.clone(),
            oracle.clone(),
            Arc::new(FixedQuestion(question)),
            self.tokens,
        ));
        TestGame {
            manager,
            store,
            oracle,
            replies: Mutex::new(HashMap::new()),
        }
    }
}

impl TestGameBuilder<MockOracle> {
    pub fn new() -> Self {
        Self {
            oracle: MockOracle::new(),
            question: None,
            tokens: CommandTokens::default(),
        }
    }
}

impl Default for TestGameBuilder<MockOracle> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: AnswerOracle + 'static> TestGame<O> {
    /// Deliver a chat message, returning whether a runtime took it
    pub async fn send(&self, chat_id: &str, sender: &str, body: &str) -> bool {
        self.watch(chat_id).await;
        self.manager
            .dispatch(InboundMessage {
                chat_id: chat_id.to_string(),
                sender_name: sender.to_string(),
                body: body.to_string(),
            })
            .await
            .expect("Failed to dispatch message")
    }

    /// Start collecting replies for `chat_id`
    pub async fn watch(&self, chat_id: &str) {
        if self.replies.lock().unwrap().contains_key(chat_id) {
            return;
        }
        let rx = self.manager.subscribe(chat_id).await;
        self.replies
            .lock()
            .unwrap()
            .entry(chat_id.to_string())
            .or_insert(rx);
    }

    /// Next reply sent to `chat_id`, panicking after a timeout
    pub async fn next_reply(&mut self, chat_id: &str) -> String {
        let rx = self
            .replies
            .get_mut()
            .unwrap()
            .get_mut(chat_id)
            .unwrap_or_else(|| panic!("{chat_id} is not being watched"));
        match tokio::time::timeout(REPLY_TIMEOUT, rx.recv()).await {
            Ok(Ok(reply)) => {
                assert_eq!(reply.chat_id, chat_id);
                reply.text
            }
            Ok(Err(e)) => panic!("reply channel for {chat_id} failed: {e}"),
            Err(_) => panic!("no reply for {chat_id} within {REPLY_TIMEOUT:?}"),
        }
    }

    /// Assert nothing is sent to any watched chat for `wait`
    pub async fn expect_silence(&mut self, wait: Duration) {
        tokio::time::sleep(wait).await;
        for (chat_id, rx) in self.replies.get_mut().unwrap().iter_mut() {
            if let Ok(reply) = rx.try_recv() {
                panic!("unexpected reply in {chat_id}: {reply:?}");
            }
        }
    }

    pub fn session(&self, chat_id: &str) -> Option<Session> {
        self.store.get(chat_id)
    }
}

pub fn fruit_question() -> Question {
    Question::new(
        "Sebutkan buah berwarna merah",
        vec![
            AnswerSlot::new("apel", 30),
            AnswerSlot::new("stroberi", 25),
            AnswerSlot::new("ceri", 20),
        ],
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(150);

    #[tokio::test]
    async fn test_mock_oracle_returns_queued_replies() {
        let mock = MockOracle::new();
        mock.queue_reply("BENAR: apel");
        mock.queue_error(OracleError::Timeout(Duration::from_secs(1)));

        let request = OracleRequest {
            prompt: "q".to_string(),
            answers: vec!["apel".to_string()],
            guess: "apple".to_string(),
        };
        assert_eq!(mock.ask(&request).await.unwrap(), "BENAR: apel");
        assert!(matches!(mock.ask(&request).await, Err(OracleError::Timeout(_))));
        assert!(mock.ask(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_full_round_of_guesses_and_resign() {
        let mut game = TestGame::new().build();
        game.oracle.queue_reply("BENAR: stroberi");
        game.oracle.queue_reply("Salah! Pisang itu kuning.");

        assert!(game.send("chat-1", "Budi", ".f100").await);
        let prompt = game.next_reply("chat-1").await;
        assert!(prompt.starts_with("Family 100 dimulai!"));
        assert!(prompt.contains("Sebutkan buah berwarna merah"));

        assert!(game.send("chat-1", "Budi", "Strawberry").await);
        let correct = game.next_reply("chat-1").await;
        assert!(correct.starts_with("✅ Jawaban benar!"));
        assert!(correct.contains("2. stroberi (25) - Budi"));

        let requests = game.oracle.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].guess, "Strawberry");
        assert_eq!(requests[0].canonical_list(), "apel, stroberi, ceri");

        assert!(game.send("chat-1", "Siti", "pisang").await);
        assert_eq!(game.next_reply("chat-1").await, "Salah! Pisang itu kuning.");

        let view = game.manager.session_view("chat-1").unwrap();
        assert_eq!(view.score, 25);
        assert_eq!(view.found_count, 1);

        assert!(game.send("chat-1", "Siti", ".nyerah").await);
        let reveal = game.next_reply("chat-1").await;
        assert!(reveal.contains("Jawaban yang sudah terjawab:"));
        assert!(reveal.contains("2. stroberi (25) - Budi"));
        assert!(game.session("chat-1").is_none());
        assert!(game.manager.session_view("chat-1").is_none());
    }

    #[tokio::test]
    async fn test_two_slot_round_to_completion() {
        let question = Question::new(
            "Sebutkan buah berwarna merah",
            vec![AnswerSlot::new("apel", 20), AnswerSlot::new("stroberi", 30)],
        );
        let mut game = TestGame::new().question(question).build();
        game.oracle.queue_reply("BENAR: stroberi");
        game.oracle.queue_reply("BENAR: apel");

        game.send("grup", "Ana", ".f100").await;
        let prompt = game.next_reply("grup").await;
        assert!(prompt.contains("1. _______\n2. _______"));
        assert!(!prompt.contains("3. "));

        game.send("grup", "Ana", "strawberry").await;
        game.next_reply("grup").await;
        let session = game.session("grup").unwrap();
        assert_eq!(session.score(), 30);
        let record = session.found("stroberi").unwrap();
        assert_eq!(record.contributors, vec!["Ana".to_string()]);
        assert_eq!(record.points, 30);

        game.send("grup", "Ana", "apel").await;
        assert!(game.next_reply("grup").await.starts_with("✅ Jawaban benar!"));
        let summary = game.next_reply("grup").await;
        assert!(summary.contains("Total Skor: 50"));
        assert!(summary.contains("1. apel (20) - Ana\n2. stroberi (30) - Ana"));
        assert!(game.session("grup").is_none());
    }

    #[tokio::test]
    async fn test_completing_round_frees_chat_for_next_round() {
        let question = Question::new("Ibu kota Indonesia", vec![AnswerSlot::new("jakarta", 50)]);
        let mut game = TestGame::new().question(question).build();
        game.oracle.queue_reply("BENAR: jakarta");

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;

        game.send("chat-1", "Budi", "Jakarta").await;
        assert!(game.next_reply("chat-1").await.starts_with("✅ Jawaban benar!"));
        let summary = game.next_reply("chat-1").await;
        assert!(summary.contains("Total Skor: 50"));
        assert!(game.session("chat-1").is_none());

        game.send("chat-1", "Siti", ".f100").await;
        assert!(game.next_reply("chat-1").await.starts_with("Family 100 dimulai!"));
        assert_eq!(game.session("chat-1").unwrap().score(), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_asks_to_retry() {
        let mut game = TestGame::new().build();
        game.oracle
            .queue_error(OracleError::Unavailable("connection refused".to_string()));

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;

        game.send("chat-1", "Budi", "apel").await;
        assert_eq!(
            game.next_reply("chat-1").await,
            "Ada masalah saat memeriksa jawaban. Coba lagi nanti."
        );
        let session = game.session("chat-1").unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.found_count(), 0);
    }

    #[tokio::test]
    async fn test_start_while_active_keeps_round() {
        let mut game = TestGame::new().build();

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;
        let session_id = game.session("chat-1").unwrap().id();

        game.send("chat-1", "Siti", "F100").await;
        assert_eq!(game.next_reply("chat-1").await, "Game Family 100 sedang berlangsung!");
        assert_eq!(game.session("chat-1").unwrap().id(), session_id);
    }

    #[tokio::test]
    async fn test_guess_without_round_is_ignored() {
        let mut game = TestGame::new().build();

        assert!(!game.send("chat-1", "Budi", "apel").await);
        assert!(!game.send("chat-1", "Budi", ".nyerah").await);
        assert!(!game.send("chat-1", "Budi", "   ").await);
        assert!(game.session("chat-1").is_none());

        game.expect_silence(QUIET).await;
        assert!(game.oracle.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_same_slot_guessed_twice_is_credited_once() {
        let oracle = DelayedMockOracle::new(Duration::from_millis(50));
        oracle.queue_reply("BENAR: apel");
        oracle.queue_reply("BENAR: apel");
        let mut game = TestGame::new().oracle(oracle).build();

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;

        // Both arrive before the first verdict
        game.send("chat-1", "Budi", "apel").await;
        game.send("chat-1", "Siti", "apel merah").await;

        assert!(game
            .next_reply("chat-1")
            .await
            .contains("1. apel (30) - Budi"));
        assert_eq!(
            game.next_reply("chat-1").await,
            "❌ Jawaban sudah terjawab (apel, 30 poin)!"
        );

        let session = game.session("chat-1").unwrap();
        assert_eq!(session.score(), 30);
        assert_eq!(session.found("apel").unwrap().contributors, vec!["Budi".to_string()]);

        // Second guess was judged against the state after the first
        let requests = game.oracle.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].guess, "apel merah");
    }

    #[tokio::test]
    async fn test_resign_waits_for_pending_verdict() {
        let oracle = DelayedMockOracle::new(Duration::from_millis(100));
        oracle.queue_reply("BENAR: ceri");
        let request_started = oracle.request_started.clone();
        let mut game = TestGame::new().oracle(oracle).build();

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;

        game.send("chat-1", "Budi", "cherry").await;
        tokio::time::timeout(Duration::from_secs(1), request_started.notified())
            .await
            .expect("oracle request should start");
        game.send("chat-1", "Siti", ".nyerah").await;

        assert!(game.next_reply("chat-1").await.starts_with("✅ Jawaban benar!"));
        let reveal = game.next_reply("chat-1").await;
        assert!(reveal.contains("3. ceri (20) - Budi"));
        assert!(game.session("chat-1").is_none());

        game.expect_silence(QUIET).await;
    }

    #[tokio::test]
    async fn test_unresolvable_acceptance_is_silent() {
        let mut game = TestGame::new().build();
        game.oracle.queue_reply("BENAR: semangka");

        game.send("chat-1", "Budi", ".f100").await;
        game.next_reply("chat-1").await;

        game.send("chat-1", "Budi", "semangka").await;
        game.expect_silence(QUIET).await;
        assert_eq!(game.session("chat-1").unwrap().score(), 0);
    }

    #[tokio::test]
    async fn test_custom_command_tokens() {
        let mut game = TestGame::new()
            .tokens(CommandTokens::new("mulai", "stop"))
            .build();

        assert!(!game.send("chat-1", "Budi", ".f100").await);
        assert!(game.send("chat-1", "Budi", "!Mulai").await);
        assert!(game.next_reply("chat-1").await.contains("Ketik .stop untuk menyerah."));

        game.send("chat-1", "Budi", ".stop").await;
        assert!(game.next_reply("chat-1").await.contains("Tidak ada jawaban yang terjawab."));
        assert!(game.oracle.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_chats_run_independently() {
        let mut game = TestGame::new().build();
        game.oracle.queue_reply("BENAR: apel");

        game.send("chat-a", "Budi", ".f100").await;
        game.next_reply("chat-a").await;
        game.send("chat-b", "Siti", ".f100").await;
        game.next_reply("chat-b").await;

        game.send("chat-a", "Budi", "apel").await;
        assert!(game.next_reply("chat-a").await.contains("1. apel (30) - Budi"));

        assert_eq!(game.session("chat-a").unwrap().score(), 30);
        assert_eq!(game.session("chat-b").unwrap().score(), 0);
        assert_ne!(
            game.session("chat-a").unwrap().id(),
            game.session("chat-b").unwrap().id()
        );
    }
}
