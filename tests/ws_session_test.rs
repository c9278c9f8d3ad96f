use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::SinkExt;
use futures::StreamExt;
use ragline::api::routes::app_routes;
use ragline::api::AppState;
use ragline::embeddings::Embedder;
use ragline::llm::ChatMessage;
use ragline::llm::ChatModel;
use ragline::llm::CompletionStream;
use ragline::llm::StreamFragment;
use ragline::rag::ChatPipeline;
use ragline::vector::RetrievedRecord;
use ragline::vector::VectorIndex;
use ragline::RaglineError;
use ragline::Result;
use serde_json::json;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct CountingEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.5, 0.5])
    }
}

/// Returns one transcript record, or fails / returns nothing depending
/// on the requested namespace
struct NamespacedIndex {
    calls: AtomicUsize,
}

#[async_trait]
impl VectorIndex for NamespacedIndex {
    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match namespace {
            "empty" => Ok(Vec::new()),
            "fail" => Err(RaglineError::VectorStore("index offline".to_string())),
            _ => {
                let mut metadata = serde_json::Map::new();
                metadata.insert("Transcript".to_string(), Value::from("stored context"));
                Ok(vec![RetrievedRecord {
                    id: "rec-1".to_string(),
                    score: 0.9,
                    metadata,
                }])
            }
        }
    }
}

/// Streams a short answer with a small delay between fragments, so
/// concurrent requests demonstrably interleave
struct SlowModel {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatModel for SlowModel {
    async fn stream(&self, _messages: Vec<ChatMessage>) -> Result<CompletionStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fragments = vec![
            StreamFragment {
                content: Some("slow".to_string()),
                finish_reason: None,
            },
            StreamFragment {
                content: Some(" and".to_string()),
                finish_reason: None,
            },
            StreamFragment {
                content: Some(" steady".to_string()),
                finish_reason: None,
            },
            StreamFragment {
                content: None,
                finish_reason: Some("stop".to_string()),
            },
        ];
        let stream = futures::stream::unfold(fragments.into_iter(), |mut iter| async move {
            let fragment = iter.next()?;
            tokio::time::sleep(Duration::from_millis(20)).await;
            Some((Ok(fragment), iter))
        });
        Ok(CompletionStream::new(Box::pin(stream)))
    }
}

struct Doubles {
    embedder: Arc<CountingEmbedder>,
    index: Arc<NamespacedIndex>,
    model: Arc<SlowModel>,
}

async fn spawn_server() -> (SocketAddr, Doubles) {
    let embedder = Arc::new(CountingEmbedder {
        calls: AtomicUsize::new(0),
    });
    let index = Arc::new(NamespacedIndex {
        calls: AtomicUsize::new(0),
    });
    let model = Arc::new(SlowModel {
        calls: AtomicUsize::new(0),
    });

    let pipeline = ChatPipeline::new(embedder.clone(), index.clone(), model.clone());
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = app_routes(state, "public");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (
        addr,
        Doubles {
            embedder,
            index,
            model,
        },
    )
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

fn prompt_event(prompt: &str, namespace: &str) -> Message {
    Message::Text(
        json!({
            "event": "sendPrompt",
            "data": { "prompt": prompt, "namespace": namespace, "topK": 3 },
        })
        .to_string(),
    )
}

async fn next_event(socket: &mut WsClient) -> Value {
    let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for event")
        .expect("connection closed")
        .expect("websocket error");
    match message {
        Message::Text(text) => serde_json::from_str(&text).expect("invalid event JSON"),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_prompt_streams_response_chunks() {
    let (addr, doubles) = spawn_server().await;
    let mut socket = connect(addr).await;

    socket
        .send(prompt_event("What was stored?", ""))
        .await
        .unwrap();

    let mut contents = String::new();
    loop {
        let event = next_event(&mut socket).await;
        assert_eq!(event["event"], "responseChunk");
        if let Some(content) = event["data"]["content"].as_str() {
            contents.push_str(content);
        }
        if event["data"]["finish_reason"].is_string() {
            assert_eq!(event["data"]["finish_reason"], "stop");
            break;
        }
    }

    assert_eq!(contents, "slow and steady");
    assert_eq!(doubles.embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(doubles.index.calls.load(Ordering::SeqCst), 1);
    assert_eq!(doubles.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_prompt_rejected_without_collaborator_calls() {
    let (addr, doubles) = spawn_server().await;
    let mut socket = connect(addr).await;

    socket.send(prompt_event("", "")).await.unwrap();

    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"], "Invalid or missing prompt data");

    // Nothing else arrives for this request
    let quiet = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(quiet.is_err());

    assert_eq!(doubles.embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(doubles.index.calls.load(Ordering::SeqCst), 0);
    assert_eq!(doubles.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_matches_surface_error_and_connection_survives() {
    let (addr, doubles) = spawn_server().await;
    let mut socket = connect(addr).await;

    socket.send(prompt_event("Anything?", "empty")).await.unwrap();

    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"], "No results returned from the vector store");
    assert_eq!(doubles.model.calls.load(Ordering::SeqCst), 0);

    // The failure is terminal for the request, not the connection
    socket.send(prompt_event("Anything?", "")).await.unwrap();
    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "responseChunk");
}

#[tokio::test]
async fn test_malformed_event_gets_validation_error() {
    let (addr, _doubles) = spawn_server().await;
    let mut socket = connect(addr).await;

    socket
        .send(Message::Text("not an event".to_string()))
        .await
        .unwrap();

    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"], "Invalid or missing prompt data");
}

#[tokio::test]
async fn test_concurrent_prompts_on_one_connection() {
    let (addr, doubles) = spawn_server().await;
    let mut socket = connect(addr).await;

    // A failing request races a slow streaming one; the failure must
    // not disturb the stream already in flight.
    socket.send(prompt_event("Will stream", "")).await.unwrap();
    socket.send(prompt_event("Will fail", "fail")).await.unwrap();

    let mut contents = String::new();
    let mut errors = Vec::new();
    loop {
        let event = next_event(&mut socket).await;
        match event["event"].as_str() {
            Some("responseChunk") => {
                if let Some(content) = event["data"]["content"].as_str() {
                    contents.push_str(content);
                }
                if event["data"]["finish_reason"].is_string() {
                    break;
                }
            }
            Some("error") => errors.push(event["data"].as_str().unwrap().to_string()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    assert_eq!(contents, "slow and steady");
    assert_eq!(errors, vec!["Vector store error: index offline".to_string()]);
    assert_eq!(doubles.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, _doubles) = spawn_server().await;

    let body: Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["error"].is_null());
}
