use anyhow::Result;
use async_trait::async_trait;
use groq_chat::{
    ChatModel, ChatOptions, ContentPart, Message, MessageSanitizer, ModelInput, RunConfig,
};
use std::sync::{Arc, Mutex};

/// Records every call and answers with a canned reply
#[derive(Default)]
struct RecordingModel {
    calls: Mutex<Vec<(ModelInput, Option<RunConfig>, ChatOptions)>>,
    fail: bool,
}

impl RecordingModel {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn respond(&self, input: ModelInput, config: Option<RunConfig>, options: ChatOptions) -> Result<Message> {
        self.calls.lock().unwrap().push((input, config, options));
        if self.fail {
            anyhow::bail!("rate limited");
        }
        Ok(Message::assistant("ok"))
    }

    fn last_input(&self) -> ModelInput {
        self.calls.lock().unwrap().last().unwrap().0.clone()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    fn invoke(&self, input: ModelInput, config: Option<RunConfig>, options: ChatOptions) -> Result<Message> {
        self.respond(input, config, options)
    }

    async fn ainvoke(&self, input: ModelInput, config: Option<RunConfig>, options: ChatOptions) -> Result<Message> {
        self.respond(input, config, options)
    }
}

fn six_turns() -> Vec<Message> {
    vec![
        Message::system("You are helpful"),
        Message::user("a"),
        Message::assistant("b"),
        Message::user("c"),
        Message::assistant("d"),
        Message::user("e"),
    ]
}

#[tokio::test]
async fn test_ainvoke_truncates_conversation() {
    let inner = Arc::new(RecordingModel::default());
    let model = MessageSanitizer::new(inner.clone());

    let reply = model.ainvoke(six_turns().into(), None, ChatOptions::new()).await.unwrap();
    assert_eq!(reply, Message::assistant("ok"));

    assert_eq!(
        inner.last_input(),
        ModelInput::Conversation(vec![
            Message::system("You are helpful"),
            Message::assistant("b"),
            Message::user("c"),
            Message::assistant("d"),
            Message::user("e"),
        ])
    );
}

#[test]
fn test_invoke_flattens_single_message() {
    let inner = Arc::new(RecordingModel::default());
    let model = MessageSanitizer::new(inner.clone());

    let msg = Message::user(vec![
        ContentPart::text("hi "),
        ContentPart::image("x"),
        ContentPart::text("there"),
    ]);
    model.invoke(msg.into(), None, ChatOptions::new()).unwrap();

    assert_eq!(inner.last_input(), ModelInput::Single(Message::user("hi there")));
}

#[tokio::test]
async fn test_flattens_every_message_before_truncating() {
    let inner = Arc::new(RecordingModel::default());
    let model = MessageSanitizer::new(inner.clone());

    let conversation = vec![
        Message::user(vec![ContentPart::text("old"), ContentPart::image("x")]),
        Message::assistant("r1"),
        Message::user(vec![ContentPart::image_url("https://img"), ContentPart::text("new")]),
    ];
    model.ainvoke(conversation.into(), None, ChatOptions::new()).await.unwrap();

    assert_eq!(
        inner.last_input(),
        ModelInput::Conversation(vec![
            Message::user("old"),
            Message::assistant("r1"),
            Message::user("new"),
        ])
    );
}

#[tokio::test]
async fn test_six_turns_without_system_keeps_last_four() {
    let inner = Arc::new(RecordingModel::default());
    let model = MessageSanitizer::new(inner.clone());

    let conversation: Vec<Message> = six_turns().into_iter().skip(1).chain([Message::assistant("f")]).collect();
    model.ainvoke(conversation.clone().into(), None, ChatOptions::new()).await.unwrap();

    assert_eq!(inner.last_input(), ModelInput::Conversation(conversation[2..].to_vec()));
}

#[tokio::test]
async fn test_config_and_options_pass_through() {
    let inner = Arc::new(RecordingModel::default());
    let model = MessageSanitizer::with_model(inner.clone(), "mixtral-8x7b-32768", None);

    let config = RunConfig::new()
        .run_name("summarize")
        .tag("batch")
        .metadata("user_id", serde_json::json!(7));
    let options = ChatOptions::new().temperature(0.3).stop(vec!["\n".to_string()]);

    model
        .ainvoke("hello".into(), Some(config.clone()), options.clone())
        .await
        .unwrap();

    let calls = inner.calls.lock().unwrap();
    let (_, seen_config, seen_options) = calls.last().unwrap();
    assert_eq!(seen_config.as_ref(), Some(&config));
    assert_eq!(seen_options, &options);
}

#[tokio::test]
async fn test_downstream_errors_propagate() {
    let model = MessageSanitizer::new(RecordingModel::failing());

    let err = model.ainvoke("hello".into(), None, ChatOptions::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "rate limited");

    let err = model.invoke("hello".into(), None, ChatOptions::new()).unwrap_err();
    assert_eq!(err.to_string(), "rate limited");
}

#[tokio::test]
async fn test_shared_behind_dyn() {
    let inner = Arc::new(RecordingModel::default());
    let model: Arc<dyn ChatModel> = Arc::new(MessageSanitizer::new(inner.clone()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let model = model.clone();
            tokio::spawn(async move {
                model
                    .ainvoke(Message::user(format!("q{}", i)).into(), None, ChatOptions::new())
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(inner.calls.lock().unwrap().len(), 4);
}
