use anyhow::Result;
use groq_chat::{ChatModel, ChatOptions, GroqChat, Message, RunConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groq_chat=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Reads GROQ_API_KEY (required) and GROQ_MODEL / GROQ_MAX_TOKENS (optional)
    let model = GroqChat::from_env()?;
    println!("Model: {} (max_tokens = {})", model.model(), model.max_tokens());

    let conversation = vec![
        Message::system("You are a concise geography tutor."),
        Message::user("What is the capital of France?"),
        Message::assistant("Paris."),
        Message::user("And of Italy?"),
        Message::assistant("Rome."),
        Message::user("And of Spain?"),
    ];

    let reply = model
        .ainvoke(
            conversation.into(),
            Some(RunConfig::new().run_name("capitals")),
            ChatOptions::new().temperature(0.2),
        )
        .await?;

    println!("Response: {}", reply.text().unwrap_or_default());

    Ok(())
}
