use anyhow::Result;
use groq_chat::{ChatModel, ChatOptions, ContentPart, GroqChat, GroqConfig, Message};

// Blocking call with an image part; the image is stripped before the request is sent.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("GROQ_API_KEY")?;
    let model = GroqChat::from_config(GroqConfig::new(api_key).with_model("mixtral-8x7b-32768"))?;

    let message = Message::user(vec![
        ContentPart::text("Describe this picture in one sentence: "),
        ContentPart::image_url("https://example.com/cat.png"),
        ContentPart::text("(if you cannot see it, say so)"),
    ]);

    let reply = model.invoke(message.into(), None, ChatOptions::new())?;
    println!("Response: {}", reply.text().unwrap_or_default());

    Ok(())
}
