use groq_chat::types::{ContentPart, ImageDetail};
use groq_chat::{flatten_content, Content, Message, Role, Tool, ToolCall, ToolChoice};
use serde_json::json;

#[test]
fn test_content_text_creation() {
    let content = Content::text("Hello, world!");
    assert_eq!(content.as_text(), Some("Hello, world!"));
}

#[test]
fn test_content_from_string() {
    let content: Content = "Test".into();
    assert_eq!(content.as_text(), Some("Test"));
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role, Role::System);
    assert_eq!(Message::user("Hello").role, Role::User);
    assert_eq!(Message::assistant("Hi there!").role, Role::Assistant);
    assert_eq!(Message::tool_result("call_123", "42").role, Role::Tool);
}

#[test]
fn test_message_serialization_user() {
    let msg = Message::user("Hello");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json, json!({"role": "user", "content": "Hello"}));
}

#[test]
fn test_unknown_role_roundtrips_as_string() {
    let json = r#"{"role":"developer","content":"be brief"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role, Role::Other("developer".to_string()));
    assert_eq!(serde_json::to_value(&msg).unwrap()["role"], "developer");
}

#[test]
fn test_multimodal_deserialization() {
    let json = json!({
        "role": "user",
        "content": [
            {"type": "text", "text": "hi "},
            {"type": "image", "url": "x"},
            {"type": "image_url", "image_url": {"url": "https://img", "detail": "low"}},
            {"type": "audio", "data": "..."},
            {"type": "text"}
        ]
    });

    let msg: Message = serde_json::from_value(json).unwrap();
    let Content::Parts(parts) = &msg.content else {
        panic!("Expected multipart content");
    };

    assert_eq!(parts[0], ContentPart::text("hi "));
    assert_eq!(parts[1], ContentPart::image("x"));
    match &parts[2] {
        ContentPart::ImageUrl { image_url } => {
            assert_eq!(image_url.url, "https://img");
            assert_eq!(image_url.detail, Some(ImageDetail::Low));
        }
        other => panic!("Expected ImageUrl, got {:?}", other),
    }
    assert_eq!(parts[3], ContentPart::Unsupported);
    assert_eq!(parts[4], ContentPart::text(""));
    assert_eq!(msg.content.joined_text(), "hi ");
}

#[test]
fn test_single_text_part_as_text() {
    let content = Content::Parts(vec![ContentPart::text("Hello")]);
    assert_eq!(content.as_text(), Some("Hello"));

    let mixed = Content::Parts(vec![ContentPart::text("a"), ContentPart::image("x")]);
    assert_eq!(mixed.as_text(), None);
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), "auto");
    assert_eq!(serde_json::to_value(ToolChoice::none()).unwrap(), "none");
    assert_eq!(serde_json::to_value(ToolChoice::required()).unwrap(), "required");
    assert_eq!(
        serde_json::to_value(ToolChoice::force("get_weather")).unwrap(),
        json!({"type": "function", "function": {"name": "get_weather"}})
    );
}

#[test]
fn test_tool_creation() {
    let tool = Tool::function(
        "get_weather",
        "Get weather for location",
        json!({"type": "object", "properties": {"location": {"type": "string"}}}),
    );

    assert_eq!(tool.tool_type, "function");
    assert_eq!(tool.function.name, "get_weather");
}

#[test]
fn test_tool_call_parse_arguments() {
    let tool_call: ToolCall = serde_json::from_value(json!({
        "id": "call_123",
        "type": "function",
        "function": {"name": "get_weather", "arguments": "{\"city\":\"NYC\"}"}
    }))
    .unwrap();

    #[derive(serde::Deserialize)]
    struct WeatherArgs {
        city: String,
    }

    let args: WeatherArgs = tool_call.parse_arguments().unwrap();
    assert_eq!(args.city, "NYC");

    let msg = Message::assistant_with_tools(vec![tool_call]);
    assert_eq!(msg.role, Role::Assistant);
}

#[test]
fn test_image_without_url_reads_as_unsupported() {
    let json = r#"{"role":"user","content":[{"type":"text","text":"a"},{"type":"image","source_type":"base64","data":"AAAA"}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();

    assert_eq!(
        msg.content,
        Content::Parts(vec![ContentPart::text("a"), ContentPart::Unsupported])
    );
    assert_eq!(flatten_content(msg).text(), Some("a"));
}

#[test]
fn test_image_url_as_plain_string() {
    let json = r#"{"role":"user","content":[{"type":"image_url","image_url":"https://x"},{"type":"text","text":"b"}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();

    assert_eq!(
        msg.content,
        Content::Parts(vec![ContentPart::image_url("https://x"), ContentPart::text("b")])
    );
    assert_eq!(flatten_content(msg).text(), Some("b"));
}

#[test]
fn test_null_text_reads_as_empty() {
    let json = r#"{"role":"user","content":[{"type":"text","text":null},{"type":"text","text":"c"}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();

    assert_eq!(flatten_content(msg).text(), Some("c"));
}

#[test]
fn test_non_object_items_are_skipped() {
    let json = r#"{"role":"user","content":["stray", 42, null, {"type":"text","text":"d"}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();

    let Content::Parts(parts) = &msg.content else {
        panic!("Expected multipart content");
    };
    assert_eq!(parts.len(), 4);
    assert_eq!(flatten_content(msg).text(), Some("d"));
}

#[test]
fn test_odd_content_shapes_flatten_to_empty() {
    for json in [
        r#"{"role":"assistant","content":null}"#,
        r#"{"role":"assistant","content":{"text":"x"}}"#,
        r#"{"role":"assistant"}"#,
    ] {
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(flatten_content(msg).content, Content::text(""), "{}", json);
    }
}

#[test]
fn test_mixed_parts_flatten_in_order() {
    let json = r#"{"role":"user","content":[{"type":"text","text":"hi "},{"type":"image","url":"x"},{"type":"text","text":"there"}]}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(flatten_content(msg).text(), Some("hi there"));
}

#[test]
fn test_system_spelled_as_open_tag() {
    let msg = Message::new(Role::Other("system".to_string()), "sys");
    assert!(msg.is_system());
    assert!(!Message::new(Role::Other("developer".to_string()), "x").is_system());
}
