use pixelvoice_ai::gemini::{image_from_response, transcript_from_response};
use pixelvoice_ai::wire::GenerateContentResponse;
use pixelvoice_ai::AiError;
use pixelvoice_core::DEFAULT_IMAGE_MIME;

fn parse(json: &str) -> GenerateContentResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn transcript_joins_text_parts_and_trims() {
    let resp = parse(
        r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": " làm nền "}, {"text": "xanh\n"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12}
        }"#,
    );
    assert_eq!(transcript_from_response(&resp).unwrap(), "làm nền xanh");
}

#[test]
fn transcript_without_text_is_empty() {
    let resp = parse(r#"{"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}"#);
    assert_eq!(transcript_from_response(&resp).unwrap(), "");
}

#[test]
fn no_candidates_is_an_error() {
    let resp = parse(r#"{"candidates": []}"#);
    assert!(matches!(
        transcript_from_response(&resp),
        Err(AiError::EmptyResponse)
    ));
    assert!(matches!(image_from_response(&resp), Err(AiError::EmptyResponse)));
}

#[test]
fn image_is_first_inline_image_part() {
    let resp = parse(
        r#"{
            "candidates": [{
                "content": {"parts": [
                    {"text": "Đây là ảnh đã sửa"},
                    {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                    {"inlineData": {"mimeType": "image/png", "data": "BAUG"}}
                ]}
            }]
        }"#,
    );
    let image = image_from_response(&resp).unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes, vec![1, 2, 3]);
}

#[test]
fn text_only_reply_reports_model_text() {
    let resp = parse(
        r#"{"candidates": [{"content": {"parts": [{"text": "Tôi không thể làm điều đó."}]}}]}"#,
    );
    match image_from_response(&resp) {
        Err(AiError::NoImageReturned { text }) => {
            assert_eq!(text.as_deref(), Some("Tôi không thể làm điều đó."));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn corrupt_image_payload_is_invalid() {
    let resp = parse(
        r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "@@"}}]}}]}"#,
    );
    assert!(matches!(
        image_from_response(&resp),
        Err(AiError::InvalidPayload(_))
    ));
}

#[test]
fn block_reason_is_exposed() {
    let resp = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
    assert_eq!(resp.block_reason(), Some("SAFETY"));
}

#[test]
fn image_without_mime_type_defaults_to_png() {
    let resp = parse(r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": "AQID"}}]}}]}"#);
    let image = image_from_response(&resp).unwrap();
    assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
    assert_eq!(image.extension(), "png");
}

#[test]
fn uppercase_image_mime_type_is_accepted() {
    let resp = parse(
        r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "IMAGE/JPEG", "data": "AQID"}}]}}]}"#,
    );
    let image = image_from_response(&resp).unwrap();
    assert_eq!(image.extension(), "jpg");
}
