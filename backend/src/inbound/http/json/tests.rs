//! Tests for strict JSON decoding.

use super::*;
use crate::domain::Runtime;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use rstest::rstest;

#[derive(Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct MovieInput {
    title: Option<String>,
    year: Option<i32>,
    runtime: Option<Runtime>,
    genres: Option<Vec<String>>,
}

fn decode(body: &str) -> Result<MovieInput, DecodeError> {
    decode_strict::<MovieInput>(body.as_bytes())
}

#[rstest]
fn well_formed_bodies_decode() {
    let body = r#"{"title":"Moana","year":2016,"runtime":"107 mins","genres":["animation"]}"#;
    let input = decode(body).expect("valid body");
    assert_eq!(input.title.as_deref(), Some("Moana"));
    assert_eq!(input.runtime, Some(Runtime::new(107)));
}

#[rstest]
#[case("")]
#[case("   \n\t")]
fn blank_bodies_are_empty(#[case] body: &str) {
    assert_eq!(decode(body), Err(DecodeError::EmptyBody));
}

#[rstest]
fn syntax_errors_report_the_character_offset() {
    assert_eq!(
        decode("<html>"),
        Err(DecodeError::MalformedSyntax { offset: Some(1) })
    );
}

#[rstest]
fn offsets_count_bytes_on_earlier_lines() {
    assert_eq!(
        decode("{\n\"title\": x}"),
        Err(DecodeError::MalformedSyntax { offset: Some(12) })
    );
}

#[rstest]
fn truncated_bodies_have_no_offset() {
    let err = decode(r#"{"title": "Moana""#).expect_err("truncated");
    assert_eq!(err, DecodeError::MalformedSyntax { offset: None });
    assert_eq!(err.to_string(), "body contains badly-formed JSON");
}

#[rstest]
#[case(r#"{"title": 123}"#, "title")]
#[case(r#"{"title": "Moana", "year": "2016"}"#, "year")]
#[case(r#"{"genres": "animation"}"#, "genres")]
fn type_mismatches_name_the_field(#[case] body: &str, #[case] field: &str) {
    let err = decode(body).expect_err("type mismatch");
    assert!(
        matches!(&err, DecodeError::TypeMismatch { field: Some(name), .. } if name == field),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        format!("body contains incorrect JSON type for field \"{field}\"")
    );
}

#[rstest]
#[case(r#"["Casablanca", 2020, "125 mins", ["historical", "drama"]]"#, 1)]
#[case(r#"  ["Casablanca"]"#, 3)]
#[case("42", 1)]
#[case("null", 1)]
fn non_object_documents_are_type_mismatches(#[case] body: &str, #[case] offset: usize) {
    let err = decode(body).expect_err("not an object");
    assert_eq!(err, DecodeError::TypeMismatch { field: None, offset });
    assert_eq!(
        err.to_string(),
        format!("body contains incorrect JSON type (at character {offset})")
    );
}

#[rstest]
fn non_object_documents_outrank_trailing_content() {
    let err = decode(r#"["Casablanca"] {}"#).expect_err("array then trailing");
    assert!(
        matches!(err, DecodeError::TypeMismatch { field: None, .. }),
        "{err:?}"
    );
}

#[rstest]
fn top_level_type_mismatch_reports_an_offset() {
    let err = decode(r#""just a string""#).expect_err("not an object");
    let DecodeError::TypeMismatch { field, offset } = &err else {
        panic!("expected a type mismatch, got {err:?}");
    };
    assert!(field.is_none());
    assert!(*offset > 0);
    assert!(
        err.to_string()
            .starts_with("body contains incorrect JSON type (at character ")
    );
}

#[rstest]
fn unknown_keys_are_rejected() {
    let err = decode(r#"{"title": "Moana", "rating": 5}"#).expect_err("unknown key");
    assert_eq!(
        err,
        DecodeError::UnknownField {
            field: "rating".to_owned()
        }
    );
    assert_eq!(err.to_string(), "body contains unknown key \"rating\"");
}

#[rstest]
#[case(r#"{"runtime": "107 minutes"}"#)]
#[case(r#"{"runtime": 107}"#)]
#[case(r#"{"runtime": "107  mins"}"#)]
fn field_decoder_messages_pass_through(#[case] body: &str) {
    assert_eq!(
        decode(body),
        Err(DecodeError::Other {
            message: "invalid runtime format".to_owned()
        })
    );
}

#[rstest]
#[case(r#"{"title": "a"}{"title": "b"}"#)]
#[case(r#"{"title": "a"} trailing"#)]
#[case("{} []")]
fn trailing_content_is_rejected(#[case] body: &str) {
    let err = decode(body).expect_err("trailing content");
    assert_eq!(err, DecodeError::TrailingContent);
    assert_eq!(
        err.to_string(),
        "body must only contain a single JSON value"
    );
}

#[rstest]
fn field_errors_take_priority_over_trailing_content() {
    assert!(matches!(
        decode(r#"{"title": 1} {}"#),
        Err(DecodeError::TypeMismatch { .. })
    ));
}

#[rstest]
fn decode_errors_become_bad_requests() {
    let err: Error = DecodeError::BodyTooLarge { limit: 16 }.into();
    assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "body must not be larger than 16 bytes");
}

#[actix_web::post("/echo")]
async fn echo(body: StrictJson<MovieInput>) -> HttpResponse {
    HttpResponse::Ok().body(body.into_inner().title.unwrap_or_default())
}

#[rstest]
#[actix_web::test]
async fn extractor_enforces_the_body_limit() {
    let app = actix_test::init_service(App::new().app_data(BodyLimit(16)).service(echo)).await;

    let small = actix_test::TestRequest::post()
        .uri("/echo")
        .set_payload(r#"{"title":"Up"}"#)
        .to_request();
    let res = actix_test::call_service(&app, small).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(actix_test::read_body(res).await, "Up");

    let large = actix_test::TestRequest::post()
        .uri("/echo")
        .set_payload(r#"{"title":"The Lord of the Rings"}"#)
        .to_request();
    let res = actix_test::call_service(&app, large).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = actix_test::read_body_json(res).await;
    assert_eq!(body["detail"], "body must not be larger than 16 bytes");
}

#[rstest]
#[actix_web::test]
async fn extractor_defaults_to_one_megabyte() {
    let app = actix_test::init_service(App::new().service(echo)).await;
    let req = actix_test::TestRequest::post()
        .uri("/echo")
        .set_payload(web::Bytes::from(vec![b' '; DEFAULT_MAX_BODY_BYTES + 1]))
        .to_request();

    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
