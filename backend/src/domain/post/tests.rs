//! Tests for post content validation and revision.

use super::*;
use crate::domain::ErrorCode;
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn content() -> PostContent {
    PostContent::new("Hello", "first post").expect("valid content")
}

#[rstest]
#[case("", "body", PostValidationError::EmptyTitle)]
#[case("   ", "body", PostValidationError::EmptyTitle)]
#[case("title", "", PostValidationError::EmptyBody)]
#[case("title", " \n\t", PostValidationError::EmptyBody)]
fn content_rejects_blank_fields(
    #[case] title: &str,
    #[case] body: &str,
    #[case] expected: PostValidationError,
) {
    assert_eq!(PostContent::new(title, body), Err(expected));
}

#[rstest]
fn content_length_limits_are_inclusive() {
    assert!(PostContent::new("t".repeat(TITLE_MAX), "body").is_ok());
    assert_eq!(
        PostContent::new("t".repeat(TITLE_MAX + 1), "body"),
        Err(PostValidationError::TitleTooLong { max: TITLE_MAX })
    );
    assert!(PostContent::new("title", "b".repeat(BODY_MAX)).is_ok());
    assert_eq!(
        PostContent::new("title", "b".repeat(BODY_MAX + 1)),
        Err(PostValidationError::BodyTooLong { max: BODY_MAX })
    );
}

#[rstest]
fn content_trims_title_but_not_body() {
    let content = PostContent::new("  Hi  ", "  keep me  ").expect("valid content");
    assert_eq!(content.title(), "Hi");
    assert_eq!(content.body(), "  keep me  ");
}

#[rstest]
fn content_deserialisation_validates() {
    let bad = json!({ "title": "", "body": "x" });
    assert!(serde_json::from_value::<PostContent>(bad).is_err());
    let good = json!({ "title": "t", "body": "x" });
    assert!(serde_json::from_value::<PostContent>(good).is_ok());
}

#[rstest]
fn validation_errors_become_invalid_requests() {
    let error: Error = PostValidationError::EmptyBody.into();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case("not-a-uuid")]
#[case("")]
fn post_id_parse_rejects_garbage(#[case] raw: &str) {
    assert_eq!(raw.parse::<PostId>(), Err(PostValidationError::InvalidId));
}

#[rstest]
fn post_id_display_round_trips() {
    let id = PostId::random();
    assert_eq!(id.to_string().parse::<PostId>(), Ok(id));
}

#[rstest]
fn revision_keeps_owner_and_creation_time(content: PostContent) {
    let created = Utc::now();
    let owner = UserId::random();
    let post = Post::new(PostId::random(), owner.clone(), content, created);
    assert_eq!(post.created_at(), post.updated_at());

    let later = created + TimeDelta::minutes(5);
    let replacement = PostContent::new("Edited", "second body").expect("valid content");
    let revised = post.clone().revised(replacement, later);

    assert_eq!(revised.id(), post.id());
    assert_eq!(revised.owner_id(), &owner);
    assert_eq!(revised.created_at(), created);
    assert_eq!(revised.updated_at(), later);
    assert_eq!(revised.title(), "Edited");
    assert_eq!(revised.body(), "second body");
}

#[rstest]
fn revision_never_moves_updated_at_before_creation(content: PostContent) {
    let created = Utc::now();
    let post = Post::new(PostId::random(), UserId::random(), content.clone(), created);
    let revised = post.revised(content, created - TimeDelta::hours(1));
    assert_eq!(revised.updated_at(), created);
}

#[rstest]
fn post_serialises_flat_camel_case(content: PostContent) {
    let created = Utc::now();
    let post = Post::new(PostId::random(), UserId::random(), content, created);
    let value = serde_json::to_value(&post).expect("serialise post");
    assert_eq!(value["title"], json!("Hello"));
    assert_eq!(value["body"], json!("first post"));
    assert!(value.get("ownerId").is_some());
    assert!(value.get("createdAt").is_some());
}
