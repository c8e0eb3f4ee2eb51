use std::sync::Arc;

use mockito::{Matcher, Mock, Server};
use serde_json::json;
use smartnotes_persist::{
    AuthProvider, NoteId, NotePatch, NoteStoreClient, PersistError, SupabaseClient,
};

const ANON: &str = "anon-key";

fn row(id: &str, title: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "user_id": "u1",
        "created_at": "2024-05-01T12:00:00+00:00",
        "updated_at": "2024-05-01T12:00:00+00:00"
    })
}

async fn client(server: &Server) -> Arc<SupabaseClient> {
    Arc::new(
        SupabaseClient::builder()
            .url(server.url())
            .anon_key(ANON)
            .build()
            .unwrap(),
    )
}

async fn mock_sign_in(server: &mut Server) -> Mock {
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", ANON)
        .match_body(Matcher::Json(json!({"email": "ada@example.com", "password": "pw"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "jwt-1",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-1",
                "user": {"id": "u1", "email": "ada@example.com"}
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_current_user(server: &mut Server) -> Mock {
    server
        .mock("GET", "/auth/v1/user")
        .match_header("authorization", "Bearer jwt-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "u1", "email": "ada@example.com"}).to_string())
        .expect_at_least(1)
        .create_async()
        .await
}

async fn signed_in(server: &mut Server) -> (Arc<SupabaseClient>, NoteStoreClient) {
    let _sign_in = mock_sign_in(server).await;
    let supabase = client(server).await;
    let session = supabase
        .sign_in_with_password("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(session.user.id, "u1");
    assert!(session.expires_at.is_some());

    let store = NoteStoreClient::new(supabase.clone(), supabase.clone());
    (supabase, store)
}

#[tokio::test]
async fn test_list_notes_queries_owner_newest_first() {
    let mut server = Server::new_async().await;
    let (_supabase, store) = signed_in(&mut server).await;
    let _user = mock_current_user(&mut server).await;

    let select = server
        .mock("GET", "/rest/v1/notes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("user_id".into(), "eq.u1".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .match_header("apikey", ANON)
        .match_header("authorization", "Bearer jwt-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([row("n2", "Meeting", "agenda"), row("n1", "Groceries", "milk")]).to_string())
        .create_async()
        .await;

    let notes = store.list_notes().await.unwrap();
    select.assert_async().await;

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, NoteId::new("n2"));
}

#[tokio::test]
async fn test_create_note_sends_owner_and_returns_row() {
    let mut server = Server::new_async().await;
    let (_supabase, store) = signed_in(&mut server).await;
    let _user = mock_current_user(&mut server).await;

    let insert = server
        .mock("POST", "/rest/v1/notes")
        .match_header("prefer", "return=representation")
        .match_body(Matcher::Json(json!([
            {"title": "Groceries", "content": "milk", "user_id": "u1"}
        ])))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!([row("n1", "Groceries", "milk")]).to_string())
        .create_async()
        .await;

    let note = store.create_note("Groceries", "milk").await.unwrap();
    insert.assert_async().await;
    assert_eq!(note.id.as_str(), "n1");
    assert_eq!(note.user_id, "u1");
}

#[tokio::test]
async fn test_update_sends_only_patch_fields() {
    let mut server = Server::new_async().await;
    let (_supabase, store) = signed_in(&mut server).await;
    let _user = mock_current_user(&mut server).await;

    let patch = server
        .mock("PATCH", "/rest/v1/notes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.n1".into()))
        .match_body(Matcher::Json(json!({"title": "Renamed"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([row("n1", "Renamed", "milk")]).to_string())
        .create_async()
        .await;

    let note = store
        .update_note(&NoteId::new("n1"), &NotePatch::new().title("Renamed"))
        .await
        .unwrap();
    patch.assert_async().await;
    assert_eq!(note.title, "Renamed");
    assert_eq!(note.content, "milk");
}

#[tokio::test]
async fn test_update_with_no_visible_row_is_not_found() {
    let mut server = Server::new_async().await;
    let (_supabase, store) = signed_in(&mut server).await;
    let _user = mock_current_user(&mut server).await;

    let _patch = server
        .mock("PATCH", "/rest/v1/notes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let err = store
        .update_note(&NoteId::new("ghost"), &NotePatch::new().content("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::NotFound(ref id) if id == "ghost"));
}

#[tokio::test]
async fn test_delete_and_permission_errors() {
    let mut server = Server::new_async().await;
    let (_supabase, store) = signed_in(&mut server).await;
    let _user = mock_current_user(&mut server).await;

    let delete = server
        .mock("DELETE", "/rest/v1/notes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.n1".into()))
        .with_status(204)
        .create_async()
        .await;
    store.delete_note(&NoteId::new("n1")).await.unwrap();
    delete.assert_async().await;

    let _denied = server
        .mock("DELETE", "/rest/v1/notes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.n2".into()))
        .with_status(403)
        .with_body(r#"{"code":"42501","message":"permission denied for table notes"}"#)
        .create_async()
        .await;
    let err = store.delete_note(&NoteId::new("n2")).await.unwrap_err();
    match err {
        PersistError::Remote { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "permission denied for table notes");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_credentials_are_auth_errors() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let supabase = client(&server).await;
    let err = supabase
        .sign_in_with_password("ada@example.com", "nope")
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert!(err.to_string().contains("Invalid login credentials"));
    assert!(!supabase.subscribe().borrow().is_signed_in());
}

#[tokio::test]
async fn test_rejected_session_clears_current_user() {
    let mut server = Server::new_async().await;
    let (supabase, store) = signed_in(&mut server).await;
    let _user = server
        .mock("GET", "/auth/v1/user")
        .with_status(401)
        .with_body(r#"{"msg":"invalid JWT"}"#)
        .create_async()
        .await;

    assert!(supabase.current_user().await.unwrap().is_none());
    assert!(supabase.session().get().is_none());
    assert!(matches!(
        store.create_note("t", "c").await,
        Err(PersistError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_revocation_fails() {
    let mut server = Server::new_async().await;
    let (supabase, _store) = signed_in(&mut server).await;
    let logout = server
        .mock("POST", "/auth/v1/logout")
        .match_header("authorization", "Bearer jwt-1")
        .with_status(500)
        .create_async()
        .await;

    let mut states = supabase.subscribe();
    assert!(states.borrow_and_update().is_signed_in());

    supabase.sign_out().await.unwrap();
    logout.assert_async().await;
    assert!(!states.borrow_and_update().is_signed_in());
    assert!(supabase.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_up_posts_credentials() {
    let mut server = Server::new_async().await;
    let signup = server
        .mock("POST", "/auth/v1/signup")
        .match_body(Matcher::Json(json!({"email": "new@example.com", "password": "pw"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "u9", "email": "new@example.com"}).to_string())
        .create_async()
        .await;

    let supabase = client(&server).await;
    supabase.sign_up("new@example.com", "pw").await.unwrap();
    signup.assert_async().await;
    // Sign-up alone does not sign in
    assert!(supabase.session().get().is_none());
}
