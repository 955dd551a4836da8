//! Registration, sign-in and sign-out.

use reqwest::StatusCode;
use solar_portal_integration_tests::{TestApp, location};

#[tokio::test]
async fn test_register_signs_in() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app
        .register(&client, "Nadège Joseph", "nadege@example.ht")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = app.get(&client, "/account").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Bonjour, Nadège Joseph"));
    assert!(body.contains("nadege@example.ht"));
}

#[tokio::test]
async fn test_registration_rejections_create_no_session() {
    let app = TestApp::spawn().await;

    let cases: [([(&str, &str); 4], &str); 4] = [
        (
            [
                ("name", ""),
                ("email", "a@example.ht"),
                ("password", "motdepasse"),
                ("confirm_password", "motdepasse"),
            ],
            "/auth/register?error=missing_fields",
        ),
        (
            [
                ("name", "Ana"),
                ("email", "a@example.ht"),
                ("password", "motdepasse"),
                ("confirm_password", "motdepassf"),
            ],
            "/auth/register?error=password_mismatch",
        ),
        (
            [
                ("name", "Ana"),
                ("email", "a@example.ht"),
                ("password", "court"),
                ("confirm_password", "court"),
            ],
            "/auth/register?error=weak_password",
        ),
        (
            [
                ("name", "Ana"),
                ("email", "pas-un-email"),
                ("password", "motdepasse"),
                ("confirm_password", "motdepasse"),
            ],
            "/auth/register?error=invalid_email",
        ),
    ];

    for (form, expected) in cases {
        let client = app.visitor();
        let resp = app.post_form(&client, "/auth/register", &form).await;
        assert_eq!(location(&resp), expected);
        assert!(!app.is_signed_in(&client).await, "signed in after {expected}");
    }
}

#[tokio::test]
async fn test_register_error_message_rendered() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app
        .get(&client, "/auth/register?error=password_mismatch")
        .await;
    let body = resp.text().await.expect("body");
    assert!(body.contains("Les mots de passe ne correspondent pas"));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.login(&client, "visiteur@example.ht", "").await;
    assert_eq!(location(&resp), "/auth/login?error=missing_fields");
    assert!(!app.is_signed_in(&client).await);
}

#[tokio::test]
async fn test_login_then_logout() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.login(&client, "Visiteur@Example.ht", "nimporte").await;
    assert_eq!(location(&resp), "/");
    assert!(app.is_signed_in(&client).await);

    // First sign-in names the account after the email's local part
    let body = app
        .get(&client, "/account")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Bonjour, Visiteur"));

    let resp = app.post_form(&client, "/auth/logout", &[]).await;
    assert_eq!(location(&resp), "/");
    assert!(!app.is_signed_in(&client).await);

    // Signing out twice is harmless
    let resp = app.post_form(&client, "/auth/logout", &[]).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.get(&client, "/account").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_sessions_are_per_visitor() {
    let app = TestApp::spawn().await;
    let first = app.visitor();
    let second = app.visitor();

    app.register(&first, "Ana", "ana@example.ht").await;

    assert!(app.is_signed_in(&first).await);
    assert!(!app.is_signed_in(&second).await);
}

#[tokio::test]
async fn test_tampered_session_cookie_is_signed_out() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    let forged = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");
    let resp = forged
        .get(app.url("/account"))
        .header("cookie", "sp_session=forged-session-id")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
