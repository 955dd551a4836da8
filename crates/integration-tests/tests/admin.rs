//! Admin panel access and actions.

use reqwest::StatusCode;
use solar_portal_integration_tests::{ADMIN_EMAIL, TestApp, location};

fn formation_form<'a>(
    title: &'a str,
    capacity: &'a str,
    enrolled: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("description", "Dimensionnement des batteries et onduleurs."),
        ("date", "2026-04-18"),
        ("time", "09:30"),
        ("duration", "3 heures"),
        ("location", "Ouanaminthe, Haïti"),
        ("instructor", "Jean Pierre (Ingénieur)"),
        ("capacity", capacity),
        ("enrolled", enrolled),
        ("level", "intermediaire"),
        ("category", "Installation"),
        ("price", "60"),
        ("image", ""),
    ]
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_admin_signed_out_redirects_to_login() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.get(&client, "/admin").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_admin_forbidden_for_regular_user() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    let resp = app.get(&client, "/admin").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Accès Administrateur Requis"));

    let resp = app.post_form(&client, "/admin/formations/1/delete", &[]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_email_with_wrong_password_is_not_admin() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.login(&client, ADMIN_EMAIL, "pas-le-bon").await;
    assert_eq!(location(&resp), "/");

    let resp = app.get(&client, "/admin").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_panel_shows_stats() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let resp = app.get(&admin, "/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");

    assert!(body.contains("Panneau d'Administration"));
    // 12 + 8 + 11 seats of 20 + 15 + 12
    assert!(body.contains("31/47"));
    assert!(body.contains(ADMIN_EMAIL));
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_admin_cannot_act_on_self() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let resp = app.post_form(&admin, "/admin/users/1/toggle-admin", &[]).await;
    assert_eq!(location(&resp), "/admin?error=self_action");

    let resp = app.post_form(&admin, "/admin/users/1/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?error=self_action");
}

#[tokio::test]
async fn test_admin_grants_admin_rights() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    let resp = app.post_form(&admin, "/admin/users/2/toggle-admin", &[]).await;
    assert_eq!(location(&resp), "/admin?success=admin_toggled");

    // Rights are read from the directory, not the session copy
    let resp = app.get(&client, "/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);

    app.post_form(&admin, "/admin/users/2/toggle-admin", &[]).await;
    let resp = app.get(&client, "/admin").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_user_releases_seats() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    app.post_form(&client, "/formations/3/enroll", &[]).await;
    let body = app
        .get(&client, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("12/12 inscrits"));

    let resp = app.post_form(&admin, "/admin/users/2/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?success=user_deleted");

    let body = app
        .get(&admin, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("11/12 inscrits"));

    let resp = app.post_form(&admin, "/admin/users/2/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?error=user_not_found");
}

#[tokio::test]
async fn test_deleted_user_session_ends() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ghost = app.visitor();
    app.register(&ghost, "Gaëlle", "gaelle@example.ht").await;

    let resp = app.post_form(&admin, "/admin/users/2/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?success=user_deleted");

    let resp = app.get(&ghost, "/account").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = app.post_form(&ghost, "/formations/3/enroll", &[]).await;
    assert_eq!(location(&resp), "/auth/login?error=login_required");
    let body = app
        .get(&admin, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("11/12 inscrits"));

    // The newcomer gets a fresh id, not the deleted account's
    let newcomer = app.visitor();
    app.register(&newcomer, "Nadia", "nadia@example.ht").await;
    assert!(!app.is_signed_in(&ghost).await);
    let resp = app.post_form(&admin, "/admin/users/2/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?error=user_not_found");
    let resp = app.post_form(&admin, "/admin/users/3/toggle-admin", &[]).await;
    assert_eq!(location(&resp), "/admin?success=admin_toggled");
}

// ============================================================================
// Formations
// ============================================================================

#[tokio::test]
async fn test_create_formation() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let resp = app.get(&admin, "/admin/formations/new").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let form = formation_form("Stockage et Batteries", "10", "0");
    let resp = app.post_form(&admin, "/admin/formations", &form).await;
    assert_eq!(location(&resp), "/admin?success=formation_created");

    let body = app
        .get(&admin, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Stockage et Batteries"));
    assert!(body.contains("0/10 inscrits"));
}

#[tokio::test]
async fn test_create_formation_validation() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let form = formation_form("", "10", "0");
    let resp = app.post_form(&admin, "/admin/formations", &form).await;
    assert_eq!(location(&resp), "/admin/formations/new?error=empty_title");

    let form = formation_form("Stockage", "5", "6");
    let resp = app.post_form(&admin, "/admin/formations", &form).await;
    assert_eq!(location(&resp), "/admin/formations/new?error=over_capacity");

    let form = formation_form("Stockage", "dix", "0");
    let resp = app.post_form(&admin, "/admin/formations", &form).await;
    assert_eq!(location(&resp), "/admin/formations/new?error=invalid_number");

    let body = app
        .get(&admin, "/admin/formations/new?error=over_capacity")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("dépasse la capacité"));
}

#[tokio::test]
async fn test_update_formation() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let resp = app.get(&admin, "/admin/formations/2/edit").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("value=\"Maintenance Système Solaire\""));

    let form = formation_form("Maintenance Avancée", "15", "8");
    let resp = app.post_form(&admin, "/admin/formations/2", &form).await;
    assert_eq!(location(&resp), "/admin?success=formation_updated");

    let body = app
        .get(&admin, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Maintenance Avancée"));
    assert!(!body.contains("Maintenance Système Solaire"));

    let resp = app.post_form(&admin, "/admin/formations/99", &form).await;
    assert_eq!(location(&resp), "/admin?error=formation_not_found");

    let resp = app.get(&admin, "/admin/formations/99/edit").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_formation() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let resp = app.post_form(&admin, "/admin/formations/1/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?success=formation_deleted");

    let body = app
        .get(&admin, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(!body.contains("Installation Panneau Solaire - Débutant"));

    let resp = app.post_form(&admin, "/admin/formations/1/delete", &[]).await;
    assert_eq!(location(&resp), "/admin?error=formation_not_found");
}
