//! Catalogue filters and enrollment.

use reqwest::StatusCode;
use solar_portal_integration_tests::{TestApp, location};

/// Seeded formation with one seat left (11/12).
const LAST_SEAT: &str = "/formations/3/enroll";

#[tokio::test]
async fn test_catalogue_lists_default_formations() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.get(&client, "/formations").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");

    assert!(body.contains("Installation Panneau Solaire - Débutant"));
    assert!(body.contains("Maintenance Système Solaire"));
    assert!(body.contains("Audit Énergétique Avancé"));
    assert!(body.contains("11/12 inscrits"));
}

#[tokio::test]
async fn test_catalogue_filters() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let body = app
        .get(&client, "/formations?level=intermediaire")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Maintenance Système Solaire"));
    assert!(!body.contains("Audit Énergétique Avancé"));

    let body = app
        .get(&client, "/formations?category=Audit")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Audit Énergétique Avancé"));
    assert!(!body.contains("Maintenance Système Solaire"));

    // Level and category both apply
    let body = app
        .get(&client, "/formations?level=debutant&category=Audit")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Aucune formation ne correspond"));

    // Unknown values select everything
    let body = app
        .get(&client, "/formations?level=Tous&category=Inconnu")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Installation Panneau Solaire - Débutant"));
    assert!(body.contains("Audit Énergétique Avancé"));
}

#[tokio::test]
async fn test_enroll_requires_sign_in() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = app.post_form(&client, LAST_SEAT, &[]).await;
    assert_eq!(location(&resp), "/auth/login?error=login_required");

    // Seat count unchanged
    let body = app
        .get(&client, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("11/12 inscrits"));
}

#[tokio::test]
async fn test_enroll_then_withdraw() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    let resp = app.post_form(&client, "/formations/1/enroll", &[]).await;
    assert_eq!(location(&resp), "/formations?success=enrolled");

    let body = app
        .get(&client, "/formations?success=enrolled")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Inscription confirmée"));
    assert!(body.contains("13/20 inscrits"));
    assert!(body.contains("Se retirer"));

    let body = app
        .get(&client, "/account")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Installation Panneau Solaire - Débutant"));

    let resp = app.post_form(&client, "/formations/1/enroll", &[]).await;
    assert_eq!(location(&resp), "/formations?success=unenrolled");

    let body = app
        .get(&client, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("12/20 inscrits"));

    let body = app
        .get(&client, "/account")
        .await
        .text()
        .await
        .expect("body");
    assert!(!body.contains("Installation Panneau Solaire - Débutant"));
}

#[tokio::test]
async fn test_full_formation_refuses_enrollment() {
    let app = TestApp::spawn().await;
    let first = app.visitor();
    let second = app.visitor();
    app.register(&first, "Ana", "ana@example.ht").await;
    app.register(&second, "Béa", "bea@example.ht").await;

    let resp = app.post_form(&first, LAST_SEAT, &[]).await;
    assert_eq!(location(&resp), "/formations?success=enrolled");

    let resp = app.post_form(&second, LAST_SEAT, &[]).await;
    assert_eq!(location(&resp), "/formations?error=full");

    let body = app
        .get(&second, "/formations")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("12/12 inscrits"));
    assert!(body.contains("Complet"));

    // Withdrawing from a full formation frees the seat
    let resp = app.post_form(&first, LAST_SEAT, &[]).await;
    assert_eq!(location(&resp), "/formations?success=unenrolled");

    let resp = app.post_form(&second, LAST_SEAT, &[]).await;
    assert_eq!(location(&resp), "/formations?success=enrolled");
}

#[tokio::test]
async fn test_enroll_unknown_formation() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    app.register(&client, "Ana", "ana@example.ht").await;

    let resp = app.post_form(&client, "/formations/999/enroll", &[]).await;
    assert_eq!(location(&resp), "/formations?error=not_found");
}
