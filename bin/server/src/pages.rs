//! HTML pages served on the OAuth redirect.
//!
//! The redirect lands in a real browser on the user's phone; these
//! pages tell them (in French, the app's language) to return to the
//! mobile app, and show the manual session key as a fallback.

use axum::response::Html;

const PAGE_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 40px; text-align: center; background: #f5f5f5; } \
.container { background: white; padding: 30px; border-radius: 8px; max-width: 500px; margin: 0 auto; box-shadow: 0 2px 10px rgba(0,0,0,0.1); } \
.success { color: #4CAF50; font-size: 24px; margin-bottom: 20px; } \
.error { color: #f44336; font-size: 24px; margin-bottom: 20px; } \
.code { background: #f0f0f0; padding: 10px; border-radius: 4px; font-family: monospace; margin: 20px 0; word-break: break-all; font-size: 12px; } \
.instruction { margin: 20px 0; line-height: 1.5; color: #666; }";

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n\
         <style>{PAGE_STYLE}</style>\n\
         </head>\n<body>\n<div class=\"container\">\n{body}\n</div>\n</body>\n</html>"
    ))
}

/// Success page shown after Google consent; displays the session key
/// for manual recovery when automatic polling does not pick it up.
pub fn success_page(session_key: &str) -> Html<String> {
    page(
        "Authentification Google Réussie",
        &format!(
            "<div class=\"success\">Authentification Google Réussie !</div>\n\
             <p class=\"instruction\"><strong>Retournez maintenant dans votre application \
             mobile.</strong><br>L'application détectera automatiquement votre \
             authentification dans quelques secondes.</p>\n\
             <div class=\"code\">ID de Session : {session_key}</div>\n\
             <p class=\"instruction\">Si l'application ne détecte pas l'authentification, \
             copiez l'ID de session ci-dessus et utilisez la vérification manuelle dans \
             l'application.</p>\n\
             <script>setTimeout(function() {{ window.close(); }}, 10000);</script>"
        ),
    )
}

/// Error page for an OAuth error returned by Google.
pub fn oauth_error_page(error: &str, description: Option<&str>) -> Html<String> {
    let explanation = if error == "access_denied" {
        "Vous avez annulé l'authentification. Veuillez réessayer si vous souhaitez vous connecter."
            .to_string()
    } else {
        format!(
            "Une erreur s'est produite : {}",
            description.unwrap_or(error)
        )
    };

    page(
        "Erreur d'Authentification",
        &format!(
            "<div class=\"error\">Erreur d'Authentification Google</div>\n\
             <p class=\"instruction\">{explanation}</p>\n\
             <button onclick=\"window.close()\">Fermer cette fenêtre</button>"
        ),
    )
}

/// Error page when the redirect carried neither code nor error.
pub fn missing_code_page() -> Html<String> {
    page(
        "Erreur d'Authentification",
        "<div class=\"error\">Erreur d'Authentification</div>\n\
         <p class=\"instruction\">Aucun code d'autorisation reçu de Google. Veuillez \
         réessayer l'authentification.</p>\n\
         <button onclick=\"window.close()\">Fermer cette fenêtre</button>",
    )
}
