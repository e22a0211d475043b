use inkpost_domain::FieldErrors;
use inkpost_domain::error::FIELD_REQUIRED;
use inkpost_notify::template;
use salvo::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

pub(super) fn router() -> Router {
    Router::with_path("contact").post(contact)
}

#[derive(Debug, Default, Deserialize)]
struct ContactForm {
    name: Option<String>,
    email: Option<String>,
    subject: Option<String>,
    message: Option<String>,
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            errors.add(field, FIELD_REQUIRED);
            String::new()
        }
    }
}

/// Relay a visitor message to the site contact address.
#[handler]
async fn contact(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let form = req.parse_json::<ContactForm>().await?;

    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", form.name);
    let email = required(&mut errors, "email", form.email);
    let subject = required(&mut errors, "subject", form.subject);
    let message = required(&mut errors, "message", form.message);
    errors.into_result()?;

    let mail = template::contact_message(&state.contact_to, &name, &email, &subject, &message);
    state.mailer.send(mail).await?;
    tracing::info!(from = %email, "contact message relayed");
    res.render(Json(json!({ "message": "Email sent successfully!" })));
    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;

    use crate::routers::tests::{BASE, Harness};

    use super::*;

    #[tokio::test]
    async fn test_contact() {
        let h = Harness::new().await;
        let mut res = TestClient::post(format!("{BASE}/contact/"))
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Lovely blog",
            }))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            res.take_json::<Value>().await.unwrap(),
            json!({"message": "Email sent successfully!"})
        );
        let sent = h.mailer.sent_to("contact@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Hello");
        assert!(sent[0].body.contains("From: Ada <ada@example.com>"));
    }

    #[tokio::test]
    async fn test_contact_errors() {
        let h = Harness::new().await;
        let mut res = TestClient::post(format!("{BASE}/contact"))
            .json(&json!({"name": "Ada", "email": "ada@example.com"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        let body: Value = res.take_json().await.unwrap();
        assert!(body.get("subject").is_some());
        assert!(body.get("message").is_some());

        h.mailer.fail_all();
        let mut res = TestClient::post(format!("{BASE}/contact"))
            .json(&json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Lovely blog",
            }))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(
            res.take_json::<Value>().await.unwrap(),
            json!({"detail": "Internal server error"})
        );
    }
}
