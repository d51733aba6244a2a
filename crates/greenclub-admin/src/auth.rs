//! Sign-in and sign-up as the auth screen performs them: validate, call the
//! backend, translate its well-known failures into friendlier messages.

use tracing::info;

use greenclub_backend::{AuthService, BackendError, SignUp};
use greenclub_types::models::Session;

use crate::error::{AdminError, Result};
use crate::notify::Notifier;
use crate::validate;

fn friendly(err: &BackendError, known: &str, replacement: &str) -> String {
    let message = err.to_string();
    if message.contains(known) { replacement.to_string() } else { message }
}

pub async fn sign_in<A: AuthService + ?Sized>(
    auth: &A,
    email: &str,
    password: &str,
    notifier: &dyn Notifier,
) -> Result<Session> {
    let credentials = validate::sign_in_form(email, password).inspect_err(|e| {
        notifier.error(&e.message);
    })?;

    match auth.sign_in(&credentials.email, &credentials.password).await {
        Ok(session) => {
            info!("User {} signed in", session.user.email);
            notifier.success("Logged in successfully!");
            Ok(session)
        }
        Err(e) => {
            notifier.error(&friendly(&e, "Invalid login credentials", "Invalid email or password"));
            Err(AdminError::from(e))
        }
    }
}

pub async fn sign_up<A: AuthService + ?Sized>(
    auth: &A,
    email: &str,
    password: &str,
    full_name: &str,
    notifier: &dyn Notifier,
) -> Result<SignUp> {
    let (credentials, full_name) =
        validate::sign_up_form(email, password, full_name).inspect_err(|e| {
            notifier.error(&e.message);
        })?;

    match auth
        .sign_up(&credentials.email, &credentials.password, &full_name)
        .await
    {
        Ok(outcome) => {
            info!("Account created for {}", credentials.email);
            notifier.success("Account created successfully!");
            Ok(outcome)
        }
        Err(e) => {
            notifier.error(&friendly(
                &e,
                "already registered",
                "This email is already registered. Please log in instead.",
            ));
            Err(AdminError::from(e))
        }
    }
}
