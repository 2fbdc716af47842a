use super::{Ctx, Submitted};
use crate::{
    db::Store,
    error::HttpError,
    forms::{EMAIL_TAKEN, FieldErrors, LoginInput, RegisterInput},
    models::{NewUser, User, UserRole},
    utils::password,
};

/// Create an account with role `user`.
///
/// The email is checked against existing users after the syntactic rules; a
/// registration racing past that check is caught by the unique index and
/// reported the same way.
pub async fn register<S: Store>(
    ctx: Ctx<'_, S>,
    input: &RegisterInput,
) -> Result<Submitted<User>, HttpError> {
    let (registration, mut errors) = match input.validated() {
        Ok(registration) => (Some(registration), FieldErrors::new()),
        Err(errors) => (None, errors),
    };

    if errors.get("email").is_none()
        && ctx
            .store
            .get_user(None, Some(input.email.as_str()))
            .await?
            .is_some()
    {
        errors.add("email", EMAIL_TAKEN);
    }

    let Some(registration) = registration.filter(|_| errors.is_empty()) else {
        return Ok(Submitted::Rejected(errors));
    };

    let password_hash = password::hash(registration.password)?;
    let new_user = NewUser {
        name: registration.name,
        email: registration.email,
        phone: registration.phone,
        password_hash,
        role: UserRole::User,
    };

    match ctx.store.save_user(&new_user).await? {
        Some(user) => {
            tracing::info!(user_id = user.id, "user registered");
            Ok(Submitted::Accepted(user))
        }
        None => {
            let mut errors = FieldErrors::new();
            errors.add("email", EMAIL_TAKEN);
            Ok(Submitted::Rejected(errors))
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LoginOutcome {
    Authenticated(User),
    InvalidCredentials,
    Invalid(FieldErrors),
}

/// Check credentials. Unknown email and wrong password are indistinguishable
/// to the caller.
pub async fn login<S: Store>(
    ctx: Ctx<'_, S>,
    input: &LoginInput,
) -> Result<LoginOutcome, HttpError> {
    if let Err(errors) = input.validated() {
        return Ok(LoginOutcome::Invalid(errors));
    }

    let Some(user) = ctx.store.get_user(None, Some(input.email.as_str())).await? else {
        return Ok(LoginOutcome::InvalidCredentials);
    };

    match password::compare(&input.password, &user.password_hash) {
        Ok(true) => {
            tracing::info!(user_id = user.id, "login succeeded");
            Ok(LoginOutcome::Authenticated(user))
        }
        Ok(false) => Ok(LoginOutcome::InvalidCredentials),
        Err(err) => {
            tracing::warn!(user_id = user.id, error = %err, "stored password hash unusable");
            Ok(LoginOutcome::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::memory::MemoryStore, session::Identity};

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Ada Lovelace".into(),
            email: email.into(),
            phone: "0123456789".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let mut store = MemoryStore::new();
        let anon = Identity::Anonymous;

        let registered = register(Ctx::new(&anon, &mut store), &input("ada@example.com"))
            .await
            .unwrap();
        let Submitted::Accepted(user) = registered else {
            panic!("registration rejected");
        };
        assert_eq!(user.role, UserRole::User);
        assert_ne!(user.password_hash, "secret1");

        let login_input = LoginInput {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        };
        let outcome = login(Ctx::new(&anon, &mut store), &login_input).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Authenticated(user));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let mut store = MemoryStore::new();
        let anon = Identity::Anonymous;

        register(Ctx::new(&anon, &mut store), &input("ada@example.com"))
            .await
            .unwrap();
        let second = register(Ctx::new(&anon, &mut store), &input("ada@example.com"))
            .await
            .unwrap();

        let Submitted::Rejected(errors) = second else {
            panic!("duplicate accepted");
        };
        assert_eq!(errors.get("email"), Some(EMAIL_TAKEN));
        assert_eq!(store.users.len(), 1);
    }

    #[tokio::test]
    async fn invalid_registration_writes_nothing() {
        let mut store = MemoryStore::new();
        let anon = Identity::Anonymous;
        let mut bad = input("ada@example.com");
        bad.confirm_password = "different".into();

        let outcome = register(Ctx::new(&anon, &mut store), &bad).await.unwrap();
        assert!(matches!(outcome, Submitted::Rejected(_)));
        assert!(store.users.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_alike() {
        let mut store = MemoryStore::new();
        let anon = Identity::Anonymous;
        register(Ctx::new(&anon, &mut store), &input("ada@example.com"))
            .await
            .unwrap();

        for (email, password) in [("ada@example.com", "wrong!"), ("bob@example.com", "secret1")] {
            let attempt = LoginInput {
                email: email.into(),
                password: password.into(),
            };
            let outcome = login(Ctx::new(&anon, &mut store), &attempt).await.unwrap();
            assert_eq!(outcome, LoginOutcome::InvalidCredentials);
        }

        let blank = LoginInput::default();
        let outcome = login(Ctx::new(&anon, &mut store), &blank).await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Invalid(_)));
    }
}
