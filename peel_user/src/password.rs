use peel_core::error::{PeelError, PeelResult};

use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use entrait::entrait_export as entrait;

#[entrait(pub HashPassword, no_deps, mock_api=HashPasswordMock)]
async fn hash_password(password: String) -> PeelResult<peel_core::PasswordHash> {
    // Argon2 hashing is designed to be computationally intensive,
    // so we need to do this on a blocking thread.
    tokio::task::spawn_blocking(move || -> PeelResult<peel_core::PasswordHash> {
        let salt = SaltString::generate(rand::thread_rng());
        Ok(peel_core::PasswordHash(
            argon2::PasswordHash::generate(Argon2::default(), password, &salt)
                .map_err(|e| anyhow::anyhow!("failed to generate password hash: {}", e))?
                .to_string(),
        ))
    })
    .await
    .context("panic when generating password hash")?
}

#[entrait(pub VerifyPassword, no_deps, mock_api=VerifyPasswordMock)]
async fn verify_password(
    password: String,
    password_hash: peel_core::PasswordHash,
) -> PeelResult<()> {
    tokio::task::spawn_blocking(move || -> PeelResult<()> {
        let hash = argon2::PasswordHash::new(&password_hash.0)
            .map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;

        hash.verify_password(&[&Argon2::default()], password)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => PeelError::Unauthorized,
                _ => anyhow::anyhow!("failed to verify password hash: {}", e).into(),
            })
    })
    .await
    .context("panic when verifying password hash")??;

    Ok(())
}
