use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_original() {
        let hash = hash_password("mật-khẩu-bí-mật").expect("hashing succeeds");
        assert!(verify_password("mật-khẩu-bí-mật", &hash).expect("verify runs"));
    }

    #[test]
    fn verify_rejects_other_password() {
        let hash = hash_password("one-password").expect("hashing succeeds");
        assert!(!verify_password("another-password", &hash).expect("verify runs"));
    }

    #[test]
    fn verify_errors_on_garbage_hash() {
        assert!(verify_password("anything", "$argon2$nope").is_err());
    }
}
