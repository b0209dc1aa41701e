use jiff::SignedDuration;
use uuid::Uuid;

use statwox_auth::error::AuthError;
use statwox_auth::jwt::{TokenSigner, bearer_token};
use statwox_auth::password::{hash_password, verify_password};

const SECRET: &str = "0123456789abcdef0123456789abcdef-test";

#[test]
fn short_secrets_are_rejected() {
    let result = TokenSigner::new("too-short", SignedDuration::from_hours(1));
    assert!(matches!(result, Err(AuthError::WeakSecret { min: 32, .. })));
}

#[test]
fn signed_tokens_verify() {
    let signer = TokenSigner::new(SECRET, SignedDuration::from_hours(24)).unwrap();
    let user_id = Uuid::new_v4();

    let token = signer.sign(user_id, "ada@example.com").unwrap();
    let claims = signer.verify(&token).unwrap();

    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.email, "ada@example.com");
    assert!(claims.exp > claims.iat);
}

#[test]
fn tokens_from_another_secret_fail() {
    let signer = TokenSigner::new(SECRET, SignedDuration::from_hours(1)).unwrap();
    let other = TokenSigner::new("another-secret-that-is-long-enough-123", SignedDuration::from_hours(1)).unwrap();

    let token = other.sign(Uuid::new_v4(), "x@example.com").unwrap();
    assert!(matches!(signer.verify(&token), Err(AuthError::InvalidToken(_))));
    assert!(signer.verify("garbage").is_err());
}

#[test]
fn expired_tokens_are_reported() {
    let signer = TokenSigner::new(SECRET, SignedDuration::from_hours(-2)).unwrap();
    let token = signer.sign(Uuid::new_v4(), "x@example.com").unwrap();
    assert!(matches!(signer.verify(&token), Err(AuthError::TokenExpired)));
}

#[test]
fn bearer_prefix_is_required() {
    assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
    assert_eq!(bearer_token(Some("Basic abc")), None);
    assert_eq!(bearer_token(Some("Bearer ")), None);
    assert_eq!(bearer_token(None), None);
}

#[test]
fn passwords_round_trip_through_bcrypt() {
    let hash = hash_password("hunter22", 4).unwrap();
    assert_ne!(hash, "hunter22");
    assert!(verify_password("hunter22", &hash).unwrap());
    assert!(!verify_password("hunter23", &hash).unwrap());
}
