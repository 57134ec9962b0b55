// Unit tests for the single-use challenge/deny responder

use warden::chain::responder::{Disposition, Responder};
use warden::chain::verify::ProtocolError;
use warden::core::errors::IdentityError;

#[tokio::test]
async fn test_redirect_is_single_use() {
    let (responder, rx) = Responder::channel();
    assert!(responder.redirect("/login").is_ok());
    assert_eq!(
        responder.redirect("/elsewhere"),
        Err(ProtocolError::AlreadyResponded)
    );

    match rx.await.unwrap() {
        Disposition::Redirect(url) => assert_eq!(url, "/login"),
        other => panic!("unexpected disposition: {:?}", other),
    }
}

#[tokio::test]
async fn test_send_carries_the_error() {
    let (responder, rx) = Responder::channel();
    assert!(responder
        .send(IdentityError::Unauthorized("bad token".to_string()))
        .is_ok());

    match rx.await.unwrap() {
        Disposition::Send(IdentityError::Unauthorized(message)) => {
            assert_eq!(message, "bad token")
        }
        other => panic!("unexpected disposition: {:?}", other),
    }
}

#[tokio::test]
async fn test_error_routes_to_the_pipeline_channel() {
    let (responder, rx) = Responder::channel();
    assert!(responder.error(anyhow::anyhow!("redirect target missing")).is_ok());

    match rx.await.unwrap() {
        Disposition::Error(IdentityError::Handler(err)) => {
            assert!(err.to_string().contains("redirect target missing"))
        }
        other => panic!("unexpected disposition: {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_responder_is_detectable() {
    let (responder, rx) = Responder::channel();
    drop(responder);
    assert!(rx.await.is_err());
}

#[tokio::test]
async fn test_stale_responder_cannot_respond() {
    let (responder, rx) = Responder::channel();
    drop(rx);
    assert_eq!(responder.redirect("/login"), Err(ProtocolError::Stale));
}
