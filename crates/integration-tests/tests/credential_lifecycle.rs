//! Credential acquisition, caching, and single-flight behavior.

use std::sync::atomic::Ordering;

use celekt_crm::{CredentialProvider, CrmError, RemoteClient};
use celekt_integration_tests::MockCrm;

fn provider_for(mock: &MockCrm) -> CredentialProvider {
    RemoteClient::new(&mock.config()).credentials().clone()
}

#[tokio::test]
async fn concurrent_acquisitions_share_one_exchange() {
    let mock = MockCrm::start().await;
    // Widen the race window so every caller arrives before the first
    // exchange resolves.
    mock.state.token_delay_ms.store(50, Ordering::SeqCst);

    let provider = provider_for(&mock);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.access_token().await })
        })
        .collect();

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(
        mock.state.token_exchanges.load(Ordering::SeqCst),
        1,
        "concurrent callers must share a single in-flight exchange"
    );
    assert!(tokens.iter().all(|t| t == "tok-1"));
}

#[tokio::test]
async fn cached_credential_is_reused_until_invalidated() {
    let mock = MockCrm::start().await;
    let provider = provider_for(&mock);

    let first = provider.access_token().await.unwrap();
    let second = provider.access_token().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(mock.state.token_exchanges.load(Ordering::SeqCst), 1);
    assert!(provider.has_valid_credential().await);

    provider.invalidate().await;
    assert!(!provider.has_valid_credential().await);

    let third = provider.access_token().await.unwrap();
    assert_eq!(third, "tok-2");
    assert_eq!(mock.state.token_exchanges.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_exchange_surfaces_auth_failure() {
    let mock = MockCrm::start().await;
    mock.state.reject_token_exchanges.store(1, Ordering::SeqCst);

    let provider = provider_for(&mock);
    let err = provider.access_token().await.unwrap_err();

    match err {
        CrmError::Auth(message) => {
            assert_eq!(message, "client secret rejected");
        }
        other => panic!("expected Auth failure, got {other:?}"),
    }

    // The failure is not retried inside the provider; the next call is a
    // fresh exchange that succeeds.
    let token = provider.access_token().await.unwrap();
    assert_eq!(token, "tok-1");
}

#[tokio::test]
async fn missing_expiry_uses_fallback_ttl() {
    let mock = MockCrm::start().await;
    mock.state.omit_token_expiry.store(1, Ordering::SeqCst);

    let provider = provider_for(&mock);
    provider.access_token().await.unwrap();

    // The credential is cached and considered valid under the fallback TTL.
    assert!(provider.has_valid_credential().await);
    assert_eq!(mock.state.token_exchanges.load(Ordering::SeqCst), 1);

    provider.access_token().await.unwrap();
    assert_eq!(mock.state.token_exchanges.load(Ordering::SeqCst), 1);
}
