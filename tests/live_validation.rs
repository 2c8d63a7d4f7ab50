use std::sync::Arc;

use tigris_relay::{
    config::Config,
    relay::{RelayApi, RelayService},
    tigris::Operation,
};

fn live_config() -> Config {
    dotenvy::dotenv().ok();
    Config::from_env().expect("TIGRIS_URI, TIGRIS_PROJECT, TIGRIS_ID and TIGRIS_SECRET must be set")
}

#[tokio::test]
#[ignore = "Requires live Tigris credentials"]
async fn live_token_exchange_and_describe() {
    let config = live_config();
    let service = Arc::new(RelayService::from_config(&config).expect("relay service"));

    let session = service.authenticate().await.expect("token exchange");
    assert!(session.expires_in > 0, "expiry should be positive: {session:?}");

    let response = service
        .relay(Operation::DescribeCollection {
            collection: "users".into(),
        })
        .await
        .expect("describe request");
    assert_ne!(
        response.status.as_u16(),
        401,
        "fresh token should be accepted: {response:?}"
    );
}
