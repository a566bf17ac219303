//! Integration test: start the gateway on a free port, GET / and /favicon.ico.
//! Does not reach LINE or the completion provider. The server task is left running when the test ends.

use lingo::config::Config;
use lingo::gateway;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

#[tokio::test]
async fn gateway_serves_greeting_and_empty_favicon() {
    let port = free_port();

    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    config.channels.line.channel_secret = Some("test-secret".to_string());
    config.channels.line.channel_access_token = Some("test-token".to_string());
    config.channels.line.api_base = Some("http://127.0.0.1:9".to_string());
    config.completion.api_key = Some("test-key".to_string());
    config.completion.base_url = Some("http://127.0.0.1:9/v1".to_string());

    let gateway_handle = tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(format!("{}/", base)).send().await {
            Ok(resp) if resp.status().is_success() => {
                assert_eq!(resp.text().await.expect("body"), "Hello, this is the home page!");
                let favicon = client
                    .get(format!("{}/favicon.ico", base))
                    .send()
                    .await
                    .expect("favicon request");
                assert_eq!(favicon.status().as_u16(), 204);
                let unsigned = client
                    .post(format!("{}/callback", base))
                    .body(r#"{"events":[]}"#)
                    .send()
                    .await
                    .expect("callback request");
                assert_eq!(unsigned.status().as_u16(), 400);
                return;
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    gateway_handle.abort();
    panic!(
        "GET {}/ did not return 200 within 5s; last error: {:?}",
        base, last_err
    );
}

#[tokio::test]
async fn gateway_refuses_to_start_without_credentials() {
    if std::env::var_os("LINE_CHANNEL_SECRET").is_some() {
        return;
    }
    let mut config = Config::default();
    config.gateway.bind = "127.0.0.1".to_string();
    config.gateway.port = free_port();
    let err = gateway::run_gateway(config).await.expect_err("must fail");
    assert!(err.to_string().contains("LINE_CHANNEL_SECRET"), "{err:#}");
}
