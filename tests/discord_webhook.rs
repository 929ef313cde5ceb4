// tests/discord_webhook.rs
//! DiscordNotifier against a local axum server standing in for the webhook.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use earnings_relay::notify::DiscordNotifier;
use earnings_relay::{EarningsAlert, Notifier, Outcome};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct Hook {
    bodies: Arc<Mutex<Vec<Value>>>,
    /// Status codes to answer with before succeeding.
    script: Arc<Mutex<Vec<u16>>>,
    /// `Retry-After` value sent with every 429.
    retry_after: &'static str,
}

async fn receive(State(hook): State<Hook>, Json(body): Json<Value>) -> impl IntoResponse {
    hook.bodies.lock().unwrap().push(body);
    let next = {
        let mut s = hook.script.lock().unwrap();
        if s.is_empty() {
            None
        } else {
            Some(s.remove(0))
        }
    };
    match next {
        Some(429) => (
            StatusCode::TOO_MANY_REQUESTS,
            [("retry-after", hook.retry_after)],
            format!(r#"{{"retry_after":{}}}"#, hook.retry_after),
        )
            .into_response(),
        Some(code) => StatusCode::from_u16(code).unwrap().into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn spawn_hook(script: Vec<u16>) -> (String, Hook) {
    spawn_hook_with(script, "0.01").await
}

async fn spawn_hook_with(script: Vec<u16>, retry_after: &'static str) -> (String, Hook) {
    let hook = Hook {
        script: Arc::new(Mutex::new(script)),
        retry_after,
        ..Default::default()
    };
    let app = Router::new()
        .route("/webhook", post(receive))
        .with_state(hook.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/webhook"), hook)
}

fn alert() -> EarningsAlert {
    EarningsAlert {
        post_id: 571034918,
        ticker: Some("NVDA".into()),
        outcome: Outcome::Beat,
        reported_text: "0.68".into(),
        consensus_text: Some("0.64".into()),
        company_title: Some("NVIDIA Corp".into()),
    }
}

#[tokio::test]
async fn posts_embed_to_webhook() {
    let (url, hook) = spawn_hook(vec![]).await;
    let discord = DiscordNotifier::new(url).with_backoff_ms(1);

    discord.send(&alert()).await.expect("delivered");

    let bodies = hook.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let embed = &bodies[0]["embeds"][0];
    assert_eq!(bodies[0]["username"], "EarningsBot");
    assert_eq!(embed["title"], "NVDA: $0.68 vs. $0.64 expected");
    assert_eq!(embed["color"], 0x008000);
    assert_eq!(embed["author"]["name"], "NVIDIA Corp");
    assert_eq!(
        embed["author"]["icon_url"],
        "https://s3.amazonaws.com/logos.atom.finance/stocks-and-funds/NVDA.png"
    );
}

#[tokio::test]
async fn rate_limit_and_server_error_are_retried() {
    let (url, hook) = spawn_hook(vec![429, 502]).await;
    let discord = DiscordNotifier::new(url).with_backoff_ms(1).with_retries(3);

    discord.send(&alert()).await.expect("delivered after retries");
    assert_eq!(hook.bodies.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn huge_retry_after_is_capped_not_fatal() {
    let (url, hook) = spawn_hook_with(vec![429], "1e20").await;
    let discord = DiscordNotifier::new(url)
        .with_backoff_ms(1)
        .with_rate_limit_cap(Duration::from_millis(20));

    let started = Instant::now();
    discord.send(&alert()).await.expect("delivered after capped wait");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(hook.bodies.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let (url, hook) = spawn_hook(vec![400]).await;
    let discord = DiscordNotifier::new(url).with_backoff_ms(1);

    let err = discord.send(&alert()).await.unwrap_err();
    assert!(err.to_string().contains("400"));
    assert_eq!(hook.bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let (url, hook) = spawn_hook(vec![500, 500, 500, 500]).await;
    let discord = DiscordNotifier::new(url).with_backoff_ms(1).with_retries(2);

    assert!(discord.send(&alert()).await.is_err());
    assert_eq!(hook.bodies.lock().unwrap().len(), 2);
}
