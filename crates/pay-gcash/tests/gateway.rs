use pay_core::{
    Cart, Checkout, ConfirmationResponse, Navigation, PaymentError, PaymentGateway,
    PaymentInitiator, PollerConfig, Product, WatchObserver,
};
use pay_gcash::{GcashConfig, GcashGateway};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cart() -> Cart {
    let noodles = Product::new("A", "Noodles", dec!(10));
    let mut cart = Cart::new();
    cart.add(&noodles).unwrap();
    cart.add(&noodles).unwrap();
    cart
}

fn gateway(server: &MockServer) -> GcashGateway {
    GcashGateway::new(GcashConfig::default().with_api_base_url(server.uri())).unwrap()
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_payment_sends_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-gcash-payment"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentIntentId": "pi_123",
            "redirectUrl": "https://gcash.test/pay/pi_123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = gateway(&server).create_payment(&cart()).await.unwrap();

    assert_eq!(created.payment_intent_id.as_deref(), Some("pi_123"));
    assert_eq!(created.redirect_url.as_deref(), Some("https://gcash.test/pay/pi_123"));

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["cart"][0]["barcode"], "A");
    assert_eq!(bodies[0]["cart"][0]["name"], "Noodles");
    assert_eq!(bodies[0]["cart"][0]["quantity"], 2);
    assert!(bodies[0]["cart"][0]["price"].is_number());
    assert_eq!(bodies[0]["cart"][0]["price"], 10.0);
}

#[tokio::test]
async fn test_create_payment_http_error_is_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-gcash-payment"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "PayMongo down"})))
        .mount(&server)
        .await;

    let err = gateway(&server).create_payment(&cart()).await.unwrap_err();

    match err {
        PaymentError::Gateway { provider, message } => {
            assert_eq!(provider, "gcash");
            assert!(message.contains("PayMongo down"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_incomplete_create_response_rejected_by_initiator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-gcash-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paymentIntentId": "pi_9"})))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let created = gateway.create_payment(&cart()).await.unwrap();
    assert!(created.redirect_url.is_none());

    let initiator = PaymentInitiator::new(Arc::new(gateway));
    let err = initiator.initiate(&cart()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Gateway { .. }));
}

#[tokio::test]
async fn test_confirm_payment_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/confirm-gcash-payment"))
        .and(body_partial_json(json!({"paymentIntentId": "pi_123"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "status": "pending"})),
        )
        .mount(&server)
        .await;

    let response = gateway(&server)
        .confirm_payment("pi_123", &cart())
        .await
        .unwrap();

    assert_eq!(response, ConfirmationResponse::pending("pending"));
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["cart"][0]["barcode"], "A");
    assert_eq!(bodies[0]["cart"][0]["price"], 10.0);
}

#[tokio::test]
async fn test_confirm_payment_failures_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/confirm-gcash-payment"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/confirm-gcash-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let gateway = gateway(&server);

    let first = gateway.confirm_payment("pi_1", &cart()).await.unwrap_err();
    assert!(matches!(first, PaymentError::Transport(_)));
    assert!(first.is_retryable());

    let second = gateway.confirm_payment("pi_1", &cart()).await.unwrap_err();
    assert!(matches!(second, PaymentError::Serialization(_)));
    assert!(second.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let config = GcashConfig::default()
        .with_api_base_url("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_secs(2));
    let gateway = GcashGateway::new(config).unwrap();

    let err = gateway.confirm_payment("pi_1", &cart()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Transport(_)));
}

#[tokio::test]
async fn test_checkout_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-gcash-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentIntentId": "pi_e2e",
            "redirectUrl": "https://gcash.test/pay/pi_e2e"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/confirm-gcash-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/confirm-gcash-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let (observer, view) = WatchObserver::new();
    let checkout = Checkout::new(
        Arc::new(gateway(&server)),
        PollerConfig::default().with_poll_interval(Duration::from_millis(10)),
        Arc::new(observer),
    );

    let redirect = checkout.pay(&cart()).await.unwrap();
    assert_eq!(redirect.redirect_url, "https://gcash.test/pay/pi_e2e");

    let mut nav =
        Navigation::parse("http://localhost:3000/checkout?payment_intent=pi_e2e").unwrap();
    let order = checkout
        .resume(&mut nav, &Cart::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(order.requests_issued, 3);
    assert_eq!(order.total(), dec!(20));
    assert!(view.borrow().order_confirmed);
    assert!(!view.borrow().processing);
    assert_eq!(nav.visible_url(), "http://localhost:3000/checkout");
}
