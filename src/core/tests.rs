#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use mongodb::bson::oid::ObjectId;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::app::{AppServices, router};
    use crate::core::auth::{JwtConfig, JwtService};
    use crate::core::config::Deadlines;
    use crate::core::db::{InMemoryStore, Product, ProductStore, StoreError};

    const SECRET: &str = "end_to_end_secret";

    fn app_with(store: &InMemoryStore, products: Arc<dyn ProductStore>) -> Router {
        let services = AppServices::new(
            Arc::new(store.clone()),
            products,
            JwtService::new(JwtConfig::new(SECRET)),
            Deadlines::default(),
        );
        router(services)
    }

    fn app(store: &InMemoryStore) -> Router {
        app_with(store, Arc::new(store.clone()))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
        let credentials = format!(r#"{{"username": "{username}", "password": "{password}"}}"#);

        let (status, _) = send(app, Method::POST, "/register", None, Some(&credentials)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(app, Method::POST, "/login", None, Some(&credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    // ========================================================================
    // End-to-end Scenario Tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_login_and_manage_products() {
        let store = InMemoryStore::new();
        let app = app(&store);

        let token = register_and_login(&app, "alice", "p@ss").await;
        assert!(!token.is_empty());

        // The issued token is the one stored on the user and it validates
        let claims = JwtService::new(JwtConfig::new(SECRET))
            .validate_access_token(&token)
            .unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(store.user("alice").unwrap().token.as_deref(), Some(token.as_str()));

        let (status, body) = send(&app, Method::GET, "/products", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(&token),
            Some(r#"{"name": "Desk", "type": "Furniture", "sku": "DSK-1", "quantity": 4, "price": 120.0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let product_id = body["product_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/products/{product_id}/quantity"),
            Some(&token),
            Some(r#"{"quantity": -1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid quantity");

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/products/{product_id}/quantity"),
            Some(&token),
            Some(r#"{"quantity": 9}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 9);

        let (_, body) = send(&app, Method::GET, "/products", Some(&token), None).await;
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["_id"], product_id);
        assert_eq!(products[0]["quantity"], 9);
    }

    #[tokio::test]
    async fn test_negative_quantity_leaves_record_unchanged() {
        let store = InMemoryStore::new();
        let app = app(&store);
        let token = register_and_login(&app, "bob", "hunter2").await;

        let (_, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(&token),
            Some(r#"{"name": "Lamp", "quantity": 3, "price": 15.5}"#),
        )
        .await;
        let product_id = body["product_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/products/{product_id}/quantity"),
            Some(&token),
            Some(r#"{"quantity": -5}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let id = ObjectId::parse_str(&product_id).unwrap();
        assert_eq!(store.product(&id).unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let store = InMemoryStore::new();
        let app = app(&store);
        let token = register_and_login(&app, "carol", "secret").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/products/{}/quantity", ObjectId::new().to_hex()),
            Some(&token),
            Some(r#"{"quantity": 2}"#),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    // ========================================================================
    // Auth Boundary Tests
    // ========================================================================

    #[tokio::test]
    async fn test_products_without_token_are_rejected() {
        let app = app(&InMemoryStore::new());

        let (status, body) = send(&app, Method::GET, "/products", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header not provided");
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_rejected() {
        let app = app(&InMemoryStore::new());
        let foreign = JwtService::new(JwtConfig::new("not_the_server_secret"))
            .issue("alice", &ObjectId::new().to_hex())
            .unwrap();

        let (status, body) = send(
            &app,
            Method::GET,
            "/products",
            Some(&foreign.access_token),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_account_routes_are_public() {
        let app = app(&InMemoryStore::new());

        let (status, _) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(r#"{"username": "dave", "password": "pw"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
    }

    // ========================================================================
    // Concurrency Tests
    // ========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_admits_one_user() {
        let store = InMemoryStore::new();
        let app = app(&store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let body = format!(r#"{{"username": "racer", "password": "pw{i}"}}"#);
                send(&app, Method::POST, "/register", None, Some(&body))
                    .await
                    .0
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                status => assert_eq!(status, StatusCode::CONFLICT),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.user_count(), 1);
    }

    // ========================================================================
    // Deadline Tests
    // ========================================================================

    /// Product store whose calls never complete
    struct StalledProducts;

    #[async_trait]
    impl ProductStore for StalledProducts {
        async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
            std::future::pending().await
        }

        async fn insert(&self, _product: &Product) -> Result<(), StoreError> {
            std::future::pending().await
        }

        async fn set_quantity(
            &self,
            _id: ObjectId,
            _quantity: i64,
        ) -> Result<Option<Product>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        let store = InMemoryStore::new();
        let app = app_with(&store, Arc::new(StalledProducts));
        let token = JwtService::new(JwtConfig::new(SECRET))
            .issue("alice", &ObjectId::new().to_hex())
            .unwrap()
            .access_token;

        let (status, body) = send(&app, Method::GET, "/products", Some(&token), None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["code"], "TIMEOUT");

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/products/{}/quantity", ObjectId::new().to_hex()),
            Some(&token),
            Some(r#"{"quantity": 1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_default_deadlines() {
        let deadlines = Deadlines::default();

        assert_eq!(deadlines.standard, Duration::from_secs(100));
        assert_eq!(deadlines.quick, Duration::from_secs(10));
    }
}
