#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payment processor configuration. Absent keys degrade the payment
    // endpoints to a "service unavailable" error instead of crashing.
    pub payment_secret_key: Option<String>,
    pub payment_publishable_key: Option<String>,
    pub payment_webhook_secret: Option<String>,
    pub payment_api_base: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        let payment_secret_key = std::env::var("PAYMENT_SECRET_KEY").ok();
        let payment_publishable_key = std::env::var("PAYMENT_PUBLISHABLE_KEY").ok();
        let payment_webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET").ok();
        let payment_api_base = std::env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            payment_secret_key,
            payment_publishable_key,
            payment_webhook_secret,
            payment_api_base,
        }
    }
}
