#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    // Minutes
    pub jwt_maxage: i64,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub admin: Option<AdminSeed>,
}

/// Credentials for the admin account provisioned at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");

        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60 * 24 * 7);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);
        let log_level = std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "debug".to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Config {
            database_url,
            jwt_secret,
            jwt_maxage,
            port,
            log_level,
            cors_origins,
            admin,
        }
    }
}
