use chrono_tz::Tz;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Civil timezone all tenant schedules are evaluated in. The default,
    /// America/Sao_Paulo, keeps a fixed UTC-03:00 offset year-round.
    pub timezone: Tz,
    /// Shared secret for verifying bearer tokens issued by the external
    /// identity provider. Tokens are never minted here.
    pub auth_shared_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        let timezone: Tz = env::var("TENANT_TIMEZONE")
            .unwrap_or_else(|_| "America/Sao_Paulo".to_string())
            .parse()
            .expect("TENANT_TIMEZONE must be a valid IANA zone name");

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            timezone,
            auth_shared_secret: env::var("AUTH_SHARED_SECRET")
                .expect("AUTH_SHARED_SECRET must be set"),
        }
    }
}
