use std::env;
use std::str::FromStr;
use std::time::Duration;

// Upper bounds for duration settings
const MAX_STALENESS_SECS: i64 = 365 * 24 * 60 * 60;
const MAX_OTP_TTL_SECS: i64 = 24 * 60 * 60;
const MAX_JWT_TTL_HOURS: i64 = 365 * 24;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub jwt_ttl_hours: i64,
    pub reminder: ReminderConfig,
    pub notifier: NotifierConfig,
    pub notify_max_attempts: u32,
    pub notify_retry_base_secs: u64,
    pub otp: OtpConfig,
    pub require_verified_login: bool,
    pub auth_rate_burst: u32,
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub staleness: chrono::Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            staleness: chrono::Duration::days(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub ttl: chrono::Duration,
    pub max_attempts: i32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::minutes(5),
            max_attempts: 5,
        }
    }
}

/// Which transport delivers reminders and one-time codes.
#[derive(Debug, Clone)]
pub enum NotifierConfig {
    Log,
    Email {
        relay_url: String,
        api_key: String,
        from: String,
    },
    Voice {
        api_base: String,
        account_sid: String,
        auth_token: String,
        from_number: String,
        default_country_code: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let reminder = ReminderConfig {
            enabled: parse_or("REMINDER_ENABLED", true)?,
            interval: Duration::from_secs(parse_or("REMINDER_INTERVAL_SECS", 60u64)?),
            staleness: bounded_secs(
                "REMINDER_STALENESS_SECS",
                parse_or("REMINDER_STALENESS_SECS", 5 * 24 * 60 * 60i64)?,
                MAX_STALENESS_SECS,
            )?,
        };

        if reminder.interval.is_zero() {
            return Err("REMINDER_INTERVAL_SECS must be greater than zero".to_string());
        }

        let otp = OtpConfig {
            ttl: bounded_secs("OTP_TTL_SECS", parse_or("OTP_TTL_SECS", 300i64)?, MAX_OTP_TTL_SECS)?,
            max_attempts: parse_or("OTP_MAX_ATTEMPTS", 5i32)?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            jwt_ttl_hours: bounded_hours("JWT_TTL_HOURS", parse_or("JWT_TTL_HOURS", 24i64)?)?,
            reminder,
            notifier: NotifierConfig::from_env()?,
            notify_max_attempts: parse_or("NOTIFY_MAX_ATTEMPTS", 1u32)?,
            notify_retry_base_secs: parse_or("NOTIFY_RETRY_BASE_SECS", 30u64)?,
            otp,
            require_verified_login: parse_or("REQUIRE_VERIFIED_LOGIN", false)?,
            auth_rate_burst: parse_or("AUTH_RATE_BURST", 20u32)?,
        })
    }
}

impl NotifierConfig {
    fn from_env() -> Result<Self, String> {
        let kind = env::var("NOTIFIER").unwrap_or_else(|_| "log".to_string());

        match kind.trim().to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "email" => Ok(Self::Email {
                relay_url: required("EMAIL_RELAY_URL")?,
                api_key: required("EMAIL_RELAY_API_KEY")?,
                from: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "EstatePro Admin <no-reply@estatepro.app>".to_string()),
            }),
            "voice" => Ok(Self::Voice {
                api_base: env::var("VOICE_API_BASE")
                    .unwrap_or_else(|_| "https://api.twilio.com/2010-04-01".to_string()),
                account_sid: required("VOICE_ACCOUNT_SID")?,
                auth_token: required("VOICE_AUTH_TOKEN")?,
                from_number: required("VOICE_FROM_NUMBER")?,
                default_country_code: env::var("VOICE_DEFAULT_COUNTRY_CODE")
                    .unwrap_or_else(|_| "+91".to_string()),
            }),
            other => Err(format!("NOTIFIER must be one of log, email, voice (got '{}')", other)),
        }
    }
}

fn required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{} must be set", key))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Positive number of seconds, at most `max`.
fn bounded_secs(key: &str, secs: i64, max: i64) -> Result<chrono::Duration, String> {
    if secs <= 0 || secs > max {
        return Err(format!("{} must be between 1 and {} seconds (got {})", key, max, secs));
    }
    chrono::Duration::try_seconds(secs).ok_or_else(|| format!("{} is out of range", key))
}

/// Token lifetime in whole hours; returned as hours once validated.
fn bounded_hours(key: &str, hours: i64) -> Result<i64, String> {
    if hours <= 0 || hours > MAX_JWT_TTL_HOURS {
        return Err(format!(
            "{} must be between 1 and {} hours (got {})",
            key, MAX_JWT_TTL_HOURS, hours
        ));
    }
    chrono::Duration::try_hours(hours)
        .map(|_| hours)
        .ok_or_else(|| format!("{} is out of range", key))
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("{} has an invalid value: '{}'", key, raw))
}
