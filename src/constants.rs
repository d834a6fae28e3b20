pub const APPLICATION_JSON: &str = "application/json";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "5000";
pub const DEFAULT_POOL_SIZE: &str = "5";

pub const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
