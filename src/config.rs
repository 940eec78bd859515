//! Session configuration resolved from the environment.

use std::env;

/// Default backend root; override with [`ENV_API_URL`].
pub const DEFAULT_API_URL: &str = "http://localhost:8080/appMedica/rest";

/// Request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "APPMEDICA_API_URL";
pub const ENV_TOKEN: &str = "APPMEDICA_TOKEN";

/// Backend root URL, from the environment or the default.
pub fn api_url() -> String {
    env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Bearer credential issued by the identity provider, when present in
/// the environment.
pub fn session_token() -> Option<String> {
    env::var(ENV_TOKEN).ok().filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both checks share one test because they mutate process-global
    // environment state.
    #[test]
    fn api_url_prefers_the_environment() {
        env::remove_var(ENV_API_URL);
        assert_eq!(api_url(), DEFAULT_API_URL);

        env::set_var(ENV_API_URL, "https://clinica.example/rest");
        assert_eq!(api_url(), "https://clinica.example/rest");
        env::remove_var(ENV_API_URL);
    }

    #[test]
    fn empty_token_counts_as_absent() {
        env::set_var(ENV_TOKEN, "");
        assert_eq!(session_token(), None);
        env::remove_var(ENV_TOKEN);
    }
}
