//! Error logging for route handlers

use axum::http::StatusCode;

/// Extension trait for logging an error and mapping it to the 500 the
/// handler answers with. The context string is what lands in the log, so
/// it should say which operation failed.
pub trait LogErr<T> {
    fn log_500(self, context: &str) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.map_err(|e| {
            eprintln!("{}: {}", context, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_500_passes_ok_and_maps_err() {
        let ok: Result<i32, String> = Ok(7);
        assert_eq!(ok.log_500("context"), Ok(7));

        let err: Result<i32, String> = Err("falhou".to_string());
        assert_eq!(
            err.log_500("context"),
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
