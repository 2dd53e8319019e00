// Oracle trait — swap-ready abstraction over whatever answers prompts.

use thiserror::Error;

/// An error raised by the oracle itself (transport, provider, empty answer).
///
/// The pipeline tells oracle failures apart from other stage failures by
/// looking for this type in the stage error's chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OracleError {
    message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Synchronous, blocking `prompt -> response` function.
///
/// Implementations own transport concerns (timeouts, retries, rate limits);
/// callers make exactly one call per prompt.
pub trait LlmOracle: Send + Sync {
    fn query(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Any suitable closure is an oracle.
impl<F> LlmOracle for F
where
    F: Fn(&str) -> Result<String, OracleError> + Send + Sync,
{
    fn query(&self, prompt: &str) -> Result<String, OracleError> {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_an_oracle() {
        let echo = |prompt: &str| -> Result<String, OracleError> { Ok(prompt.to_uppercase()) };
        let oracle: &dyn LlmOracle = &echo;
        assert_eq!(oracle.query("abc").unwrap(), "ABC");
    }

    fn ask(oracle: &dyn LlmOracle) -> anyhow::Result<String> {
        let answer = oracle.query("hi")?;
        Ok(answer)
    }

    #[test]
    fn test_error_survives_anyhow() {
        let failing =
            |_: &str| -> Result<String, OracleError> { Err(OracleError::new("quota exceeded")) };
        let err = ask(&failing).unwrap_err();
        assert_eq!(
            err.downcast_ref::<OracleError>().map(OracleError::message),
            Some("quota exceeded")
        );
    }
}
