// LLM oracle — the single `prompt -> response` function every stage talks to.
//
// The LlmOracle trait is the seam: the pipeline and the default stages only
// ever see `&dyn LlmOracle`. OpenAiOracle is the HTTP implementation used by
// the binary; tests use closures.

pub mod openai;
pub mod traits;

pub use traits::{LlmOracle, OracleError};
