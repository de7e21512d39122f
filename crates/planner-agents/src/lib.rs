pub mod direct;
pub mod error;
pub mod knowledge;
pub mod prediction;
pub mod prompts;
pub mod router;
pub mod transport;

pub mod test_support;

pub use direct::{DirectGenerator, GenerationParams};
pub use error::BackendError;
pub use knowledge::KnowledgeAgent;
pub use prediction::{Prediction, PredictionClient, PredictionInput};
pub use prompts::build_prompt;
pub use router::{Backend, NormalizedResult, QueryRouter, Responder};
pub use transport::{AgentInvocation, AgentTransport, ModelTransport};
