//! The core reasoning loop — the heart of skein.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Receive** a user message
//! 2. **Build context** (system prompt + scratchpad + conversation history)
//! 3. **Send to the completion backend**
//! 4. **Parse** the response into a structured intent
//! 5. **If an action**: dispatch the tool, inject the observation, loop
//! 6. **If a final answer**: emit it and terminate
//!
//! The loop continues until the model produces a final answer, the
//! iteration bound is reached, cancellation is requested, or the backend
//! fails. All output flows through the session's content stream.

pub mod dispatcher;
pub mod memory;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod stream;
pub mod test_helpers;

pub use dispatcher::{Dispatch, ToolDispatcher};
pub use memory::ConversationMemory;
pub use parser::{parse, Intent, ParsedResponse};
pub use prompt::PromptBuilder;
pub use session::{
    AgentSession, RunOptions, RunOutcome, SessionConfig, SessionHandle, DEFAULT_MAX_ITERATIONS,
};
pub use stream::ContentStream;
