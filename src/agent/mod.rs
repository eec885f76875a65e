//! Tool-calling agent loop
//!
//! The LLM does the reasoning; this module supplies configuration: the tool
//! table, the system prompt, and the iteration cap. Tools are a capability
//! interface dispatched by declared name, so adding one is a registry insert,
//! not a framework decoration.

pub mod tools;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{LlmClient, ToolCall};
use crate::error::{FlipError, Result};

/// Default iteration cap for the agent loop.
pub const DEFAULT_MAX_STEPS: u32 = 6;

pub const SYSTEM_PROMPT: &str = "You are a resale price analysis expert. Your job is to:\n\
1. Scrape product listings from provided URLs\n\
2. Analyze the product information\n\
3. Compare the listed price against typical market values\n\
4. Identify if items are underpriced and profitable to flip\n\n\
Analysis guidelines:\n\
- If listed price is 20%+ below market value: item is UNDERPRICED - issue an ALERT\n\
- If listed price is 10-20% below market value: item is a GOOD DEAL\n\
- If listed price is within 10% of market value: item is FAIRLY PRICED\n\
- If listed price is above market value: item is OVERPRICED\n\n\
For each analysis, provide:\n\
1. Product category and estimated market value\n\
2. Price comparison and fee-adjusted margin (use the margin_calculator tool)\n\
3. Recommendation (BUY, CONSIDER, or AVOID)\n\
4. An ALERT line if significantly underpriced\n\n\
Format the answer as short markdown.";

/// A capability the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;
    async fn invoke(&self, args: Value) -> Result<String>;
}

/// Lookup table of tools, dispatched by declared name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Tool declarations in the chat-completions wire shape.
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters(),
                    }
                })
            })
            .collect()
    }

    pub async fn dispatch(&self, name: &str, args: Value) -> Result<String> {
        match self.tools.get(name) {
            Some(tool) => tool.invoke(args).await,
            None => Err(FlipError::Agent(format!("unknown tool: {name}"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Drives the LLM through up to `max_steps` tool-calling rounds.
pub struct AgentRunner {
    llm: LlmClient,
    registry: ToolRegistry,
    system_prompt: String,
    max_steps: u32,
}

impl AgentRunner {
    pub fn new(llm: LlmClient, registry: ToolRegistry) -> Self {
        Self {
            llm,
            registry,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the loop until the model answers or the step cap is hit.
    pub async fn run(&self, user_prompt: &str) -> Result<String> {
        let mut messages = vec![
            serde_json::json!({"role": "system", "content": self.system_prompt}),
            serde_json::json!({"role": "user", "content": user_prompt}),
        ];
        let specs = self.registry.specs();

        for step in 0..self.max_steps {
            let turn = self.llm.chat(&messages, &specs).await?;

            if turn.tool_calls.is_empty() {
                return turn
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| FlipError::Api("LLM returned empty answer".into()));
            }

            tracing::debug!(step, calls = turn.tool_calls.len(), "dispatching tool calls");
            messages.push(turn.message.clone());
            for call in &turn.tool_calls {
                messages.push(self.tool_result_message(call).await);
            }
        }

        Err(FlipError::Agent(format!(
            "no final answer after {} steps",
            self.max_steps
        )))
    }

    /// Invoke one tool and wrap the outcome as a transcript message.
    ///
    /// Failures go back to the model as a tagged object instead of a bare
    /// string, so "tool errored" and "tool said something" stay
    /// distinguishable.
    async fn tool_result_message(&self, call: &ToolCall) -> Value {
        let payload = match self.registry.dispatch(&call.name, call.arguments.clone()).await {
            Ok(output) => serde_json::json!({"ok": true, "output": output}),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", call.name, e);
                serde_json::json!({"ok": false, "error": e.to_string()})
            }
        };
        serde_json::json!({
            "role": "tool",
            "tool_call_id": call.id,
            "content": payload.to_string(),
        })
    }
}
