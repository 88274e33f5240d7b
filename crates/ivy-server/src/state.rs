use std::path::PathBuf;
use std::sync::Arc;

use ivy_agent::AgentConfig;
use ivy_core::storage::{JsonlStorage, MemorySaver, MemoryStore};
use ivy_core::tools::{RegistryExecutor, ToolExecutor, ToolRegistry};
use ivy_llm::{LLMProvider, OpenAIProvider};

use crate::tools::GetUserAgeTool;

/// Process-scoped context shared by all requests. Built once at startup and
/// handed to handlers through `web::Data` — no globals.
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<dyn MemoryStore>,
    pub llm: Arc<dyn LLMProvider>,
    pub tools: Arc<dyn ToolExecutor>,
    pub agent_config: AgentConfig,
}

impl AppState {
    pub async fn new(
        llm_base_url: String,
        model: String,
        api_key: String,
        data_dir: Option<PathBuf>,
    ) -> std::io::Result<Self> {
        let memory: Arc<dyn MemoryStore> = match data_dir {
            Some(dir) => {
                log::info!("Persisting conversations under {}", dir.display());
                let storage = JsonlStorage::new(&dir);
                storage.init().await?;
                Arc::new(storage)
            }
            None => {
                log::info!("Using in-memory conversation store");
                Arc::new(MemorySaver::new())
            }
        };

        log::info!("LLM: {} at {}", model, llm_base_url);
        let llm: Arc<dyn LLMProvider> = Arc::new(
            OpenAIProvider::new(api_key)
                .with_base_url(llm_base_url)
                .with_model(model),
        );

        Ok(Self {
            memory,
            llm,
            tools: build_tool_executor(),
            agent_config: AgentConfig::default(),
        })
    }

    /// Assemble state from parts; endpoint tests swap in a scripted provider.
    #[allow(dead_code)]
    pub fn with_components(
        memory: Arc<dyn MemoryStore>,
        llm: Arc<dyn LLMProvider>,
        tools: Arc<dyn ToolExecutor>,
    ) -> Self {
        Self {
            memory,
            llm,
            tools,
            agent_config: AgentConfig::default(),
        }
    }
}

pub fn build_tool_executor() -> Arc<dyn ToolExecutor> {
    let registry = ToolRegistry::new();
    if let Err(e) = registry.register(GetUserAgeTool) {
        log::error!("Failed to register builtin tool: {e}");
    }
    Arc::new(RegistryExecutor::new(Arc::new(registry)))
}
