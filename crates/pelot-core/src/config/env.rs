use super::{Config, MemoryBackend};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_memory();
        self.apply_env_overrides_ingest();
        self.apply_env_overrides_surface();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("PELOT_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("PELOT_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("PELOT_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("PELOT_LLM_EMBEDDING_TASK") {
            if let Ok(task) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.embedding_task = task;
            } else {
                tracing::warn!("ignoring invalid PELOT_LLM_EMBEDDING_TASK value: {v}");
            }
        }
        if let Ok(v) = std::env::var("PELOT_LLM_MAX_RETRIES")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_retries = n;
        }
    }

    fn apply_env_overrides_memory(&mut self) {
        if let Ok(v) = std::env::var("PELOT_MEMORY_BACKEND") {
            match serde_json::from_value::<MemoryBackend>(serde_json::Value::String(v.clone())) {
                Ok(backend) => self.memory.backend = backend,
                Err(_) => tracing::warn!("ignoring invalid PELOT_MEMORY_BACKEND value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PELOT_QDRANT_URL") {
            self.memory.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("PELOT_MEMORY_COLLECTION") {
            self.memory.collection = v;
        }
        if let Ok(v) = std::env::var("PELOT_MEMORY_VECTOR_SIZE")
            && let Ok(size) = v.parse::<u64>()
        {
            self.memory.vector_size = size;
        }
        if let Ok(v) = std::env::var("PELOT_MEMORY_RECALL_LIMIT")
            && let Ok(limit) = v.parse::<u64>()
        {
            self.memory.recall_limit = limit;
        }
    }

    fn apply_env_overrides_ingest(&mut self) {
        if let Ok(v) = std::env::var("PELOT_INGEST_FOLDER") {
            self.ingest.folder = v.into();
        }
        if let Ok(v) = std::env::var("PELOT_INGEST_CHUNKS_FILE") {
            self.ingest.chunks_file = v.into();
        }
        if let Ok(v) = std::env::var("PELOT_INGEST_MAX_LENGTH")
            && let Ok(n) = v.parse::<usize>()
        {
            self.ingest.max_length = n;
        }
        if let Ok(v) = std::env::var("PELOT_INGEST_SENTENCE_MAX_LENGTH")
            && let Ok(n) = v.parse::<usize>()
        {
            self.ingest.sentence_max_length = n;
        }
        if let Ok(v) = std::env::var("PELOT_INGEST_EXTENSIONS") {
            self.ingest.extensions = v
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_owned())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = std::env::var("PELOT_INGEST_MAX_FILE_SIZE")
            && let Ok(n) = v.parse::<u64>()
        {
            self.ingest.max_file_size = n;
        }
    }

    fn apply_env_overrides_surface(&mut self) {
        if let Ok(v) = std::env::var("PELOT_PROMPT_TEMPLATE") {
            self.prompt.template_path = v.into();
        }
        if let Ok(v) = std::env::var("PELOT_PROMPT_SEND_SYSTEM") {
            match v.parse::<bool>() {
                Ok(b) => self.prompt.send_system_prompt = b,
                Err(_) => tracing::warn!("ignoring invalid PELOT_PROMPT_SEND_SYSTEM value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PELOT_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("PELOT_GATEWAY_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.gateway.port = port;
            } else {
                tracing::warn!("ignoring invalid PELOT_GATEWAY_PORT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("PELOT_UI_TITLE") {
            self.ui.title = v;
        }
    }
}
