use std::path::Path;
use std::sync::Arc;

use pelot_core::assistant::AssistantSettings;
use pelot_core::bootstrap::{create_pipeline, create_store};
use pelot_core::config::{Config, MemoryBackend};
use pelot_core::{Assistant, AssistantError, PromptTemplate};
use pelot_llm::any::AnyProvider;
use pelot_llm::mock::MockProvider;
use pelot_llm::provider::Role;
use pelot_memory::document::ChunkManifest;
use serial_test::serial;

struct App {
    dir: tempfile::TempDir,
    config: Config,
    assistant: Assistant,
    mock: MockProvider,
}

async fn app(mock: MockProvider) -> App {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::copy("prompt_template.yml", dir.path().join("prompt_template.yml")).unwrap();

    let mut config = Config::default();
    config.memory.backend = MemoryBackend::Memory;
    config.memory.vector_size = 4;
    config.ingest.folder = data;
    config.ingest.chunks_file = dir.path().join("chunks.json");
    config.ingest.extensions = vec!["txt".into()];
    config.ingest.max_length = 40;
    config.prompt.template_path = dir.path().join("prompt_template.yml");

    let provider = AnyProvider::Mock(mock.clone());
    let store = create_store(&config).unwrap();
    let pipeline = create_pipeline(&config, Arc::clone(&store), &provider);
    let assistant = Assistant::new(
        provider,
        store,
        pipeline,
        AssistantSettings::from_config(&config),
    );
    assistant.prepare().await.unwrap();

    App {
        dir,
        config,
        assistant,
        mock,
    }
}

fn write_doc(app: &App, name: &str, text: &str) {
    std::fs::write(app.config.ingest.folder.join(name), text).unwrap();
}

#[tokio::test]
async fn ingest_then_ask() {
    let mock = MockProvider::with_responses(vec!["Pelotas foi fundada em 1812.".into()]);
    let app = app(mock.clone()).await;
    write_doc(
        &app,
        "historia.txt",
        "Pelotas fica no Rio Grande do Sul. A cidade foi fundada em 1812. Ficou famosa pelos doces.",
    );

    let report = app.assistant.ingest().await.unwrap();
    assert_eq!(report.processed, vec!["historia"]);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(
        app.config.ui.ingest_status(&report),
        "Processados os seguintes PDFs: historia"
    );

    let answer = app.assistant.ask("Quando Pelotas foi fundada?").await.unwrap();
    assert_eq!(answer, "Pelotas foi fundada em 1812.");

    let prompts = mock.recorded_prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].len(), 1);
    assert_eq!(prompts[0][0].role, Role::User);
    let user = &prompts[0][0].content;
    assert!(user.contains("Pergunta: Quando Pelotas foi fundada?"));
    assert!(user.contains("A cidade foi fundada em 1812."));
    assert!(user.contains("A cidade foi fundada em 1812.\n\nFicou famosa pelos doces."));
}

#[tokio::test]
async fn manifest_lists_only_current_run() {
    let app = app(MockProvider::default()).await;
    write_doc(&app, "a.txt", "Primeiro documento.");
    app.assistant.ingest().await.unwrap();

    write_doc(&app, "b.txt", "Segundo documento.");
    let report = app.assistant.ingest().await.unwrap();
    assert_eq!(report.processed, vec!["b"]);
    assert_eq!(report.skipped, vec!["a"]);

    let manifest = ChunkManifest::read(&app.config.ingest.chunks_file)
        .await
        .unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(
        manifest.get("b"),
        Some(["Segundo documento.".to_owned()].as_slice())
    );
    assert!(manifest.get("a").is_none());
}

#[tokio::test]
async fn nothing_new_to_ingest() {
    let app = app(MockProvider::default()).await;
    write_doc(&app, "a.txt", "Texto.");
    app.assistant.ingest().await.unwrap();

    let report = app.assistant.ingest().await.unwrap();
    assert!(report.processed.is_empty());
    assert_eq!(
        app.config.ui.ingest_status(&report),
        "Todos os PDFs já foram processados."
    );
}

#[tokio::test]
async fn blank_question_is_rejected_before_embedding() {
    let mock = MockProvider::default();
    let app = app(mock.clone()).await;
    let err = app.assistant.ask("   ").await.unwrap_err();
    assert!(matches!(err, AssistantError::EmptyQuestion));
    assert_eq!(mock.embed_calls(), 0);
}

#[tokio::test]
async fn edited_template_applies_to_next_question() {
    let mock = MockProvider::default();
    let app = app(mock.clone()).await;
    app.assistant.ask("primeira").await.unwrap();

    std::fs::write(
        app.dir.path().join("prompt_template.yml"),
        "prompt_instructions: \"ONLY {query}\"\n",
    )
    .unwrap();
    app.assistant.ask("segunda").await.unwrap();

    let prompts = mock.recorded_prompts();
    assert_eq!(prompts[1].len(), 1);
    assert_eq!(prompts[1][0].content, "ONLY segunda");
}

#[test]
#[serial]
fn shipped_config_loads() {
    let config = Config::load(Path::new("config/default.toml")).unwrap();
    assert_eq!(config.memory.collection, "pdf_embeddings");
    assert_eq!(config.ingest.extensions, vec!["pdf"]);
    assert_eq!(config.ui.page_title, "Pelot.ai - Descubra Pelotas");
}

#[tokio::test]
async fn shipped_template_renders() {
    let template = PromptTemplate::load(Path::new("prompt_template.yml"))
        .await
        .unwrap();
    assert!(!template.system_prompt.is_empty());
    let prompt = template.render("Q?", "CTX").unwrap();
    assert!(prompt.contains("Pergunta: Q?"));
    assert!(prompt.contains("CTX"));
}
