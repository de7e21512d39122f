//! Full turns through the real backends over scripted transports.

use std::sync::Arc;

use planner::agents::test_support::{MockAgentTransport, MockModelTransport};
use planner::agents::{Backend, DirectGenerator, KnowledgeAgent, QueryRouter, Responder};
use planner::models::{AgentSession, Role, RouteMode};
use planner::{render_content, ChatSession, Rendered, RETRY_NOTICE};

fn router(model: Arc<MockModelTransport>, agent: Arc<MockAgentTransport>) -> QueryRouter {
    let responders: Vec<Arc<dyn Responder>> = vec![
        Arc::new(Backend::Direct(DirectGenerator::new(
            model,
            "test-model",
            "bedrock-2023-05-31",
        ))),
        Arc::new(Backend::Knowledge(KnowledgeAgent::new(agent, "AGENT", "ALIAS"))),
    ];
    QueryRouter::new(responders)
}

#[tokio::test]
async fn mixed_conversation() {
    let model = Arc::new(MockModelTransport::new());
    model.push_text(r#"[{"year": 2025, "gap": 450}, {"year": 2029, "gap": 550}]"#);
    model.push_failure("throttled");
    let agent = Arc::new(MockAgentTransport::new());
    agent.push_reply("s-kb-1", &["Bungalow ", "demand ", "grows."]);
    agent.push_reply("s-kb-2", &["Yes."]);
    let router = router(Arc::clone(&model), Arc::clone(&agent));

    let mut chat = ChatSession::new(AgentSession::new("planner-1"), RouteMode::Direct);

    let first = chat.handle_turn(&router, "Show the gap table").await;
    match render_content(&first.display) {
        Rendered::Table(table) => {
            assert_eq!(table.header, vec!["year", "gap"]);
            assert_eq!(table.rows.len(), 2);
        }
        Rendered::Text(text) => panic!("expected a table, got {text}"),
    }

    let second = chat.handle_turn(&router, "Again?").await;
    assert!(second.result.is_error());
    assert!(second.display.ends_with(RETRY_NOTICE));

    chat.set_mode(RouteMode::Knowledge);
    let third = chat.handle_turn(&router, "What does the data say?").await;
    assert_eq!(third.display, "Bungalow demand grows.");
    assert_eq!(chat.agent_session().id, "s-kb-1");

    chat.handle_turn(&router, "Sure?").await;
    let requests = agent.requests();
    assert_eq!(requests[0].session_id, "planner-1");
    assert_eq!(requests[1].session_id, "s-kb-1");
    assert_eq!(chat.agent_session().id, "s-kb-2");

    let roles: Vec<Role> = chat.turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        [Role::User, Role::Assistant].repeat(4),
        "every turn records a question and a reply"
    );
    assert_eq!(model.calls().len(), 2);
}
