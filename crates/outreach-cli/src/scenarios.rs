//! Built-in smoke scenarios for `outreach eval`, mirroring the scenarios
//! `outreach-eval`'s own integration suite drives over the legacy topology.
//! A file-driven scenario format (YAML scenario packs) is a natural next
//! step but has no grounding example in the pack beyond what's already
//! implemented here, so this CLI ships the fixed set instead of inventing a
//! serialization schema for `EvalScenario`.

use outreach_eval::{
    EvalScenario, ExpectedLlmResponse, ExpectedOutcome, ExpectedToolCall, MatchMode,
};
use outreach_graph::{Contact, Priority, Record, RecordStatus, ToolResult};
use serde_json::json;
use std::collections::HashMap;

fn invoice_record() -> Record {
    Record {
        id: "rec1".into(),
        title: "Invoice 1001".into(),
        status: RecordStatus::Open,
        priority: Some(Priority::High),
        record_type: "invoice".into(),
        metadata: HashMap::new(),
    }
}

fn jane_contact() -> Contact {
    Contact {
        id: "c1".into(),
        display_name: "Jane Doe".into(),
        email: Some("jane@example.com".into()),
        phone: Some("+15551234".into()),
        preferred_channel: Some("EMAIL".into()),
    }
}

pub fn builtin() -> Vec<EvalScenario> {
    let mut s1_tools = HashMap::new();
    s1_tools.insert(
        "sendEmail".to_string(),
        ToolResult::ok("sent", Some(json!({"messageId": "m1"}))),
    );
    let s1 = EvalScenario {
        id: "s1_happy_path_email_flow".into(),
        record: invoice_record(),
        contact: Some(jane_contact()),
        mock_tools: s1_tools,
        llm_script: vec!["needs_email".into(), "complete".into()],
        interrupts: vec![json!({"channel": "EMAIL", "content": "Thanks, paid."})],
        expected: ExpectedOutcome {
            node_sequence: Some(vec![
                "analyzeRecord".into(),
                "sendEmail".into(),
                "waitForResponse".into(),
                "processResponse".into(),
                "analyzeRecord".into(),
                "markComplete".into(),
            ]),
            record_status: Some(RecordStatus::Done),
            tools_called: vec![ExpectedToolCall::strict(
                "updateRecordStatus",
                json!({"status": "DONE"}),
            )],
            ..Default::default()
        },
    };

    let mut s2_tools = HashMap::new();
    s2_tools.insert("sendCall".to_string(), ToolResult::ok("dialed", None));
    let s2 = EvalScenario {
        id: "s2_no_response_human_review_waits".into(),
        record: invoice_record(),
        contact: Some(jane_contact()),
        mock_tools: s2_tools,
        llm_script: vec!["needs_call".into(), "thanks, noted".into(), "escalate".into()],
        interrupts: vec![json!({"timeout": true, "content": ""})],
        expected: ExpectedOutcome {
            node_sequence: Some(vec![
                "analyzeRecord".into(),
                "sendCall".into(),
                "waitForResponse".into(),
                "processResponse".into(),
                "analyzeRecord".into(),
                "humanReview".into(),
            ]),
            ..Default::default()
        },
    };

    let mut s6_tools = HashMap::new();
    s6_tools.insert(
        "sendEmail".to_string(),
        ToolResult::ok(
            "sent",
            Some(json!({"subject": "Re: Invoice #1001", "body": "…"})),
        ),
    );
    let s6 = EvalScenario {
        id: "s6_llm_judge_argument_match".into(),
        record: invoice_record(),
        contact: Some(jane_contact()),
        mock_tools: s6_tools,
        llm_script: vec!["needs_email".into()],
        interrupts: vec![],
        expected: ExpectedOutcome {
            tools_called: vec![ExpectedToolCall {
                name: "sendEmail".into(),
                args: Some(json!({"subject": "Invoice 1001"})),
                match_mode: MatchMode::Judge,
            }],
            llm_responses: vec![ExpectedLlmResponse {
                node: "analyzeRecord".into(),
                contains: vec!["needs_email".into()],
            }],
            ..Default::default()
        },
    };

    vec![s1, s2, s6]
}
