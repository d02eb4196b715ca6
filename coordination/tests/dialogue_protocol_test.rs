//! Dialogue protocol integration tests: turn counts, context fan-out and
//! failure behaviour, driven by a scripted backend.

use std::sync::Arc;

use coordination::testing::ScriptedGenerator;
use coordination::{
    Agent, Capability, CoordinationError, DialogueCoordinator, DialogueStyle, ResearchTeam,
    Roster, TranscriptEntry, TurnKind,
};

fn writers(names: &[&str], gen: &Arc<ScriptedGenerator>) -> Roster {
    Roster::new(
        names
            .iter()
            .map(|n| {
                Agent::new(
                    *n,
                    format!("{n} Perspective"),
                    Capability::Writer,
                    "llama3.2:3b",
                    gen.clone(),
                )
            })
            .collect(),
    )
    .unwrap()
}

// ── Turn counts ────────────────────────────────────────────────────

#[tokio::test]
async fn panel_entry_count_is_r_times_w_times_w_plus_one() {
    for (w, r) in [(2usize, 1usize), (2, 3), (3, 2), (4, 1)] {
        let gen = Arc::new(ScriptedGenerator::echo());
        let names: Vec<String> = (0..w).map(|i| format!("Writer {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut roster = writers(&refs, &gen);

        let t = DialogueCoordinator::new(DialogueStyle::Panel, r)
            .run(&mut roster, "tides")
            .await
            .unwrap();

        assert_eq!(t.turn_count(), r * w * (1 + w), "w={w} r={r}");
        assert_eq!(t.separator_count(), r * w, "w={w} r={r}");
        assert_eq!(gen.call_count(), r * w * (1 + w));
    }
}

#[tokio::test]
async fn exchange_entry_count_is_two_r_plus_r_separators() {
    for r in [0usize, 1, 5] {
        let gen = Arc::new(ScriptedGenerator::echo());
        let mut roster = writers(&["Scientific Writer", "Religious Writer"], &gen);

        let t = DialogueCoordinator::new(DialogueStyle::Exchange, r)
            .run(&mut roster, "tides")
            .await
            .unwrap();

        assert_eq!(t.turn_count(), 2 * r);
        assert_eq!(t.separator_count(), r);
    }
}

#[tokio::test]
async fn exchange_with_three_writers_leaves_the_third_out() {
    let gen = Arc::new(ScriptedGenerator::echo());
    let mut roster = writers(&["A", "B", "C"], &gen);

    DialogueCoordinator::new(DialogueStyle::Exchange, 2)
        .run(&mut roster, "tides")
        .await
        .unwrap();

    assert!(roster.get("C").unwrap().context().individual().is_empty());
    assert_eq!(roster.get("A").unwrap().context().individual().len(), 4);
}

// ── Context fan-out ────────────────────────────────────────────────

#[tokio::test]
async fn fan_out_is_third_person_for_peers_first_person_for_self() {
    let gen = Arc::new(ScriptedGenerator::sequence([
        "Q?", "answer-a", "answer-b", "answer-c",
    ]));
    let mut roster = writers(&["A", "B", "C"], &gen);

    let coordinator = DialogueCoordinator::new(DialogueStyle::Panel, 1);
    coordinator.run(&mut roster, "tides").await.unwrap();

    let a = roster.get("A").unwrap().context().individual();
    let b = roster.get("B").unwrap().context().individual();
    let c = roster.get("C").unwrap().context().individual();

    assert_eq!(a.fragments()[0], "My answer: answer-a");
    assert_eq!(b.fragments()[0], "A's answer: answer-a");
    assert_eq!(c.fragments()[0], "A's answer: answer-a");
    assert_eq!(b.fragments()[1], "My answer: answer-b");
    assert_eq!(a.fragments()[1], "B's answer: answer-b");

    assert!(!a.contains("A's answer:"));
    assert!(!b.contains("B's answer:"));
    assert!(!c.contains("C's answer:"));
}

#[tokio::test]
async fn later_speakers_see_earlier_answers_in_their_prompt() {
    let gen = Arc::new(ScriptedGenerator::sequence(["Q?", "first answer"]));
    let mut roster = writers(&["A", "B"], &gen);

    DialogueCoordinator::new(DialogueStyle::Panel, 1)
        .run(&mut roster, "tides")
        .await
        .unwrap();

    // Call 3 is B answering A's question, after A's own answer was fanned out.
    let calls = gen.calls();
    assert!(calls[2].starts_with("B Perspective\n\nShared Context:"));
    assert!(calls[2].contains("Individual Context:\nA's answer: first answer"));
}

#[tokio::test]
async fn context_only_grows() {
    let gen = Arc::new(ScriptedGenerator::echo());
    let mut roster = writers(&["A", "B"], &gen);
    roster.broadcast("Research on tides:\nthe moon");
    let before: Vec<usize> = roster.agents().iter().map(|a| a.context().len()).collect();

    for round_count in [1, 2] {
        DialogueCoordinator::new(DialogueStyle::Panel, round_count)
            .run(&mut roster, "tides")
            .await
            .unwrap();
        let after: Vec<usize> = roster.agents().iter().map(|a| a.context().len()).collect();
        for (b, a) in before.iter().zip(&after) {
            assert!(a >= b);
        }
    }
    for agent in roster.agents() {
        assert_eq!(
            agent.context().shared().fragments(),
            &["Research on tides:\nthe moon"]
        );
    }
}

// ── Failure behaviour ──────────────────────────────────────────────

#[test]
fn duplicate_names_never_form_a_roster() {
    let gen = Arc::new(ScriptedGenerator::echo());
    let err = Roster::new(vec![
        Agent::new("A", "A Perspective", Capability::Writer, "m", gen.clone()),
        Agent::new("A", "A Perspective", Capability::Writer, "m", gen.clone()),
    ])
    .unwrap_err();

    assert!(matches!(err, CoordinationError::Configuration(_)));
    assert_eq!(gen.call_count(), 0);
}

#[tokio::test]
async fn roster_of_one_writer_makes_zero_calls() {
    let gen = Arc::new(ScriptedGenerator::echo());
    let mut roster = writers(&["Lonely Writer"], &gen);

    for style in [DialogueStyle::Panel, DialogueStyle::Exchange] {
        let err = DialogueCoordinator::new(style, 3)
            .run(&mut roster, "tides")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::InsufficientParticipants { found: 1, .. }
        ));
    }
    assert_eq!(gen.call_count(), 0);
}

#[tokio::test]
async fn mid_round_failure_aborts_without_further_calls() {
    let gen = Arc::new(ScriptedGenerator::failing_at(3));
    let mut roster = writers(&["A", "B"], &gen);

    let err = DialogueCoordinator::new(DialogueStyle::Panel, 2)
        .run(&mut roster, "tides")
        .await
        .unwrap_err();

    assert!(err.is_retriable());
    match err {
        CoordinationError::GenerationFailure { agent, .. } => assert_eq!(agent, "B"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(gen.call_count(), 3);
    // A's answer was already fanned out before B failed; nothing is rolled back.
    assert_eq!(roster.get("B").unwrap().context().individual().len(), 1);
}

// ── ResearchTeam ───────────────────────────────────────────────────

#[tokio::test]
async fn team_session_flows_research_into_every_prompt() {
    let gen = Arc::new(ScriptedGenerator::from_fn(|n, prompt| {
        if prompt.contains("comprehensive summary of the latest information") {
            Ok("RESEARCH NOTES".to_string())
        } else {
            Ok(format!("turn {n}"))
        }
    }));
    let mut roster = Roster::default();
    roster
        .push(Agent::new(
            "Researcher",
            "Information Gatherer",
            Capability::Researcher,
            "m",
            gen.clone(),
        ))
        .unwrap();
    for (name, role) in [
        ("Scientific Writer", "Science Perspective"),
        ("Religious Writer", "Religious Perspective"),
    ] {
        roster
            .push(Agent::new(name, role, Capability::Writer, "m", gen.clone()))
            .unwrap();
    }
    let mut team = ResearchTeam::new(roster);

    let info = team.research_and_share("tides").await.unwrap();
    assert_eq!(info, "RESEARCH NOTES");

    let transcript = team
        .interactive_dialogue("tides", 1, DialogueStyle::Panel)
        .await
        .unwrap();
    assert_eq!(transcript.turn_count(), 6);
    // Answers fan out to writers only.
    let researcher = team.roster().get("Researcher").unwrap();
    assert!(researcher.context().individual().is_empty());
    assert_eq!(researcher.context().shared().len(), 1);
    match &transcript.entries()[0] {
        TranscriptEntry::Turn { speaker, kind, .. } => {
            assert_eq!(speaker, "Scientific Writer");
            assert_eq!(*kind, TurnKind::Question);
        }
        TranscriptEntry::Separator => panic!("expected a question first"),
    }

    let reflections = team.reflect_on_debate("tides").await.unwrap();
    let names: Vec<_> = reflections.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["Scientific Writer", "Religious Writer"]);

    let articles = team.write_articles("tides").await.unwrap();
    assert_eq!(articles.len(), 2);

    // Every dialogue/reflection/article prompt carried the broadcast research.
    let research_prompts = gen.calls_containing("Research on tides:\nRESEARCH NOTES");
    assert_eq!(research_prompts, gen.call_count() - 1);

    let last = gen.calls().last().cloned().unwrap();
    assert!(last.contains("Reflection on the debate:\n"));
    assert!(last.contains("Write an article on the topic: tides"));
}

#[tokio::test]
async fn team_without_researcher_fails_fast() {
    let gen = Arc::new(ScriptedGenerator::echo());
    let team = ResearchTeam::new(writers(&["A", "B"], &gen));

    let err = team.conduct_research("tides").await.unwrap_err();
    assert!(matches!(
        err,
        CoordinationError::MissingCapability(Capability::Researcher)
    ));
    assert_eq!(gen.call_count(), 0);
}
