//! Task instructions handed to agents, and the fixed prompt frame they are
//! rendered into.
//!
//! Bump `PROMPT_VERSION` whenever any instruction text changes so transcripts
//! can be traced back to the wording that produced them.

pub const PROMPT_VERSION: &str = "1.2.0";

/// Render the full prompt for one generation call.
///
/// Order is fixed: role, shared context, individual context, task.
pub fn render_prompt(role: &str, shared: &str, individual: &str, task: &str) -> String {
    format!(
        "{role}\n\nShared Context:\n{shared}\n\nIndividual Context:\n{individual}\n\nPrompt: {task}\n\nResponse:"
    )
}

pub fn research(topic: &str) -> String {
    format!(
        "Please provide a comprehensive summary of the latest information on the topic: {topic}. \
         Include key facts, different perspectives, and any recent developments."
    )
}

/// Long-form research used to seed the summarize/critique loop.
pub fn rigorous_research(topic: &str) -> String {
    format!(
        "Research the topic '{topic}' and gather information and present them in the most \
         rigorous way, avoid lists and summarization. Use an academic style of language and \
         phrasing, be as detailed and complete as possible."
    )
}

/// Shared-context broadcast carrying research results.
pub fn research_broadcast(topic: &str, information: &str) -> String {
    format!("Research on {topic}:\n{information}")
}

pub fn panel_question(round: usize, role: &str, topic: &str) -> String {
    format!(
        "Round {}: As the {role}, ask a thought-provoking question about '{topic}' that \
         challenges or explores different perspectives. Be concise.",
        round + 1
    )
}

pub fn panel_answer(role: &str, topic: &str, question: &str) -> String {
    format!(
        "As the {role}, answer the following question about '{topic}': {question}\n\
         Provide your perspective concisely."
    )
}

pub fn exchange_opening(round: usize, topic: &str, partner: &str) -> String {
    format!(
        "Round {}: Based on the previous discussion, ask a thought-provoking question or make \
         a statement about '{topic}' that challenges or explores {partner}'s perspective. Be concise.",
        round + 1
    )
}

pub fn exchange_rejoinder(round: usize, topic: &str, opener: &str, opening: &str) -> String {
    format!(
        "Round {}: Respond to {opener}'s statement/question: '{opening}'. Then, ask a follow-up \
         question or make a challenging statement about '{topic}' from your perspective. Be concise.",
        round + 1
    )
}

pub fn reflection(topic: &str, role: &str) -> String {
    format!(
        "Reflect on the interactive dialogue about '{topic}' from your perspective as a {role}. \
         Consider the key points raised, areas of agreement and disagreement, and how this \
         discussion has influenced or refined your viewpoint. Summarize your reflections concisely."
    )
}

pub fn article(topic: &str, role: &str) -> String {
    format!(
        "Write an article on the topic: {topic} from your perspective as a {role}. Use the shared \
         context, individual context (including your reflection on the debate), and the results \
         of the interactive dialogue as a basis for your article. The article should be \
         well-structured, present a coherent argument or viewpoint, and acknowledge the \
         complexity of the topic as revealed in the debate."
    )
}

pub fn summarize(data: &str) -> String {
    format!("Summarize the following data: {data}")
}

pub fn critique(artifact: &str) -> String {
    format!("Critique the following research and suggest improvements: {artifact}")
}

pub fn refine(research_data: &str, summary: &str, critique: &str) -> String {
    format!(
        "Refine the following summary based on the original text and the critique:\n \
         Research Data:{research_data}\nSummary: {summary}\nCritique: {critique}"
    )
}

// Context fragments written by the dialogue protocol.

pub fn peer_answer(respondent: &str, answer: &str) -> String {
    format!("{respondent}'s answer: {answer}")
}

pub fn own_answer(answer: &str) -> String {
    format!("My answer: {answer}")
}

pub fn own_opening(text: &str) -> String {
    format!("My question/statement: {text}")
}

pub fn peer_opening(opener: &str, text: &str) -> String {
    format!("{opener}'s question/statement: {text}")
}

pub fn own_rejoinder(text: &str) -> String {
    format!("My response and question: {text}")
}

pub fn peer_rejoinder(responder: &str, text: &str) -> String {
    format!("{responder}'s response and question: {text}")
}

pub fn reflection_note(reflection: &str) -> String {
    format!("Reflection on the debate:\n{reflection}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_frame_order_is_fixed() {
        let p = render_prompt("ROLE", "SHARED", "MINE", "TASK");
        let role = p.find("ROLE").unwrap();
        let shared = p.find("SHARED").unwrap();
        let mine = p.find("MINE").unwrap();
        let task = p.find("TASK").unwrap();
        assert!(role < shared && shared < mine && mine < task);
        assert!(p.ends_with("Response:"));
    }

    #[test]
    fn rounds_are_one_based_in_instructions() {
        assert!(panel_question(0, "Science Perspective", "tides").starts_with("Round 1:"));
        assert!(exchange_opening(2, "tides", "Religious Writer").starts_with("Round 3:"));
    }

    #[test]
    fn answer_instruction_carries_literal_question() {
        let q = "Is the moon responsible?";
        assert!(panel_answer("Science Perspective", "tides", q).contains(q));
    }

    #[test]
    fn fan_out_phrasing() {
        assert_eq!(peer_answer("A", "x"), "A's answer: x");
        assert_eq!(own_answer("x"), "My answer: x");
    }
}
