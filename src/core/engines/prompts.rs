//! Opaque prompt template text (§1: out of scope for the tested core
//! surface, but the engines need *something* concrete to send). These are
//! plain string constants, not a templating subsystem.

pub const DEEP_THINK_INITIAL: &str = "You are a careful problem solver. Work through the problem \
step by step and state your final solution clearly.";

pub const DEEP_THINK_CORRECT: &str = "You previously proposed a solution that a verifier flagged as \
incorrect or uncertain. Revise your solution to address the verifier's feedback, showing your \
corrected reasoning and a clearly stated final answer.";

pub const DEEP_THINK_SUMMARY: &str = "Summarize the final solution for the user in a few clear \
sentences, stating the answer first.";

pub const ULTRA_THINK_PLAN: &str = "Propose a short plan enumerating several genuinely distinct \
approaches to solving this problem.";

pub const ULTRA_THINK_AGENT_CONFIG: &str = "Produce a JSON array of agent specifications, one per \
approach, each an object with fields agentId, approach, specificPrompt, and optionally model, \
llm_params, qps, throttleSeconds. Respond with the JSON array only.";

pub const ULTRA_THINK_SYNTHESIS: &str = "You are given several independently derived candidate \
solutions to the same problem. Merge them into a single best solution, resolving any \
disagreements and keeping the strongest reasoning.";

pub fn correction_user_message(problem: &str, previous_solution: &str, verifier_feedback: &str) -> String {
    format!(
        "Problem:\n{problem}\n\nPrevious solution:\n{previous_solution}\n\nVerifier feedback:\n{verifier_feedback}"
    )
}

pub fn agent_guided_problem(problem: &str, specific_prompt: &str) -> String {
    format!("{problem}\n\nGuidance for this attempt: {specific_prompt}")
}
