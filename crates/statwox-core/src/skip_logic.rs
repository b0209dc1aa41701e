//! Skip-logic evaluation.
//!
//! Pure functions mapping a question list and the current answers to the
//! questions a respondent should see. Questions are walked once, in `order`,
//! over an index arena; a matching rule moves the cursor forward to its
//! target. A target that does not appear later in the walk (unknown,
//! backward, or the question itself) hides every remaining question.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value;
use uuid::Uuid;

use crate::models::question::{Condition, Question, SkipLogicRule};
use crate::numeric::parse_float_prefix;

/// Current answers keyed by question ID. Values may be any JSON; they are
/// compared as text.
pub type AnswerMap = HashMap<Uuid, Value>;

/// Literal text an unanswered question compares as: an empty string in
/// JSON-quoted form.
const UNANSWERED: &str = "\"\"";

/// Evaluate one rule against a question's answer.
///
/// `gt` and `lt` compare numerically; when either side has no numeric
/// prefix the comparison is false, like a NaN comparison.
pub fn evaluate_rule(rule: &SkipLogicRule, answer: Option<&Value>) -> bool {
    let answer = answer_text(answer);

    match rule.condition {
        Condition::Equals => answer == rule.value,
        Condition::NotEquals => answer != rule.value,
        Condition::Contains => answer
            .to_lowercase()
            .contains(&rule.value.to_lowercase()),
        Condition::Gt => compare(&answer, &rule.value, |a, b| a > b),
        Condition::Lt => compare(&answer, &rule.value, |a, b| a < b),
        Condition::IsEmpty => is_blank(&answer),
        Condition::IsNotEmpty => !is_blank(&answer),
    }
}

/// IDs of the visible questions, in ascending `order`.
pub fn compute_visible_questions(questions: &[Question], answers: &AnswerMap) -> Vec<Uuid> {
    let sorted = sorted_indices(questions);
    let mut visible = Vec::with_capacity(sorted.len());

    let mut cursor = 0;
    while let Some(&index) = sorted.get(cursor) {
        let question = &questions[index];
        visible.push(question.id);

        let Some(target) = first_matching_target(question, answers) else {
            cursor += 1;
            continue;
        };

        // Only questions after the cursor can end a skip.
        match sorted[cursor + 1..]
            .iter()
            .position(|&i| questions[i].id == target)
        {
            Some(offset) => cursor += offset + 1,
            None => break,
        }
    }

    visible
}

/// The visible questions on `page`, in ascending `order`.
pub fn get_visible_questions_for_page<'a>(
    questions: &'a [Question],
    answers: &AnswerMap,
    page: u32,
) -> Vec<&'a Question> {
    let visible: HashSet<Uuid> = compute_visible_questions(questions, answers)
        .into_iter()
        .collect();

    let mut on_page: Vec<&Question> = questions
        .iter()
        .filter(|q| q.page == page && visible.contains(&q.id))
        .collect();
    on_page.sort_by_key(|q| q.order);
    on_page
}

/// Sorted, de-duplicated page numbers holding at least one visible question.
pub fn get_visible_pages(questions: &[Question], answers: &AnswerMap) -> Vec<u32> {
    let visible: HashSet<Uuid> = compute_visible_questions(questions, answers)
        .into_iter()
        .collect();

    questions
        .iter()
        .filter(|q| visible.contains(&q.id))
        .map(|q| q.page)
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .collect()
}

fn first_matching_target(question: &Question, answers: &AnswerMap) -> Option<Uuid> {
    let answer = answers.get(&question.id);
    question
        .logic
        .iter()
        .find(|rule| evaluate_rule(rule, answer))
        .map(|rule| rule.target_question_id)
}

/// Stable sort of arena indices by `order`.
fn sorted_indices(questions: &[Question]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..questions.len()).collect();
    indices.sort_by_key(|&i| questions[i].order);
    indices
}

fn answer_text(answer: Option<&Value>) -> String {
    match answer {
        None | Some(Value::Null) => UNANSWERED.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_blank(answer: &str) -> bool {
    answer.is_empty() || answer == UNANSWERED
}

fn compare(answer: &str, expected: &str, op: impl Fn(f64, f64) -> bool) -> bool {
    match (parse_float_prefix(answer), parse_float_prefix(expected)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}
