//! Prompt templates for document-grounded answering

/// Build the QA prompt from retrieved context and the user's question
///
/// The rules keep the model inside the supplied documents: no outside
/// knowledge, explicit "not found" when the context lacks an answer, and
/// markdown table output preserved from the source material.
#[must_use]
pub fn build_qa_prompt(question: &str, context: &str) -> String {
    format!(
        r"You are a document question-answering assistant. Answer the question using only the reference documents below.

Rules:
1. Answer only from the reference documents. Do not use outside knowledge.
2. If the documents do not contain the answer, say that the information was not found in the documents.
3. When the documents contain tables, reproduce the relevant rows as markdown tables.
4. When the answer describes a procedure, present the steps in order.
5. End the answer with the source document name(s) you used.

Reference documents:
{context}

Question: {question}

Answer:"
    )
}

/// Build the fallback answer used when no retrieved chunk clears the
/// similarity threshold
#[must_use]
pub fn build_fallback_answer(suggestions: &[String]) -> String {
    let mut answer = String::from(
        "I could not find information related to your question in the indexed documents.",
    );
    if !suggestions.is_empty() {
        answer.push_str("\n\nYou could try asking:\n");
        for suggestion in suggestions {
            answer.push_str("- ");
            answer.push_str(suggestion);
            answer.push('\n');
        }
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_prompt_contains_question_and_context() {
        let prompt = build_qa_prompt("How do I reset my password?", "Doc body here");
        assert!(prompt.contains("How do I reset my password?"));
        assert!(prompt.contains("Doc body here"));
        assert!(prompt.contains("only from the reference documents"));
    }

    #[test]
    fn test_fallback_without_suggestions() {
        let answer = build_fallback_answer(&[]);
        assert!(answer.contains("could not find"));
        assert!(!answer.contains("try asking"));
    }

    #[test]
    fn test_fallback_with_suggestions() {
        let answer = build_fallback_answer(&["What are the fees?".to_string()]);
        assert!(answer.contains("- What are the fees?"));
    }
}
